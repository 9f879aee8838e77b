use crate::core::transport::Transport;
use crate::domain::config::{FlowControlConfig, ParityConfig, SerialConfig, TransportKind};
use crate::domain::error::{GwError, GwResult};
use crate::infrastructure::serial::ports::detect_port;
use async_trait::async_trait;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Console over a local serial line
pub struct SerialTransport {
    port_name: Option<String>,
    baud_rate: u32,
    data_bits: serialport::DataBits,
    stop_bits: serialport::StopBits,
    parity: serialport::Parity,
    flow_control: serialport::FlowControl,
    settle: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Validate the line parameters. `settle` is waited after every open.
    pub fn new(config: &SerialConfig, settle: Duration) -> GwResult<Self> {
        let data_bits = match config.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(GwError::Config {
                    message: format!("Invalid data bits: {}", other),
                })
            }
        };

        let stop_bits = match config.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => {
                return Err(GwError::Config {
                    message: format!("Invalid stop bits: {}", other),
                })
            }
        };

        let parity = match config.parity {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Even => serialport::Parity::Even,
            ParityConfig::Odd => serialport::Parity::Odd,
        };

        let flow_control = match config.flow_control {
            FlowControlConfig::None => serialport::FlowControl::None,
            FlowControlConfig::Software => serialport::FlowControl::Software,
            FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
        };

        Ok(Self {
            port_name: config.port.clone(),
            baud_rate: config.baud_rate,
            data_bits,
            stop_bits,
            parity,
            flow_control,
            settle,
            port: None,
        })
    }

    fn port_mut(&mut self) -> GwResult<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(GwError::NotConnected)
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn describe(&self) -> String {
        format!(
            "{}@{}",
            self.port_name.as_deref().unwrap_or("<auto>"),
            self.baud_rate
        )
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    async fn connect(&mut self) -> GwResult<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let port_name = match &self.port_name {
            Some(name) => name.clone(),
            None => {
                let detected = detect_port()?;
                info!("Auto-detected serial port {}", detected);
                self.port_name = Some(detected.clone());
                detected
            }
        };

        info!("Connecting to {} at {} baud...", port_name, self.baud_rate);
        let port = serialport::new(&port_name, self.baud_rate)
            .data_bits(self.data_bits)
            .stop_bits(self.stop_bits)
            .parity(self.parity)
            .flow_control(self.flow_control)
            .timeout(Duration::from_millis(100))
            .open()?;

        // The console firmware needs a moment to attach after open.
        if !self.settle.is_zero() {
            debug!("Waiting {:?} for the serial line to settle", self.settle);
            tokio::time::sleep(self.settle).await;
        }

        self.port = Some(port);
        info!("Serial port {} opened", port_name);
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> GwResult<()> {
        let port = self.port_mut()?;
        port.write_all(data)?;
        port.flush()?;
        debug!("Sent {} bytes over serial", data.len());
        Ok(())
    }

    async fn receive_nonblocking(&mut self) -> GwResult<Vec<u8>> {
        let port = self.port_mut()?;
        let available = port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; available];
        match port.read(&mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                Ok(buffer)
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&mut self) -> GwResult<()> {
        if self.port.take().is_some() {
            info!("Serial connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> SerialConfig {
        SerialConfig {
            port: Some("/dev/null".to_string()),
            ..SerialConfig::default()
        }
    }

    #[tokio::test]
    async fn test_serial_connect_fails_gracefully() {
        let mut transport = SerialTransport::new(&create_test_config(), Duration::ZERO).unwrap();

        // /dev/null is not a tty
        assert!(transport.connect().await.is_err());
        assert!(!transport.is_open());
    }

    #[tokio::test]
    async fn test_io_before_connect_is_rejected() {
        let mut transport = SerialTransport::new(&create_test_config(), Duration::ZERO).unwrap();

        assert!(matches!(transport.send(b"uptime\r\n").await, Err(GwError::NotConnected)));
        assert!(matches!(transport.receive_nonblocking().await, Err(GwError::NotConnected)));
        assert!(transport.close().await.is_ok());
    }

    #[test]
    fn test_invalid_line_parameters() {
        let bad_data_bits = SerialConfig {
            data_bits: 9,
            ..create_test_config()
        };
        assert!(matches!(
            SerialTransport::new(&bad_data_bits, Duration::ZERO),
            Err(GwError::Config { .. })
        ));

        let bad_stop_bits = SerialConfig {
            stop_bits: 3,
            ..create_test_config()
        };
        assert!(SerialTransport::new(&bad_stop_bits, Duration::ZERO).is_err());
    }

    #[test]
    fn test_describe() {
        let transport = SerialTransport::new(&create_test_config(), Duration::ZERO).unwrap();
        assert_eq!(transport.describe(), "/dev/null@115200");
        assert_eq!(transport.kind(), TransportKind::Serial);

        let auto = SerialTransport::new(&SerialConfig::default(), Duration::ZERO).unwrap();
        assert_eq!(auto.describe(), "<auto>@115200");
    }
}

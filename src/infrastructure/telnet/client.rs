use crate::core::transport::Transport;
use crate::domain::config::{TelnetConfig, TransportKind};
use crate::domain::error::{GwError, GwResult};
use crate::infrastructure::telnet::codec::{escape, TelnetCodec};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Console over a Telnet socket
pub struct TelnetTransport {
    config: TelnetConfig,
    settle: Duration,
    stream: Option<TcpStream>,
    codec: TelnetCodec,
}

impl TelnetTransport {
    /// `settle` is waited after every write so the device can start answering
    pub fn new(config: &TelnetConfig, settle: Duration) -> Self {
        Self {
            config: config.clone(),
            settle,
            stream: None,
            codec: TelnetCodec::new(),
        }
    }

    /// Discard output the device printed since the last read
    async fn drain_stale(&mut self) -> GwResult<()> {
        loop {
            let stale = self.receive_nonblocking().await?;
            if stale.is_empty() {
                return Ok(());
            }
            trace!("Discarded {} stale bytes", stale.len());
        }
    }
}

#[async_trait]
impl Transport for TelnetTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Telnet
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    fn host(&self) -> Option<&str> {
        Some(&self.config.host)
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn connect(&mut self) -> GwResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = self.config.host.as_str();
        let port = self.config.port;
        info!("Connecting to {}:{}...", host, port);

        let stream = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            TcpStream::connect((host, port)),
        )
        .await
        .map_err(|_| {
            GwError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("Connection timeout to {}:{}", host, port),
            ))
        })??;

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        self.codec.reset();
        self.stream = Some(stream);
        info!("Telnet connection established to {}:{}", host, port);
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> GwResult<()> {
        // Stale output would otherwise be mistaken for this command's echo.
        self.drain_stale().await?;

        let stream = self.stream.as_mut().ok_or(GwError::NotConnected)?;
        stream.write_all(&escape(data)).await?;
        stream.flush().await?;
        debug!("Sent {} bytes over telnet", data.len());

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        Ok(())
    }

    async fn receive_nonblocking(&mut self) -> GwResult<Vec<u8>> {
        let stream = self.stream.as_mut().ok_or(GwError::NotConnected)?;

        let mut raw = Vec::new();
        let mut buffer = [0u8; 4096];
        loop {
            match stream.try_read(&mut buffer) {
                Ok(0) if raw.is_empty() => return Err(GwError::ConnectionClosed),
                Ok(0) => break,
                Ok(n) => raw.extend_from_slice(&buffer[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        if raw.is_empty() {
            return Ok(raw);
        }

        let decoded = self.codec.decode(&raw);
        if !decoded.replies.is_empty() {
            trace!(replies = %hex::encode(&decoded.replies), "refusing telnet options");
            stream.write_all(&decoded.replies).await?;
        }
        Ok(decoded.data)
    }

    async fn close(&mut self) -> GwResult<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
            info!("Telnet connection closed");
        }
        Ok(())
    }
}

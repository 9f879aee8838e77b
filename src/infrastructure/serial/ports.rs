use crate::domain::error::{GwError, GwResult};
use serde::Serialize;
use serialport::SerialPortType;

/// A serial port visible on this host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortEntry {
    pub name: String,
    pub description: String,
}

/// Enumerate serial ports
pub fn list_ports() -> GwResult<Vec<PortEntry>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| PortEntry {
            description: describe(&port.port_type),
            name: port.port_name,
        })
        .collect())
}

/// First port that looks like a console adapter
pub fn detect_port() -> GwResult<String> {
    let ports = list_ports()?;
    pick_console_port(&ports)
        .map(|port| port.name.clone())
        .ok_or(GwError::NoSerialPort)
}

/// First entry whose description mentions `USB` or `Serial`
pub fn pick_console_port(ports: &[PortEntry]) -> Option<&PortEntry> {
    ports
        .iter()
        .find(|port| port.description.contains("USB") || port.description.contains("Serial"))
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(info) => {
            let product = info.product.as_deref().unwrap_or("Serial Device");
            match info.manufacturer.as_deref() {
                Some(vendor) => format!("USB {} ({})", product, vendor),
                None => format!("USB {}", product),
            }
        }
        SerialPortType::PciPort => "PCI Serial Port".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "n/a".to_string(),
    }
}

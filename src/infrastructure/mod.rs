// Infrastructure module - External dependencies and adapters
pub mod config;
pub mod logging;
pub mod serial;
pub mod telnet;

use crate::core::transport::Transport;
use crate::domain::config::{ConnectionConfig, TimingConfig, TransportKind};
use crate::domain::error::GwResult;

pub use serial::SerialTransport;
pub use telnet::TelnetTransport;

/// Build the transport selected by `connection.kind`
pub fn build_transport(
    connection: &ConnectionConfig,
    timing: &TimingConfig,
) -> GwResult<Box<dyn Transport>> {
    match connection.kind {
        TransportKind::Serial => Ok(Box::new(SerialTransport::new(
            &connection.serial,
            timing.serial_settle(),
        )?)),
        TransportKind::Telnet => Ok(Box::new(TelnetTransport::new(
            &connection.telnet,
            timing.send_settle(),
        ))),
    }
}

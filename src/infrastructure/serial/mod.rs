// Serial module - Serial line transport
pub mod client;
pub mod ports;

pub use client::SerialTransport;
pub use ports::{detect_port, list_ports, pick_console_port, PortEntry};

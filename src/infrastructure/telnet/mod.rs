// Telnet module - Telnet socket transport
pub mod client;
pub mod codec;

pub use client::TelnetTransport;
pub use codec::TelnetCodec;

//! GwConsole Library
//!
//! Console session automation for residential gateways: serial and Telnet
//! transports, prompt-synchronized command execution and output streaming.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::gateway::Gateway;
pub use crate::core::reader::{PatternReader, ReadOutcome, NO_OUTPUT};
pub use crate::core::session::{CommandResults, ConsoleSession, SessionState, REBOOT_SENT};
pub use crate::core::transport::{LineEnding, Transport};
pub use domain::config::{Credentials, GatewayConfig, TimingConfig, TransportKind};
pub use domain::error::{GwError, GwResult};

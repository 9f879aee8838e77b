// Core module - Transport abstraction, prompt reader and console session
pub mod gateway;
pub mod reader;
pub mod session;
pub mod transport;

pub use gateway::Gateway;
pub use reader::{PatternReader, ReadOutcome, NO_OUTPUT};
pub use session::{CommandResults, ConsoleSession, SessionState};
pub use transport::{LineEnding, Transport};

// Session module - Console session over one transport
pub mod clean;
pub mod session;
pub mod state;
pub mod transcript;

pub use clean::clean_output;
pub use session::{CommandResults, ConsoleSession, REBOOT_SENT};
pub use state::SessionState;
pub use transcript::Transcript;

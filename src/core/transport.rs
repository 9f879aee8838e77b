use crate::domain::{config::TransportKind, error::GwResult};
use async_trait::async_trait;

/// Line terminator appended to text sent to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\r\n`, what the gateway shell expects after a command
    CrLf,
    /// Nothing appended
    None,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::None => "",
        }
    }
}

/// Byte channel to the device console.
///
/// Implementations must not touch the underlying handle before `connect`
/// succeeds or after `close`; both report `GwError::NotConnected` instead.
#[async_trait]
pub trait Transport: Send {
    /// Get the transport kind
    fn kind(&self) -> TransportKind;

    /// Human-readable endpoint, e.g. `/dev/ttyUSB0@115200`
    fn describe(&self) -> String;

    /// Network host of the device, when the transport has one
    fn host(&self) -> Option<&str> {
        None
    }

    /// Whether the handle is currently open
    fn is_open(&self) -> bool;

    /// Open the channel
    async fn connect(&mut self) -> GwResult<()>;

    /// Write raw bytes
    async fn send(&mut self, data: &[u8]) -> GwResult<()>;

    /// Return whatever bytes are available right now, possibly none
    async fn receive_nonblocking(&mut self) -> GwResult<Vec<u8>>;

    /// Close the channel. Calling it on a closed transport is a no-op.
    async fn close(&mut self) -> GwResult<()>;
}

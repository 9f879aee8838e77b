use thiserror::Error;

/// Gateway console unified error type
#[derive(Error, Debug)]
pub enum GwError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Transport not connected")]
    NotConnected,

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("No serial port found")]
    NoSerialPort,

    #[error("Prompt not found: {pattern}")]
    PromptNotFound { pattern: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type GwResult<T> = Result<T, GwError>;

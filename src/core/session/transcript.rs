//! Append-only transcript files mirroring console sessions.
//!
//! A transcript is opened at the start of one `execute_commands` or
//! `stream_command` call and dropped at its end.

use crate::domain::error::{GwError, GwResult};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Width of the rule written after each command
pub const SEPARATOR_WIDTH: usize = 50;

/// Open transcript file
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    file: File,
}

impl Transcript {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: &Path) -> GwResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| GwError::Output(format!("Failed to open transcript {}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header opening a command batch
    pub fn write_session_header(&mut self) -> GwResult<()> {
        let header = format!("\n=== Session started at {} ===\n", timestamp());
        self.write_str(&header)
    }

    /// Header opening a streamed command
    pub fn write_stream_header(&mut self, command: &str) -> GwResult<()> {
        let header = format!("\n=== Streaming: {} ===\nStarted at: {}\n", command, timestamp());
        self.write_str(&header)
    }

    /// One executed command with its cleaned output
    pub fn write_command(&mut self, command: &str, output: &str) -> GwResult<()> {
        let entry = format!(
            "\nCommand: {}\n{}\n{}\n",
            command,
            output,
            "=".repeat(SEPARATOR_WIDTH)
        );
        self.write_str(&entry)
    }

    /// Raw streamed text
    pub fn append(&mut self, data: &str) -> GwResult<()> {
        self.write_str(data)
    }

    fn write_str(&mut self, data: &str) -> GwResult<()> {
        self.file
            .write_all(data.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| GwError::Output(format!("Failed to write transcript {}: {}", self.path.display(), e)))
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

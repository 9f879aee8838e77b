use crate::cli::args::OutputFormat;
use crate::core::reader::NO_OUTPUT;
use crate::core::session::CommandResults;
use crate::domain::config::GatewayConfig;
use crate::infrastructure::serial::PortEntry;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_results(&self, results: &CommandResults) -> Result<(), OutputError>;
    fn write_ports(&self, ports: &[PortEntry], detected: Option<&str>) -> Result<(), OutputError>;
    fn write_config(&self, config: &GatewayConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::GwError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_results(&self, results: &CommandResults) -> Result<(), OutputError> {
        println!("{}", render_results(&self.format, results)?);
        Ok(())
    }

    fn write_ports(&self, ports: &[PortEntry], detected: Option<&str>) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if ports.is_empty() {
                    println!("No serial ports found");
                }
                for port in ports {
                    let marker = if Some(port.name.as_str()) == detected { "*" } else { " " };
                    println!("{} {}  {}", marker, port.name, port.description);
                }
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "ports": ports,
                    "detected": detected,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                if !ports.is_empty() {
                    let rows: Vec<PortTableRow> = ports
                        .iter()
                        .map(|port| PortTableRow {
                            port: port.name.clone(),
                            description: port.description.clone(),
                            console: Some(port.name.as_str()) == detected,
                        })
                        .collect();
                    println!("{}", Table::new(rows));
                }
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &GatewayConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            _ => print!("{}", toml::to_string_pretty(config)?),
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Render command results in the given format
pub fn render_results(format: &OutputFormat, results: &CommandResults) -> Result<String, OutputError> {
    let rendered = match format {
        OutputFormat::Text => {
            let mut text = String::from("=== Command Results ===\n");
            for (command, output) in results {
                text.push_str(&format!(
                    "\nCommand: {}\n{}\n{}\n",
                    command,
                    "-".repeat(30),
                    output.as_deref().unwrap_or(NO_OUTPUT)
                ));
            }
            text
        }
        OutputFormat::Json => serde_json::to_string_pretty(results)?,
        OutputFormat::Table => {
            let rows: Vec<ResultTableRow> = results
                .iter()
                .map(|(command, output)| ResultTableRow {
                    command: command.clone(),
                    status: if output.is_some() { "ok" } else { "failed" }.to_string(),
                    output: output.clone().unwrap_or_default(),
                })
                .collect();
            Table::new(rows).to_string()
        }
    };
    Ok(rendered)
}

/// Table row for a command result
#[derive(Tabled)]
struct ResultTableRow {
    command: String,
    status: String,
    output: String,
}

/// Table row for a serial port
#[derive(Tabled)]
struct PortTableRow {
    port: String,
    description: String,
    console: bool,
}

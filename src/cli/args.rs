use crate::domain::config::{GatewayConfig, TransportKind};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for gwconsole
#[derive(Parser, Debug)]
#[command(
    name = "gwconsole",
    version = env!("CARGO_PKG_VERSION"),
    about = "Residential gateway console automation",
    long_about = "Runs diagnostic and configuration commands on a residential gateway console over a serial line or Telnet."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log file level (overrides the configuration file)
    #[arg(long, global = true)]
    pub log_file_level: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect system information from the gateway
    Info {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Append a transcript to this file
        #[arg(long)]
        output_file: Option<PathBuf>,
    },
    /// Execute commands on the gateway shell
    Exec {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Append a transcript to this file
        #[arg(long)]
        output_file: Option<PathBuf>,
        /// Commands, run in order
        #[arg(required = true)]
        commands: Vec<String>,
    },
    /// Stream the output of a long-running command until Ctrl-C
    Stream {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Append the streamed output to this file
        #[arg(long)]
        output_file: Option<PathBuf>,
        /// Command to stream, e.g. 'tail -F /var/log/messages'
        command: String,
    },
    /// List available serial ports
    Ports,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Connection overrides
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Transport to use
    #[arg(short, long, value_enum)]
    pub transport: Option<TransportArg>,

    /// Serial port path (auto-detected when omitted)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Telnet host
    #[arg(long)]
    pub host: Option<String>,

    /// Telnet port
    #[arg(long)]
    pub telnet_port: Option<u16>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create a default project configuration
    Init {
        /// Directory to create `.gwconsole/config.toml` in
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

/// Transport argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TransportArg {
    Serial,
    Telnet,
}

impl From<TransportArg> for TransportKind {
    fn from(transport: TransportArg) -> Self {
        match transport {
            TransportArg::Serial => Self::Serial,
            TransportArg::Telnet => Self::Telnet,
        }
    }
}

impl ConnectionArgs {
    /// Apply the overrides given on the command line
    pub fn apply_to(&self, config: &mut GatewayConfig) {
        if let Some(transport) = self.transport {
            config.connection.kind = transport.into();
        }
        if let Some(port) = &self.port {
            config.connection.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.connection.serial.baud_rate = baud;
        }
        if let Some(host) = &self.host {
            config.connection.telnet.host = host.clone();
        }
        if let Some(port) = self.telnet_port {
            config.connection.telnet.port = port;
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_exec_with_telnet_overrides() {
        let args = Args::try_parse_from([
            "gwconsole", "exec", "--transport", "telnet", "--host", "10.0.0.1", "uptime", "uname -a",
        ])
        .unwrap();

        let Command::Exec { connection, commands, output_file } = args.command else {
            panic!("expected exec");
        };
        assert_eq!(commands, vec!["uptime", "uname -a"]);
        assert!(output_file.is_none());

        let mut config = GatewayConfig::default();
        connection.apply_to(&mut config);
        assert_eq!(config.connection.kind, TransportKind::Telnet);
        assert_eq!(config.connection.telnet.host, "10.0.0.1");
        assert_eq!(config.connection.telnet.port, 23);
    }

    #[test]
    fn test_log_levels_are_global() {
        let args = Args::try_parse_from([
            "gwconsole", "ports", "--log-level", "warn", "--log-file-level", "trace",
        ])
        .unwrap();

        assert!(matches!(args.command, Command::Ports));
        assert_eq!(args.log_level.as_deref(), Some("warn"));
        assert_eq!(args.log_file_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_exec_requires_a_command() {
        assert!(Args::try_parse_from(["gwconsole", "exec"]).is_err());
    }

    #[test]
    fn test_serial_overrides() {
        let args = Args::try_parse_from([
            "gwconsole", "-o", "json", "info", "--port", "/dev/ttyUSB1", "--baud", "9600",
            "--output-file", "info.txt",
        ])
        .unwrap();

        assert!(matches!(args.output, OutputFormat::Json));
        let Command::Info { connection, output_file } = args.command else {
            panic!("expected info");
        };
        assert_eq!(output_file, Some(PathBuf::from("info.txt")));

        let mut config = GatewayConfig::default();
        connection.apply_to(&mut config);
        assert_eq!(config.connection.kind, TransportKind::Serial);
        assert_eq!(config.connection.serial.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(config.connection.serial.baud_rate, 9600);
    }
}

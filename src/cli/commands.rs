use crate::cli::args::{Args, Command, ConfigCommand, ConnectionArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::gateway::Gateway;
use crate::domain::config::GatewayConfig;
use crate::domain::error::{GwError, GwResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::{list_ports, pick_console_port};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;

/// Execute CLI command
pub async fn execute_command(args: Args) -> GwResult<()> {
    let writer = ConsoleWriter::new(args.output.clone());

    let config_manager = ConfigManager::new();
    let config = match &args.config {
        Some(path) => config_manager.load_config_from_path(path)?,
        None => config_manager.load_config()?,
    };

    let _log_guard = if args.quiet {
        None
    } else {
        setup_logging(&args, &config)?
    };

    match args.command {
        Command::Info { connection, output_file } => {
            let mut gateway = open_gateway(config, &connection).await?;
            let results = gateway.system_info(output_file.as_deref()).await;
            gateway.close().await;
            writer.write_results(&results)?;
            report_transcript(&writer, output_file)
        }
        Command::Exec { connection, output_file, commands } => {
            let mut gateway = open_gateway(config, &connection).await?;
            let results = gateway.execute_commands(commands.as_slice(), output_file.as_deref()).await;
            gateway.close().await;
            writer.write_results(&results)?;
            report_transcript(&writer, output_file)
        }
        Command::Stream { connection, output_file, command } => {
            let mut gateway = open_gateway(config, &connection).await?;
            writer.write_message("\nStreaming output (Ctrl+C to stop)...\n")?;

            let cancel = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            let print_chunk = |chunk: &str| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            };
            let streamed = gateway
                .stream_command(&command, output_file.as_deref(), print_chunk, cancel)
                .await;
            gateway.close().await;

            if streamed {
                writer.write_message("\nStopping stream...")?;
                report_transcript(&writer, output_file)
            } else {
                Err(GwError::Session {
                    message: format!("Streaming '{}' failed", command),
                })
            }
        }
        Command::Ports => {
            let ports = list_ports()?;
            let detected = pick_console_port(&ports).map(|port| port.name.clone());
            writer.write_ports(&ports, detected.as_deref())?;
            Ok(())
        }
        Command::Config(config_args) => match config_args.command {
            ConfigCommand::Show => {
                writer.write_config(&config)?;
                Ok(())
            }
            ConfigCommand::Init { dir } => {
                let dir = match dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                let path = config_manager.init_project_config(&dir)?;
                writer.write_message(&format!("Configuration written to {}", path.display()))?;
                Ok(())
            }
        },
        Command::Version => {
            writer.write_message(&format!("gwconsole {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

fn setup_logging(args: &Args, config: &GatewayConfig) -> GwResult<Option<WorkerGuard>> {
    let level = match (&args.log_level, args.verbose) {
        (Some(level), _) => level.as_str(),
        (None, true) => "debug",
        (None, false) => config.global.log_level.as_str(),
    };

    let mut logging = config.logging.clone();
    if let Some(file_level) = &args.log_file_level {
        logging.file_level = file_level.clone();
    }
    init_logging(level, &logging)
}

/// Build the gateway for the selected transport, connect and log in
async fn open_gateway(mut config: GatewayConfig, connection: &ConnectionArgs) -> GwResult<Gateway> {
    connection.apply_to(&mut config);
    let mut gateway = Gateway::from_config(&config)?;

    if gateway.connect_and_login().await {
        Ok(gateway)
    } else {
        Err(GwError::Session {
            message: format!(
                "Could not connect and log in over {}",
                config.connection.kind
            ),
        })
    }
}

fn report_transcript(writer: &ConsoleWriter, output_file: Option<PathBuf>) -> GwResult<()> {
    if let Some(path) = output_file {
        writer.write_message(&format!("\nResults saved to: {}", path.display()))?;
    }
    Ok(())
}

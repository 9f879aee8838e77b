// GwConsole - Residential gateway console automation
use anyhow::Context;
use clap::Parser;
use gwconsole::cli::{execute_command, Args, ConsoleWriter, OutputWriter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let writer = ConsoleWriter::new(args.output.clone());

    if let Err(e) = execute_command(args).await.context("gwconsole failed") {
        let message = format!("{:#}", e);
        if writer.write_error(&message).is_err() {
            eprintln!("Error: {}", message);
        }
        std::process::exit(1);
    }
    Ok(())
}

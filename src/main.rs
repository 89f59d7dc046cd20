//! cellsheet - Run cell store commands from a script, stdin or the command line

mod command;
mod config;
mod error;

use anyhow::{Context, Result};
use cellsheet_core::{Propagation, Sheet};
use clap::Parser;
use command::Session;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "cellsheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script of commands to run (reads stdin when omitted)
    script: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Downstream recompute strategy (topological or fan-out)
    #[arg(long)]
    propagation: Option<Propagation>,

    /// Accept any word as a cell identifier
    #[arg(long)]
    no_validate_ids: bool,

    /// Print the display string of every cell that is set
    #[arg(long)]
    echo: bool,

    /// Run this command instead of reading a script (can be repeated)
    #[arg(short = 'c', long = "command", value_name = "CMD")]
    commands: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --verbose picks the level.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::default().add_directive(if cli.verbose {
            tracing::Level::DEBUG.into()
        } else {
            tracing::Level::WARN.into()
        })
    });
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(propagation) = cli.propagation {
        settings.propagation = propagation;
    }
    if cli.no_validate_ids {
        settings.validate_ids = false;
    }
    if cli.echo {
        settings.echo = true;
    }
    debug!(?settings, "starting");

    let lines: Vec<String> = if !cli.commands.is_empty() {
        cli.commands
    } else {
        let text = match &cli.script {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                text
            }
        };
        text.lines().map(str::to_string).collect()
    };

    let mut session = Session::new(
        Sheet::with_propagation(settings.propagation),
        settings.validate_ids,
        settings.echo,
    );

    let mut failed = 0usize;
    for (n, line) in lines.iter().enumerate() {
        match session.run_line(line) {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(err) => {
                failed += 1;
                debug!(line = n + 1, %err, "command rejected");
                eprintln!("error: line {}: {}", n + 1, err);
            }
        }
    }

    debug!(cells = session.sheet.len(), failed, "done");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

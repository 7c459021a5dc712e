#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line player that speaks the paintball engine's turn protocol.

mod config;
mod protocol;
mod session;

use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use paintball_system_agent::SquadConfig;
use tracing_subscriber::EnvFilter;

use crate::{protocol::TurnReader, session::Session};

/// Command-line arguments accepted by the player.
#[derive(Debug, Parser)]
#[command(name = "paintball", version, about = "Paintball squad player")]
struct CliArgs {
    /// Whether the player runs locally or under tournament restrictions.
    #[arg(value_enum, default_value_t = Mode::Practice)]
    mode: Mode,
    /// Seed for the exploration random number generators.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML file overriding role coefficients.
    #[arg(long, value_name = "PATH")]
    roles: Option<PathBuf>,
    /// Writes diagnostics to this file instead of standard error.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Execution environment of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Local games; files may be read and written.
    Practice,
    /// Official games; no file access is allowed.
    Tournament,
}

/// Entry point for the paintball command-line player.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    if args.mode == Mode::Tournament && (args.roles.is_some() || args.log_file.is_some()) {
        bail!("tournament mode does not allow --roles or --log-file");
    }

    init_logging(args.log_file.as_deref())?;

    let mut config = SquadConfig {
        seed: args.seed,
        ..SquadConfig::default()
    };
    if let Some(path) = &args.roles {
        config::load_roles(path, &mut config)?;
    }
    tracing::info!(mode = ?args.mode, seed = args.seed, "starting player");

    let stdin = io::stdin();
    let mut reader = TurnReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let _ = Session::new(&config).run(&mut reader, &mut out)?;
    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file at {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(|error| anyhow!(error).context("failed to install log subscriber"))
}

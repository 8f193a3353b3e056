use std::{path::PathBuf, sync::OnceLock};

use clap::Parser;

/// Check the status of a dockerized app on its remote servers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file.
    #[arg(short, long, default_value = "stevedore.toml")]
    pub config: PathBuf,
    /// Only check the server with this host.
    #[arg(long)]
    pub server: Option<String>,
}

static ARGS: OnceLock<Args> = OnceLock::new();

pub fn get_cli_args() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}

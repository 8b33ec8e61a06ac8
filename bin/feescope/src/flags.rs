//! Global arguments for the CLI.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Global arguments shared by every subcommand.
#[derive(Parser, Default, Clone, Debug)]
pub struct GlobalArgs {
    /// Verbosity: -v for debug, -vv for trace.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl GlobalArgs {
    /// Initializes the tracing subscriber. `RUST_LOG` takes precedence over
    /// the verbosity flag when set.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let default = match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
    }
}

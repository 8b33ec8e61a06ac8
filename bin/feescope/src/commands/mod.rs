//! Subcommands for the feescope CLI.

mod fetch;
pub use fetch::FetchCommand;

mod analyze;
pub use analyze::AnalyzeCommand;

mod forecast;
pub use forecast::ForecastCommand;

use clap::Subcommand;

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a range of blocks over RPC into the dataset file.
    Fetch(FetchCommand),
    /// Derive fee metrics from the dataset and print the report.
    Analyze(AnalyzeCommand),
    /// Forecast the next base fee from the tail of the dataset.
    Forecast(ForecastCommand),
}

//! Command line interface.

pub mod command;

use std::path::PathBuf;
use std::time::Duration;

use clap::{command, Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch daily rainfall for a station and write the summary tables
    Fetch(FetchArgs),
    /// Refresh the cached BoM station directory
    Stations(StationsArgs),
}

/// Which upstream service supplies the daily rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// SILO Patched Point Dataset (patched, with interpolation codes)
    Silo,
    /// BoM daily rainfall zipped data file (observations only)
    Bom,
}

#[derive(Args)]
pub struct FetchArgs {
    /// BoM station number, e.g. 23343
    #[arg(long)]
    pub station: String,

    /// Upstream source for the daily rows
    #[arg(long, value_enum, default_value_t = Source::Silo)]
    pub source: Source,

    /// Email address passed to SILO as the username (SILO source only)
    #[arg(long)]
    pub email: Option<String>,

    /// BoM dataset id, the `p_c` value from the weather station directory
    /// (BoM source only)
    #[arg(long)]
    pub pc: Option<i64>,

    /// Start of the query window, YYYYMMDD
    #[arg(long)]
    pub start: Option<String>,

    /// End of the query window, YYYYMMDD
    #[arg(long)]
    pub finish: Option<String>,

    /// Discard rows before the first and after the last observed day
    #[arg(long)]
    pub clip_ends: bool,

    /// Drop years with missing days from the annual tables
    #[arg(long)]
    pub complete_years_only: bool,

    /// Group annual totals by `calendar` or `financial` year
    #[arg(long, default_value = "calendar")]
    pub year_type: String,

    /// First period label of the statistics baseline, e.g. 1950 or 1950-51
    #[arg(long)]
    pub baseline_start: Option<String>,

    /// Last period label of the statistics baseline
    #[arg(long)]
    pub baseline_end: Option<String>,

    /// Render the annual rainfall chart
    #[arg(long)]
    pub chart: bool,

    /// Also save the daily table as parquet
    #[arg(long)]
    pub parquet: bool,

    /// Station cache database path
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args)]
pub struct StationsArgs {
    /// Observation code to refresh (default: every code not yet cached)
    #[arg(long)]
    pub obs_code: Option<u32>,

    /// Station cache database path
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

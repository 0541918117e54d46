use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML settings file (missing file falls back to defaults)
    #[arg(long, default_value = "rebalancer.toml")]
    pub config: String,

    /// Account to monitor and rebalance
    #[arg(long, default_value = "demo")]
    pub account: String,

    /// Force dry-run mode regardless of the settings file
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds between demo assessment cycles
    #[arg(long, default_value_t = 30)]
    pub interval_secs: u64,

    /// Number of demo cycles to run (0 = run until interrupted)
    #[arg(long, default_value_t = 4)]
    pub cycles: u32,
}

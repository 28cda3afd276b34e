use clap::Parser;
use reqwest::Url;

use crate::request::parse_base_url;
use crate::request_state::StalePolicy;
use crate::stats::MedianRule;

/// Terminal dashboard for the statistics of a remote numeric dataset.
///
/// Logs go to stderr, redirect them (`2>dashboard.log`) and set `RUST_LOG`
/// to see them.
#[derive(Debug, Clone, Parser)]
#[command(version)]
pub struct Config {
    /// Base url of the dataset backend. Datasets are fetched from
    /// `<base-url>/dataset?set_index=<n>`.
    #[arg(long, env = "DASHBOARD_BASE_URL", value_parser = base_url)]
    pub base_url: Url,

    /// Number of dataset selector controls (F1 and up).
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub datasets: u8,

    /// Dataset fetched on start.
    #[arg(long, default_value_t = 0)]
    pub initial_index: usize,

    /// How the median is computed.
    #[arg(long, value_enum, default_value_t = MedianRule::Compat)]
    pub median: MedianRule,

    /// Which response wins when dataset requests overlap.
    #[arg(long, value_enum, default_value_t = StalePolicy::LastIssuedWins)]
    pub stale: StalePolicy,
}

impl Config {
    pub fn dataset_count(&self) -> usize {
        usize::from(self.datasets)
    }
}

fn base_url(input: &str) -> Result<Url, String> {
    parse_base_url(input).map_err(|error| error.to_string())
}

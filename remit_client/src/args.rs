//! Command-line arguments for the quote client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::{Parser, Subcommand};
use remit_common::Country;
use remit_common::net::DEFAULT_API_BASE_URL;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the quote API.
    #[clap(long, env = "REMITBUDDY_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub base_url: String,

    /// Timeout of the first attempt, in seconds.
    #[clap(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Timeout of the single retry, in seconds.
    #[clap(long, default_value_t = 30)]
    pub retry_timeout_secs: u64,

    /// What to do.
    #[clap(subcommand)]
    pub cmd: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare providers once and print the ranking.
    Compare {
        /// Amount to send in KRW. Thousands separators are accepted ("1,000,000").
        #[clap(long)]
        amount: String,

        /// Destination country.
        #[clap(long, value_enum, ignore_case = true)]
        country: Country,

        /// Fetch the fast provider batch first and merge the slow batch when it arrives in time.
        #[clap(long)]
        staged: bool,

        /// Print the ranking as JSON.
        #[clap(long)]
        json: bool,
    },
    /// List supported destination countries.
    Countries,
    /// Read "<amount> [country]" lines from stdin; each line supersedes the previous comparison.
    Watch {
        /// Country used when a line has no country.
        #[clap(long, value_enum, ignore_case = true, default_value = "vietnam")]
        country: Country,
    },
}

//! Command line argument parsing

use clap::Parser;
use std::time::Duration;

/// HKAnime stream extractor - resolve episode pages to playable streams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Episode page URL (https://www.hkanime.com/animal/<series>x<group>x<episode>)
    pub url: String,

    /// Episode number to extract instead of the one in the URL
    #[arg(short, long, value_name = "N")]
    pub episode: Option<usize>,

    /// List the episodes of the series and exit
    #[arg(short, long)]
    pub list_episodes: bool,

    /// Print stream URLs only
    #[arg(short = 'g', long)]
    pub print_url: bool,

    /// Print the media descriptor as JSON
    #[arg(short = 'j', long)]
    pub dump_json: bool,

    /// HTTP timeout (e.g., 30s, 1m)
    #[arg(long, value_name = "DURATION", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// HTTP retries for transient errors
    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Override User-Agent header
    #[arg(long, value_name = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Override Referer sent to the embed player
    #[arg(long, value_name = "URL")]
    pub referer: Option<String>,

    /// Proxy URL (http/https/socks)
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get HTTP timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default log filter when RUST_LOG is unset
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbosity_level() {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            url: String::new(),
            episode: None,
            list_episodes: false,
            print_url: false,
            dump_json: false,
            timeout: humantime::Duration::from(Duration::from_secs(30)),
            retries: 3,
            user_agent: None,
            referer: None,
            proxy: None,
            verbose: false,
            quiet: false,
        }
    }
}

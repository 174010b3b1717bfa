use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

use crate::scanner::DEFAULT_WINDOW;

/// Layout of the lines appended to the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<ip> -> (<hostname>)`
    Text,
    /// `ip,hostname,status`
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub window: usize,
    pub format: OutputFormat,
    /// Largest range accepted; a /8 by default
    pub max_addresses: u64,
    /// Longest the event loop waits before refreshing progress
    pub poll_interval: Duration,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            format: OutputFormat::Text,
            max_addresses: 1 << 24,
            poll_interval: Duration::from_millis(100),
            show_progress: true,
        }
    }
}

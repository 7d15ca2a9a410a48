//! Command-line arguments and the run loop

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sdp_bw_core::emit::{write_json, write_text};
use sdp_bw_core::{Config, Error, negotiate_files};
use tracing::info;

use crate::logging::{LoggingConfig, level_for_verbosity, parse_log_level};

/// Output format for the permit rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `permit ...` lines followed by the uplink totals
    Text,
    /// One JSON document
    Json,
}

/// Derive bandwidth permit rules from an SDP offer/answer pair
#[derive(Debug, Parser)]
#[command(name = "sdp-bw", version, about)]
pub struct Cli {
    /// Path to the SDP offer
    #[arg(value_name = "OFFER")]
    pub offer: PathBuf,

    /// Path to the SDP answer
    #[arg(value_name = "ANSWER")]
    pub answer: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "SDP_BW_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Explicit log level, overrides -v
    ///
    /// Parse and matching warnings are still shown at `error`; only a
    /// `RUST_LOG` entry for `sdp_bw_core` can silence them.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Logging configuration implied by the flags
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        let level = match &self.log_level {
            Some(level) => parse_log_level(level)?,
            None => level_for_verbosity(self.verbose),
        };
        let mut config = LoggingConfig::new(level);
        if self.json_logs {
            config = config.with_json();
        }
        if self.verbose >= 3 {
            config = config.with_file_info();
        }
        Ok(config)
    }

    /// Parse both documents, match them and print the rules
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        info!(
            offer = %self.offer.display(),
            answer = %self.answer.display(),
            "Negotiating bandwidth"
        );

        let report = negotiate_files(&self.offer, &self.answer, &config)?;
        if report.warning_count() > 0 {
            info!(warnings = report.warning_count(), "Finished with warnings");
        }

        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        let written = match self.format {
            OutputFormat::Text => write_text(&mut out, &report.negotiation),
            OutputFormat::Json => write_json(&mut out, &report),
        };
        written
            .and_then(|_| out.flush())
            .context("Failed to write permit rules")?;

        Ok(())
    }
}

/// Load configuration from `path`, or the defaults when there is none
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let text = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| {
        Error::Config(format!("cannot parse {}: {}", path.display(), e))
    })?;
    config.validate()?;
    Ok(config)
}

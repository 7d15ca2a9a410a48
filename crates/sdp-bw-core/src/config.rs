//! Parser and matcher configuration
//!
//! All structures deserialize with every field optional, so an empty TOML
//! document yields the defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of media descriptions per document
pub const MAX_MEDIA: usize = 8;

/// Maximum line length in characters, line terminator excluded
pub const MAX_LINE_LEN: usize = 255;

/// What to do with a line longer than [`ParserConfig::max_line_length`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongLinePolicy {
    /// Drop the characters past the limit and parse the rest
    #[default]
    Truncate,
    /// Fail the parse with [`Error::LineTooLong`]
    Reject,
}

/// Limits applied while parsing a session document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_media_entries: usize,
    pub max_line_length: usize,
    pub long_line_policy: LongLinePolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_media_entries: MAX_MEDIA,
            max_line_length: MAX_LINE_LEN,
            long_line_policy: LongLinePolicy::Truncate,
        }
    }
}

impl ParserConfig {
    /// Reject lines over the length limit instead of truncating them
    pub fn rejecting_long_lines(mut self) -> Self {
        self.long_line_policy = LongLinePolicy::Reject;
        self
    }

    /// Check the limits are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_media_entries == 0 {
            return Err(Error::Config(
                "max_media_entries must be at least 1".to_string(),
            ));
        }
        // "m=" alone needs two characters
        if self.max_line_length < 2 {
            return Err(Error::Config(format!(
                "max_line_length must be at least 2, got {}",
                self.max_line_length
            )));
        }
        Ok(())
    }
}

/// Which address a flow endpoint uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressScope {
    /// The document's session-level `c=` address
    #[default]
    Session,
    /// The media entry's own connection address
    Media,
}

/// Options for offer/answer matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub address_scope: AddressScope,
}

/// Complete configuration, as loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub matcher: MatcherConfig,
}

impl Config {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.parser.validate()
    }
}

use anyhow::{Result, anyhow};
use std::io::IsTerminal;
use std::str::FromStr;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The log level to use
    pub level: Level,
    /// Whether to enable JSON formatting
    pub json: bool,
    /// Whether to include file and line information
    pub file_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::WARN,
            json: false,
            file_info: false,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new(level: Level) -> Self {
        LoggingConfig {
            level,
            ..Default::default()
        }
    }

    /// Enable JSON formatting
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Enable file and line information in logs
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }
}

/// Target of the library's events
const CORE_TARGET: &str = "sdp_bw_core";

/// Directive keeping the library's parse and matching warnings visible
///
/// Those warnings are part of the tool's output, so a quieter global level
/// does not hide them. `None` when `RUST_LOG` already names the library.
pub fn core_directive(level: Level, rust_log: Option<&str>) -> Option<String> {
    if rust_log.is_some_and(|directives| directives.contains(CORE_TARGET)) {
        return None;
    }
    let floor = level.max(Level::WARN);
    Some(format!("{}={}", CORE_TARGET, LevelFilter::from_level(floor)))
}

/// Set up the logging system with the provided configuration
///
/// Everything goes to stderr; stdout carries only the permit rules.
pub fn setup_logging(config: LoggingConfig) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(LevelFilter::from_level(config.level).into());
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    if let Some(directive) = core_directive(config.level, rust_log.as_deref()) {
        filter = filter.add_directive(directive.parse()?);
    }

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    let result = if config.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    result.map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| anyhow!("Invalid log level: {}", level))
}

/// Log level for a `-v` count
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), Level::WARN);
        assert_eq!(level_for_verbosity(1), Level::INFO);
        assert_eq!(level_for_verbosity(2), Level::DEBUG);
        assert_eq!(level_for_verbosity(7), Level::TRACE);
    }

    #[test]
    fn test_core_warnings_survive_quiet_levels() {
        assert_eq!(
            core_directive(Level::ERROR, None).as_deref(),
            Some("sdp_bw_core=warn")
        );
        assert_eq!(
            core_directive(Level::WARN, None).as_deref(),
            Some("sdp_bw_core=warn")
        );
        assert_eq!(
            core_directive(Level::DEBUG, Some("hyper=off")).as_deref(),
            Some("sdp_bw_core=debug")
        );
        assert_eq!(core_directive(Level::ERROR, Some("sdp_bw_core=off")), None);
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::new(Level::INFO).with_json().with_file_info();
        assert_eq!(config.level, Level::INFO);
        assert!(config.json);
        assert!(config.file_info);
    }
}

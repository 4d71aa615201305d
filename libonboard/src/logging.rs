//! Logging setup for Onboard binaries
//!
//! Log output always goes to stderr so that command output stays pipeable.
//! The format and level come from `ONBOARD_LOG_FORMAT` and
//! `ONBOARD_LOG_LEVEL`; a verbose flag overrides both with debug-level text.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

const FORMAT_ENV: &str = "ONBOARD_LOG_FORMAT";
const LEVEL_ENV: &str = "ONBOARD_LOG_LEVEL";

/// Output formats for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text without targets (for piping)
    #[default]
    Text,
    /// One JSON object per line (for ingestion)
    Json,
    /// Multi-line colored output (for development)
    Pretty,
}

impl LogFormat {
    /// The format selected through the environment, defaulting to text
    ///
    /// Unrecognized values fall back to the default rather than failing;
    /// logging setup must not abort the program.
    pub fn from_env() -> Self {
        std::env::var(FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        write!(f, "{}", name)
    }
}

/// Initialize logging from the environment
///
/// Level defaults to `info` when `ONBOARD_LOG_LEVEL` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_default() {
    let filter =
        EnvFilter::try_from_env(LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    install(LogFormat::from_env(), filter);
}

/// Initialize debug-level text logging, ignoring the environment
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_verbose() {
    install(LogFormat::Text, EnvFilter::new("debug"));
}

fn install(format: LogFormat, filter: EnvFilter) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.with_target(false).init(),
        LogFormat::Json => builder.json().flatten_event(true).init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

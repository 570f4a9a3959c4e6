//! CLI error handling with user-friendly messages.

use linelab::cache::CacheError;
use linelab::config::ConfigError;
use linelab::dispatch::WorkError;
use linelab::fetch::FetchErrorKind;
use linelab::provider::ProviderError;
use std::fmt;
use std::process;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration error
    Config(ConfigError),
    /// Failed to open the data cache
    Cache(CacheError),
    /// Failed to build the HTTP client
    Provider(ProviderError),
    /// A dispatched job failed or was rejected
    Work(WorkError),
    /// The worker finished without delivering a result
    Delivery,
}

impl CliError {
    /// Exit the process with an error message and appropriate hint.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Work(WorkError::Fetch(fetch)) = self {
            match fetch.kind {
                FetchErrorKind::BadConnection => {
                    eprintln!();
                    eprintln!("Check your internet connection and the provider host setting.");
                }
                FetchErrorKind::EmptyResultSet => {
                    eprintln!();
                    eprintln!("Try widening the wavenumber window.");
                }
                _ => {}
            }
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "configuration: {}", e),
            CliError::Cache(e) => write!(f, "data cache: {}", e),
            CliError::Provider(e) => write!(f, "provider: {}", e),
            CliError::Work(e) => write!(f, "{}", e),
            CliError::Delivery => write!(f, "worker exited without delivering a result"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

impl From<WorkError> for CliError {
    fn from(e: WorkError) -> Self {
        Self::Work(e)
    }
}

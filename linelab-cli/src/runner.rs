//! CLI runner: shared setup and synchronous job execution.
//!
//! The runner owns the pieces every command needs (config, logging guard,
//! cache, provider, dispatcher) and turns the dispatcher's asynchronous
//! continuation delivery into a blocking call suited to a one-shot CLI.

use crate::error::CliError;
use linelab::cache::DataCache;
use linelab::config::ConfigFile;
use linelab::dispatch::{JobDispatcher, WorkPayload, WorkRequest, WorkResult};
use linelab::logging::{init_logging, LoggingGuard};
use linelab::provider::{HitranProvider, ReqwestClient};
use std::sync::{mpsc, Arc};
use tracing::debug;

/// Owns the dispatcher and the ambient pieces around it.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    dispatcher: JobDispatcher,
}

impl CliRunner {
    /// Loads config, initializes logging, and builds the dispatcher.
    ///
    /// The data directory is warmed before returning, so cached tables from
    /// earlier sessions are visible to every command.
    pub fn new() -> Result<Self, CliError> {
        ConfigFile::ensure_exists()?;
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(CliError::LoggingInit)?;
        debug!(version = linelab::VERSION, "linelab starting");

        let cache = Arc::new(DataCache::new(&config.data.directory)?);
        let client =
            ReqwestClient::new(config.provider.timeout_secs).map_err(CliError::Provider)?;
        let provider = Arc::new(HitranProvider::new(client, config.provider.host.clone()));
        let dispatcher = JobDispatcher::new(cache, provider);

        let runner = Self {
            logging_guard,
            dispatcher,
        };
        runner.run(WorkRequest::Start)?;
        Ok(runner)
    }

    /// Dispatches a request and blocks until its result is delivered.
    pub fn run(&self, request: WorkRequest) -> Result<WorkPayload, CliError> {
        let (tx, rx) = mpsc::channel::<WorkResult>();
        self.dispatcher.dispatch(request, move |result| {
            let _ = tx.send(result);
        })?;
        let result = rx.recv().map_err(|_| CliError::Delivery)?;
        debug!(job = %result.job_id, "result delivered");
        result.outcome.map_err(CliError::from)
    }
}

use std::sync::Arc;

use crate::config::Config;
use crate::logsink::LogSink;
use crate::openai::OpenAiClient;

/// Shared application state for HTTP handlers
///
/// Everything here is either immutable configuration or append-only (the
/// log sink); handlers never share mutable state across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// `None` when no credential is configured; every proxy handler checks
    /// this before touching the request body or the network.
    pub openai: Option<OpenAiClient>,

    pub log: Arc<LogSink>,
}

impl AppState {
    pub fn new(config: Config, log: LogSink) -> Self {
        let openai = config
            .openai
            .api_key
            .as_ref()
            .map(|key| OpenAiClient::new(&config.openai.base_url, key));

        Self {
            config: Arc::new(config),
            openai,
            log: Arc::new(log),
        }
    }
}

//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use sr_completion::{CompletionBackend, OpenAiClient};
use sr_domain::config::Config;
use sr_search::{SearchBackend, SearchClient};
use sr_store::{ConfigStore, KvClient};

use crate::quota::KeyRegistry;
use crate::relay::RelayDeps;

/// Shared state handed to every request handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConfigStore>,
    /// `None` when the search token env var is unset. Requests that need
    /// search then fail with a config error instead of at startup.
    pub search: Option<Arc<dyn SearchBackend>>,
    /// `None` when the completion API key env var is unset.
    pub completion: Option<Arc<dyn CompletionBackend>>,
    pub keys: Arc<KeyRegistry>,
    /// SHA-256 digest of the API token, hashed once at startup.
    /// `None` means no token is configured (dev mode, auth disabled).
    pub api_token_hash: Option<Vec<u8>>,
}

impl AppState {
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let store_token = Config::secret(&config.store.token_env).unwrap_or_else(|| {
            tracing::warn!(
                env = %config.store.token_env,
                "store token not set; config store requests will be unauthenticated"
            );
            String::new()
        });
        let store: Arc<dyn ConfigStore> = Arc::new(KvClient::new(&config.store, store_token)?);

        let search: Option<Arc<dyn SearchBackend>> =
            match Config::secret(&config.search.token_env) {
                Some(token) => Some(Arc::new(SearchClient::new(&config.search, token)?)),
                None => {
                    tracing::warn!(
                        env = %config.search.token_env,
                        "search token not set; chat requests will be rejected"
                    );
                    None
                }
            };

        let completion: Option<Arc<dyn CompletionBackend>> =
            match Config::secret(&config.completion.api_key_env) {
                Some(key) => Some(Arc::new(OpenAiClient::new(
                    &config.completion,
                    key,
                    config.relay.base_origin.clone(),
                )?)),
                None => {
                    tracing::warn!(
                        env = %config.completion.api_key_env,
                        "completion API key not set; chat requests will be rejected"
                    );
                    None
                }
            };

        let api_token_hash = match Config::secret(&config.server.api_token_env) {
            Some(token) => Some(Sha256::digest(token.as_bytes()).to_vec()),
            None => {
                tracing::warn!(
                    env = %config.server.api_token_env,
                    "API token not set; running WITHOUT authentication (dev mode)"
                );
                None
            }
        };

        let keys = Arc::new(KeyRegistry::new(
            config.server.rate_limit_per_hour,
            Duration::from_secs(3600),
        ));

        Ok(Self {
            config,
            store,
            search,
            completion,
            keys,
            api_token_hash,
        })
    }

    /// Relay dependency bundle for the orchestrator.
    pub fn relay_deps(&self) -> RelayDeps {
        RelayDeps {
            config: self.config.clone(),
            store: self.store.clone(),
            search: self.search.clone(),
            completion: self.completion.clone(),
        }
    }
}

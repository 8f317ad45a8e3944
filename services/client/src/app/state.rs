//! services/client/src/app/state.rs
//!
//! Defines the application state shared by every workflow.

use crate::adapters::{FileTokenStore, HttpBackend, TerminalNavigator, TerminalNotifier};
use crate::app::session::SessionManager;
use crate::config::Config;
use crate::error::ClientError;
use std::sync::Arc;
use unbind_core::ports::{DocumentBackend, Navigator, Notifier, TokenStore};

/// The shared application state, created once at startup and passed to all workflows.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn DocumentBackend>,
    pub session: Arc<SessionManager>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppState {
    /// Wires the given ports together. The session manager is built here and
    /// owned by the state for the rest of the process.
    pub fn new(
        config: Arc<Config>,
        backend: Arc<dyn DocumentBackend>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(
            tokens,
            navigator.clone(),
            config.login_path.clone(),
        ));
        Self {
            config,
            backend,
            session,
            notifier,
            navigator,
        }
    }

    /// The production wiring: HTTP backend, token file on disk, terminal output.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("unbind/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let backend = Arc::new(HttpBackend::new(http, config.api_base_url.clone()));
        let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
        let navigator = Arc::new(TerminalNavigator::new(config.login_path.clone()));

        Ok(Self::new(
            Arc::new(config),
            backend,
            tokens,
            Arc::new(TerminalNotifier),
            navigator,
        ))
    }
}

//! services/client/src/adapters/terminal.rs
//!
//! Terminal implementations of the `Notifier` and `Navigator` ports used by
//! the `unbind` binary.

use tracing::{info, warn};
use unbind_core::ports::{Navigator, Notifier};

/// Prints notifications to the terminal, mirroring them as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        info!(notification = "success", "{}", message);
        println!("✔ {}", message);
    }

    fn error(&self, message: &str) {
        warn!(notification = "error", "{}", message);
        eprintln!("✘ {}", message);
    }
}

/// A terminal cannot navigate, so a redirect to the login entry point becomes
/// an instruction to the user. Other destinations are only logged.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    login_path: String,
}

impl TerminalNavigator {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn redirect(&self, path: &str) {
        info!("Redirecting to {}", path);
        if path == self.login_path {
            eprintln!("Please sign in first: run `unbind login`.");
        }
    }
}

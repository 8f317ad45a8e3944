//! services/client/src/app/session.rs
//!
//! The session manager owns the bearer token and is the only component that
//! creates or destroys it. Also holds the account workflows built on top of
//! it: login, logout and profile updates.

use crate::app::state::AppState;
use std::sync::Arc;
use tracing::{error, info, warn};
use unbind_core::domain::{LoginCredentials, ProfileUpdate, Token, User};
use unbind_core::ports::{Navigator, PortError, PortResult, TokenStore};

/// Where an explicit logout sends the user.
pub const HOME_PATH: &str = "/";

pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>, login_path: String) -> Self {
        Self {
            store,
            navigator,
            login_path,
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// The currently held token, if any. An unreadable store counts as empty.
    pub fn get_token(&self) -> Option<Token> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read the stored session: {}", e);
                None
            }
        }
    }

    /// Returns the token, or redirects to login and fails with `AuthRequired`.
    pub fn require_token_or_redirect(&self) -> PortResult<Token> {
        match self.get_token() {
            Some(token) => Ok(token),
            None => {
                info!("No session held; sending the user to {}", self.login_path);
                self.navigator.redirect(&self.login_path);
                Err(PortError::AuthRequired)
            }
        }
    }

    pub fn start_session(&self, token: &Token) -> PortResult<()> {
        self.store.save(token)
    }

    /// Removes the token unconditionally. Returns whether one was held.
    pub fn clear_session(&self) -> bool {
        match self.store.clear() {
            Ok(had_token) => had_token,
            Err(e) => {
                error!("Failed to clear the stored session: {}", e);
                false
            }
        }
    }

    /// Clears the session and sends the user to login.
    ///
    /// The redirect only fires when a token was actually removed, so several
    /// rejections racing for the same session produce a single redirect.
    pub fn end_session_and_redirect(&self) {
        if self.clear_session() {
            warn!("Session rejected by the server; signing out");
            self.navigator.redirect(&self.login_path);
        }
    }

    /// Applies the session side effect of a failed authenticated call:
    /// a 401 ends the session, anything else leaves it alone.
    pub fn handle_rejection(&self, err: &PortError) {
        if matches!(err, PortError::Unauthorized { .. }) {
            self.end_session_and_redirect();
        }
    }
}

//=========================================================================================
// Account Workflows
//=========================================================================================

/// Exchanges credentials for a token and stores it, replacing any previous one.
pub async fn login(state: &AppState, credentials: &LoginCredentials) -> PortResult<()> {
    match state.backend.login(credentials).await {
        Ok(token) => {
            state.session.start_session(&token)?;
            info!("Signed in as {}", credentials.email);
            state.notifier.success("Logged in successfully");
            Ok(())
        }
        Err(e) => {
            let message = e.detail().unwrap_or("Login failed").to_string();
            state.notifier.error(&message);
            Err(e)
        }
    }
}

/// Explicit logout: drop the token, go home, confirm to the user.
pub fn logout(state: &AppState) {
    state.session.clear_session();
    state.navigator.redirect(HOME_PATH);
    state.notifier.success("Logged out successfully");
}

pub async fn update_profile(state: &AppState, update: &ProfileUpdate) -> PortResult<User> {
    let token = state.session.require_token_or_redirect()?;
    match state.backend.update_profile(&token, update).await {
        Ok(user) => {
            state.notifier.success("Profile updated");
            Ok(user)
        }
        Err(e) => {
            state.session.handle_rejection(&e);
            state.notifier.error("Profile update failed");
            Err(e)
        }
    }
}

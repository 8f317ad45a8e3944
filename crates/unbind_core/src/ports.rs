//! crates/unbind_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client workflows depend on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the HTTP library, the token storage medium and the
//! user interface.

use async_trait::async_trait;
use crate::domain::{Analysis, Document, LoginCredentials, ProfileUpdate, Token, User};
use crate::upload::LocalFile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {}", .detail.as_deref().unwrap_or("no detail"))]
    NotFound { detail: Option<String> },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    /// The server rejected the bearer token (HTTP 401).
    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("no detail"))]
    Unauthorized { detail: Option<String> },
    /// No token is held locally, so an authenticated call was never made.
    #[error("Authentication required")]
    AuthRequired,
    /// The server answered with a non-success status.
    #[error("Request rejected with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },
    /// No response was received at all.
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl PortError {
    /// The server-supplied error detail, if the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. }
            | Self::Unauthorized { detail }
            | Self::NotFound { detail } => detail.as_deref(),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The UnBind HTTP API as seen by the client.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    // --- Auth ---
    async fn login(&self, credentials: &LoginCredentials) -> PortResult<Token>;

    async fn current_user(&self, token: &Token) -> PortResult<User>;

    async fn update_profile(&self, token: &Token, update: &ProfileUpdate) -> PortResult<User>;

    // --- Documents ---
    async fn list_documents(&self, token: &Token) -> PortResult<Vec<Document>>;

    async fn get_document(&self, token: &Token, document_id: i64) -> PortResult<Document>;

    /// Uploads one file as a single-part multipart body.
    /// Success carries no payload: new documents are learned from the next list fetch.
    async fn upload_document(&self, token: &Token, file: &LocalFile) -> PortResult<()>;

    // --- Analyses ---
    async fn analyze_document(&self, token: &Token, document_id: i64) -> PortResult<Analysis>;

    async fn list_analyses(&self, token: &Token, document_id: i64) -> PortResult<Vec<Analysis>>;
}

/// Persistent storage for the single bearer token, keyed by a fixed name.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> PortResult<Option<Token>>;

    fn save(&self, token: &Token) -> PortResult<()>;

    /// Removes the stored token. Returns whether a token was present.
    fn clear(&self) -> PortResult<bool>;
}

/// Transient user-facing notifications (toasts in a browser, lines in a terminal).
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// Moves the user to another entry point, e.g. the login screen.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

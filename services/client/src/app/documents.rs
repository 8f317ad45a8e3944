//! services/client/src/app/documents.rs
//!
//! The client-side read model of the user's documents: the dashboard load,
//! single-document lookups and analysis requests. The client never changes
//! a document's status itself; it only shows what the server reports.

use crate::app::state::AppState;
use tracing::{error, info, warn};
use unbind_core::dashboard::DashboardCounters;
use unbind_core::domain::{Analysis, Document, Token, User};
use unbind_core::ports::{PortError, PortResult};

/// Everything the dashboard shows after one load.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// `None` for a guest view or when the user could not be fetched.
    pub user: Option<User>,
    pub documents: Vec<Document>,
    pub counters: DashboardCounters,
}

/// Loads the dashboard. Without a token this is a guest view and no request
/// is made.
pub async fn load_dashboard(state: &AppState) -> Dashboard {
    let Some(token) = state.session.get_token() else {
        info!("No session held; showing the guest dashboard");
        return Dashboard::default();
    };

    let (user, documents) = tokio::join!(
        fetch_current_user(state, &token),
        list_documents(state, &token)
    );
    let counters = DashboardCounters::from_documents(&documents);
    Dashboard {
        user,
        documents,
        counters,
    }
}

/// Fetches the signed-in user. Any non-success answer ends the session and
/// redirects to login; a transport failure is only logged.
pub async fn fetch_current_user(state: &AppState, token: &Token) -> Option<User> {
    match state.backend.current_user(token).await {
        Ok(user) => Some(user),
        Err(e @ (PortError::Transport(_) | PortError::Unexpected(_))) => {
            error!("Error fetching user data: {}", e);
            None
        }
        Err(e) => {
            warn!("User fetch rejected: {}", e);
            state.session.end_session_and_redirect();
            None
        }
    }
}

/// Lists the user's documents, degrading to an empty list on any failure.
pub async fn list_documents(state: &AppState, token: &Token) -> Vec<Document> {
    match state.backend.list_documents(token).await {
        Ok(documents) => documents,
        Err(e) => {
            warn!("Document list unavailable, showing none: {}", e);
            state.session.handle_rejection(&e);
            Vec::new()
        }
    }
}

pub async fn get_document(state: &AppState, document_id: i64) -> PortResult<Document> {
    let token = state.session.require_token_or_redirect()?;
    state
        .backend
        .get_document(&token, document_id)
        .await
        .inspect_err(|e| state.session.handle_rejection(e))
}

/// Asks the backend to analyze a document and waits for the result.
///
/// Locally held `Document` values are left untouched; a later list fetch
/// reflects the status the server moved the document to.
pub async fn request_analysis(state: &AppState, document_id: i64) -> PortResult<Analysis> {
    let token = state.session.require_token_or_redirect()?;
    info!("Requesting analysis for document {}", document_id);

    match state.backend.analyze_document(&token, document_id).await {
        Ok(analysis) => {
            state
                .notifier
                .success(&format!("Analysis ready for document {}", document_id));
            Ok(analysis)
        }
        Err(e) => {
            error!("Analysis of document {} failed: {}", document_id, e);
            state.session.handle_rejection(&e);
            let message = e.detail().unwrap_or("Analysis failed");
            state.notifier.error(message);
            Err(e)
        }
    }
}

pub async fn list_analyses(state: &AppState, document_id: i64) -> PortResult<Vec<Analysis>> {
    let token = state.session.require_token_or_redirect()?;
    state
        .backend
        .list_analyses(&token, document_id)
        .await
        .inspect_err(|e| state.session.handle_rejection(e))
}

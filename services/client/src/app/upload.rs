//! services/client/src/app/upload.rs
//!
//! The upload coordinator: admits local files, tracks one attempt per file
//! and drives each attempt through the backend one at a time.

use crate::app::session::SessionManager;
use crate::app::state::AppState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use unbind_core::admission::{admit, AdmissionError};
use unbind_core::ports::{DocumentBackend, Notifier, PortError, PortResult};
use unbind_core::upload::{AttemptId, LocalFile, UploadAttempt, UploadStatus, UploadTracker};

pub const NETWORK_ERROR: &str = "Network error";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const AUTH_REQUIRED: &str = "Authentication required";

/// The outcome of admission for one batch of files.
#[derive(Debug, Default)]
pub struct Admission {
    /// One `Uploading` attempt per admitted file, in input order.
    pub accepted: Vec<AttemptId>,
    pub rejected: Vec<AdmissionError>,
}

/// The message an attempt shows after a failed upload call: the server's
/// detail for any non-success status, otherwise a generic message.
pub fn upload_error_message(err: &PortError) -> String {
    match err {
        PortError::Transport(_) => NETWORK_ERROR.to_string(),
        PortError::AuthRequired => AUTH_REQUIRED.to_string(),
        _ => err.detail().unwrap_or(UPLOAD_FAILED).to_string(),
    }
}

/// Cloning is cheap and every clone shares the same tracked attempts.
#[derive(Clone)]
pub struct UploadCoordinator {
    backend: Arc<dyn DocumentBackend>,
    session: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
    // Never held across an await, so `dismiss` works while an upload is in flight.
    tracker: Arc<Mutex<UploadTracker>>,
}

impl UploadCoordinator {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            session: state.session.clone(),
            notifier: state.notifier.clone(),
            tracker: Arc::new(Mutex::new(UploadTracker::new())),
        }
    }

    fn tracker(&self) -> MutexGuard<'_, UploadTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies admission rules and creates an `Uploading` attempt for every
    /// admitted file before any network call is made.
    pub fn accept_files(&self, files: Vec<LocalFile>) -> Admission {
        let mut admission = Admission::default();
        let mut tracker = self.tracker();
        for file in files {
            match admit(&file.name, file.size()) {
                Ok(kind) => {
                    let id = tracker.push(UploadAttempt::new(file, kind));
                    admission.accepted.push(id);
                }
                Err(e) => {
                    warn!("Refusing file before upload: {}", e);
                    admission.rejected.push(e);
                }
            }
        }
        drop(tracker);

        for rejection in &admission.rejected {
            self.notifier.error(&rejection.to_string());
        }
        admission
    }

    /// Admits `files` and uploads the accepted ones as one batch.
    pub async fn upload_files(&self, files: Vec<LocalFile>) -> PortResult<Admission> {
        let admission = self.accept_files(files);
        self.upload_batch(&admission.accepted).await?;
        Ok(admission)
    }

    /// Uploads attempts strictly in order: each call resolves before the next
    /// starts. Without a session, or once the server rejects the token, the
    /// batch stops and the attempts that were not sent are marked failed so
    /// they can be retried after login. The user is redirected at most once.
    pub async fn upload_batch(&self, ids: &[AttemptId]) -> PortResult<()> {
        info!("Uploading {} file(s)", ids.len());
        for (index, id) in ids.iter().enumerate() {
            if let Err(e) = self.upload_one(*id).await {
                let mut tracker = self.tracker();
                for rest in ids.iter().skip(index + 1) {
                    if let Some(attempt) = tracker.get_mut(*rest) {
                        // Attempts already settled keep their state.
                        let _ = attempt.mark_failed(AUTH_REQUIRED);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Sends one attempt. Returns its new status, or `None` when the attempt
    /// is not tracked or not `Uploading`. The only error is `AuthRequired`,
    /// returned when no session is held or when the server rejected the token
    /// and this attempt ended the session.
    pub async fn upload_one(&self, id: AttemptId) -> PortResult<Option<UploadStatus>> {
        let file = {
            let tracker = self.tracker();
            match tracker.get(id) {
                Some(attempt) if attempt.status() == UploadStatus::Uploading => attempt.file().clone(),
                Some(attempt) => {
                    debug!("Attempt {} is {:?}; nothing to send", id, attempt.status());
                    return Ok(None);
                }
                None => {
                    debug!("Attempt {} is no longer tracked", id);
                    return Ok(None);
                }
            }
        };

        let token = match self.session.require_token_or_redirect() {
            Ok(token) => token,
            Err(e) => {
                if let Some(attempt) = self.tracker().get_mut(id) {
                    let _ = attempt.mark_failed(AUTH_REQUIRED);
                }
                return Err(e);
            }
        };

        debug!("Uploading {} ({} bytes)", file.name, file.size());
        let outcome = self.backend.upload_document(&token, &file).await;

        let status = {
            let mut tracker = self.tracker();
            let attempt = tracker.get_mut(id);
            if attempt.is_none() {
                debug!("Attempt {} was dismissed while in flight; result dropped", id);
            }
            match (&outcome, attempt) {
                (Ok(()), Some(attempt)) => {
                    if let Err(e) = attempt.mark_success() {
                        warn!("Attempt {}: {}", id, e);
                    }
                    Some(attempt.status())
                }
                (Err(e), Some(attempt)) => {
                    if let Err(t) = attempt.mark_failed(upload_error_message(e)) {
                        warn!("Attempt {}: {}", id, t);
                    }
                    Some(attempt.status())
                }
                (_, None) => None,
            }
        };

        match outcome {
            Ok(()) => {
                info!("{} uploaded", file.name);
                self.notifier
                    .success(&format!("{} uploaded successfully!", file.name));
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                self.session.handle_rejection(&e);
                self.notifier.error(&format!("{} upload failed", file.name));
                if matches!(e, PortError::Unauthorized { .. }) {
                    return Err(PortError::AuthRequired);
                }
            }
        }
        Ok(status)
    }

    /// Re-sends a failed attempt. Attempts in any other state are left alone
    /// and `Ok(None)` is returned. Siblings are never touched.
    pub async fn retry(&self, id: AttemptId) -> PortResult<Option<UploadStatus>> {
        {
            let mut tracker = self.tracker();
            let Some(attempt) = tracker.get_mut(id) else {
                return Ok(None);
            };
            if let Err(e) = attempt.begin_retry() {
                debug!("Attempt {}: {}", id, e);
                return Ok(None);
            }
        }
        self.upload_one(id).await
    }

    /// Stops tracking an attempt in any state. An in-flight request is not
    /// cancelled; its result is simply dropped.
    pub fn dismiss(&self, id: AttemptId) -> bool {
        self.tracker().dismiss(id).is_some()
    }

    pub fn attempt(&self, id: AttemptId) -> Option<UploadAttempt> {
        self.tracker().get(id).cloned()
    }

    /// A copy of every tracked attempt, in acceptance order.
    pub fn attempts(&self) -> Vec<UploadAttempt> {
        self.tracker().iter().cloned().collect()
    }

    pub fn is_uploading(&self) -> bool {
        self.tracker().count(UploadStatus::Uploading) > 0
    }
}

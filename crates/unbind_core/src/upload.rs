//! crates/unbind_core/src/upload.rs
//!
//! The per-file upload state machine and the ordered set of attempts the
//! user currently sees.
//!
//! ```text
//! uploading --ok--> success
//!     |  ^
//!   fail |retry
//!     v  |
//!    error
//! ```
//!
//! Every mutation goes through a named transition; an attempt never moves
//! from `success`, and only `retry` leaves `error`.

use bytes::Bytes;
use std::fmt;
use uuid::Uuid;

use crate::admission::FileKind;

/// Progress value reported once an upload has completed.
pub const PROGRESS_COMPLETE: u8 = 100;

/// A file picked by the user, held in memory until its upload resolves.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub bytes: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Locally generated identifier of an upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} an upload attempt in state {from:?}")]
pub struct InvalidTransition {
    pub from: UploadStatus,
    pub action: &'static str,
}

/// One upload of one local file.
#[derive(Debug, Clone)]
pub struct UploadAttempt {
    id: AttemptId,
    file: LocalFile,
    kind: FileKind,
    status: UploadStatus,
    progress: u8,
    error: Option<String>,
}

impl UploadAttempt {
    /// A freshly admitted file starts out `Uploading` at progress 0.
    pub fn new(file: LocalFile, kind: FileKind) -> Self {
        Self {
            id: AttemptId::new(),
            file,
            kind,
            status: UploadStatus::Uploading,
            progress: 0,
            error: None,
        }
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn file(&self) -> &LocalFile {
        &self.file
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mark_success(&mut self) -> Result<(), InvalidTransition> {
        self.expect_uploading("complete")?;
        self.status = UploadStatus::Success;
        self.progress = PROGRESS_COMPLETE;
        Ok(())
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        self.expect_uploading("fail")?;
        self.status = UploadStatus::Error;
        self.error = Some(message.into());
        Ok(())
    }

    /// `error -> uploading`, with progress reset and the old message cleared.
    pub fn begin_retry(&mut self) -> Result<(), InvalidTransition> {
        if self.status != UploadStatus::Error {
            return Err(InvalidTransition {
                from: self.status,
                action: "retry",
            });
        }
        self.status = UploadStatus::Uploading;
        self.progress = 0;
        self.error = None;
        Ok(())
    }

    fn expect_uploading(&self, action: &'static str) -> Result<(), InvalidTransition> {
        if self.status == UploadStatus::Uploading {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}

/// The attempts currently tracked for display, in the order they were accepted.
#[derive(Debug, Default)]
pub struct UploadTracker {
    attempts: Vec<UploadAttempt>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attempt: UploadAttempt) -> AttemptId {
        let id = attempt.id();
        self.attempts.push(attempt);
        id
    }

    pub fn get(&self, id: AttemptId) -> Option<&UploadAttempt> {
        self.attempts.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AttemptId) -> Option<&mut UploadAttempt> {
        self.attempts.iter_mut().find(|a| a.id == id)
    }

    /// Stops tracking an attempt in any state. Returns it if it was tracked.
    pub fn dismiss(&mut self, id: AttemptId) -> Option<UploadAttempt> {
        let index = self.attempts.iter().position(|a| a.id == id)?;
        Some(self.attempts.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadAttempt> {
        self.attempts.iter()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn count(&self, status: UploadStatus) -> usize {
        self.attempts.iter().filter(|a| a.status == status).count()
    }
}

//! crates/unbind_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of the HTTP wire format; adapters convert
//! their own records into these types.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// An opaque bearer token issued by the backend at login.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in log lines through `{:?}`; never print the secret.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// The authenticated user as reported by `/auth/me`.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined, falling back to the email address.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Processing status of a stored document.
///
/// The server drives `Uploaded -> Processing -> Analyzed`, with `Error`
/// reachable from any non-terminal state. Values this client does not know
/// yet are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Analyzed,
    Error,
    Unknown(String),
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Analyzed => "analyzed",
            Self::Error => "error",
            Self::Unknown(raw) => raw,
        }
    }

    /// `Analyzed` and `Error` are never left by server-side processing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Analyzed | Self::Error)
    }
}

impl FromStr for DocumentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "uploaded" => Self::Uploaded,
            "processing" => Self::Processing,
            "analyzed" => Self::Analyzed,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document owned by the current user, as last reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One AI-generated simplification of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub id: i64,
    pub document_id: i64,
    pub analysis_type: String,
    pub original_text: Option<String>,
    pub simplified_text: String,
    pub analysis_data: Option<serde_json::Value>,
    pub confidence_score: Option<i64>,
    pub processing_time: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Credentials sent to the login endpoint.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Partial profile update; `None` fields are left untouched by the server.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `DocumentBackend` port from the `core` crate. It handles all
//! interactions with the UnBind REST API using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::{multipart, Client, Response, StatusCode, Url};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use unbind_core::admission::{file_extension, FileKind};
use unbind_core::domain::{
    Analysis, Document, DocumentStatus, LoginCredentials, ProfileUpdate, Token, User,
};
use unbind_core::ports::{DocumentBackend, PortError, PortResult};
use unbind_core::upload::LocalFile;

const API_PREFIX: &str = "/api/v1";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter that implements the `DocumentBackend` port.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` talking to the backend at `base_url`.
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(&format!("{}{}", API_PREFIX, path))
            .map_err(|e| PortError::Unexpected(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// Sends a request, mapping a missing response to `PortError::Transport`
    /// and any non-success status to the matching `PortError`.
    async fn send(&self, request: reqwest::RequestBuilder) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        // Error bodies are best effort; a non-JSON body just means no detail.
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_detail);
        debug!("{} answered {} (detail: {:?})", url, status, detail);

        Err(match status {
            StatusCode::UNAUTHORIZED => PortError::Unauthorized { detail },
            StatusCode::NOT_FOUND => PortError::NotFound { detail },
            _ => PortError::Rejected {
                status: status.as_u16(),
                detail,
            },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> PortResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed response body: {}", e)))
    }
}

//=========================================================================================
// Wire Record Structs
//=========================================================================================

/// FastAPI-style error body. `detail` is a string for handled errors and a
/// list of objects for validation failures; only the string form is surfaced.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}
impl ErrorBody {
    fn into_detail(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct LoginRecord<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponseRecord {
    access_token: String,
    token_type: String,
    expires_in: Option<i64>,
}

#[derive(Serialize)]
struct ProfileUpdateRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
}

#[derive(Deserialize)]
struct UserRecord {
    id: i64,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    is_active: bool,
    is_verified: bool,
    #[serde(deserialize_with = "de_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct DocumentRecord {
    id: i64,
    user_id: i64,
    filename: String,
    original_filename: String,
    file_path: String,
    file_size: u64,
    mime_type: String,
    status: String,
    #[serde(deserialize_with = "de_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        let status = self
            .status
            .parse::<DocumentStatus>()
            .unwrap_or_else(|never| match never {});
        Document {
            id: self.id,
            user_id: self.user_id,
            filename: self.filename,
            original_filename: self.original_filename,
            file_path: self.file_path,
            file_size: self.file_size,
            mime_type: self.mime_type,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct AnalysisRecord {
    id: i64,
    document_id: i64,
    analysis_type: String,
    original_text: Option<String>,
    simplified_text: String,
    analysis_data: Option<serde_json::Value>,
    confidence_score: Option<i64>,
    processing_time: Option<i64>,
    #[serde(deserialize_with = "de_timestamp")]
    created_at: DateTime<Utc>,
}
impl AnalysisRecord {
    fn to_domain(self) -> Analysis {
        Analysis {
            id: self.id,
            document_id: self.document_id,
            analysis_type: self.analysis_type,
            original_text: self.original_text,
            simplified_text: self.simplified_text,
            analysis_data: self.analysis_data,
            confidence_score: self.confidence_score,
            processing_time: self.processing_time,
            created_at: self.created_at,
        }
    }
}

/// Accepts RFC 3339 timestamps as well as the naive ISO form the backend
/// emits for timezone-less columns, which is read as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_timestamp(&raw))
        .transpose()
        .map_err(serde::de::Error::custom)
}

//=========================================================================================
// `DocumentBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentBackend for HttpBackend {
    async fn login(&self, credentials: &LoginCredentials) -> PortResult<Token> {
        let url = self.endpoint("/auth/login")?;
        let body = LoginRecord {
            email: &credentials.email,
            password: &credentials.password,
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let auth: AuthResponseRecord = Self::decode(response).await?;
        debug!(
            "Issued {} token, expires in {:?}s",
            auth.token_type, auth.expires_in
        );
        Ok(Token::new(auth.access_token))
    }

    async fn current_user(&self, token: &Token) -> PortResult<User> {
        let url = self.endpoint("/auth/me")?;
        let response = self
            .send(self.client.get(url).bearer_auth(token.as_str()))
            .await?;
        let record: UserRecord = Self::decode(response).await?;
        Ok(record.to_domain())
    }

    async fn update_profile(&self, token: &Token, update: &ProfileUpdate) -> PortResult<User> {
        let url = self.endpoint("/users/profile")?;
        let body = ProfileUpdateRecord {
            first_name: update.first_name.as_deref(),
            last_name: update.last_name.as_deref(),
        };
        let response = self
            .send(self.client.put(url).bearer_auth(token.as_str()).json(&body))
            .await?;
        let record: UserRecord = Self::decode(response).await?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, token: &Token) -> PortResult<Vec<Document>> {
        let url = self.endpoint("/documents")?;
        let response = self
            .send(self.client.get(url).bearer_auth(token.as_str()))
            .await?;
        let records: Vec<DocumentRecord> = Self::decode(response).await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_document(&self, token: &Token, document_id: i64) -> PortResult<Document> {
        let url = self.endpoint(&format!("/documents/{}", document_id))?;
        let response = self
            .send(self.client.get(url).bearer_auth(token.as_str()))
            .await?;
        let record: DocumentRecord = Self::decode(response).await?;
        Ok(record.to_domain())
    }

    async fn upload_document(&self, token: &Token, file: &LocalFile) -> PortResult<()> {
        let url = self.endpoint("/documents/upload")?;
        let mime = FileKind::from_extension(&file_extension(&file.name))
            .map(FileKind::mime_type)
            .unwrap_or("application/octet-stream");
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(mime)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        self.send(
            self.client
                .post(url)
                .bearer_auth(token.as_str())
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn analyze_document(&self, token: &Token, document_id: i64) -> PortResult<Analysis> {
        let url = self.endpoint(&format!("/documents/{}/analyze", document_id))?;
        let response = self
            .send(self.client.post(url).bearer_auth(token.as_str()))
            .await?;
        let record: AnalysisRecord = Self::decode(response).await?;
        Ok(record.to_domain())
    }

    async fn list_analyses(&self, token: &Token, document_id: i64) -> PortResult<Vec<Analysis>> {
        let url = self.endpoint(&format!("/documents/{}/analysis", document_id))?;
        let response = self
            .send(self.client.get(url).bearer_auth(token.as_str()))
            .await?;
        let records: Vec<AnalysisRecord> = Self::decode(response).await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

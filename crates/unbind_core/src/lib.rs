pub mod admission;
pub mod dashboard;
pub mod domain;
pub mod format;
pub mod ports;
pub mod upload;

pub use admission::{admit, AdmissionError, FileKind};
pub use dashboard::{count_by_status, DashboardCounters};
pub use domain::{Analysis, Document, DocumentStatus, LoginCredentials, ProfileUpdate, Token, User};
pub use ports::{DocumentBackend, Navigator, Notifier, PortError, PortResult, TokenStore};
pub use upload::{AttemptId, LocalFile, UploadAttempt, UploadStatus, UploadTracker};

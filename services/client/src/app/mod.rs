pub mod documents;
pub mod session;
pub mod state;
pub mod upload;

// Re-export the pieces the binary wires together.
pub use documents::{load_dashboard, request_analysis, Dashboard};
pub use session::{login, logout, SessionManager};
pub use state::AppState;
pub use upload::{Admission, UploadCoordinator};

//! crates/unbind_core/src/dashboard.rs
//!
//! Pure aggregations over the document list shown on the dashboard.

use crate::domain::{Document, DocumentStatus};

pub fn count_by_status(documents: &[Document], status: &DocumentStatus) -> usize {
    documents.iter().filter(|d| &d.status == status).count()
}

/// Counters shown on the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardCounters {
    pub total: usize,
    pub analyzed: usize,
    /// Documents still in `uploaded`, waiting for analysis.
    pub pending: usize,
}

impl DashboardCounters {
    /// Unknown statuses count toward `total` only.
    pub fn from_documents(documents: &[Document]) -> Self {
        Self {
            total: documents.len(),
            analyzed: count_by_status(documents, &DocumentStatus::Analyzed),
            pending: count_by_status(documents, &DocumentStatus::Uploaded),
        }
    }
}

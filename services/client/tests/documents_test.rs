//! Dashboard loading and analysis requests against the mock backend.

mod common;

use common::{Harness, MockServer, Notification, VALID_TOKEN};
use std::sync::atomic::Ordering;
use unbind_client::app::documents::{get_document, list_analyses};
use unbind_client::app::{load_dashboard, request_analysis};
use unbind_core::dashboard::DashboardCounters;
use unbind_core::domain::DocumentStatus;
use unbind_core::ports::PortError;

#[tokio::test]
async fn dashboard_reports_counters_from_server_statuses() {
    let server = MockServer::spawn().await;
    let h = Harness::new(server.url.clone(), Some(VALID_TOKEN));

    let dashboard = load_dashboard(&h.state).await;

    let user = dashboard.user.expect("user should load");
    assert_eq!(user.display_name(), "Jane Doe");
    assert_eq!(dashboard.documents.len(), 5);
    assert_eq!(dashboard.documents[2].status, DocumentStatus::Analyzed);
    assert_eq!(
        dashboard.counters,
        DashboardCounters {
            total: 5,
            analyzed: 1,
            pending: 2
        }
    );
}

#[tokio::test]
async fn guest_dashboard_makes_no_requests() {
    let server = MockServer::spawn().await;
    let h = Harness::new(server.url.clone(), None);

    let dashboard = load_dashboard(&h.state).await;

    assert!(dashboard.user.is_none());
    assert_eq!(dashboard.counters, DashboardCounters::default());
    assert_eq!(server.state.requests.load(Ordering::SeqCst), 0);
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn failed_document_fetch_degrades_to_empty_list() {
    let server = MockServer::spawn().await;
    server.state.fail_documents.store(true, Ordering::SeqCst);
    let h = Harness::new(server.url.clone(), Some(VALID_TOKEN));

    let dashboard = load_dashboard(&h.state).await;

    assert!(dashboard.user.is_some());
    assert!(dashboard.documents.is_empty());
    assert_eq!(dashboard.counters.total, 0);
    // Not an authentication problem: the session survives.
    assert!(h.stored_token().is_some());
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn unreachable_backend_keeps_the_session() {
    let h = Harness::new(common::unreachable_url().await, Some(VALID_TOKEN));

    let dashboard = load_dashboard(&h.state).await;

    assert!(dashboard.user.is_none());
    assert!(dashboard.documents.is_empty());
    assert!(h.stored_token().is_some());
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn request_analysis_returns_the_simplification() {
    let server = MockServer::spawn().await;
    let h = Harness::new(server.url.clone(), Some(VALID_TOKEN));

    let analysis = request_analysis(&h.state, 3).await.unwrap();

    assert_eq!(analysis.document_id, 3);
    assert_eq!(analysis.simplified_text, "You pay for damage you cause.");
    assert_eq!(analysis.confidence_score, Some(87));
    assert_eq!(analysis.analysis_data.unwrap()["risks"][0], "indemnity");
    assert_eq!(
        h.notifier.events(),
        vec![Notification::Success("Analysis ready for document 3".to_string())]
    );
}

#[tokio::test]
async fn analysis_of_missing_document_surfaces_server_detail() {
    let server = MockServer::spawn().await;
    let h = Harness::new(server.url.clone(), Some(VALID_TOKEN));

    let err = request_analysis(&h.state, 99).await.unwrap_err();

    assert!(matches!(err, PortError::NotFound { detail: Some(ref d) } if d == "Document not found"));
    assert_eq!(
        h.notifier.events(),
        vec![Notification::Error("Document not found".to_string())]
    );
    assert!(h.stored_token().is_some());
}

#[tokio::test]
async fn request_analysis_without_session_never_calls_the_server() {
    let server = MockServer::spawn().await;
    let h = Harness::new(server.url.clone(), None);

    let err = request_analysis(&h.state, 3).await.unwrap_err();

    assert!(matches!(err, PortError::AuthRequired));
    assert_eq!(server.state.requests.load(Ordering::SeqCst), 0);
    assert_eq!(h.navigator.redirects(), vec!["/auth/login".to_string()]);
}

#[tokio::test]
async fn document_and_analyses_lookups() {
    let server = MockServer::spawn().await;
    let h = Harness::new(server.url.clone(), Some(VALID_TOKEN));

    let document = get_document(&h.state, 4).await.unwrap();
    assert_eq!(document.original_filename, "lease-4.pdf");
    assert_eq!(document.status, DocumentStatus::Processing);
    assert_eq!(document.file_size, 2048);

    let analyses = list_analyses(&h.state, 4).await.unwrap();
    let ids: Vec<i64> = analyses.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![10, 11]);
}

//! services/client/src/lib.rs
//!
//! Typed client for the UnBind document-analysis API: session handling,
//! the document read model and the upload coordinator.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;

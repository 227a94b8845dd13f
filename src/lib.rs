//! HTTP gateway for the task service.
//!
//! Each request under `/v1` is decoded, bounded by a per-request deadline,
//! forwarded as exactly one call to a [`service::TaskService`], and answered
//! with either the backend's result or a `{"error": "..."}` envelope.

pub mod app_state;
pub mod codec;
pub mod config;
pub mod deadline;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod query;
pub mod service;
pub mod tasks;

pub use app_state::AppState;
pub use config::Config;

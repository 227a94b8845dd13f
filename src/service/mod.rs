//! Backend task service: the single collaborator every dispatch calls into.

mod memory;
mod mongo;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::deadline::Deadline;
use crate::models::{parse_timestamp, DeleteAck, OverdueQuery, Task};
use crate::query::PaginationParams;

pub use memory::MemoryTaskService;
pub use mongo::MongoTaskService;

/// Failure reported by a backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("task {0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid task: {0}")]
    Invalid(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

/// Operations the gateway forwards to. Implementations are shared across all
/// in-flight requests.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Stores a new task. The backend assigns `id` and both timestamps.
    async fn create(&self, deadline: Deadline, task: Task) -> Result<Task, ServiceError>;

    async fn get(&self, deadline: Deadline, id: String) -> Result<Task, ServiceError>;

    async fn list(
        &self,
        deadline: Deadline,
        params: PaginationParams,
    ) -> Result<Vec<Task>, ServiceError>;

    /// Replaces every mutable field of the task identified by `task.id`.
    async fn update(&self, deadline: Deadline, task: Task) -> Result<Task, ServiceError>;

    async fn delete(&self, deadline: Deadline, id: String) -> Result<DeleteAck, ServiceError>;

    /// Tasks whose deadline falls strictly before `query.timed`.
    async fn overdue(
        &self,
        deadline: Deadline,
        query: OverdueQuery,
    ) -> Result<Vec<Task>, ServiceError>;
}

/// Business rules shared by the bundled backends. Returns the parsed deadline
/// when one is set.
pub(crate) fn validate_task(task: &Task) -> Result<Option<DateTime<Utc>>, ServiceError> {
    if task.title.trim().is_empty() {
        return Err(ServiceError::Invalid("title must not be empty".to_string()));
    }
    if task.deadline.trim().is_empty() {
        return Ok(None);
    }
    parse_timestamp(&task.deadline)
        .map(Some)
        .ok_or_else(|| ServiceError::Invalid(format!("unrecognised deadline {:?}", task.deadline)))
}

pub(crate) fn parse_cutoff(timed: &str) -> Result<DateTime<Utc>, ServiceError> {
    parse_timestamp(timed)
        .ok_or_else(|| ServiceError::Invalid(format!("unrecognised timed {:?}", timed)))
}

/// The overdue window shares list semantics: 1-based pages, `limit = 0` is unbounded.
pub(crate) fn overdue_window(query: &OverdueQuery) -> PaginationParams {
    PaginationParams {
        limit: query.limit,
        page: query.page,
    }
}

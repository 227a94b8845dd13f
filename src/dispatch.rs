// src/dispatch.rs

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::{debug, error};
use serde::Serialize;

use crate::app_state::AppState;
use crate::deadline::Deadline;
use crate::error::{ErrorEnvelope, GatewayError};
use crate::service::{ServiceError, TaskService};

/// The resource operations exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateTask,
    GetTask,
    ListTasks,
    UpdateTask,
    DeleteTask,
    OverdueTasks,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateTask => "create task",
            Operation::GetTask => "get task",
            Operation::ListTasks => "list tasks",
            Operation::UpdateTask => "update task",
            Operation::DeleteTask => "delete task",
            Operation::OverdueTasks => "list overdue tasks",
        }
    }

    pub fn success_status(self) -> StatusCode {
        match self {
            Operation::CreateTask => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs one request: takes the already parsed `input`, opens the deadline
/// scope, makes exactly one backend call and maps the outcome to a response.
///
/// An `Err` input is answered right away and the backend is never called.
pub async fn dispatch<I, T, F, Fut>(
    state: &AppState,
    op: Operation,
    input: Result<I, GatewayError>,
    call: F,
) -> HttpResponse
where
    I: fmt::Debug,
    T: Serialize,
    F: FnOnce(Arc<dyn TaskService>, Deadline, I) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let input = match input {
        Ok(input) => input,
        Err(e) => return failure(op, &e, state.config.collapse_backend_errors),
    };
    debug!("{}: {:?}", op, input);

    let deadline = Deadline::after(state.config.ctx_timeout);
    let outcome = deadline
        .run(call(state.task_service.clone(), deadline, input))
        .await;

    match outcome {
        Ok(body) => HttpResponse::build(op.success_status()).json(body),
        Err(e) => failure(op, &GatewayError::from(e), state.config.collapse_backend_errors),
    }
}

/// Logs the failure and builds the error envelope response.
pub fn failure(op: Operation, err: &GatewayError, collapse_backend: bool) -> HttpResponse {
    let status = err.status(collapse_backend);
    error!("failed to {}: status={} error={}", op, status.as_u16(), err);
    HttpResponse::build(status).json(ErrorEnvelope::from(err))
}

//! Shared fixtures for the HTTP-level tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use task_gateway::config::Config;
use task_gateway::deadline::Deadline;
use task_gateway::models::{DeleteAck, OverdueQuery, Task};
use task_gateway::query::PaginationParams;
use task_gateway::service::{ServiceError, TaskService};

pub fn short_timeout_config(timeout: Duration) -> Config {
    Config {
        ctx_timeout: timeout,
        ..Config::default()
    }
}

/// A backend call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Task),
    Get(String),
    List(PaginationParams),
    Update(Task),
    Delete(String),
    Overdue(OverdueQuery),
}

/// Records every call and answers with fixed values.
#[derive(Default)]
pub struct RecordingService {
    calls: Mutex<Vec<Call>>,
}

impl RecordingService {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TaskService for RecordingService {
    async fn create(&self, _deadline: Deadline, task: Task) -> Result<Task, ServiceError> {
        self.record(Call::Create(task.clone()));
        Ok(Task {
            id: "generated".to_string(),
            ..task
        })
    }

    async fn get(&self, _deadline: Deadline, id: String) -> Result<Task, ServiceError> {
        self.record(Call::Get(id.clone()));
        Ok(Task {
            id,
            ..Task::default()
        })
    }

    async fn list(
        &self,
        _deadline: Deadline,
        params: PaginationParams,
    ) -> Result<Vec<Task>, ServiceError> {
        self.record(Call::List(params));
        Ok(vec![])
    }

    async fn update(&self, _deadline: Deadline, task: Task) -> Result<Task, ServiceError> {
        self.record(Call::Update(task.clone()));
        Ok(task)
    }

    async fn delete(&self, _deadline: Deadline, id: String) -> Result<DeleteAck, ServiceError> {
        self.record(Call::Delete(id.clone()));
        Ok(DeleteAck::new(id))
    }

    async fn overdue(
        &self,
        _deadline: Deadline,
        query: OverdueQuery,
    ) -> Result<Vec<Task>, ServiceError> {
        self.record(Call::Overdue(query));
        Ok(vec![])
    }
}

/// Never answers within any sane deadline.
pub struct StalledService {
    pub delay: Duration,
}

impl StalledService {
    async fn stall<T: Send>(&self) -> Result<T, ServiceError> {
        tokio::time::sleep(self.delay).await;
        Err(ServiceError::Internal("stalled call finished".to_string()))
    }
}

#[async_trait]
impl TaskService for StalledService {
    async fn create(&self, _deadline: Deadline, _task: Task) -> Result<Task, ServiceError> {
        self.stall().await
    }

    async fn get(&self, _deadline: Deadline, _id: String) -> Result<Task, ServiceError> {
        self.stall().await
    }

    async fn list(
        &self,
        _deadline: Deadline,
        _params: PaginationParams,
    ) -> Result<Vec<Task>, ServiceError> {
        self.stall().await
    }

    async fn update(&self, _deadline: Deadline, _task: Task) -> Result<Task, ServiceError> {
        self.stall().await
    }

    async fn delete(&self, _deadline: Deadline, _id: String) -> Result<DeleteAck, ServiceError> {
        self.stall().await
    }

    async fn overdue(
        &self,
        _deadline: Deadline,
        _query: OverdueQuery,
    ) -> Result<Vec<Task>, ServiceError> {
        self.stall().await
    }
}

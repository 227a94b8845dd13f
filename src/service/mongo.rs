// src/service/mongo.rs

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{error, info};
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{overdue_window, parse_cutoff, validate_task, ServiceError, TaskService};
use crate::deadline::Deadline;
use crate::models::{now_rfc3339, DeleteAck, OverdueQuery, Task};
use crate::query::PaginationParams;

const DUPLICATE_KEY: i32 = 11000;

/// Stored shape: the task plus its parsed deadline, which is what the overdue
/// query filters and sorts on.
#[derive(Debug, Serialize, Deserialize)]
struct TaskDocument {
    id: String,
    assignee: String,
    title: String,
    summary: String,
    deadline: String,
    status: String,
    created_at: String,
    updated_at: String,
    deadline_at: Option<BsonDateTime>,
}

impl TaskDocument {
    fn new(task: Task, deadline_at: Option<BsonDateTime>) -> Self {
        Self {
            id: task.id,
            assignee: task.assignee,
            title: task.title,
            summary: task.summary,
            deadline: task.deadline,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
            deadline_at,
        }
    }
}

impl From<TaskDocument> for Task {
    fn from(doc: TaskDocument) -> Self {
        Task {
            id: doc.id,
            assignee: doc.assignee,
            title: doc.title,
            summary: doc.summary,
            deadline: doc.deadline,
            status: doc.status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Task service backed by a MongoDB collection.
pub struct MongoTaskService {
    tasks: Collection<TaskDocument>,
}

impl MongoTaskService {
    pub async fn connect(uri: &str, db_name: &str, collection: &str) -> Result<Self, ServiceError> {
        let client_options = ClientOptions::parse(uri).await.map_err(internal)?;
        let client = Client::with_options(client_options).map_err(internal)?;
        let tasks = client.database(db_name).collection::<TaskDocument>(collection);

        let unique_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        tasks.create_index(unique_id).await.map_err(internal)?;

        info!("Connected to MongoDB collection {}.{}", db_name, collection);
        Ok(Self { tasks })
    }

    async fn collect(
        &self,
        mut cursor: mongodb::Cursor<TaskDocument>,
    ) -> Result<Vec<Task>, ServiceError> {
        let mut tasks = vec![];
        while let Some(doc_res) = cursor.next().await {
            match doc_res {
                Ok(doc) => tasks.push(Task::from(doc)),
                Err(e) => {
                    error!("Error reading tasks cursor: {}", e);
                    return Err(internal(e));
                }
            }
        }
        Ok(tasks)
    }
}

#[async_trait]
impl TaskService for MongoTaskService {
    async fn create(&self, _deadline: Deadline, task: Task) -> Result<Task, ServiceError> {
        let deadline_at = validate_task(&task)?.map(|d| BsonDateTime::from_millis(d.timestamp_millis()));
        let now = now_rfc3339();
        let new_task = Task {
            id: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
            ..task
        };

        match self
            .tasks
            .insert_one(TaskDocument::new(new_task.clone(), deadline_at))
            .await
        {
            Ok(_) => {
                info!("Task created: {}", new_task.id);
                Ok(new_task)
            }
            Err(e) if is_duplicate_key(&e) => Err(ServiceError::Conflict(format!(
                "task {} already exists",
                new_task.id
            ))),
            Err(e) => {
                error!("Error inserting task: {}", e);
                Err(internal(e))
            }
        }
    }

    async fn get(&self, deadline: Deadline, id: String) -> Result<Task, ServiceError> {
        match self
            .tasks
            .find_one(doc! { "id": &id })
            .max_time(server_budget(&deadline))
            .await
        {
            Ok(Some(doc)) => Ok(doc.into()),
            Ok(None) => Err(ServiceError::NotFound(id)),
            Err(e) => {
                error!("Error fetching task {}: {}", id, e);
                Err(internal(e))
            }
        }
    }

    async fn list(
        &self,
        deadline: Deadline,
        params: PaginationParams,
    ) -> Result<Vec<Task>, ServiceError> {
        let mut find = self
            .tasks
            .find(doc! {})
            .sort(list_order())
            .skip(params.offset())
            .max_time(server_budget(&deadline));
        if params.limit > 0 {
            find = find.limit(params.limit as i64);
        }
        let cursor = find.await.map_err(internal)?;
        self.collect(cursor).await
    }

    async fn update(&self, deadline: Deadline, task: Task) -> Result<Task, ServiceError> {
        let deadline_at = validate_task(&task)?.map(|d| BsonDateTime::from_millis(d.timestamp_millis()));

        // Full replace of the mutable fields; created_at stays as stored.
        let update_op = doc! {
            "$set": {
                "assignee": &task.assignee,
                "title": &task.title,
                "summary": &task.summary,
                "deadline": &task.deadline,
                "status": &task.status,
                "updated_at": now_rfc3339(),
                "deadline_at": deadline_at,
            }
        };

        match self
            .tasks
            .find_one_and_update(doc! { "id": &task.id }, update_op)
            .return_document(ReturnDocument::After)
            .max_time(server_budget(&deadline))
            .await
        {
            Ok(Some(doc)) => Ok(doc.into()),
            Ok(None) => Err(ServiceError::NotFound(task.id)),
            Err(e) => {
                error!("Error updating task {}: {}", task.id, e);
                Err(internal(e))
            }
        }
    }

    async fn delete(&self, _deadline: Deadline, id: String) -> Result<DeleteAck, ServiceError> {
        match self.tasks.delete_one(doc! { "id": &id }).await {
            Ok(res) if res.deleted_count == 0 => Err(ServiceError::NotFound(id)),
            Ok(_) => {
                info!("Task deleted: {}", id);
                Ok(DeleteAck::new(id))
            }
            Err(e) => {
                error!("Error deleting task {}: {}", id, e);
                Err(internal(e))
            }
        }
    }

    async fn overdue(
        &self,
        deadline: Deadline,
        query: OverdueQuery,
    ) -> Result<Vec<Task>, ServiceError> {
        let cutoff = BsonDateTime::from_millis(parse_cutoff(&query.timed)?.timestamp_millis());
        let window = overdue_window(&query);

        let mut find = self
            .tasks
            .find(doc! { "deadline_at": { "$lt": cutoff } })
            .sort(doc! { "deadline_at": 1, "_id": 1 })
            .skip(window.offset())
            .max_time(server_budget(&deadline));
        if window.limit > 0 {
            find = find.limit(window.limit as i64);
        }
        let cursor = find.await.map_err(internal)?;
        self.collect(cursor).await
    }
}

/// Creation order. `created_at` is fixed-width RFC 3339, so string order is
/// time order; `_id` breaks ties within one microsecond.
fn list_order() -> Document {
    doc! { "created_at": 1, "_id": 1 }
}

/// maxTimeMS of zero means "unbounded" to the server, so never send it.
fn server_budget(deadline: &Deadline) -> Duration {
    deadline.remaining().max(Duration::from_millis(1))
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

fn internal(e: mongodb::error::Error) -> ServiceError {
    ServiceError::Internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trips_into_task() {
        let task = Task {
            id: "1".to_string(),
            title: "t".to_string(),
            deadline: "2024-01-01".to_string(),
            ..Task::default()
        };
        let doc = TaskDocument::new(task.clone(), Some(BsonDateTime::from_millis(0)));
        assert_eq!(Task::from(doc), task);
    }

    #[test]
    fn list_is_ordered_by_creation_time() {
        let order = list_order();
        let keys: Vec<&str> = order.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["created_at", "_id"]);
        assert_eq!(order.get_i32("created_at").unwrap(), 1);
    }

    #[tokio::test]
    async fn zero_remaining_budget_is_still_bounded() {
        let deadline = Deadline::after(Duration::ZERO);
        assert_eq!(server_budget(&deadline), Duration::from_millis(1));
    }
}

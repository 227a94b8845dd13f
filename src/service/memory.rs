use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{overdue_window, parse_cutoff, validate_task, ServiceError, TaskService};
use crate::deadline::Deadline;
use crate::models::{now_rfc3339, parse_timestamp, DeleteAck, OverdueQuery, Task};
use crate::query::PaginationParams;

struct StoredTask {
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Store {
    next_seq: u64,
    tasks: HashMap<String, StoredTask>,
}

/// Process-local task store. Used when no database is configured and by tests.
#[derive(Default)]
pub struct MemoryTaskService {
    store: RwLock<Store>,
}

impl MemoryTaskService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskService for MemoryTaskService {
    async fn create(&self, _deadline: Deadline, task: Task) -> Result<Task, ServiceError> {
        validate_task(&task)?;
        let now = now_rfc3339();
        let new_task = Task {
            id: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
            ..task
        };

        let mut store = self.store.write().await;
        let seq = store.next_seq;
        store.next_seq += 1;
        store.tasks.insert(
            new_task.id.clone(),
            StoredTask {
                seq,
                task: new_task.clone(),
            },
        );
        info!("Task created: {}", new_task.id);
        Ok(new_task)
    }

    async fn get(&self, _deadline: Deadline, id: String) -> Result<Task, ServiceError> {
        let store = self.store.read().await;
        store
            .tasks
            .get(&id)
            .map(|stored| stored.task.clone())
            .ok_or(ServiceError::NotFound(id))
    }

    async fn list(
        &self,
        _deadline: Deadline,
        params: PaginationParams,
    ) -> Result<Vec<Task>, ServiceError> {
        let store = self.store.read().await;
        let mut stored: Vec<&StoredTask> = store.tasks.values().collect();
        stored.sort_by_key(|s| s.seq);
        Ok(params.window(stored.into_iter().map(|s| s.task.clone())))
    }

    async fn update(&self, _deadline: Deadline, task: Task) -> Result<Task, ServiceError> {
        validate_task(&task)?;
        let mut store = self.store.write().await;
        let stored = store
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| ServiceError::NotFound(task.id.clone()))?;

        stored.task = Task {
            created_at: stored.task.created_at.clone(),
            updated_at: now_rfc3339(),
            ..task
        };
        debug!("Task updated: {}", stored.task.id);
        Ok(stored.task.clone())
    }

    async fn delete(&self, _deadline: Deadline, id: String) -> Result<DeleteAck, ServiceError> {
        let mut store = self.store.write().await;
        match store.tasks.remove(&id) {
            Some(_) => {
                info!("Task deleted: {}", id);
                Ok(DeleteAck::new(id))
            }
            None => Err(ServiceError::NotFound(id)),
        }
    }

    async fn overdue(
        &self,
        _deadline: Deadline,
        query: OverdueQuery,
    ) -> Result<Vec<Task>, ServiceError> {
        let cutoff = parse_cutoff(&query.timed)?;
        let store = self.store.read().await;

        let mut overdue: Vec<_> = store
            .tasks
            .values()
            .filter_map(|s| parse_timestamp(&s.task.deadline).map(|due| (due, s.seq, &s.task)))
            .filter(|(due, _, _)| *due < cutoff)
            .collect();
        overdue.sort_by_key(|(due, seq, _)| (*due, *seq));

        Ok(overdue_window(&query).window(overdue.into_iter().map(|(_, _, task)| task.clone())))
    }
}

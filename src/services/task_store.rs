use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use crate::errors::{AppError, AppResult, StorageResult};
use crate::models::{Task, TaskId, TaskUpdate};
use super::json_file;

/// Tasks in insertion order plus an id -> position index.
struct TaskIndex {
    tasks: Vec<Task>,
    positions: HashMap<TaskId, usize>,
}

impl TaskIndex {
    fn new(tasks: Vec<Task>) -> Self {
        let mut index = Self { tasks, positions: HashMap::new() };
        index.reindex();
        index
    }

    fn reindex(&mut self) {
        self.positions = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| (task.id.clone(), i))
            .collect();
    }

    // Position of `task_id` only if it belongs to `owner_id`
    fn position_for(&self, owner_id: &str, task_id: &str) -> Option<usize> {
        self.positions
            .get(task_id)
            .copied()
            .filter(|&i| self.tasks[i].owner_id == owner_id)
    }
}

/// Owns every task and mirrors the collection to a JSON file.
///
/// All operations except [`TaskStore::list_all`] are scoped to an owner: a
/// task belonging to someone else behaves exactly like a missing one.
/// Mutations hold the lock across the file write and are rolled back in
/// memory if the write fails.
pub struct TaskStore {
    path: PathBuf,
    inner: Mutex<TaskIndex>,
}

impl TaskStore {
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let tasks = json_file::load(&path).await?;
        Ok(Self {
            path,
            inner: Mutex::new(TaskIndex::new(tasks)),
        })
    }

    pub async fn create(
        &self,
        owner_id: &str,
        title: String,
        description: String,
        status: String,
    ) -> AppResult<TaskId> {
        let task = Task::new(owner_id, title, description, status);
        let task_id = task.id.clone();

        let mut index = self.inner.lock().await;
        let position = index.tasks.len();
        index.positions.insert(task_id.clone(), position);
        index.tasks.push(task);

        if let Err(e) = json_file::save(&self.path, &index.tasks).await {
            index.tasks.pop();
            index.positions.remove(&task_id);
            return Err(e.into());
        }

        tracing::debug!("Created task {} for owner {}", task_id, owner_id);
        Ok(task_id)
    }

    /// Every task regardless of owner, in insertion order.
    pub async fn list_all(&self) -> Vec<Task> {
        self.inner.lock().await.tasks.clone()
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Vec<Task> {
        self.inner
            .lock()
            .await
            .tasks
            .iter()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect()
    }

    pub async fn get_by_owner(&self, owner_id: &str, task_id: &str) -> AppResult<Task> {
        let index = self.inner.lock().await;
        index
            .position_for(owner_id, task_id)
            .map(|i| index.tasks[i].clone())
            .ok_or_else(|| AppError::NotFound(task_id.to_string()))
    }

    pub async fn update(
        &self,
        owner_id: &str,
        task_id: &str,
        update: TaskUpdate,
    ) -> AppResult<Task> {
        let mut index = self.inner.lock().await;
        let i = index
            .position_for(owner_id, task_id)
            .ok_or_else(|| AppError::NotFound(task_id.to_string()))?;

        let previous = index.tasks[i].clone();
        index.tasks[i].apply(update);

        if let Err(e) = json_file::save(&self.path, &index.tasks).await {
            index.tasks[i] = previous;
            return Err(e.into());
        }

        Ok(index.tasks[i].clone())
    }

    pub async fn delete(&self, owner_id: &str, task_id: &str) -> AppResult<()> {
        let mut index = self.inner.lock().await;
        let i = index
            .position_for(owner_id, task_id)
            .ok_or_else(|| AppError::NotFound(task_id.to_string()))?;

        let removed = index.tasks.remove(i);

        if let Err(e) = json_file::save(&self.path, &index.tasks).await {
            index.tasks.insert(i, removed);
            return Err(e.into());
        }

        index.reindex();
        Ok(())
    }
}

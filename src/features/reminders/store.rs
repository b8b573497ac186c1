//! JSON file persistence for pending reminders
//!
//! The whole task list is rewritten on every save. A missing file is the normal
//! state of a fresh deployment and loads as an empty list.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::error::ReminderError;

pub type ReminderId = Uuid;

/// A one-shot message bound to a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTask {
    pub id: ReminderId,
    pub fire_at: DateTime<Utc>,
    pub message: String,
    pub channel_id: u64,
}

impl ReminderTask {
    /// Create a task with a fresh id
    pub fn new(fire_at: DateTime<Utc>, message: impl Into<String>, channel_id: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            fire_at,
            message: message.into(),
            channel_id,
        }
    }
}

/// In-memory task set backed by a JSON file
#[derive(Debug)]
pub struct ReminderStore {
    path: PathBuf,
    tasks: Vec<ReminderTask>,
    /// Set when the file exists but could not be read; saving would destroy it
    unreadable: bool,
}

impl ReminderStore {
    /// Empty store writing to `path`. Nothing is read from disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tasks: Vec::new(),
            unreadable: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted task list.
    ///
    /// If the file exists but can't be read or parsed, later saves are refused
    /// until a load succeeds, so the file is left for someone to repair.
    pub async fn load(&mut self) -> Result<Vec<ReminderTask>, ReminderError> {
        let result = self.read_file().await;
        self.unreadable = result.is_err();
        result
    }

    async fn read_file(&self) -> Result<Vec<ReminderTask>, ReminderError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "Reminder file {} not found, starting anew",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.persistence_error(e)),
        };

        let tasks: Vec<ReminderTask> =
            serde_json::from_slice(&data).map_err(|e| self.persistence_error(e.into()))?;
        debug!(
            "Loaded {} reminders from {}",
            tasks.len(),
            self.path.display()
        );
        Ok(tasks)
    }

    /// Overwrite the file with the current task list
    pub async fn save(&self) -> Result<(), ReminderError> {
        if self.unreadable {
            return Err(self.persistence_error(io::Error::new(
                ErrorKind::Other,
                "file could not be read at startup, refusing to overwrite it",
            )));
        }
        let data =
            serde_json::to_vec_pretty(&self.tasks).map_err(|e| self.persistence_error(e.into()))?;
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| self.persistence_error(e))?;
        debug!(
            "Saved {} reminders to {}",
            self.tasks.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn add(&mut self, task: ReminderTask) {
        self.tasks.push(task);
    }

    /// Remove the task with `id`. A missing id is logged and ignored.
    pub fn remove(&mut self, id: ReminderId) -> Option<ReminderTask> {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => Some(self.tasks.remove(index)),
            None => {
                info!("Reminder {id} not found in store");
                None
            }
        }
    }

    pub fn get(&self, id: ReminderId) -> Option<&ReminderTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[ReminderTask] {
        &self.tasks
    }

    fn persistence_error(&self, source: io::Error) -> ReminderError {
        ReminderError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

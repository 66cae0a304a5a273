//! Task document. Progress and status are independently settable; the model
//! does not enforce a correlation between them.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Overdue,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

/// Task document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Completion percentage, 0..=100.
    pub progress: i32,
    #[serde(rename = "dueDate", with = "chrono_datetime_as_bson_datetime")]
    pub due_date: DateTime<Utc>,
    #[serde(rename = "case")]
    pub case_id: String,
    #[serde(rename = "assignedTo")]
    pub assigned_to: String,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(req: CreateTaskRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::NotStarted),
            priority: req.priority,
            progress: req.progress.unwrap_or(0),
            due_date: req.due_date,
            case_id: req.case_id,
            assigned_to: req.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: TaskPriority,
    pub progress: Option<i32>,
    #[serde(rename = "dueDate")]
    pub due_date: DateTime<Utc>,
    #[serde(rename = "case")]
    pub case_id: String,
    #[serde(rename = "assignedTo")]
    pub assigned_to: String,
}

/// Allow-listed update patch; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub progress: Option<i32>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub progress: i32,
    #[serde(rename = "dueDate")]
    pub due_date: DateTime<Utc>,
    #[serde(rename = "case")]
    pub case_id: String,
    #[serde(rename = "assignedTo")]
    pub assigned_to: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            priority: t.priority,
            progress: t.progress,
            due_date: t.due_date,
            case_id: t.case_id,
            assigned_to: t.assigned_to,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_spaced_names() {
        assert_eq!(
            serde_json::to_value(TaskStatus::NotStarted).unwrap(),
            serde_json::json!("Not Started")
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("In Progress")
        );
    }
}

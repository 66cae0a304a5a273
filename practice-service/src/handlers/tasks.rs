//! Task CRUD. Tasks are firm-wide for lawyer accounts; `progress` is bounded
//! 0..=100 but otherwise independent of `status`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde_json::json;
use service_core::error::AppError;

use crate::middleware::CallerIdentity;
use crate::models::{CreateTaskRequest, Task, TaskResponse, UpdateTaskRequest};
use crate::startup::AppState;

fn check_progress(progress: i32) -> Result<(), AppError> {
    if !(0..=100).contains(&progress) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Progress must be between 0 and 100"
        )));
    }
    Ok(())
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;

    if let Some(progress) = req.progress {
        check_progress(progress)?;
    }

    let task = Task::new(req, Utc::now());
    state.db.tasks().insert_one(&task, None).await?;

    tracing::info!(task_id = %task.id, "Task created");
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;

    let options = FindOptions::builder().sort(doc! { "dueDate": 1 }).build();
    let mut cursor = state.db.tasks().find(doc! {}, options).await?;

    let mut tasks = Vec::new();
    while let Some(task) = cursor.try_next().await? {
        tasks.push(TaskResponse::from(task));
    }
    Ok(Json(tasks))
}

/// GET /tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;

    let task = state
        .db
        .tasks()
        .find_one(doc! { "_id": &id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Task not found")))?;

    Ok(Json(TaskResponse::from(task)))
}

/// PUT /tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;

    if let Some(progress) = req.progress {
        check_progress(progress)?;
    }

    let update = doc! { "$set": task_patch(&req)? };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let task = state
        .db
        .tasks()
        .find_one_and_update(doc! { "_id": &id }, update, options)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Task not found")))?;

    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;

    let result = state.db.tasks().delete_one(doc! { "_id": &id }, None).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Task not found")));
    }

    tracing::info!(task_id = %id, "Task deleted");
    Ok(Json(json!({ "message": "Task deleted" })))
}

fn task_patch(req: &UpdateTaskRequest) -> Result<Document, AppError> {
    let mut set = doc! { "updatedAt": BsonDateTime::from_chrono(Utc::now()) };

    if let Some(v) = &req.title {
        set.insert("title", v);
    }
    if let Some(v) = &req.description {
        set.insert("description", v);
    }
    if let Some(v) = &req.status {
        let bson = mongodb::bson::to_bson(v)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
        set.insert("status", bson);
    }
    if let Some(v) = &req.priority {
        let bson = mongodb::bson::to_bson(v)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
        set.insert("priority", bson);
    }
    if let Some(v) = req.progress {
        set.insert("progress", v);
    }
    if let Some(v) = &req.due_date {
        set.insert("dueDate", BsonDateTime::from_chrono(*v));
    }
    if let Some(v) = &req.assigned_to {
        set.insert("assignedTo", v);
    }

    Ok(set)
}

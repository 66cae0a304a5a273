//! Calendar event CRUD, scoped to the creating lawyer.

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
use crate::models::{CreateEventRequest, Event, EventResponse, UpdateEventRequest};
use crate::startup::AppState;

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let event = Event::new(lawyer_id.to_string(), req, Utc::now());
    state.db.events().insert_one(&event, None).await?;

    tracing::info!(event_id = %event.id, "Event created");
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let options = FindOptions::builder().sort(doc! { "date": 1 }).build();
    let mut cursor = state
        .db
        .events()
        .find(doc! { "creator": lawyer_id }, options)
        .await?;

    let mut events = Vec::new();
    while let Some(event) = cursor.try_next().await? {
        events.push(EventResponse::from(event));
    }
    Ok(Json(events))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let event = state
        .db
        .events()
        .find_one(doc! { "_id": &id, "creator": lawyer_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Event not found")))?;

    Ok(Json(EventResponse::from(event)))
}

/// PUT /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let update = doc! { "$set": event_patch(&req) };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let event = state
        .db
        .events()
        .find_one_and_update(doc! { "_id": &id, "creator": lawyer_id }, update, options)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Event not found")))?;

    Ok(Json(EventResponse::from(event)))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let result = state
        .db
        .events()
        .delete_one(doc! { "_id": &id, "creator": lawyer_id }, None)
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Event not found")));
    }

    tracing::info!(event_id = %id, "Event deleted");
    Ok(Json(json!({ "message": "Event deleted" })))
}

fn event_patch(req: &UpdateEventRequest) -> Document {
    let mut set = doc! { "updatedAt": BsonDateTime::from_chrono(Utc::now()) };

    if let Some(v) = &req.title {
        set.insert("title", v);
    }
    if let Some(v) = &req.event_type {
        set.insert("type", v);
    }
    if let Some(v) = &req.date {
        set.insert("date", BsonDateTime::from_chrono(*v));
    }
    if let Some(v) = &req.start_time {
        set.insert("startTime", v);
    }
    if let Some(v) = &req.end_time {
        set.insert("endTime", v);
    }
    if let Some(v) = &req.location {
        set.insert("location", v);
    }
    if let Some(v) = &req.description {
        set.insert("description", v);
    }
    if let Some(v) = &req.case_id {
        set.insert("caseId", v);
    }
    if let Some(v) = &req.priority {
        set.insert("priority", v);
    }
    if let Some(v) = &req.attendees {
        set.insert("attendees", v.clone());
    }

    set
}

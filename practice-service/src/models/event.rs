//! Calendar event document.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    #[serde(rename = "startTime", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "caseId", default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub creator: String,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(creator_id: String, req: CreateEventRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            event_type: req.event_type,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            location: req.location,
            description: req.description,
            case_id: req.case_id,
            priority: req.priority,
            attendees: req.attendees.unwrap_or_default(),
            creator: creator_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "caseId")]
    pub case_id: Option<String>,
    pub priority: Option<String>,
    pub attendees: Option<Vec<String>>,
}

/// Allow-listed update patch; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "caseId")]
    pub case_id: Option<String>,
    pub priority: Option<String>,
    pub attendees: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "caseId", skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub attendees: Vec<String>,
    pub creator: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            event_type: e.event_type,
            date: e.date,
            start_time: e.start_time,
            end_time: e.end_time,
            location: e.location,
            description: e.description,
            case_id: e.case_id,
            priority: e.priority,
            attendees: e.attendees,
            creator: e.creator,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

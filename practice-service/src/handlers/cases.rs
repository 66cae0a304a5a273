//! Case CRUD. Every read goes through the caller's case scope predicate;
//! mutations are owner-only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde_json::json;
use service_core::error::{is_duplicate_key, AppError};

use crate::handlers::{client_summaries, user_summaries};
use crate::middleware::CallerIdentity;
use crate::models::{CaseRecord, CaseResponse, CreateCaseRequest, UpdateCaseRequest};
use crate::services::MongoDb;
use crate::startup::AppState;

/// POST /cases
pub async fn create_case(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(req): Json<CreateCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let case = CaseRecord::new(lawyer_id.to_string(), req, Utc::now());

    state.db.cases().insert_one(&case, None).await.map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::Conflict(anyhow::anyhow!("Case number must be unique"))
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(case_id = %case.id, lawyer_id = %lawyer_id, "Case created");

    let response = populate_case(&state.db, case).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /cases
pub async fn list_cases(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    let filter = identity.case_filter();
    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .build();

    let mut cursor = state.db.cases().find(filter, options).await?;
    let mut cases = Vec::new();
    while let Some(case) = cursor.try_next().await? {
        cases.push(case);
    }

    let responses = populate_cases(&state.db, cases).await?;
    Ok(Json(responses))
}

/// GET /cases/:id
pub async fn get_case(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut filter = identity.case_filter();
    filter.insert("_id", &id);

    let case = state
        .db
        .cases()
        .find_one(filter, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Case not found")))?;

    let response = populate_case(&state.db, case).await?;
    Ok(Json(response))
}

/// PUT /cases/:id
pub async fn update_case(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let update = doc! { "$set": case_patch(&req)? };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let case = state
        .db
        .cases()
        .find_one_and_update(doc! { "_id": &id, "lawyer": lawyer_id }, update, options)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict(anyhow::anyhow!("Case number must be unique"))
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Case not found")))?;

    let response = populate_case(&state.db, case).await?;
    Ok(Json(response))
}

/// DELETE /cases/:id
pub async fn delete_case(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    let result = state
        .db
        .cases()
        .delete_one(doc! { "_id": &id, "lawyer": lawyer_id }, None)
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Case not found")));
    }

    tracing::info!(case_id = %id, "Case deleted");
    Ok(Json(json!({ "message": "Case deleted" })))
}

/// Build the `$set` document from an allow-listed patch. Unknown request
/// fields never reach this point; absent fields are left untouched.
fn case_patch(req: &UpdateCaseRequest) -> Result<Document, AppError> {
    let mut set = doc! { "updatedAt": BsonDateTime::from_chrono(Utc::now()) };

    if let Some(v) = &req.case_name {
        set.insert("caseName", v);
    }
    if let Some(v) = &req.case_number {
        set.insert("caseNumber", v);
    }
    if let Some(v) = &req.practice_area {
        set.insert("practiceArea", v);
    }
    if let Some(v) = &req.case_stage {
        set.insert("caseStage", v);
    }
    if let Some(v) = &req.date_opened {
        set.insert("dateOpened", BsonDateTime::from_chrono(*v));
    }
    if let Some(v) = &req.office {
        set.insert("office", v);
    }
    if let Some(v) = &req.description {
        set.insert("description", v);
    }
    if let Some(v) = &req.statute_of_limitations {
        set.insert("statuteOfLimitations", BsonDateTime::from_chrono(*v));
    }
    if let Some(v) = req.conflict_check {
        set.insert("conflictCheck", v);
    }
    if let Some(v) = &req.conflict_check_notes {
        set.insert("conflictCheckNotes", v);
    }
    if let Some(v) = &req.clients {
        set.insert("clients", v.clone());
    }
    if let Some(v) = &req.contacts {
        set.insert("contacts", v.clone());
    }
    if let Some(v) = &req.staff {
        set.insert("staff", v.clone());
    }
    if let Some(v) = &req.custom_fields {
        let bson = mongodb::bson::to_bson(v)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
        set.insert("customFields", bson);
    }
    if let Some(v) = &req.status {
        set.insert("status", Bson::String(v.as_str().to_string()));
    }

    Ok(set)
}

async fn populate_case(db: &MongoDb, case: CaseRecord) -> Result<CaseResponse, AppError> {
    Ok(populate_cases(db, vec![case]).await?.remove(0))
}

pub(crate) async fn populate_cases(
    db: &MongoDb,
    cases: Vec<CaseRecord>,
) -> Result<Vec<CaseResponse>, AppError> {
    let lawyer_ids: Vec<String> = cases.iter().map(|c| c.lawyer.clone()).collect();
    let client_ids: Vec<String> = cases.iter().flat_map(|c| c.clients.clone()).collect();

    let lawyers = user_summaries(db, &lawyer_ids).await?;
    let clients = client_summaries(db, &client_ids).await?;

    Ok(cases
        .into_iter()
        .map(|case| {
            let lawyer = lawyers.get(&case.lawyer).cloned();
            let case_clients = case
                .clients
                .iter()
                .filter_map(|id| clients.get(id).cloned())
                .collect();
            CaseResponse::from_parts(case, lawyer, case_clients)
        })
        .collect())
}

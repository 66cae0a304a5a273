//! Client account provisioning (lawyer-side) and client self-service.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use service_core::error::{is_duplicate_key, AppError};
use validator::Validate;

use crate::handlers::cases;
use crate::middleware::CallerIdentity;
use crate::models::{ClientAccount, CreateClientRequest, UpdateClientProfile};
use crate::startup::AppState;
use crate::utils::password::{hash_password, Password};

/// POST /clients
pub async fn create_client(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(req): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;
    req.validate()?;

    let password_hash = hash_password(&Password::new(req.password.clone()))?;
    let client = ClientAccount::new(req, password_hash.into_string(), Utc::now());

    state
        .db
        .clients()
        .insert_one(&client, None)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            } else {
                AppError::from(e)
            }
        })?;

    tracing::info!(client_id = %client.id, "Client account created");
    Ok((StatusCode::CREATED, Json(client.sanitized())))
}

/// GET /clients
pub async fn list_clients(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    identity.require_lawyer()?;

    let options = FindOptions::builder().sort(doc! { "company": 1 }).build();
    let mut cursor = state.db.clients().find(doc! {}, options).await?;

    let mut clients = Vec::new();
    while let Some(client) = cursor.try_next().await? {
        clients.push(client.sanitized());
    }
    Ok(Json(clients))
}

/// GET /client/profile
pub async fn get_profile(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    let client_id = identity.require_client()?;

    let client = state
        .db
        .clients()
        .find_one(doc! { "_id": client_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    Ok(Json(client.sanitized()))
}

/// PUT /client/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(req): Json<UpdateClientProfile>,
) -> Result<impl IntoResponse, AppError> {
    let client_id = identity.require_client()?;
    req.validate()?;

    let set = profile_patch(&req);
    if set.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No updatable fields in request"
        )));
    }

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let client = state
        .db
        .clients()
        .find_one_and_update(doc! { "_id": client_id }, doc! { "$set": set }, options)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    Ok(Json(client.sanitized()))
}

/// GET /client/cases
///
/// Cases that reference the caller and are not closed, newest first by
/// `dateOpened`.
pub async fn list_client_cases(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    identity.require_client()?;

    let options = FindOptions::builder()
        .sort(doc! { "dateOpened": -1 })
        .build();

    let mut cursor = state.db.cases().find(identity.case_filter(), options).await?;
    let mut records = Vec::new();
    while let Some(case) = cursor.try_next().await? {
        records.push(case);
    }

    let responses = cases::populate_cases(&state.db, records).await?;
    Ok(Json(responses))
}

fn profile_patch(req: &UpdateClientProfile) -> Document {
    let mut set = Document::new();
    if let Some(v) = &req.company {
        set.insert("company", v);
    }
    if let Some(v) = &req.contact_person {
        set.insert("contactPerson", v);
    }
    if let Some(v) = &req.email {
        set.insert("email", v);
    }
    if let Some(v) = &req.account_type {
        if let Ok(bson) = mongodb::bson::to_bson(v) {
            set.insert("accountType", bson);
        }
    }
    set
}

//! Authentication handlers for lawyer and client accounts.
//!
//! Login failures use one message for unknown email and wrong password so
//! the endpoint cannot be used to probe which emails exist.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use mongodb::bson::doc;
use serde::Serialize;
use service_core::error::AppError;
use validator::Validate;

use crate::middleware::CallerIdentity;
use crate::models::{AuthResponse, ClientResponse, LoginRequest, RegisterRequest, User};
use crate::services::Identity;
use crate::startup::AppState;
use crate::utils::password::{hash_password, verify_password, Password, PasswordHashString};

/// Token plus sanitized client profile, returned by client login.
#[derive(Debug, Serialize)]
pub struct ClientAuthResponse {
    pub token: String,
    pub client: ClientResponse,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let password_hash = hash_password(&Password::new(req.password.clone()))?;
    let user = User::new(req, password_hash.into_string(), Utc::now());

    // Unique index on email turns a duplicate signup into a 409.
    state.db.users().insert_one(&user, None).await.map_err(|e| {
        if service_core::error::is_duplicate_key(&e) {
            AppError::Conflict(anyhow::anyhow!("Email already registered"))
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = %user.id, "Lawyer account registered");

    let token = state.jwt.issue(&Identity::Lawyer {
        id: user.id.clone(),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.sanitized(),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user = state
        .db
        .users()
        .find_one(doc! { "email": &req.email }, None)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

    verify_password(
        &Password::new(req.password),
        &PasswordHashString::new(user.password.clone()),
    )
    .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

    let now = Utc::now();
    state
        .db
        .users()
        .update_one(
            doc! { "_id": &user.id },
            doc! { "$set": { "lastLogin": mongodb::bson::DateTime::from_chrono(now) } },
            None,
        )
        .await?;

    tracing::info!(user_id = %user.id, "Lawyer logged in");

    let token = state.jwt.issue(&Identity::Lawyer {
        id: user.id.clone(),
    })?;

    let mut sanitized = user.sanitized();
    sanitized.last_login = Some(now);

    Ok(Json(AuthResponse {
        token,
        user: sanitized,
    }))
}

/// POST /auth/client/login
pub async fn client_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let client = state
        .db
        .clients()
        .find_one(doc! { "email": &req.email }, None)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

    verify_password(
        &Password::new(req.password),
        &PasswordHashString::new(client.password.clone()),
    )
    .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

    tracing::info!(client_id = %client.id, "Client logged in");

    let token = state.jwt.issue(&Identity::Client {
        id: client.id.clone(),
    })?;

    Ok(Json(ClientAuthResponse {
        token,
        client: client.sanitized(),
    }))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Response, AppError> {
    match identity {
        Identity::Lawyer { id } => {
            let user = state
                .db
                .users()
                .find_one(doc! { "_id": &id }, None)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;
            Ok(Json(user.sanitized()).into_response())
        }
        Identity::Client { id } => {
            let client = state
                .db
                .clients()
                .find_one(doc! { "_id": &id }, None)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;
            Ok(Json(client.sanitized()).into_response())
        }
    }
}

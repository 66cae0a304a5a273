use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::IntoResponse,
};
use service_core::error::AppError;

use crate::services::Identity;
use crate::startup::AppState;

/// Middleware to require a valid bearer token.
///
/// Validates the token and stores the resolved identity in request
/// extensions. Anything that fails to resolve is refused before a handler
/// ever runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let identity = state.jwt.validate(token)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extractor for the authenticated identity placed by `auth_middleware`.
pub struct CallerIdentity(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<Identity>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Identity missing from request extensions; is the route behind auth_middleware?"
            ))
        })?;

        Ok(CallerIdentity(identity.clone()))
    }
}

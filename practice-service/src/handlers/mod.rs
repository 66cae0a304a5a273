pub mod auth;
pub mod cases;
pub mod clients;
pub mod events;
pub mod health;
pub mod invoices;
pub mod tasks;

use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use service_core::error::AppError;
use std::collections::HashMap;

use crate::models::{CaseSummary, ClientSummary, UserSummary};
use crate::services::MongoDb;

/// Batch-fetch case summaries for response population. One `$in` query per
/// response, never one query per row.
pub(crate) async fn case_summaries(
    db: &MongoDb,
    ids: &[String],
) -> Result<HashMap<String, CaseSummary>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut cursor = db.cases().find(doc! { "_id": { "$in": ids } }, None).await?;
    let mut summaries = HashMap::new();
    while let Some(case) = cursor.try_next().await? {
        summaries.insert(case.id.clone(), CaseSummary::from(&case));
    }
    Ok(summaries)
}

pub(crate) async fn user_summaries(
    db: &MongoDb,
    ids: &[String],
) -> Result<HashMap<String, UserSummary>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut cursor = db.users().find(doc! { "_id": { "$in": ids } }, None).await?;
    let mut summaries = HashMap::new();
    while let Some(user) = cursor.try_next().await? {
        summaries.insert(user.id.clone(), UserSummary::from(&user));
    }
    Ok(summaries)
}

pub(crate) async fn client_summaries(
    db: &MongoDb,
    ids: &[String],
) -> Result<HashMap<String, ClientSummary>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut cursor = db
        .clients()
        .find(doc! { "_id": { "$in": ids } }, None)
        .await?;
    let mut summaries = HashMap::new();
    while let Some(client) = cursor.try_next().await? {
        summaries.insert(client.id.clone(), ClientSummary::from(&client));
    }
    Ok(summaries)
}

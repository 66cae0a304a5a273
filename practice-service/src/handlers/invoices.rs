//! Invoice handlers: CRUD, portfolio statistics, and the recent-activity
//! feed. Totals are always derived server-side; client-submitted amounts are
//! never trusted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;

use crate::handlers::{case_summaries, user_summaries};
use crate::middleware::CallerIdentity;
use crate::models::{
    CreateInvoiceRequest, Invoice, InvoicePatch, InvoiceResponse, RecentActivityEntry,
};
use crate::services::billing::{compute_totals, validate_expenses, InvoiceStats};
use crate::services::MongoDb;
use crate::startup::AppState;

const DEFAULT_ACTIVITY_LIMIT: i64 = 5;

/// POST /invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lawyer_id = identity.require_lawyer()?;

    validate_expenses(&req.expenses)?;

    // A dangling case id is a caller mistake, not a missing resource.
    state
        .db
        .cases()
        .find_one(doc! { "_id": &req.case_id }, None)
        .await?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid case reference")))?;

    let totals = compute_totals(&req.expenses, state.config.billing.tax_rate);
    let invoice = Invoice::new(
        req.case_id,
        lawyer_id.to_string(),
        req.date,
        req.expenses,
        totals.subtotal,
        totals.tax,
        totals.total,
        Utc::now(),
    );

    state.db.invoices().insert_one(&invoice, None).await?;

    tracing::info!(invoice_id = %invoice.id, total = %invoice.total, "Invoice created");

    let response = populate_invoice(&state.db, invoice).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    let filter = identity.invoice_filter()?;
    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .build();

    let mut cursor = state.db.invoices().find(filter, options).await?;
    let mut invoices = Vec::new();
    while let Some(invoice) = cursor.try_next().await? {
        invoices.push(invoice);
    }

    let responses = populate_invoices(&state.db, invoices).await?;
    Ok(Json(responses))
}

/// GET /invoices/:id
pub async fn get_invoice(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut filter = identity.invoice_filter()?;
    filter.insert("_id", &id);

    let invoice = state
        .db
        .invoices()
        .find_one(filter, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    let response = populate_invoice(&state.db, invoice).await?;
    Ok(Json(response))
}

/// PUT /invoices/:id
///
/// Replacing the expense list recomputes subtotal, tax, and total in the
/// same write; stored totals can never drift from stored lines.
pub async fn update_invoice(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<InvoicePatch>,
) -> Result<impl IntoResponse, AppError> {
    let mut filter = identity.invoice_filter()?;
    filter.insert("_id", &id);

    let set = invoice_patch(&req, &state)?;
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let invoice = state
        .db
        .invoices()
        .find_one_and_update(filter, doc! { "$set": set }, options)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    let response = populate_invoice(&state.db, invoice).await?;
    Ok(Json(response))
}

/// DELETE /invoices/:id
pub async fn delete_invoice(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut filter = identity.invoice_filter()?;
    filter.insert("_id", &id);

    let result = state.db.invoices().delete_one(filter, None).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Invoice not found")));
    }

    tracing::info!(invoice_id = %id, "Invoice deleted");
    Ok(Json(json!({ "message": "Invoice deleted" })))
}

/// GET /invoices/stats
///
/// Single streaming fold over the caller's invoice scope; nothing is
/// cached, so the numbers always reconcile with the rows.
pub async fn invoice_stats(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<impl IntoResponse, AppError> {
    let filter = identity.invoice_filter()?;

    let mut cursor = state.db.invoices().find(filter, None).await?;
    let mut stats = InvoiceStats::default();
    while let Some(invoice) = cursor.try_next().await? {
        stats.observe(&invoice);
    }

    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub limit: Option<i64>,
}

/// GET /invoices/recent-activity
pub async fn recent_activity(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = identity.invoice_filter()?;

    let limit = params.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    if limit < 0 {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "limit must not be negative"
        )));
    }
    // The driver treats limit 0 as "no limit"; an explicit zero means none.
    if limit == 0 {
        return Ok(Json(Vec::<RecentActivityEntry>::new()));
    }
    let limit = limit.min(100);

    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .limit(limit)
        .build();

    let mut cursor = state.db.invoices().find(filter, options).await?;
    let mut invoices = Vec::new();
    while let Some(invoice) = cursor.try_next().await? {
        invoices.push(invoice);
    }

    let case_ids: Vec<String> = invoices.iter().map(|i| i.case_id.clone()).collect();
    let user_ids: Vec<String> = invoices.iter().map(|i| i.user_id.clone()).collect();
    let case_refs = case_summaries(&state.db, &case_ids).await?;
    let user_refs = user_summaries(&state.db, &user_ids).await?;

    let entries: Vec<RecentActivityEntry> = invoices
        .into_iter()
        .map(|invoice| RecentActivityEntry {
            id: invoice.id,
            action: invoice.status,
            date: invoice.created_at,
            amount: invoice.total,
            case: case_refs.get(&invoice.case_id).cloned(),
            user: user_refs.get(&invoice.user_id).cloned(),
        })
        .collect();

    Ok(Json(entries))
}

/// Build the `$set` document from an allow-listed invoice patch.
fn invoice_patch(req: &InvoicePatch, state: &AppState) -> Result<Document, AppError> {
    let mut set = doc! { "updatedAt": BsonDateTime::from_chrono(Utc::now()) };

    if let Some(status) = &req.status {
        set.insert("status", Bson::String(status.as_str().to_string()));
    }
    if let Some(notes) = &req.notes {
        set.insert("notes", notes);
    }
    if let Some(terms) = &req.payment_terms {
        set.insert("paymentTerms", terms);
    }
    if let Some(due) = &req.due_date {
        set.insert("dueDate", BsonDateTime::from_chrono(*due));
    }
    if let Some(expenses) = &req.expenses {
        validate_expenses(expenses)?;
        let totals = compute_totals(expenses, state.config.billing.tax_rate);

        let lines = mongodb::bson::to_bson(expenses)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
        set.insert("expenses", lines);
        set.insert("subtotal", totals.subtotal.to_string());
        set.insert("tax", totals.tax.to_string());
        set.insert("total", totals.total.to_string());
    }

    Ok(set)
}

async fn populate_invoice(db: &MongoDb, invoice: Invoice) -> Result<InvoiceResponse, AppError> {
    Ok(populate_invoices(db, vec![invoice]).await?.remove(0))
}

async fn populate_invoices(
    db: &MongoDb,
    invoices: Vec<Invoice>,
) -> Result<Vec<InvoiceResponse>, AppError> {
    let case_ids: Vec<String> = invoices.iter().map(|i| i.case_id.clone()).collect();
    let user_ids: Vec<String> = invoices.iter().map(|i| i.user_id.clone()).collect();

    let cases = case_summaries(db, &case_ids).await?;
    let users = user_summaries(db, &user_ids).await?;

    Ok(invoices
        .into_iter()
        .map(|invoice| {
            let case = cases.get(&invoice.case_id).cloned();
            let user = users.get(&invoice.user_id).cloned();
            InvoiceResponse::from_parts(invoice, case, user)
        })
        .collect())
}

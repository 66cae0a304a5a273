//! Invoice document: itemized expense lines, computed totals, and status.
//!
//! Persisted field names (`case`, `user`, `date`, `paymentTerms`, ...) are
//! kept compatible with the pre-existing collection layout so data can be
//! migrated in place. Monetary amounts are fixed-point `Decimal` values and
//! serialize as strings, never binary floats.

use super::{CaseSummary, UserSummary};
use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice status. Transitions are caller-driven; no transition is forbidden,
/// including setting a Paid invoice back to Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Outstanding,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Outstanding => "Outstanding",
            InvoiceStatus::Paid => "Paid",
        }
    }
}

/// One billable or non-billable line on an invoice. Immutable once attached
/// to a saved invoice; replacing the expense list replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub description: String,
    pub cost: Decimal,
    pub quantity: i64,
    pub billable: bool,
}

/// Invoice document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "case")]
    pub case_id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub expenses: Vec<ExpenseLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "paymentTerms",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_terms: Option<String>,
    #[serde(
        rename = "dueDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::optional_bson_datetime"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Build a new Draft invoice. Totals come from the money calculator and
    /// `now` is passed in explicitly so the write timestamp is testable.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        case_id: String,
        user_id: String,
        date: DateTime<Utc>,
        expenses: Vec<ExpenseLine>,
        subtotal: Decimal,
        tax: Decimal,
        total: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            case_id,
            user_id,
            date,
            expenses,
            subtotal,
            tax,
            total,
            status: InvoiceStatus::Draft,
            notes: None,
            payment_terms: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(rename = "case")]
    pub case_id: String,
    pub date: DateTime<Utc>,
    pub expenses: Vec<ExpenseLine>,
}

/// Allow-listed update patch. Only the fields named here are mutable; any
/// other key in the request body is ignored rather than persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePatch {
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    #[serde(rename = "paymentTerms")]
    pub payment_terms: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    pub expenses: Option<Vec<ExpenseLine>>,
}

/// Invoice response with populated case and user summaries.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub case: Option<CaseSummary>,
    pub user: Option<UserSummary>,
    pub date: DateTime<Utc>,
    pub expenses: Vec<ExpenseLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "paymentTerms", skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    pub fn from_parts(
        invoice: Invoice,
        case: Option<CaseSummary>,
        user: Option<UserSummary>,
    ) -> Self {
        Self {
            id: invoice.id,
            case,
            user,
            date: invoice.date,
            expenses: invoice.expenses,
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            total: invoice.total,
            status: invoice.status,
            notes: invoice.notes,
            payment_terms: invoice.payment_terms,
            due_date: invoice.due_date,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// One row of the recent-activity feed: an invoice mapped to the shape the
/// dashboard renders, recomputed on every call. `date` is the invoice's
/// creation time, not its issue date.
#[derive(Debug, Clone, Serialize)]
pub struct RecentActivityEntry {
    pub id: String,
    pub action: InvoiceStatus,
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub case: Option<CaseSummary>,
    pub user: Option<UserSummary>,
}

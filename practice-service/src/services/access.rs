//! Access scope resolver: maps a caller's identity to the query predicate
//! that bounds what they may read or mutate.
//!
//! Roles are a closed set; an unrecognized role never reaches a predicate
//! because token validation rejects it first.

use mongodb::bson::{doc, Document};
use service_core::error::AppError;

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Lawyer { id: String },
    Client { id: String },
}

impl Identity {
    pub fn id(&self) -> &str {
        match self {
            Identity::Lawyer { id } | Identity::Client { id } => id,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Identity::Lawyer { .. } => "lawyer",
            Identity::Client { .. } => "client",
        }
    }

    /// Predicate bounding which cases this identity may see.
    ///
    /// Lawyers see cases they own; clients see cases that reference them,
    /// excluding closed ones.
    pub fn case_filter(&self) -> Document {
        match self {
            Identity::Lawyer { id } => doc! { "lawyer": id },
            Identity::Client { id } => doc! {
                "clients": id,
                "status": { "$ne": "closed" },
            },
        }
    }

    /// Predicate bounding which invoices this identity may see.
    ///
    /// Lawyers are scoped to invoices they issued (the `user` field), not to
    /// invoices on cases they own. Clients have no invoice-visibility path
    /// at all; rather than invent one, they are refused outright.
    pub fn invoice_filter(&self) -> Result<Document, AppError> {
        match self {
            Identity::Lawyer { id } => Ok(doc! { "user": id }),
            Identity::Client { .. } => Err(AppError::Forbidden(anyhow::anyhow!(
                "Clients do not have access to invoices"
            ))),
        }
    }

    /// Operations reserved for lawyers (case mutation, billing, calendar).
    pub fn require_lawyer(&self) -> Result<&str, AppError> {
        match self {
            Identity::Lawyer { id } => Ok(id),
            Identity::Client { .. } => Err(AppError::Forbidden(anyhow::anyhow!(
                "This operation requires a lawyer account"
            ))),
        }
    }

    /// Operations reserved for clients (self-service profile).
    pub fn require_client(&self) -> Result<&str, AppError> {
        match self {
            Identity::Client { id } => Ok(id),
            Identity::Lawyer { .. } => Err(AppError::Forbidden(anyhow::anyhow!(
                "This operation requires a client account"
            ))),
        }
    }
}

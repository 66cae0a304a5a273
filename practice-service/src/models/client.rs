//! Client (external customer) account document.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Individual,
    Business,
    Corporate,
}

/// Client account document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAccount {
    #[serde(rename = "_id")]
    pub id: String,
    pub company: String,
    #[serde(rename = "contactPerson")]
    pub contact_person: String,
    pub email: String,
    /// Argon2 hash, never the raw password.
    pub password: String,
    #[serde(rename = "accountType")]
    pub account_type: AccountType,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ClientAccount {
    pub fn new(req: CreateClientRequest, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            company: req.company,
            contact_person: req.contact_person,
            email: req.email,
            password: password_hash,
            account_type: req.account_type,
            created_at: now,
        }
    }

    pub fn sanitized(&self) -> ClientResponse {
        ClientResponse {
            id: self.id.clone(),
            company: self.company.clone(),
            contact_person: self.contact_person.clone(),
            email: self.email.clone(),
            account_type: self.account_type,
            created_at: self.created_at,
        }
    }
}

/// Lawyer-side request to provision a client account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1))]
    pub company: String,
    #[serde(rename = "contactPerson")]
    #[validate(length(min = 1))]
    pub contact_person: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(rename = "accountType")]
    pub account_type: AccountType,
}

/// Client self-service profile patch; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClientProfile {
    #[validate(length(min = 1))]
    pub company: Option<String>,
    #[serde(rename = "contactPerson")]
    #[validate(length(min = 1))]
    pub contact_person: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(rename = "accountType")]
    pub account_type: Option<AccountType>,
}

/// Client response without credentials.
#[derive(Debug, Clone, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub company: String,
    #[serde(rename = "contactPerson")]
    pub contact_person: String,
    pub email: String,
    #[serde(rename = "accountType")]
    pub account_type: AccountType,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Short client reference used when populating cases.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: String,
    pub company: String,
    #[serde(rename = "contactPerson")]
    pub contact_person: String,
    pub email: String,
}

impl From<&ClientAccount> for ClientSummary {
    fn from(c: &ClientAccount) -> Self {
        Self {
            id: c.id.clone(),
            company: c.company.clone(),
            contact_person: c.contact_person.clone(),
            email: c.email.clone(),
        }
    }
}

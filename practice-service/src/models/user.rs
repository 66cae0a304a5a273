//! Lawyer user account. Credential storage is interface-level only: the hash
//! is opaque to the rest of the service and never serialized into responses.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lawyer account document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    /// Argon2 hash, never the raw password.
    pub password: String,
    #[serde(rename = "firmName")]
    pub firm_name: String,
    #[serde(
        rename = "numberOfEmployees",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_employees: Option<i32>,
    #[serde(rename = "phoneNumber", default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(
        rename = "lastLogin",
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::optional_bson_datetime"
    )]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(req: RegisterRequest, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: password_hash,
            firm_name: req.firm_name,
            number_of_employees: req.number_of_employees,
            phone_number: req.phone_number,
            last_login: None,
            created_at: now,
        }
    }

    /// Response shape with the credential field stripped.
    pub fn sanitized(&self) -> UserResponse {
        UserResponse {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            firm_name: self.firm_name.clone(),
            number_of_employees: self.number_of_employees,
            phone_number: self.phone_number.clone(),
            last_login: self.last_login,
            created_at: self.created_at,
        }
    }
}

/// Lawyer signup request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "firstName")]
    #[validate(length(min = 1))]
    pub first_name: String,
    #[serde(rename = "lastName")]
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(rename = "firmName")]
    #[validate(length(min = 1))]
    pub firm_name: String,
    #[serde(rename = "numberOfEmployees")]
    pub number_of_employees: Option<i32>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// User response without credentials.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "firmName")]
    pub firm_name: String,
    #[serde(rename = "numberOfEmployees", skip_serializing_if = "Option::is_none")]
    pub number_of_employees: Option<i32>,
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(rename = "lastLogin", skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Short user reference used when populating invoices and activity rows.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}

/// Token plus sanitized profile, returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

//! Case document. A case is owned by exactly one lawyer; clients referenced
//! in `clients` get read-only visibility while the case is not closed.

use super::{ClientSummary, UserSummary};
use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Active,
    Closed,
    Pending,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Active => "active",
            CaseStatus::Closed => "closed",
            CaseStatus::Pending => "pending",
        }
    }
}

/// Case document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "caseName")]
    pub case_name: String,
    #[serde(rename = "caseNumber", default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
    #[serde(rename = "caseStage")]
    pub case_stage: String,
    #[serde(rename = "dateOpened", with = "chrono_datetime_as_bson_datetime")]
    pub date_opened: DateTime<Utc>,
    pub office: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "statuteOfLimitations",
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::optional_bson_datetime"
    )]
    pub statute_of_limitations: Option<DateTime<Utc>>,
    #[serde(rename = "conflictCheck", default)]
    pub conflict_check: bool,
    #[serde(
        rename = "conflictCheckNotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conflict_check_notes: Option<String>,
    /// Owning lawyer; exactly one, required for every case.
    pub lawyer: String,
    #[serde(default)]
    pub clients: Vec<String>,
    #[serde(default)]
    pub contacts: Vec<String>,
    #[serde(default)]
    pub staff: Vec<String>,
    #[serde(rename = "customFields", default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<HashMap<String, String>>,
    pub status: CaseStatus,
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl CaseRecord {
    pub fn new(lawyer_id: String, req: CreateCaseRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            case_name: req.case_name,
            case_number: req.case_number,
            practice_area: req.practice_area,
            case_stage: req.case_stage,
            date_opened: req.date_opened,
            office: req.office,
            description: req.description,
            statute_of_limitations: req.statute_of_limitations,
            conflict_check: req.conflict_check.unwrap_or(false),
            conflict_check_notes: req.conflict_check_notes,
            lawyer: lawyer_id,
            clients: req.clients.unwrap_or_default(),
            contacts: req.contacts.unwrap_or_default(),
            staff: req.staff.unwrap_or_default(),
            custom_fields: req.custom_fields,
            status: CaseStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaseRequest {
    #[serde(rename = "caseName")]
    pub case_name: String,
    #[serde(rename = "caseNumber")]
    pub case_number: Option<String>,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
    #[serde(rename = "caseStage")]
    pub case_stage: String,
    #[serde(rename = "dateOpened")]
    pub date_opened: DateTime<Utc>,
    pub office: String,
    pub description: Option<String>,
    #[serde(rename = "statuteOfLimitations")]
    pub statute_of_limitations: Option<DateTime<Utc>>,
    #[serde(rename = "conflictCheck")]
    pub conflict_check: Option<bool>,
    #[serde(rename = "conflictCheckNotes")]
    pub conflict_check_notes: Option<String>,
    pub clients: Option<Vec<String>>,
    pub contacts: Option<Vec<String>>,
    pub staff: Option<Vec<String>>,
    #[serde(rename = "customFields")]
    pub custom_fields: Option<HashMap<String, String>>,
}

/// Allow-listed update patch; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCaseRequest {
    #[serde(rename = "caseName")]
    pub case_name: Option<String>,
    #[serde(rename = "caseNumber")]
    pub case_number: Option<String>,
    #[serde(rename = "practiceArea")]
    pub practice_area: Option<String>,
    #[serde(rename = "caseStage")]
    pub case_stage: Option<String>,
    #[serde(rename = "dateOpened")]
    pub date_opened: Option<DateTime<Utc>>,
    pub office: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "statuteOfLimitations")]
    pub statute_of_limitations: Option<DateTime<Utc>>,
    #[serde(rename = "conflictCheck")]
    pub conflict_check: Option<bool>,
    #[serde(rename = "conflictCheckNotes")]
    pub conflict_check_notes: Option<String>,
    pub clients: Option<Vec<String>>,
    pub contacts: Option<Vec<String>>,
    pub staff: Option<Vec<String>>,
    #[serde(rename = "customFields")]
    pub custom_fields: Option<HashMap<String, String>>,
    pub status: Option<CaseStatus>,
}

/// Short case reference used when populating invoices and activity rows.
#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub id: String,
    #[serde(rename = "caseName")]
    pub case_name: String,
    #[serde(rename = "caseNumber", skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
}

impl From<&CaseRecord> for CaseSummary {
    fn from(c: &CaseRecord) -> Self {
        Self {
            id: c.id.clone(),
            case_name: c.case_name.clone(),
            case_number: c.case_number.clone(),
        }
    }
}

/// Case response with populated lawyer and client summaries.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResponse {
    pub id: String,
    #[serde(rename = "caseName")]
    pub case_name: String,
    #[serde(rename = "caseNumber", skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
    #[serde(rename = "caseStage")]
    pub case_stage: String,
    #[serde(rename = "dateOpened")]
    pub date_opened: DateTime<Utc>,
    pub office: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "statuteOfLimitations", skip_serializing_if = "Option::is_none")]
    pub statute_of_limitations: Option<DateTime<Utc>>,
    #[serde(rename = "conflictCheck")]
    pub conflict_check: bool,
    #[serde(rename = "conflictCheckNotes", skip_serializing_if = "Option::is_none")]
    pub conflict_check_notes: Option<String>,
    pub lawyer: Option<UserSummary>,
    pub clients: Vec<ClientSummary>,
    pub contacts: Vec<String>,
    pub staff: Vec<String>,
    #[serde(rename = "customFields", skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<HashMap<String, String>>,
    pub status: CaseStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl CaseResponse {
    pub fn from_parts(
        case: CaseRecord,
        lawyer: Option<UserSummary>,
        clients: Vec<ClientSummary>,
    ) -> Self {
        Self {
            id: case.id,
            case_name: case.case_name,
            case_number: case.case_number,
            practice_area: case.practice_area,
            case_stage: case.case_stage,
            date_opened: case.date_opened,
            office: case.office,
            description: case.description,
            statute_of_limitations: case.statute_of_limitations,
            conflict_check: case.conflict_check,
            conflict_check_notes: case.conflict_check_notes,
            lawyer,
            clients,
            contacts: case.contacts,
            staff: case.staff,
            custom_fields: case.custom_fields,
            status: case.status,
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn persisted_field_names_are_compatible() {
        let now = Utc::now();
        let case = CaseRecord::new(
            "lawyer-1".to_string(),
            CreateCaseRequest {
                case_name: "Smith v. Jones".to_string(),
                case_number: Some("2026-0042".to_string()),
                practice_area: "Litigation".to_string(),
                case_stage: "Discovery".to_string(),
                date_opened: now,
                office: "Downtown".to_string(),
                description: None,
                statute_of_limitations: None,
                conflict_check: None,
                conflict_check_notes: None,
                clients: Some(vec!["client-1".to_string()]),
                contacts: None,
                staff: None,
                custom_fields: None,
            },
            now,
        );

        let doc = bson::to_document(&case).expect("serialize");
        for field in [
            "_id",
            "caseName",
            "caseNumber",
            "practiceArea",
            "caseStage",
            "dateOpened",
            "office",
            "lawyer",
            "clients",
            "status",
            "createdAt",
            "updatedAt",
        ] {
            assert!(doc.contains_key(field), "missing field {}", field);
        }
        assert_eq!(doc.get_str("status").unwrap(), "active");
    }
}

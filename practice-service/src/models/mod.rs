//! Persisted documents and API request/response types.

mod case;
mod client;
mod event;
mod invoice;
mod task;
mod user;

pub use case::{
    CaseRecord, CaseResponse, CaseStatus, CaseSummary, CreateCaseRequest, UpdateCaseRequest,
};
pub use client::{
    ClientAccount, ClientResponse, ClientSummary, CreateClientRequest, UpdateClientProfile,
};
pub use event::{CreateEventRequest, Event, EventResponse, UpdateEventRequest};
pub use invoice::{
    CreateInvoiceRequest, ExpenseLine, Invoice, InvoicePatch, InvoiceResponse, InvoiceStatus,
    RecentActivityEntry,
};
pub use task::{CreateTaskRequest, Task, TaskPriority, TaskResponse, TaskStatus, UpdateTaskRequest};
pub use user::{
    AuthResponse, LoginRequest, RegisterRequest, User, UserResponse, UserSummary,
};

/// Bson serde helper for optional datetimes; the driver's chrono helper only
/// covers the non-optional case.
pub(crate) mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::DateTime as BsonDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(val: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        val.map(BsonDateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<BsonDateTime>::deserialize(deserializer)?;
        Ok(opt.map(BsonDateTime::to_chrono))
    }
}

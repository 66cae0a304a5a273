use crate::models::{CaseRecord, ClientAccount, Event, Invoice, Task, User};
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for practice-service");

        // Unique lawyer and client emails
        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users().create_index(email_unique.clone(), None).await?;
        self.clients().create_index(email_unique, None).await?;

        // Case numbers are unique when present
        let case_number_unique = IndexModel::builder()
            .keys(doc! { "caseNumber": 1 })
            .options(
                IndexOptions::builder()
                    .name("case_number_unique".to_string())
                    .unique(true)
                    .sparse(true)
                    .build(),
            )
            .build();
        self.cases().create_index(case_number_unique, None).await?;

        // Owner and membership lookups drive every scoped case query
        let case_lawyer = IndexModel::builder()
            .keys(doc! { "lawyer": 1 })
            .options(
                IndexOptions::builder()
                    .name("case_lawyer_lookup".to_string())
                    .build(),
            )
            .build();
        self.cases().create_index(case_lawyer, None).await?;

        let case_clients = IndexModel::builder()
            .keys(doc! { "clients": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("case_client_lookup".to_string())
                    .build(),
            )
            .build();
        self.cases().create_index(case_clients, None).await?;

        // Issuer scoping plus newest-first listing for invoices
        let invoice_user = IndexModel::builder()
            .keys(doc! { "user": 1, "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("invoice_issuer_lookup".to_string())
                    .build(),
            )
            .build();
        self.invoices().create_index(invoice_user, None).await?;

        let invoice_case = IndexModel::builder()
            .keys(doc! { "case": 1 })
            .options(
                IndexOptions::builder()
                    .name("invoice_case_lookup".to_string())
                    .build(),
            )
            .build();
        self.invoices().create_index(invoice_case, None).await?;

        tracing::info!("MongoDB indexes ready");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn clients(&self) -> Collection<ClientAccount> {
        self.db.collection("clients")
    }

    pub fn cases(&self) -> Collection<CaseRecord> {
        self.db.collection("cases")
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    pub fn events(&self) -> Collection<Event> {
        self.db.collection("events")
    }

    pub fn tasks(&self) -> Collection<Task> {
        self.db.collection("tasks")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

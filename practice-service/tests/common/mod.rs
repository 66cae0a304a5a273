#![allow(dead_code)]

use practice_service::config::PracticeConfig;
use practice_service::services::MongoDb;
use practice_service::startup::Application;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");

        let db_name = format!("practice_test_{}", Uuid::new_v4().simple());

        let mut config = PracticeConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    /// Register a lawyer account and return (token, user_id).
    pub async fn register_lawyer(&self, client: &Client) -> (String, String) {
        let email = format!("lawyer-{}@example.com", Uuid::new_v4().simple());
        let response = client
            .post(format!("{}/auth/register", self.address))
            .json(&json!({
                "firstName": "Ada",
                "lastName": "Counsel",
                "email": email,
                "password": "a-strong-password",
                "firmName": "Counsel & Co",
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "register should succeed");

        let body: Value = response.json().await.expect("Failed to parse JSON");
        (
            body["token"].as_str().expect("token").to_string(),
            body["user"]["id"].as_str().expect("user id").to_string(),
        )
    }

    /// Create a case owned by the token's lawyer; returns the case id.
    pub async fn create_case(&self, client: &Client, token: &str, clients: &[&str]) -> String {
        let response = client
            .post(format!("{}/cases", self.address))
            .bearer_auth(token)
            .json(&json!({
                "caseName": "Smith v. Jones",
                "practiceArea": "Litigation",
                "caseStage": "Discovery",
                "dateOpened": "2026-01-15T00:00:00Z",
                "office": "Downtown",
                "clients": clients,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "case creation should succeed");

        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_str().expect("case id").to_string()
    }

    /// Create an invoice from raw expense lines; returns the response body.
    pub async fn create_invoice(
        &self,
        client: &Client,
        token: &str,
        case_id: &str,
        expenses: Value,
    ) -> Value {
        let response = client
            .post(format!("{}/invoices", self.address))
            .bearer_auth(token)
            .json(&json!({
                "case": case_id,
                "date": "2026-02-01T00:00:00Z",
                "expenses": expenses,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "invoice creation should succeed");

        response.json().await.expect("Failed to parse JSON")
    }

    /// Provision a client account via the lawyer API and log it in;
    /// returns (token, client_id).
    pub async fn register_and_login_client(
        &self,
        client: &Client,
        lawyer_token: &str,
    ) -> (String, String) {
        let email = format!("client-{}@example.com", Uuid::new_v4().simple());
        let response = client
            .post(format!("{}/clients", self.address))
            .bearer_auth(lawyer_token)
            .json(&json!({
                "company": "Acme Holdings",
                "contactPerson": "Pat Smith",
                "email": email,
                "password": "a-strong-password",
                "accountType": "Business",
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "client creation should succeed");

        let created: Value = response.json().await.expect("Failed to parse JSON");
        let client_id = created["id"].as_str().expect("client id").to_string();

        let response = client
            .post(format!("{}/auth/client/login", self.address))
            .json(&json!({ "email": email, "password": "a-strong-password" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200, "client login should succeed");

        let body: Value = response.json().await.expect("Failed to parse JSON");
        (
            body["token"].as_str().expect("token").to_string(),
            client_id,
        )
    }

    /// Drop the per-test database.
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}

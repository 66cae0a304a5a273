mod common;

use common::TestApp;
use reqwest::Client;
use serde_json::{json, Value};

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn lawyers_only_see_their_own_cases_and_invoices() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let (token_a, _user_a) = app.register_lawyer(&client).await;
    let (token_b, _user_b) = app.register_lawyer(&client).await;

    let case_id = app.create_case(&client, &token_a, &[]).await;
    app.create_invoice(
        &client,
        &token_a,
        &case_id,
        json!([{ "description": "Work", "cost": "100.00", "quantity": 1, "billable": true }]),
    )
    .await;

    let cases_b: Vec<Value> = client
        .get(format!("{}/cases", app.address))
        .bearer_auth(&token_b)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert!(cases_b.is_empty());

    let invoices_b: Vec<Value> = client
        .get(format!("{}/invoices", app.address))
        .bearer_auth(&token_b)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert!(invoices_b.is_empty());

    // Direct fetch across the scope boundary reads as absence, not as 403.
    let invoices_a: Vec<Value> = client
        .get(format!("{}/invoices", app.address))
        .bearer_auth(&token_a)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let invoice_id = invoices_a[0]["id"].as_str().expect("invoice id");

    let cross = client
        .get(format!("{}/invoices/{}", app.address, invoice_id))
        .bearer_auth(&token_b)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(cross.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn clients_have_no_invoice_access_at_all() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let (lawyer_token, _user_id) = app.register_lawyer(&client).await;
    let (client_token, _client_id) = app.register_and_login_client(&client, &lawyer_token).await;

    for path in ["/invoices", "/invoices/stats", "/invoices/recent-activity"] {
        let response = client
            .get(format!("{}{}", app.address, path))
            .bearer_auth(&client_token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 403, "{} should be forbidden", path);
    }

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn client_case_view_excludes_closed_cases() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let (lawyer_token, _user_id) = app.register_lawyer(&client).await;
    let (client_token, client_id) = app.register_and_login_client(&client, &lawyer_token).await;

    let open_case = app
        .create_case(&client, &lawyer_token, &[client_id.as_str()])
        .await;
    let closed_case = app
        .create_case(&client, &lawyer_token, &[client_id.as_str()])
        .await;
    let unrelated_case = app.create_case(&client, &lawyer_token, &[]).await;

    let response = client
        .put(format!("{}/cases/{}", app.address, closed_case))
        .bearer_auth(&lawyer_token)
        .json(&json!({ "status": "closed" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let visible: Vec<Value> = client
        .get(format!("{}/client/cases", app.address))
        .bearer_auth(&client_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let ids: Vec<&str> = visible.iter().filter_map(|c| c["id"].as_str()).collect();
    assert!(ids.contains(&open_case.as_str()));
    assert!(!ids.contains(&closed_case.as_str()));
    assert!(!ids.contains(&unrelated_case.as_str()));

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn clients_cannot_mutate_cases() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let (lawyer_token, _user_id) = app.register_lawyer(&client).await;
    let (client_token, client_id) = app.register_and_login_client(&client, &lawyer_token).await;
    let case_id = app
        .create_case(&client, &lawyer_token, &[client_id.as_str()])
        .await;

    let update = client
        .put(format!("{}/cases/{}", app.address, case_id))
        .bearer_auth(&client_token)
        .json(&json!({ "caseName": "Hijacked" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(update.status(), 403);

    let delete = client
        .delete(format!("{}/cases/{}", app.address, case_id))
        .bearer_auth(&client_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(delete.status(), 403);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn client_profile_self_service_round_trip() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let (lawyer_token, _user_id) = app.register_lawyer(&client).await;
    let (client_token, _client_id) = app.register_and_login_client(&client, &lawyer_token).await;

    let response = client
        .put(format!("{}/client/profile", app.address))
        .bearer_auth(&client_token)
        .json(&json!({ "contactPerson": "Sam Smith" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let profile: Value = client
        .get(format!("{}/client/profile", app.address))
        .bearer_auth(&client_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(profile["contactPerson"], "Sam Smith");
    assert!(profile.get("password").is_none());

    // Lawyers have no client profile to serve.
    let response = client
        .get(format!("{}/client/profile", app.address))
        .bearer_auth(&lawyer_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 403);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn profile_patch_rejects_malformed_emails() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let (lawyer_token, _user_id) = app.register_lawyer(&client).await;
    let (client_token, _client_id) = app.register_and_login_client(&client, &lawyer_token).await;

    let response = client
        .put(format!("{}/client/profile", app.address))
        .bearer_auth(&client_token)
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 422);

    // The stored email is untouched by the rejected patch.
    let profile: Value = client
        .get(format!("{}/client/profile", app.address))
        .bearer_auth(&client_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_ne!(profile["email"], "not-an-email");

    app.cleanup().await;
}

mod common;

use common::TestApp;
use reqwest::Client;
use serde_json::{json, Value};

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn duplicate_case_numbers_conflict() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let (token, _user_id) = app.register_lawyer(&client).await;

    let payload = json!({
        "caseName": "Smith v. Jones",
        "caseNumber": "2026-0042",
        "practiceArea": "Litigation",
        "caseStage": "Discovery",
        "dateOpened": "2026-01-15T00:00:00Z",
        "office": "Downtown",
    });

    let first = client
        .post(format!("{}/cases", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/cases", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status(), 409);

    let body: Value = second.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Case number must be unique");

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn case_update_only_touches_allow_listed_fields() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let (token, user_id) = app.register_lawyer(&client).await;
    let case_id = app.create_case(&client, &token, &[]).await;

    // `lawyer` is not in the patch allow-list; it must survive unchanged.
    let response = client
        .put(format!("{}/cases/{}", app.address, case_id))
        .bearer_auth(&token)
        .json(&json!({
            "caseStage": "Trial",
            "lawyer": "someone-else",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let updated: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(updated["caseStage"], "Trial");
    assert_eq!(updated["lawyer"]["id"], user_id);
    assert_eq!(updated["caseName"], "Smith v. Jones");

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn deleted_cases_stop_resolving() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let (token, _user_id) = app.register_lawyer(&client).await;
    let case_id = app.create_case(&client, &token, &[]).await;

    let delete = client
        .delete(format!("{}/cases/{}", app.address, case_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(delete.status(), 200);

    let get = client
        .get(format!("{}/cases/{}", app.address, case_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(get.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn task_progress_is_bounded() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let (token, user_id) = app.register_lawyer(&client).await;
    let case_id = app.create_case(&client, &token, &[]).await;

    let out_of_range = client
        .post(format!("{}/tasks", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "title": "File motion",
            "description": "Draft and file",
            "priority": "High",
            "progress": 150,
            "dueDate": "2026-03-01T00:00:00Z",
            "case": case_id,
            "assignedTo": user_id,
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(out_of_range.status(), 400);

    let valid = client
        .post(format!("{}/tasks", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "title": "File motion",
            "description": "Draft and file",
            "priority": "High",
            "dueDate": "2026-03-01T00:00:00Z",
            "case": case_id,
            "assignedTo": user_id,
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(valid.status(), 201);

    let task: Value = valid.json().await.expect("Failed to parse JSON");
    assert_eq!(task["status"], "Not Started");
    assert_eq!(task["progress"], 0);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn events_are_scoped_to_their_creator() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let (token_a, _user_a) = app.register_lawyer(&client).await;
    let (token_b, _user_b) = app.register_lawyer(&client).await;

    let created = client
        .post(format!("{}/events", app.address))
        .bearer_auth(&token_a)
        .json(&json!({
            "title": "Deposition",
            "type": "meeting",
            "date": "2026-03-05T00:00:00Z",
            "startTime": "09:00",
            "endTime": "11:00",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(created.status(), 201);

    let events_b: Vec<Value> = client
        .get(format!("{}/events", app.address))
        .bearer_auth(&token_b)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert!(events_b.is_empty());

    let events_a: Vec<Value> = client
        .get(format!("{}/events", app.address))
        .bearer_auth(&token_a)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(events_a.len(), 1);
    assert_eq!(events_a[0]["title"], "Deposition");

    app.cleanup().await;
}

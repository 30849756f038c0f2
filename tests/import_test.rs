mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use common::{Factory, TestApp};

fn file(name: &str, mime: &str, body: &str) -> Part {
    Part::bytes(body.as_bytes().to_vec())
        .file_name(name)
        .mime_type(mime)
}

fn ping_collection() -> String {
    json!({
        "info": {"name": "Demo", "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"},
        "item": [{
            "name": "Ping",
            "request": {
                "method": "GET",
                "url": {"raw": "https://x/y"},
                "header": [{"key": "Authorization", "value": "Bearer t"}]
            }
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_preview_postman_collection() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_part(
        "files",
        file("demo.postman_collection.json", "application/json", &ping_collection()),
    );
    let response = app.server.post("/import/preview").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let result = &body["files"][0];
    assert_eq!(result["fileName"], "demo.postman_collection.json");
    assert_eq!(result["format"], "postman");
    assert!(result["error"].is_null());

    let draft = &result["drafts"][0];
    assert_eq!(draft["name"], "Ping");
    assert_eq!(draft["endpoint"], "https://x/y");
    assert_eq!(draft["method"], "GET");
    assert_eq!(draft["headers"], json!([{"key": "Authorization", "value": "Bearer t"}]));
    assert!(draft["exampleIntegration"]
        .as_str()
        .unwrap()
        .starts_with("curl -X GET https://x/y"));

    // preview stores nothing
    let list: Value = app.server.get("/apis").await.json();
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_preview_csv() {
    let app = TestApp::new();
    let csv = "name,endpoint,method,description,category\n\
               List users,/users,GET,All users,Users\n\
               Create user,/users,POST,,Users\n";

    let form = MultipartForm::new().add_part("files", file("apis.csv", "text/csv", csv));
    let body: Value = app
        .server
        .post("/import/preview")
        .multipart(form)
        .await
        .json();

    let drafts = body["files"][0]["drafts"].as_array().unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0]["name"], "List users");
    assert_eq!(drafts[0]["description"], "All users");
    assert_eq!(drafts[1]["method"], "POST");
    assert!(drafts[1]["description"].is_null());
    assert_eq!(drafts[1]["category"], "Users");
}

#[tokio::test]
async fn test_preview_isolates_bad_files() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_part("files", file("broken.json", "application/json", "{ not json"))
        .add_part("files", file("apis.csv", "text/csv", "name,endpoint\nA,/a\n"))
        .add_part("files", file("notes.txt", "text/plain", "hello"));
    let response = app.server.post("/import/preview").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);

    assert!(files[0]["error"].as_str().unwrap().contains("broken.json"));
    assert!(files[0]["drafts"].as_array().unwrap().is_empty());

    assert!(files[1]["error"].is_null());
    assert_eq!(files[1]["drafts"].as_array().unwrap().len(), 1);

    assert!(files[2]["format"].is_null());
    assert!(files[2]["error"].is_string());
}

#[tokio::test]
async fn test_preview_requires_a_file() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_text("note", "no files here");
    let response = app.server.post("/import/preview").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("files"));
}

#[tokio::test]
async fn test_commit_drafts() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let users = factory.create_category("Users").await;

    let response = app
        .server
        .post("/import/commit")
        .json(&json!({
            "drafts": [
                {"name": "List users", "endpoint": "/users", "method": "GET", "category": "users"},
                {"name": "Charge", "endpoint": "/charges", "method": "POST", "category": "Payments",
                 "requestBody": "{\"amount\": 10}"},
                {"name": "Broken", "endpoint": "/broken", "responseExample": "{"},
                {"rawText": "GET /orders returns every order"}
            ]
        }))
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["created"].as_array().unwrap().len(), 2);
    let failures = report["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["index"], 2);
    assert_eq!(failures[1]["index"], 3);

    let list_users: Value = app
        .server
        .get("/apis")
        .add_query_param("categoryId", users.id)
        .await
        .json();
    assert_eq!(list_users["total"], 1);

    let categories: Value = app.server.get("/categories").await.json();
    assert_eq!(categories["total"], 2);

    let charge_id = report["created"][1].as_str().unwrap();
    let charge: Value = app.server.get(&format!("/apis/{charge_id}")).await.json();
    assert_eq!(charge["exampleRequestBody"], "{\"amount\": 10}");
    assert_eq!(charge["effectiveRequestBody"], json!({"amount": 10}));
}

#[tokio::test]
async fn test_preview_then_commit() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_part(
        "files",
        file("demo.json", "application/json", &ping_collection()),
    );
    let preview: Value = app
        .server
        .post("/import/preview")
        .multipart(form)
        .await
        .json();

    let drafts = preview["files"][0]["drafts"].clone();
    let report: Value = app
        .server
        .post("/import/commit")
        .json(&json!({ "drafts": drafts }))
        .await
        .json();
    assert_eq!(report["created"].as_array().unwrap().len(), 1);

    let id = report["created"][0].as_str().unwrap();
    let api: Value = app.server.get(&format!("/apis/{id}")).await.json();
    assert_eq!(api["name"], "Ping");
    assert_eq!(api["headers"][0]["name"], "Authorization");
    assert_eq!(api["headers"][0]["example"], "Bearer t");
}

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use api_catalog::models::{FieldDescriptor, FieldList, FieldType, SchemaDefinition, StatusDescriptor};
use common::{Factory, TestApp};

fn paged_list() -> SchemaDefinition {
    SchemaDefinition {
        name: "Paged list".to_string(),
        description: "Standard paginated response".to_string(),
        query_params: FieldList::new()
            .push(FieldDescriptor::new("page", FieldType::Number, "1-based page")),
        response_body: FieldList::new()
            .push(FieldDescriptor::new("data", FieldType::Array, "Items"))
            .push(FieldDescriptor::new("total", FieldType::Number, "Item count")),
        response_codes: vec![StatusDescriptor {
            code: 200,
            description: "OK".to_string(),
        }],
        example_response_body: Some("{\"data\": [], \"total\": 0}".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_schema() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/schemas")
        .json(&json!({
            "name": "Error envelope",
            "responseBody": [{"name": "error", "type": "string", "description": "Message"}],
            "responseCodes": [{"code": 400, "description": "Bad request"}]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["name"], "Error envelope");
    assert_eq!(body["responseBody"][0]["type"], "string");
    assert_eq!(body["responseCodes"][0]["code"], 400);
}

#[tokio::test]
async fn test_create_schema_validation() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/schemas")
        .json(&json!({ "name": "Bad", "responseCodes": [{"code": 42}] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/schemas")
        .json(&json!({ "name": "Bad", "exampleRequestBody": "{" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("exampleRequestBody"));

    let list: Value = app.server.get("/schemas").await.json();
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_update_and_delete_schema() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let template = factory.create_schema(paged_list()).await;

    let response = app
        .server
        .put(&format!("/schemas/{}", template.id))
        .json(&json!({ "name": "Cursor list", "description": "Cursor based" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Cursor list");
    assert_eq!(body["responseBody"], json!([]));

    app.server
        .delete(&format!("/schemas/{}", template.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/schemas/{}", template.id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_apply_schema_copies_shape() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let template = factory.create_schema(paged_list()).await;

    let response = app
        .server
        .post(&format!("/schemas/{}/apply", template.id))
        .json(&json!({
            "name": "List users",
            "endpoint": "/users",
            "method": "GET",
            "description": "All users"
        }))
        .await;

    response.assert_status_ok();
    let applied: Value = response.json();
    assert_eq!(applied["name"], "List users");
    assert_eq!(applied["description"], "All users");
    assert_eq!(applied["queryParams"][0]["name"], "page");
    assert_eq!(applied["responseBody"].as_array().unwrap().len(), 2);
    assert_eq!(applied["statusCodes"][0]["code"], 200);
    assert_eq!(applied["exampleResponseBody"], "{\"data\": [], \"total\": 0}");

    // nothing stored
    let list: Value = app.server.get("/apis").await.json();
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_apply_is_a_snapshot() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let template = factory.create_schema(paged_list()).await;

    let applied: Value = app
        .server
        .post(&format!("/schemas/{}/apply", template.id))
        .json(&json!({ "name": "List users", "endpoint": "/users" }))
        .await
        .json();

    let created: Value = app.server.post("/apis").json(&applied).await.json();
    let id = created["id"].as_str().unwrap().to_string();

    app.server
        .put(&format!("/schemas/{}", template.id))
        .json(&json!({ "name": "Paged list", "queryParams": [] }))
        .await
        .assert_status_ok();

    let fetched: Value = app.server.get(&format!("/apis/{id}")).await.json();
    assert_eq!(fetched["queryParams"][0]["name"], "page");
}

#[tokio::test]
async fn test_apply_missing_schema() {
    let app = TestApp::new();

    app.server
        .post(&format!("/schemas/{}/apply", uuid::Uuid::new_v4()))
        .json(&json!({ "name": "A", "endpoint": "/a" }))
        .await
        .assert_status_not_found();
}

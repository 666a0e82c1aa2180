use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;
use registry::Registry;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let registry = Registry::builder().database(db).build().await.unwrap();
    server::router(registry)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

fn client(id: i64, username: &str) -> Value {
    json!({ "clientId": id, "username": username })
}

fn batch(ids: std::ops::RangeInclusive<i64>) -> Value {
    Value::Array(
        ids.map(|id| client(id, &format!("user-{id}")))
            .collect(),
    )
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let app = app().await;

    let res = send(&app, "POST", "/api/clients", Some(client(1, "alice"))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "/api/clients/1"
    );
    let created = json_body(res).await;
    assert_eq!(created["clientId"], 1);
    assert_eq!(created["username"], "alice");
    let system_id = created["systemId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(system_id).is_ok());

    let res = send(&app, "GET", "/api/clients/1", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, created);
}

#[tokio::test]
async fn duplicate_create_is_conflict() {
    let app = app().await;

    let res = send(&app, "POST", "/api/clients", Some(client(1, "alice"))).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = send(&app, "POST", "/api/clients", Some(client(1, "bob"))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = json_body(res).await;
    assert_eq!(body["error"], "client \"1\" already exists");
}

#[tokio::test]
async fn get_missing_client_is_not_found() {
    let app = app().await;

    let res = send(&app, "GET", "/api/clients/404", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_every_client() {
    let app = app().await;

    let res = send(&app, "GET", "/api/clients", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([]));

    for (id, name) in [(2, "bob"), (1, "alice")] {
        send(&app, "POST", "/api/clients", Some(client(id, name))).await;
    }

    let res = send(&app, "GET", "/api/clients", None).await;
    let body = json_body(res).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[tokio::test]
async fn update_changes_username() {
    let app = app().await;
    let res = send(&app, "POST", "/api/clients", Some(client(3, "carol"))).await;
    let created = json_body(res).await;

    let res = send(&app, "PUT", "/api/clients/3", Some(client(3, "caroline"))).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = send(&app, "GET", "/api/clients/3", None).await;
    let body = json_body(res).await;
    assert_eq!(body["username"], "caroline");
    assert_eq!(body["systemId"], created["systemId"]);
}

#[tokio::test]
async fn update_missing_client_is_not_found() {
    let app = app().await;

    let res = send(&app, "PUT", "/api/clients/9", Some(client(9, "ghost"))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_mismatched_id_is_bad_request() {
    let app = app().await;
    send(&app, "POST", "/api/clients", Some(client(1, "alice"))).await;

    let res = send(&app, "PUT", "/api/clients/1", Some(client(2, "alice"))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert_eq!(body["error"], "route id doesn't match request clientId");
}

#[tokio::test]
async fn delete_removes_client() {
    let app = app().await;
    send(&app, "POST", "/api/clients", Some(client(5, "eve"))).await;

    let res = send(&app, "DELETE", "/api/clients/5", None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = send(&app, "GET", "/api/clients/5", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_client_is_not_found() {
    let app = app().await;

    let res = send(&app, "DELETE", "/api/clients/5", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_below_minimum_is_rejected() {
    let app = app().await;

    let res = send(&app, "POST", "/api/clients/batch", Some(batch(1..=9))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert_eq!(body["error"], "at least 10 clients required");

    let res = send(&app, "GET", "/api/clients", None).await;
    assert_eq!(json_body(res).await, json!([]));
}

#[tokio::test]
async fn batch_reports_skipped_clients() {
    let app = app().await;
    send(&app, "POST", "/api/clients", Some(client(4, "existing"))).await;

    let res = send(&app, "POST", "/api/clients/batch", Some(batch(1..=10))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([client(4, "user-4")]));

    let res = send(&app, "GET", "/api/clients", None).await;
    assert_eq!(json_body(res).await.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn batch_with_free_ids_stores_everything() {
    let app = app().await;

    let res = send(&app, "POST", "/api/clients/batch", Some(batch(1..=12))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([]));

    let res = send(&app, "GET", "/api/clients/12", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_fields_are_bad_request() {
    let app = app().await;

    let res = send(&app, "POST", "/api/clients", Some(client(0, "alice"))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = send(&app, "POST", "/api/clients", Some(client(1, ""))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let long_name = "a".repeat(101);
    let res = send(&app, "POST", "/api/clients", Some(client(1, &long_name))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = send(&app, "GET", "/api/clients", None).await;
    assert_eq!(json_body(res).await, json!([]));
}

#[tokio::test]
async fn malformed_requests_are_bad_request() {
    let app = app().await;

    let res = send(&app, "POST", "/api/clients", Some(json!({ "username": "x" }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["error"].is_string());

    let res = send(&app, "GET", "/api/clients/abc", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["error"].is_string());
}

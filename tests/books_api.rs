use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookstore_app::modules::{self, books::repository::InMemoryBookRepository};
use bookstore_kernel::ModuleRegistry;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(InMemoryBookRepository::new()));
    bookstore_http::build_router(&registry)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn list(app: &Router) -> Vec<Value> {
    let (status, body) = send(app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap()
}

async fn create(app: &Router, title: &str, author: &str, year: i32) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(json!({ "title": title, "author": author, "publishedYear": year })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn list_starts_empty() {
    let app = app();
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn dune_round_trip_through_the_api() {
    let app = app();

    let created = create(&app, "Dune", "Frank Herbert", 1965).await;
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert_eq!(created["title"], "Dune");
    assert_eq!(created["author"], "Frank Herbert");
    assert_eq!(created["publishedYear"], 1965);
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());
    assert_eq!(list(&app).await, vec![created.clone()]);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({ "title": "Dune (rev)", "author": "Frank Herbert", "publishedYear": 1965 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["_id"], id.as_str());
    assert_eq!(updated["title"], "Dune (rev)");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(list(&app).await[0]["title"], "Dune (rev)");

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");
    assert!(list(&app).await.iter().all(|book| book["_id"] != id.as_str()));
}

#[tokio::test]
async fn create_with_missing_field_persists_nothing() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "Dune", "publishedYear": 1965 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"], json!([{ "field": "author", "error": "required" }]));
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn create_accepts_numeric_year_string() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "Emma", "author": "Jane Austen", "publishedYear": "1815" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["publishedYear"], 1815);
}

#[tokio::test]
async fn create_casts_numeric_title_to_text() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": 1984, "author": "George Orwell", "publishedYear": 1949 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "1984");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let request = Request::post("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn update_touches_only_the_target() {
    let app = app();
    let target = create(&app, "1984", "George Orwell", 1949).await;
    let other = create(&app, "Emma", "Jane Austen", 1815).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", target["_id"].as_str().unwrap()),
        Some(json!({ "title": "Animal Farm", "author": "George Orwell", "publishedYear": 1945 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let books = list(&app).await;
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["title"], "Animal Farm");
    assert_eq!(books[0]["publishedYear"], 1945);
    assert_eq!(books[1], other);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found_and_creates_nothing() {
    let app = app();
    let body = json!({ "title": "Dune", "author": "Frank Herbert", "publishedYear": 1965 });

    for id in ["65f1c0ffee0000000000abcd", "not-an-object-id"] {
        let (status, response) =
            send(&app, Method::PUT, &format!("/books/{id}"), Some(body.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(response["error"]["code"], "not_found");
    }

    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn update_with_missing_field_is_rejected() {
    let app = app();
    let book = create(&app, "Dune", "Frank Herbert", 1965).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", book["_id"].as_str().unwrap()),
        Some(json!({ "title": "Dune (rev)" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(list(&app).await[0]["title"], "Dune");
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = app();
    let book = create(&app, "Dune", "Frank Herbert", 1965).await;
    let uri = format!("/books/{}", book["_id"].as_str().unwrap());

    let (first, _) = send(&app, Method::DELETE, &uri, None).await;
    let (second, body) = send(&app, Method::DELETE, &uri, None).await;
    let (garbage, _) = send(&app, Method::DELETE, "/books/not-an-object-id", None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(garbage, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");
}

#[tokio::test]
async fn list_size_tracks_creates_minus_deletes() {
    let app = app();
    let mut ids = Vec::new();

    for (i, title) in ["A", "B", "C", "D"].into_iter().enumerate() {
        let book = create(&app, title, "Anon", 1900 + i as i32).await;
        ids.push(book["_id"].as_str().unwrap().to_string());
    }
    for id in &ids[..2] {
        send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    }
    create(&app, "E", "Anon", 2000).await;

    assert_eq!(list(&app).await.len(), 4 - 2 + 1);
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let app = app();
    let request = Request::get("/books")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn openapi_document_describes_books() {
    let app = app();

    let (status, spec) = send(&app, Method::GET, "/docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/books"]["post"].is_object());
    assert!(spec["paths"]["/books/{id}"]["delete"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn health_check_answers_ok() {
    let response = app()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use inkwell::application::clock::ManualClock;
use inkwell::application::posts::PostService;
use inkwell::domain::types::FeaturedMode;
use inkwell::infra::http::{ApiState, REQUEST_ID_HEADER, build_router};
use inkwell_api_types::{PostCreatedResponse, PostResponse};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(mode: FeaturedMode) -> Router {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000_000_000, 1_000));
    let posts = Arc::new(PostService::new(mode, clock));
    build_router(ApiState::new(posts))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    (status, bytes.to_vec())
}

async fn create(app: &Router, title: &str) -> u64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/posts",
        Some(json!({ "title": title, "content": format!("{title} body"), "author": "ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: PostCreatedResponse = serde_json::from_slice(&body).expect("created body");
    created.id
}

async fn list(app: &Router, uri: &str) -> Vec<PostResponse> {
    let (status, body) = send(app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).expect("post list")
}

fn ids(posts: &[PostResponse]) -> Vec<u64> {
    posts.iter().map(|post| post.id).collect()
}

fn error_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("error envelope")
}

#[tokio::test]
async fn health_returns_no_content_with_request_id() {
    let app = app(FeaturedMode::Starred);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request should build");

    let response = app.oneshot(request).await.expect("router should respond");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn create_list_delete_edit_scenario() {
    let app = app(FeaturedMode::Single);

    assert_eq!(create(&app, "A").await, 1);
    assert_eq!(create(&app, "B").await, 2);
    assert_eq!(ids(&list(&app, "/api/v1/posts").await), vec![2, 1]);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/posts/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(ids(&list(&app, "/api/v1/posts").await), vec![2]);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/posts/1",
        Some(json!({ "title": "A'", "content": "", "author": "ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = error_body(&body);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "post not found");
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let app = app(FeaturedMode::Starred);

    let first = create(&app, "A").await;
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/posts/{first}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(create(&app, "B").await, first + 1);
}

#[tokio::test]
async fn edit_replaces_content_and_keeps_timestamp() {
    let app = app(FeaturedMode::Single);
    let id = create(&app, "Draft").await;

    let (_, before) = send(&app, Method::GET, &format!("/api/v1/posts/{id}"), None).await;
    let before: PostResponse = serde_json::from_slice(&before).expect("post");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/posts/{id}"),
        Some(json!({ "title": "Final", "content": "done", "author": "grace" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, after) = send(&app, Method::GET, &format!("/api/v1/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let after: PostResponse = serde_json::from_slice(&after).expect("post");
    assert_eq!(after.title, "Final");
    assert_eq!(after.content, "done");
    assert_eq!(after.author, "grace");
    assert_eq!(after.timestamp, before.timestamp);
    assert_eq!(after.starred, None);
}

#[tokio::test]
async fn single_mode_featured_flow() {
    let app = app(FeaturedMode::Single);
    let a = create(&app, "A").await;
    let b = create(&app, "B").await;

    assert!(list(&app, "/api/v1/posts/featured").await.is_empty());

    for id in [a, b] {
        let body = Some(json!({ "id": id }));
        let (status, _) = send(&app, Method::PUT, "/api/v1/featured", body).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    assert_eq!(ids(&list(&app, "/api/v1/posts/featured").await), vec![b]);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/featured", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(list(&app, "/api/v1/posts/featured").await.is_empty());

    let missing = Some(json!({ "id": 99 }));
    let (status, body) = send(&app, Method::PUT, "/api/v1/featured", missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_body(&body)["error"]["code"], "not_found");
}

#[tokio::test]
async fn single_mode_rejects_starring() {
    let app = app(FeaturedMode::Single);
    let id = create(&app, "A").await;

    let (status, body) = send(&app, Method::PUT, &format!("/api/v1/posts/{id}/star"), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_body(&body)["error"]["code"], "unsupported_operation");
}

#[tokio::test]
async fn starred_mode_star_and_unstar_scenario() {
    let app = app(FeaturedMode::Starred);
    create(&app, "A").await;
    let b = create(&app, "B").await;

    for _ in 0..2 {
        let (status, _) = send(&app, Method::PUT, &format!("/api/v1/posts/{b}/star"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let featured = list(&app, "/api/v1/posts/featured").await;
    assert_eq!(ids(&featured), vec![b]);
    assert_eq!(featured[0].starred, Some(true));

    let all = list(&app, "/api/v1/posts").await;
    assert_eq!(
        all.iter().map(|post| post.starred).collect::<Vec<_>>(),
        vec![Some(true), Some(false)]
    );

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/posts/{b}/star"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(list(&app, "/api/v1/posts/featured").await.is_empty());
}

#[tokio::test]
async fn starred_mode_rejects_set_featured() {
    let app = app(FeaturedMode::Starred);
    let id = create(&app, "A").await;

    let request = Some(json!({ "id": id }));
    let (status, body) = send(&app, Method::PUT, "/api/v1/featured", request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let body = error_body(&body);
    assert_eq!(body["error"]["code"], "unsupported_operation");
    assert!(
        body["error"]["hint"]
            .as_str()
            .is_some_and(|hint| hint.contains("setFeaturedPost"))
    );
}

#[tokio::test]
async fn deleting_a_starred_post_drops_it_from_featured() {
    let app = app(FeaturedMode::Starred);
    let id = create(&app, "A").await;
    send(&app, Method::PUT, &format!("/api/v1/posts/{id}/star"), None).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(list(&app, "/api/v1/posts/featured").await.is_empty());
    let (status, _) = send(&app, Method::PUT, &format!("/api/v1/posts/{id}/star"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_use_error_envelope() {
    let app = app(FeaturedMode::Starred);

    let (status, body) = send(&app, Method::GET, "/api/v1/posts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&body)["error"]["code"], "bad_request");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/posts",
        Some(json!({ "title": "missing fields" })),
    )
    .await;
    assert!(status.is_client_error());
    assert_eq!(error_body(&body)["error"]["code"], "bad_request");
}

#[tokio::test]
async fn empty_content_is_accepted() {
    let app = app(FeaturedMode::Starred);
    let id = create(&app, "").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let post: PostResponse = serde_json::from_slice(&body).expect("post");
    assert_eq!(post.title, "");
    assert_eq!(post.timestamp, 1_700_000_000_000_000_000);
}

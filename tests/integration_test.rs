//! End-to-end tests over the full router: submission (form + API),
//! success page, redirect resolution, and hit accounting.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use curtail::{cache::LinkCache, config::AppConfig, router, store::SqliteStore, AppState};

/// Build a router over a fresh temp-file database. The store handle is
/// returned alongside so tests can inspect hit accounting directly.
async fn setup() -> (axum::Router, Arc<SqliteStore>, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("temp db file");
    let database_url = format!("sqlite:{}", temp_db.path().display());
    let store = Arc::new(
        SqliteStore::connect(&database_url)
            .await
            .expect("store setup"),
    );

    let state = Arc::new(AppState {
        store: store.clone(),
        cache: LinkCache::new(),
        config: AppConfig {
            database_url,
            host: "127.0.0.1".into(),
            port: 0,
            base_url: "http://short.test".into(),
        },
    });

    let app = router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4242))));
    (app, store, temp_db)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("read body").to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn body_string(body: Body) -> String {
    let bytes = body.collect().await.expect("read body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

#[tokio::test]
async fn api_shorten_returns_short_and_long_url() {
    let (app, _store, _db) = setup().await;

    let response = app
        .oneshot(form_post(
            "/api/newLink",
            "long_url=http%3A%2F%2Fexample.com%2Fpage",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    // First identifier is 1, which encodes to "B".
    assert_eq!(body["short_url"], "http://short.test/B");
    assert_eq!(body["long_url"], "http://example.com/page");
}

#[tokio::test]
async fn duplicate_submission_reuses_the_same_short_url() {
    let (app, _store, _db) = setup().await;

    let first = app
        .clone()
        .oneshot(form_post(
            "/api/newLink",
            "long_url=http%3A%2F%2Fexample.com%2Fpage",
        ))
        .await
        .unwrap();
    let second = app
        .oneshot(form_post(
            "/api/newLink",
            "long_url=http%3A%2F%2Fexample.com%2Fpage",
        ))
        .await
        .unwrap();

    let first = body_json(first.into_body()).await;
    let second = body_json(second.into_body()).await;
    assert_eq!(first["short_url"], second["short_url"]);
}

#[tokio::test]
async fn form_submission_redirects_to_the_success_page() {
    let (app, _store, _db) = setup().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/newLink",
            "long_url=http%3A%2F%2Fexample.com%2Fpage",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/success?short=B"
    );

    let page = app.oneshot(get("/success?short=B")).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);

    let html = body_string(page.into_body()).await;
    assert!(html.contains("http://short.test/B"));
    assert!(html.contains("http://example.com/page"));
}

#[tokio::test]
async fn invalid_url_submission_is_rejected() {
    let (app, _store, _db) = setup().await;

    for body in ["long_url=notaurl", "long_url=", "long_url=ftp%3A%2F%2Fx%2Fy"] {
        let response = app
            .clone()
            .oneshot(form_post("/newLink", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body = {body}");
    }
}

#[tokio::test]
async fn resolving_redirects_and_records_a_hit() {
    let (app, store, _db) = setup().await;

    app.clone()
        .oneshot(form_post(
            "/api/newLink",
            "long_url=http%3A%2F%2Fexample.com%2Fpage",
        ))
        .await
        .unwrap();

    assert_eq!(store.hit_count(1).await.unwrap(), 0);

    let response = app.oneshot(get("/B")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com/page"
    );

    // Hit recording runs in a spawned task; poll until it lands.
    let mut count = 0;
    for _ in 0..50 {
        count = store.hit_count(1).await.unwrap();
        if count == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(count, 1);
}

#[tokio::test]
async fn code_with_characters_outside_the_alphabet_is_not_found() {
    let (app, _store, _db) = setup().await;

    // "%21" decodes to "!", which is not a base-62 digit.
    let response = app.oneshot(get("/%21")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn well_formed_but_unissued_code_is_not_found() {
    let (app, _store, _db) = setup().await;

    let response = app.oneshot(get("/zzzz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn success_page_without_a_code_is_bad_request() {
    let (app, _store, _db) = setup().await;

    let response = app.oneshot(get("/success")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_page_renders_the_form() {
    let (app, _store, _db) = setup().await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response.into_body()).await;
    assert!(html.contains("long_url"));
}

//! Router-level tests for the query endpoint.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use common::MockBackend;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use triplecast_endpoint::server::build_router;
use triplecast_endpoint::{AppState, ServerConfig};

fn app(backend: MockBackend) -> axum::Router {
    build_router(AppState::new(Arc::new(backend), ServerConfig::default()))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn get_ask_query_returns_boolean() {
    let app = app(MockBackend::new().with_ask_value(true));

    let uri = "/sparql?query=ASK%20%7B%20%3Fs%20%3Fp%20%3Fo%20%7D&resultFormat=XML";
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(body_text(response).await, "true");
}

#[tokio::test]
async fn get_select_query_streams_csv() {
    let csv = "s,p\nhttp://a/x,http://a/y\n";
    let app = app(MockBackend::new().with_select_payload(csv));

    let uri = "/sparql?query=SELECT%20%2A%20WHERE%20%7B%20%3Fs%20%3Fp%20%3Fo%20%7D&resultFormat=CSV";
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/csv");
    assert_eq!(body_text(response).await, csv);
}

#[tokio::test]
async fn post_form_construct_defaults_to_abbreviated_rdfxml() {
    let n3 = "@prefix ex: <http://example.org/> .\nex:a a ex:T .\n";
    let app = app(MockBackend::new().with_graph_payload(n3));

    // no rdfResultFormat: the RDF/XML-ABBREV default applies
    let form = "query=CONSTRUCT%20%7B%20%3Fs%20%3Fp%20%3Fo%20%7D%20WHERE%20%7B%20%3Fs%20%3Fp%20%3Fo%20%7D&resultFormat=XML";
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sparql")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/rdf+xml"
    );
    let text = body_text(response).await;
    assert!(text.contains("<rdf:RDF"));
}

#[tokio::test]
async fn missing_query_is_bad_request() {
    let app = app(MockBackend::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/sparql?resultFormat=XML")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("missing query"));
}

#[tokio::test]
async fn unknown_format_is_bad_request_listing_known_names() {
    let app = app(MockBackend::new());

    let uri = "/sparql?query=SELECT%20%2A%20WHERE%20%7B%7D&resultFormat=PARQUET";
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = body_text(response).await;
    assert!(text.contains("PARQUET"));
    assert!(text.contains("XML, TEXT, CSV, JSON"));
}

#[tokio::test]
async fn update_text_is_rejected_before_dispatch() {
    let backend = MockBackend::new();
    let app = app(backend);

    let uri = "/sparql?query=INSERT%20DATA%20%7B%20%3Ca%3E%20%3Cb%3E%20%3Cc%3E%20%7D&resultFormat=XML";
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("SELECT, ASK, CONSTRUCT or DESCRIBE"));
}

#[tokio::test]
async fn backend_failure_maps_to_bad_gateway() {
    let app = app(MockBackend::new().failing());

    let uri = "/sparql?query=SELECT%20%2A%20WHERE%20%7B%7D&resultFormat=JSON";
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

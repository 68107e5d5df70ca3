use actix_web::http::header::CONTENT_TYPE;
use actix_web::{test, web, App};
use example_service::{routes, StructuredLogger};
use serde_json::Value;

#[ctor::ctor]
fn init_logging() {
    test_support::logging::init_with_default("warn,example_service=info");
}

macro_rules! test_app {
    () => {
        test::init_service(
            App::new()
                .wrap(StructuredLogger)
                .configure(routes::configure)
                .default_service(web::to(routes::not_found)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_root_says_hello() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    let body = test::read_body(resp).await;
    assert_eq!(body, "Hello from Rust");
}

#[actix_web::test]
async fn test_healthz_reports_ok() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[actix_web::test]
async fn test_unknown_route_is_problem_details() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 404);
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let body = test::read_body(resp).await;
    let problem: Value = serde_json::from_slice(&body).expect("problem details JSON");
    for key in ["type", "title", "status", "detail", "code"] {
        assert!(problem.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(problem["code"], "NOT_FOUND");
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["detail"], "No route for GET /nope");
}

#[actix_web::test]
async fn test_healthz_rejects_post() {
    let app = test_app!();

    let req = test::TestRequest::post().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_client_error());
}

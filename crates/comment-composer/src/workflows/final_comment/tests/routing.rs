use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::CompositionConfig;
use crate::workflows::final_comment::router::submit_handler;
use crate::workflows::final_comment::service::{FinalCommentService, FinalCommentSubmission};

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn submission() -> FinalCommentSubmission {
    FinalCommentSubmission {
        subject_id: math(),
        first_name: "Avery".to_string(),
        last_name: "Lee".to_string(),
        grade: 95.0,
        comment: "Great kind to classmates".to_string(),
        extended: false,
    }
}

#[tokio::test]
async fn personalized_listing_honours_the_rating_query() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/subjects/math/personalized-comments?rating=4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|view| view["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["p-curious", "p-kind"]);
    assert_eq!(body[0]["normalizedRating"], json!(4.0));
    assert_eq!(body[0]["emoji"], json!("🙂"));

    let response = router
        .oneshot(get("/api/v1/subjects/math/personalized-comments?rating=0"))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn adding_comments_returns_created_then_conflict() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);
    let payload = json!({ "text": "Shares ideas readily", "rating": 4 });

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/subjects/math/personalized-comments",
            payload.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["subjectId"], json!("math"));

    let response = router
        .oneshot(post_json(
            "/api/v1/subjects/math/personalized-comments",
            payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["retryable"], json!(false));
}

#[tokio::test]
async fn inverted_outcome_band_is_unprocessable() {
    let (service, _, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/subjects/math/outcome-comments",
            json!({ "text": "Backwards", "lowerRange": 90, "upperRange": 10 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn outcome_listing_keeps_bank_order() {
    let (service, _, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get("/api/v1/subjects/math/outcome-comments"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body[0]["id"], json!("band-b"));
    assert_eq!(body[1]["lowerRange"], json!(80));
}

#[tokio::test]
async fn compose_route_previews_the_candidate() {
    let (service, _, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/final-comments/compose",
            json!({
                "subjectId": "math",
                "grade": 95,
                "personalizedCommentId": "p-kind",
                "draft": "Typed already"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["candidate"], json!("Great kind to classmates"));
    assert_eq!(body["populate"], json!("confirmation_required"));
    assert_eq!(body["maxLength"], json!(1000));
    assert_eq!(body["matchedOutcome"]["id"], json!("band-a"));
}

#[tokio::test]
async fn compose_route_reports_unknown_pronoun() {
    let (service, _, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/final-comments/compose",
            json!({ "subjectId": "math", "pronounId": "xe" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_route_stores_the_final_comment() {
    let (service, store, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/final-comments",
            json!({
                "subjectId": "math",
                "firstName": "Avery",
                "lastName": "Lee",
                "grade": 95,
                "comment": "Great kind to classmates"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["comment"], json!("Great kind to classmates"));
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn submit_handler_returns_unavailable_when_store_is_down() {
    let service = Arc::new(FinalCommentService::new(
        Arc::new(MemoryCatalog::seeded()),
        Arc::new(UnavailableStore),
        Arc::new(CannedCopier::default()),
        CompositionConfig::default(),
    ));

    let response = submit_handler::<MemoryCatalog, UnavailableStore, CannedCopier>(
        State(service),
        axum::Json(submission()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert_eq!(body["retryable"], json!(true));
}

#[tokio::test]
async fn copy_route_returns_summary_message() {
    let (service, _, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/subjects/copy",
            json!({
                "sourceSubjectId": "math",
                "targetSubjectId": "science",
                "overwrite": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["successCount"], json!(5));
    assert_eq!(body["duplicateCount"], json!(2));
    assert_eq!(
        body["message"],
        json!("Copied 5 comments to the target subject. Skipped 2 duplicate comments.")
    );
}

#[tokio::test]
async fn copy_from_unknown_subject_is_not_found() {
    let service = FinalCommentService::new(
        Arc::new(MemoryCatalog::seeded()),
        Arc::new(MemoryStore::default()),
        Arc::new(CannedCopier::default()),
        CompositionConfig::default(),
    );
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/subjects/copy",
            json!({
                "sourceSubjectId": "history",
                "targetSubjectId": "science",
                "overwrite": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

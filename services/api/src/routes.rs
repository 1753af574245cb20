use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use comment_composer::workflows::final_comment::{
    final_comment_router, CommentCatalog, CommentCopier, FinalCommentService, FinalCommentStore,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_comment_routes<C, S, X>(
    service: Arc<FinalCommentService<C, S, X>>,
) -> axum::Router
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    final_comment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryCommentCatalog, InMemoryCommentCopier, InMemoryFinalCommentStore};
    use axum::body::Body;
    use axum::http::Request;
    use comment_composer::config::CompositionConfig;
    use comment_composer::workflows::final_comment::{
        CommentId, OutcomeComment, PersonalizedComment, SubjectId,
    };
    use tower::ServiceExt;

    fn router() -> axum::Router {
        let math = SubjectId("math".to_string());
        let catalog = InMemoryCommentCatalog::with_banks(
            &math,
            vec![OutcomeComment {
                id: CommentId("band".to_string()),
                text: "{{pronoun}} did well.".to_string(),
                lower_range: 0,
                upper_range: 100,
                subject_id: math.clone(),
            }],
            vec![PersonalizedComment {
                id: CommentId("kind".to_string()),
                text: "Kind to peers.".to_string(),
                rating: Some(5.0),
                subject_id: math.clone(),
            }],
        );
        let copier = InMemoryCommentCopier::new(catalog.clone());
        let service = Arc::new(FinalCommentService::new(
            Arc::new(catalog),
            Arc::new(InMemoryFinalCommentStore::default()),
            Arc::new(copier),
            CompositionConfig::default(),
        ));
        with_comment_routes(service)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn compose_uses_the_default_pronoun_list() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/final-comments/compose")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "subjectId": "math",
                            "grade": 88,
                            "personalizedCommentId": "kind",
                            "pronounId": "she"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["candidate"], "she did well. Kind to peers.");
        assert_eq!(body["populate"], "applied");
    }

    #[tokio::test]
    async fn copy_then_list_target_bank() {
        let router = router();
        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/subjects/copy")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "sourceSubjectId": "math",
                            "targetSubjectId": "science",
                            "overwrite": false
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Copied 1 comment to the target subject.");

        let response = router
            .oneshot(
                Request::get("/api/v1/subjects/science/personalized-comments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body[0]["text"], "Kind to peers.");
        assert_eq!(body[0]["label"], "Very Positive");
    }
}

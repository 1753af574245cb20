use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::copy::CopyCommentsRequest;
use super::domain::SubjectId;
use super::ordering::RatingFilter;
use super::repository::{CommentCatalog, CommentCopier, CopyError, FinalCommentStore, RepositoryError};
use super::service::{
    ComposeRequest, FinalCommentService, FinalCommentServiceError, FinalCommentSubmission,
    NewOutcomeComment, NewPersonalizedComment,
};

type SharedService<C, S, X> = Arc<FinalCommentService<C, S, X>>;

/// Router exposing the comment banks, candidate preview, submission and copy endpoints.
pub fn final_comment_router<C, S, X>(service: SharedService<C, S, X>) -> Router
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    Router::new()
        .route(
            "/api/v1/subjects/:subject_id/personalized-comments",
            get(list_personalized_handler::<C, S, X>).post(add_personalized_handler::<C, S, X>),
        )
        .route(
            "/api/v1/subjects/:subject_id/outcome-comments",
            get(list_outcome_handler::<C, S, X>).post(add_outcome_handler::<C, S, X>),
        )
        .route("/api/v1/subjects/copy", post(copy_handler::<C, S, X>))
        .route(
            "/api/v1/final-comments/compose",
            post(compose_handler::<C, S, X>),
        )
        .route("/api/v1/final-comments", post(submit_handler::<C, S, X>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RatingQuery {
    #[serde(default)]
    rating: Option<i64>,
}

pub(crate) async fn list_personalized_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    Path(subject_id): Path<String>,
    Query(query): Query<RatingQuery>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    let filter = query.rating.map(RatingFilter::from).unwrap_or_default();
    match service.personalized_comments(&SubjectId(subject_id), filter) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_personalized_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    Path(subject_id): Path<String>,
    axum::Json(new): axum::Json<NewPersonalizedComment>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    match service.add_personalized_comment(&SubjectId(subject_id), new) {
        Ok(comment) => (StatusCode::CREATED, axum::Json(comment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_outcome_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    Path(subject_id): Path<String>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    match service.outcome_comments(&SubjectId(subject_id)) {
        Ok(comments) => (StatusCode::OK, axum::Json(comments)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_outcome_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    Path(subject_id): Path<String>,
    axum::Json(new): axum::Json<NewOutcomeComment>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    match service.add_outcome_comment(&SubjectId(subject_id), new) {
        Ok(comment) => (StatusCode::CREATED, axum::Json(comment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn compose_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    axum::Json(request): axum::Json<ComposeRequest>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    match service.compose(request) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    axum::Json(submission): axum::Json<FinalCommentSubmission>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    match service.submit_final_comment(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn copy_handler<C, S, X>(
    State(service): State<SharedService<C, S, X>>,
    axum::Json(request): axum::Json<CopyCommentsRequest>,
) -> Response
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    match service.copy_comments(request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: FinalCommentServiceError) -> Response {
    let status = status_for(&err);
    let payload = json!({
        "error": err.to_string(),
        "retryable": status == StatusCode::SERVICE_UNAVAILABLE,
    });
    (status, axum::Json(payload)).into_response()
}

/// HTTP status for a service failure, shared with [`crate::error::AppError`].
pub(crate) fn status_for(err: &FinalCommentServiceError) -> StatusCode {
    match err {
        FinalCommentServiceError::Duplicate(_)
        | FinalCommentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FinalCommentServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FinalCommentServiceError::NotFound { .. }
        | FinalCommentServiceError::Repository(RepositoryError::NotFound)
        | FinalCommentServiceError::Copy(CopyError::UnknownSubject(_)) => StatusCode::NOT_FOUND,
        FinalCommentServiceError::Repository(RepositoryError::Unavailable(_))
        | FinalCommentServiceError::Copy(CopyError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

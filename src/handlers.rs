//! HTTP surface: axum routes, JSON-API envelopes, error translation.
//!
//! Request bodies arrive as `{"data": {"attributes": <ResizeRequest>}}`;
//! successes leave as `{"data": [{"type": "image-processing-operation",
//! "attributes": <OperationResult>}]}` and failures as `{"errors": [...]}`
//! with one entry per validation violation.

use crate::error::ResizeError;
use crate::request::ResizeRequest;
use crate::service::{OperationResult, ResizeService};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Deserialize)]
struct RequestDocument {
    #[serde(default)]
    data: Option<RequestData>,
}

#[derive(Debug, Deserialize)]
struct RequestData {
    #[serde(default)]
    attributes: Option<ResizeRequest>,
}

pub fn router(service: Arc<ResizeService>) -> Router {
    Router::new()
        .route("/", post(resize))
        .route("/resize", post(resize))
        .route("/health", get(health))
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn resize(
    State(service): State<Arc<ResizeService>>,
    payload: Result<Json<RequestDocument>, JsonRejection>,
) -> Response {
    let document = match payload {
        Ok(Json(document)) => document,
        Err(rejection) => {
            let body = json!({
                "errors": [{
                    "status": 400,
                    "title": format!("Invalid JSON: {}", rejection.body_text()),
                }]
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let Some(request) = document.data.and_then(|d| d.attributes) else {
        let body = json!({
            "errors": [{
                "status": 400,
                "title": "data.attributes is required",
            }]
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    match service.process(request).await {
        Ok(results) => (StatusCode::OK, Json(success_document(&results))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) fn success_document(results: &[OperationResult]) -> Value {
    json!({
        "data": results
            .iter()
            .map(|result| json!({
                "type": "image-processing-operation",
                "attributes": result,
            }))
            .collect::<Vec<_>>()
    })
}

pub(crate) fn error_document(err: &ResizeError) -> (u16, Value) {
    let status = err.status();

    let errors = match err {
        ResizeError::Validation(violations) if !violations.is_empty() => violations
            .iter()
            .map(|v| {
                json!({
                    "status": status,
                    "title": format!("\"{}\" {}", v.path, v.message),
                    "meta": { "path": v.path },
                })
            })
            .collect::<Vec<_>>(),
        ResizeError::OperationFailed { index, tag, source } => vec![json!({
            "status": status,
            "title": source.to_string(),
            "meta": { "index": index, "tag": tag },
        })],
        // Server-side detail stays in the logs.
        ResizeError::Store(_) | ResizeError::Io(_) | ResizeError::Internal(_) => {
            vec![json!({ "status": status, "title": "Internal server error" })]
        }
        other => vec![json!({ "status": status, "title": other.to_string() })],
    };

    (status, json!({ "errors": errors }))
}

impl IntoResponse for ResizeError {
    fn into_response(self) -> Response {
        if self.status() >= 500 {
            error!(error = %self, "request processing error");
        }
        let (status, body) = error_document(&self);
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

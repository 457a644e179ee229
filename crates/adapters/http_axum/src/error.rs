//! HTTP error response mapping.
//!
//! Every error body has the shape `{ "message": ..., "extra": {...} }`.
//! Field errors go under `extra.fields`; batch imports report one entry per
//! submitted row and repeat the list at the top level under `fields`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};

use terminal_domain::error::{FieldErrors, TerminalError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
    extra: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Value>,
}

impl ErrorBody {
    fn new(message: &'static str, extra: Value) -> Self {
        Self {
            message,
            extra,
            fields: None,
        }
    }
}

/// Errors returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// An application or domain failure.
    Terminal(TerminalError),
    /// The body could not be read as JSON (or CSV for batch uploads).
    MalformedBody { status: StatusCode, detail: String },
}

impl ApiError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedBody {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<TerminalError> for ApiError {
    fn from(err: TerminalError) -> Self {
        Self::Terminal(err)
    }
}

/// `[{"0": {...}}, {}, ...]`: failing rows keyed by their index, valid rows empty.
fn row_errors(rows: &[FieldErrors]) -> Value {
    rows.iter()
        .enumerate()
        .map(|(index, errors)| {
            let mut entry = Map::new();
            if !errors.is_empty() {
                entry.insert(index.to_string(), json!(errors));
            }
            Value::Object(entry)
        })
        .collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Terminal(TerminalError::Validation(fields)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Validation error", json!({ "fields": fields })),
            ),
            Self::Terminal(TerminalError::BatchValidation(rows)) => {
                let fields = row_errors(&rows);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        message: "Validation error",
                        extra: json!({ "fields": fields.clone() }),
                        fields: Some(fields),
                    },
                )
            }
            Self::Terminal(TerminalError::NotFound(err)) => {
                tracing::debug!(error = %err, "not found");
                (StatusCode::NOT_FOUND, ErrorBody::new("Not found", json!({})))
            }
            Self::Terminal(TerminalError::Storage(err)) => {
                tracing::error!(error = %err, source = ?err.source(), "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error", json!({})),
                )
            }
            Self::MalformedBody { status, detail } => (
                status,
                ErrorBody::new("Malformed request body", json!({ "detail": detail })),
            ),
        };

        (status, Json(body)).into_response()
    }
}

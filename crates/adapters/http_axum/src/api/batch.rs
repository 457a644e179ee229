//! Batch import of container visits.
//!
//! Rows arrive either as a JSON list of objects or as a `text/csv` upload
//! whose header line names the columns of [`COLUMNS`].

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use terminal_app::commands::BatchRow;
use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::container;
use terminal_domain::error::{FieldErrors, TerminalError, ValidationError};

use super::fields::{Fields, Text, choice, datetime};
use crate::error::ApiError;
use crate::state::AppState;

/// Columns of an import file, in template order.
pub const COLUMNS: [&str; 11] = [
    "container_name",
    "container_size",
    "company_name",
    "container_state",
    "container_owner",
    "product_name",
    "transport_type",
    "transport_number",
    "entry_time",
    "exit_time",
    "dispatch_method",
];

/// Possible responses from the template endpoint.
pub enum TemplateResponse {
    Csv(String),
}

impl IntoResponse for TemplateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Csv(body) => (
                [
                    (CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (CONTENT_DISPOSITION, "attachment; filename=template.csv"),
                ],
                body,
            )
                .into_response(),
        }
    }
}

/// Possible responses from the import endpoint.
pub enum ImportResponse {
    Created,
}

impl IntoResponse for ImportResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created => StatusCode::CREATED.into_response(),
        }
    }
}

fn is_csv(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("text/csv"))
}

/// Records of a CSV upload as JSON objects. An empty `exit_time` cell
/// means the container is still in the terminal.
fn csv_rows(body: &[u8]) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body);
    let headers = reader.headers()?.clone();
    reader
        .records()
        .map(|record| -> Result<Value, csv::Error> {
            let record = record?;
            let row: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| {
                    let value = if column == "exit_time" && cell.is_empty() {
                        Value::Null
                    } else {
                        Value::String(cell.to_owned())
                    };
                    (column.to_owned(), value)
                })
                .collect();
            Ok(Value::Object(row))
        })
        .collect()
}

fn batch_row(item: &Value) -> Result<BatchRow, FieldErrors> {
    let blank_ok = |value: &Value| Text::new().blank_ok().parse(value);
    let not_blank = |value: &Value| Text::new().parse(value);

    let mut fields = Fields::new(item);
    let container_name = fields.required("container_name", |v| {
        Text::new().max_len(container::MAX_NAME_LEN).parse(v)
    });
    let container_size = fields.required("container_size", choice);
    let company_name = fields.required("company_name", not_blank);
    let container_state = fields.required("container_state", not_blank);
    let container_owner = fields.required("container_owner", blank_ok);
    let product_name = fields.optional("product_name", blank_ok);
    let transport_type = fields.required("transport_type", not_blank);
    let transport_number = fields.required("transport_number", blank_ok);
    let entry_time = fields.required("entry_time", datetime);
    let exit_time = fields.nullable("exit_time", false, datetime).flatten();
    let dispatch_method = fields.optional("dispatch_method", blank_ok);

    match (
        container_name,
        container_size,
        company_name,
        container_state,
        container_owner,
        transport_type,
        transport_number,
        entry_time,
    ) {
        (
            Some(container_name),
            Some(container_size),
            Some(company_name),
            Some(container_state),
            Some(container_owner),
            Some(transport_type),
            Some(transport_number),
            Some(entry_time),
        ) if !fields.has_errors() => Ok(BatchRow {
            container_name,
            container_size,
            company_name,
            container_state,
            container_owner,
            product_name,
            transport_type,
            transport_number,
            entry_time,
            exit_time,
            dispatch_method,
        }),
        _ => Err(fields.into_errors()),
    }
}

/// Shape-check every row; fails with one entry per row when any is invalid.
fn batch_rows(items: &[Value]) -> Result<Vec<BatchRow>, TerminalError> {
    let mut rows = Vec::with_capacity(items.len());
    let mut row_errors = Vec::with_capacity(items.len());
    for item in items {
        match batch_row(item) {
            Ok(row) => {
                rows.push(row);
                row_errors.push(FieldErrors::new());
            }
            Err(errors) => row_errors.push(errors),
        }
    }
    if row_errors.iter().any(|errors| !errors.is_empty()) {
        return Err(TerminalError::BatchValidation(row_errors));
    }
    Ok(rows)
}

fn read_items(headers: &HeaderMap, body: &[u8]) -> Result<Vec<Value>, ApiError> {
    if is_csv(headers) {
        return csv_rows(body).map_err(|err| ApiError::malformed(err.to_string()));
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|err| ApiError::malformed(err.to_string()))?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(TerminalError::field("non_field_errors", ValidationError::NotAList).into()),
    }
}

/// `GET /api/container_visit_register/batch`
pub async fn template() -> TemplateResponse {
    TemplateResponse::Csv(format!("{}\n", COLUMNS.join(",")))
}

/// `POST /api/container_visit_register/batch`
pub async fn import<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ImportResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let items = read_items(&headers, &body)?;
    let rows = batch_rows(&items)?;
    state
        .storage_service
        .register_container_batch_entry(rows)
        .await?;
    Ok(ImportResponse::Created)
}

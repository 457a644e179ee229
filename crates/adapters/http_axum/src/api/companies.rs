//! JSON REST handlers for customer companies.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::company::Company;
use terminal_domain::id::CompanyId;

use super::fields::{Fields, Text};
use super::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Company>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Company>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Company>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/companies`
pub async fn list<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
) -> Result<ListResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let companies = state.company_service.list_companies().await?;
    Ok(ListResponse::Ok(Json(companies)))
}

/// `GET /api/companies/{id}`
pub async fn get<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: CompanyId = parse_id(&id, "Company")?;
    let company = state.company_service.get_company(id).await?;
    Ok(GetResponse::Ok(Json(company)))
}

/// `POST /api/companies`
pub async fn create<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<CreateResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let mut fields = Fields::new(&body);
    // Length and blank rules are enforced by the service.
    let Some(name) = fields.required("name", |v| Text::new().blank_ok().parse(v)) else {
        return Err(fields.into_error().into());
    };
    let company = state.company_service.create_company(name).await?;
    Ok(CreateResponse::Created(Json(company)))
}

//! JSON REST handlers for paginated visit listings.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::response::{IntoResponse, Response};

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::id::CompanyId;
use terminal_domain::time;

use super::filters::{company_visit_filter, page, visit_filter};
use super::parse_id;
use super::representation::{CustomerVisitItem, VisitView};
use crate::error::ApiError;
use crate::pagination::Paginated;
use crate::state::AppState;

/// Possible responses from the visit list endpoint.
pub enum ListResponse {
    Ok(Json<Paginated<VisitView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the per-customer list endpoint.
pub enum CompanyListResponse {
    Ok(Json<Paginated<CustomerVisitItem>>),
}

impl IntoResponse for CompanyListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/containers_visit_list`
pub async fn list<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ListResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let filter = visit_filter(&params)?;
    let visits = state
        .storage_service
        .get_all_containers_visits(filter, page(&params))
        .await?;
    let now = time::now();
    let results = visits.map(|visit| VisitView::list_item(&visit, now));
    Ok(ListResponse::Ok(Json(Paginated::new(results, &uri))))
}

/// `GET /api/container_visit_list/by_company/{company_id}`
pub async fn by_company<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(company_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<CompanyListResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let company_id: CompanyId = parse_id(&company_id, "Company")?;
    let filter = company_visit_filter(&params)?;
    let visits = state
        .storage_service
        .get_all_containers_visits_by_company(company_id, filter, page(&params))
        .await?;
    let now = time::now();
    let results = visits.map(|visit| CustomerVisitItem::new(&visit, now));
    Ok(CompanyListResponse::Ok(Json(Paginated::new(results, &uri))))
}

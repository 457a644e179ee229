//! JSON REST handler for terminal occupancy statistics.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::statistics::TerminalStatistics;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the statistics endpoint.
pub enum StatisticsResponse {
    Ok(Json<TerminalStatistics>),
}

impl IntoResponse for StatisticsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/container_visit_statistics`
pub async fn get<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
) -> Result<StatisticsResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let statistics = state.storage_service.statistics().await?;
    Ok(StatisticsResponse::Ok(Json(statistics)))
}

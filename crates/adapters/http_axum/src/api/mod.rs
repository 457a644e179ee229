//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod batch;
#[allow(clippy::missing_errors_doc)]
pub mod catalog;
#[allow(clippy::missing_errors_doc)]
pub mod companies;
#[allow(clippy::missing_errors_doc)]
pub mod files;
#[allow(clippy::missing_errors_doc)]
pub mod statistics;
#[allow(clippy::missing_errors_doc)]
pub mod visit_lists;
#[allow(clippy::missing_errors_doc)]
pub mod visits;

pub(crate) mod fields;
pub(crate) mod filters;
pub mod representation;

use std::str::FromStr;

use axum::Router;
use axum::routing::{delete, get, post, put};

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::error::{NotFoundError, TerminalError};

use crate::error::ApiError;
use crate::state::AppState;

/// Parse a path identifier; anything that is not a row id cannot exist.
pub(crate) fn parse_id<T: FromStr>(raw: &str, entity: &'static str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::from(TerminalError::from(NotFoundError {
            entity,
            id: raw.to_owned(),
        }))
    })
}

/// Build the `/api` sub-router.
pub fn routes<V, C, Co, K>() -> Router<AppState<V, C, Co, K>>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    Router::new()
        // Registration
        .route(
            "/container_visit_register",
            post(visits::register::<V, C, Co, K>),
        )
        .route(
            "/container_visit_register/batch",
            get(batch::template).post(batch::import::<V, C, Co, K>),
        )
        // Visit lifecycle
        .route(
            "/container_visit/{visit_id}/update",
            put(visits::update::<V, C, Co, K>),
        )
        .route(
            "/container_visit/{visit_id}/delete",
            delete(visits::delete::<V, C, Co, K>),
        )
        .route(
            "/container_visit/{visit_id}/dispatch",
            put(visits::dispatch::<V, C, Co, K>),
        )
        .route(
            "/container_visit/{visit_id}/available_services",
            get(visits::available_services::<V, C, Co, K>),
        )
        // Listings
        .route(
            "/containers_visit_list",
            get(visit_lists::list::<V, C, Co, K>),
        )
        .route(
            "/container_visit_list/{visit_id}",
            get(visits::detail::<V, C, Co, K>),
        )
        .route(
            "/container_visit_list/by_company/{company_id}",
            get(visit_lists::by_company::<V, C, Co, K>),
        )
        .route(
            "/container_visit_statistics",
            get(statistics::get::<V, C, Co, K>),
        )
        // Attachments
        .route(
            "/files/container_visit/{visit_id}/image/create",
            post(files::create_image::<V, C, Co, K>),
        )
        .route(
            "/files/container_visit/image/{image_id}/delete",
            delete(files::delete_image::<V, C, Co, K>),
        )
        .route(
            "/files/container_visit/{visit_id}/document/create",
            post(files::create_document::<V, C, Co, K>),
        )
        .route(
            "/files/container_visit/document/{document_id}/delete",
            delete(files::delete_document::<V, C, Co, K>),
        )
        .route(
            "/files/container_visit/{visit_id}/images/download",
            get(files::download_images::<V, C, Co, K>),
        )
        .route(
            "/files/container_visit/{visit_id}/documents/download",
            get(files::download_documents::<V, C, Co, K>),
        )
        // Customers
        .route(
            "/companies",
            get(companies::list::<V, C, Co, K>).post(companies::create::<V, C, Co, K>),
        )
        .route("/companies/{id}", get(companies::get::<V, C, Co, K>))
        // Catalog
        .route(
            "/service_types",
            get(catalog::list_service_types::<V, C, Co, K>)
                .post(catalog::create_service_type::<V, C, Co, K>),
        )
        .route(
            "/services",
            get(catalog::list_services::<V, C, Co, K>).post(catalog::create_service::<V, C, Co, K>),
        )
        .route("/contracts", post(catalog::create_contract::<V, C, Co, K>))
        .route("/contracts/{id}", get(catalog::get_contract::<V, C, Co, K>))
        .route(
            "/contracts/{id}/services",
            get(catalog::list_contract_services::<V, C, Co, K>)
                .post(catalog::add_contract_service::<V, C, Co, K>),
        )
}

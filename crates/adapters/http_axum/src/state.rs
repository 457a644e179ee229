//! Shared application state for axum handlers.

use std::sync::Arc;

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_app::services::catalog_service::CatalogService;
use terminal_app::services::company_service::CompanyService;
use terminal_app::services::container_storage_service::ContainerStorageService;

/// Application state shared across all axum handlers.
///
/// Generic over the four repository types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the repositories themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<V, C, Co, K> {
    /// Visit lifecycle, listings, attachments and statistics.
    pub storage_service: Arc<ContainerStorageService<V, C, Co, K>>,
    /// Customer accounts.
    pub company_service: Arc<CompanyService<Co>>,
    /// Service types, services, contracts and contract prices.
    pub catalog_service: Arc<CatalogService<K, Co>>,
}

impl<V, C, Co, K> Clone for AppState<V, C, Co, K> {
    fn clone(&self) -> Self {
        Self {
            storage_service: Arc::clone(&self.storage_service),
            company_service: Arc::clone(&self.company_service),
            catalog_service: Arc::clone(&self.catalog_service),
        }
    }
}

impl<V, C, Co, K> AppState<V, C, Co, K>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        storage_service: ContainerStorageService<V, C, Co, K>,
        company_service: CompanyService<Co>,
        catalog_service: CatalogService<K, Co>,
    ) -> Self {
        Self {
            storage_service: Arc::new(storage_service),
            company_service: Arc::new(company_service),
            catalog_service: Arc::new(catalog_service),
        }
    }
}

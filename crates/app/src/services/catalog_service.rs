//! Catalog service: service types, terminal services, contracts and
//! contract prices.

use terminal_domain::catalog::{
    ContractService, NewContractService, NewServiceType, NewTerminalService, ServiceType,
    TerminalService,
};
use terminal_domain::company::{Contract, NewContract};
use terminal_domain::error::{NotFoundError, TerminalError, ValidationError};
use terminal_domain::id::ContractId;

use crate::ports::{CatalogRepository, CompanyRepository};

/// Application service for the pricing catalog.
pub struct CatalogService<K, Co> {
    catalog: K,
    companies: Co,
}

impl<K, Co> CatalogService<K, Co>
where
    K: CatalogRepository,
    Co: CompanyRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(catalog: K, companies: Co) -> Self {
        Self { catalog, companies }
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] for a blank name, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, service_type), fields(name = %service_type.name))]
    pub async fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> Result<ServiceType, TerminalError> {
        service_type.validate()?;
        self.catalog.create_service_type(service_type).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_service_types(&self) -> Result<Vec<ServiceType>, TerminalError> {
        self.catalog.list_service_types().await
    }

    /// Add a service to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when fields are invalid or the
    /// service type does not exist, or a storage error.
    #[tracing::instrument(skip(self, service), fields(name = %service.name))]
    pub async fn create_service(
        &self,
        service: NewTerminalService,
    ) -> Result<TerminalService, TerminalError> {
        service.validate()?;
        let type_id = service.service_type_id;
        if self.catalog.get_service_type(type_id).await?.is_none() {
            return Err(TerminalError::field(
                "service_type_id",
                ValidationError::UnknownServiceType(type_id.as_i64()),
            ));
        }
        self.catalog.create_service(service).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_services(&self) -> Result<Vec<TerminalService>, TerminalError> {
        self.catalog.list_services().await
    }

    /// Create a contract for a company.
    ///
    /// Creating an active contract deactivates the company's previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when fields are invalid or the
    /// company does not exist, or a storage error.
    #[tracing::instrument(skip(self, contract), fields(company_id = %contract.company_id))]
    pub async fn create_contract(&self, contract: NewContract) -> Result<Contract, TerminalError> {
        contract.validate()?;
        if self.companies.get_by_id(contract.company_id).await?.is_none() {
            return Err(TerminalError::field(
                "company_id",
                ValidationError::CustomerNotFound,
            ));
        }
        let contract = self.catalog.create_contract(contract).await?;
        tracing::info!(contract_id = %contract.id, active = contract.is_active, "contract created");
        Ok(contract)
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when no contract with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_contract(&self, id: ContractId) -> Result<Contract, TerminalError> {
        self.catalog.get_contract(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Contract",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Price a catalog service for a contract.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the contract does not exist,
    /// [`TerminalError::Validation`] when the price is negative or the
    /// service does not exist, or a storage error.
    #[tracing::instrument(skip(self, contract_service), fields(contract_id = %contract_service.contract_id))]
    pub async fn add_contract_service(
        &self,
        contract_service: NewContractService,
    ) -> Result<ContractService, TerminalError> {
        self.get_contract(contract_service.contract_id).await?;
        contract_service.validate()?;
        let service_id = contract_service.service_id;
        if self.catalog.get_service(service_id).await?.is_none() {
            return Err(TerminalError::field(
                "service_id",
                ValidationError::UnknownService(service_id.as_i64()),
            ));
        }
        self.catalog.add_contract_service(contract_service).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the contract does not exist,
    /// or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_contract_services(
        &self,
        contract_id: ContractId,
    ) -> Result<Vec<ContractService>, TerminalError> {
        self.get_contract(contract_id).await?;
        self.catalog.list_contract_services(contract_id).await
    }
}

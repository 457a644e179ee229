//! Catalog port: contracts, service types, services and contract prices.

use std::future::Future;

use terminal_domain::catalog::{
    ContractService, NewContractService, NewServiceType, NewTerminalService, ServiceType,
    TerminalService,
};
use terminal_domain::company::{Contract, NewContract};
use terminal_domain::error::TerminalError;
use terminal_domain::id::{CompanyId, ContractId, ServiceId, ServiceTypeId};

/// Repository for the service catalog and customer contracts.
pub trait CatalogRepository {
    fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> impl Future<Output = Result<ServiceType, TerminalError>> + Send;

    fn get_service_type(
        &self,
        id: ServiceTypeId,
    ) -> impl Future<Output = Result<Option<ServiceType>, TerminalError>> + Send;

    fn list_service_types(
        &self,
    ) -> impl Future<Output = Result<Vec<ServiceType>, TerminalError>> + Send;

    fn create_service(
        &self,
        service: NewTerminalService,
    ) -> impl Future<Output = Result<TerminalService, TerminalError>> + Send;

    fn get_service(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<TerminalService>, TerminalError>> + Send;

    fn list_services(
        &self,
    ) -> impl Future<Output = Result<Vec<TerminalService>, TerminalError>> + Send;

    /// Create a contract. An active contract deactivates the company's
    /// previous active one in the same transaction.
    fn create_contract(
        &self,
        contract: NewContract,
    ) -> impl Future<Output = Result<Contract, TerminalError>> + Send;

    fn get_contract(
        &self,
        id: ContractId,
    ) -> impl Future<Output = Result<Option<Contract>, TerminalError>> + Send;

    /// The company's single active contract, if any.
    fn find_active_contract(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Option<Contract>, TerminalError>> + Send;

    /// Price a catalog service for a contract.
    fn add_contract_service(
        &self,
        contract_service: NewContractService,
    ) -> impl Future<Output = Result<ContractService, TerminalError>> + Send;

    /// Every service priced by the contract.
    fn list_contract_services(
        &self,
        contract_id: ContractId,
    ) -> impl Future<Output = Result<Vec<ContractService>, TerminalError>> + Send;
}

//! Stub repositories and fixtures for handler and router tests.
//!
//! The stubs hold no data: lookups find nothing, listings are empty and
//! creations echo their input.

use terminal_app::pagination::{LimitOffset, Page};
use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_app::query::VisitFilter;
use terminal_app::services::catalog_service::CatalogService;
use terminal_app::services::company_service::CompanyService;
use terminal_app::services::container_storage_service::ContainerStorageService;
use terminal_domain::catalog::{
    ContractService, NewContractService, NewServiceType, NewTerminalService, ServiceType,
    TerminalService,
};
use terminal_domain::choices::{ContainerSize, ContainerState, TransportType};
use terminal_domain::company::{Company, Contract, NewContract};
use terminal_domain::container::Container;
use terminal_domain::error::{NotFoundError, TerminalError};
use terminal_domain::id::{
    AttachmentId, CompanyId, ContainerId, ContractId, ServiceId, ServiceTypeId, VisitId,
};
use terminal_domain::statistics::TerminalStatistics;
use terminal_domain::time::{self, Timestamp};
use terminal_domain::visit::{Attachment, ContainerVisit, NewAttachment, NewContainerVisit};

use crate::state::AppState;

pub struct StubVisitRepo;
pub struct StubContainerRepo;
pub struct StubCompanyRepo;
pub struct StubCatalogRepo;

pub type StubState = AppState<StubVisitRepo, StubContainerRepo, StubCompanyRepo, StubCatalogRepo>;

pub fn ts(value: &str) -> Timestamp {
    time::parse(value).unwrap()
}

/// An active visit of an empty 20ft container with no contract.
pub fn visit(id: i64, container_name: &str, entry: &str) -> ContainerVisit {
    ContainerVisit {
        id: VisitId::new(id),
        container: Container {
            id: ContainerId::new(id),
            name: container_name.to_owned(),
            size: ContainerSize::Ft20,
            in_storage: true,
        },
        company: Company {
            id: CompanyId::new(1),
            name: "Baltic Shipping".into(),
        },
        contract: None,
        container_state: ContainerState::Empty,
        container_owner: "MSC".into(),
        product_name: None,
        transport_type: TransportType::Auto,
        transport_number: "AB1234".into(),
        exit_transport_type: None,
        exit_transport_number: None,
        entry_time: ts(entry),
        exit_time: None,
        notes: None,
        services: Vec::new(),
        images: Vec::new(),
        documents: Vec::new(),
    }
}

fn stored(id: i64, new: NewContainerVisit) -> ContainerVisit {
    ContainerVisit {
        container: Container {
            id: ContainerId::new(id),
            name: new.container_name,
            size: new.container_size,
            in_storage: new.exit_time.is_none(),
        },
        company: Company {
            id: new.company_id,
            name: String::new(),
        },
        contract: new.contract,
        container_state: new.container_state,
        container_owner: new.container_owner,
        product_name: new.product_name,
        transport_type: new.transport_type,
        transport_number: new.transport_number,
        exit_transport_type: new.exit_transport_type,
        exit_transport_number: new.exit_transport_number,
        entry_time: new.entry_time,
        exit_time: new.exit_time,
        notes: new.notes,
        ..visit(id, "", "2024-01-01T00:00:00Z")
    }
}

fn missing(entity: &'static str) -> TerminalError {
    NotFoundError {
        entity,
        id: String::new(),
    }
    .into()
}

impl CompanyRepository for StubCompanyRepo {
    async fn create(&self, name: String) -> Result<Company, TerminalError> {
        Ok(Company {
            id: CompanyId::new(1),
            name,
        })
    }
    async fn get_by_id(&self, _id: CompanyId) -> Result<Option<Company>, TerminalError> {
        Ok(None)
    }
    async fn find_by_name(&self, _name: &str) -> Result<Option<Company>, TerminalError> {
        Ok(None)
    }
    async fn get_all(&self) -> Result<Vec<Company>, TerminalError> {
        Ok(vec![])
    }
}

impl ContainerRepository for StubContainerRepo {
    async fn get_by_id(&self, _id: ContainerId) -> Result<Option<Container>, TerminalError> {
        Ok(None)
    }
    async fn find_by_name(&self, _name: &str) -> Result<Option<Container>, TerminalError> {
        Ok(None)
    }
}

impl ContainerVisitRepository for StubVisitRepo {
    async fn create(&self, visit: NewContainerVisit) -> Result<ContainerVisit, TerminalError> {
        Ok(stored(1, visit))
    }
    async fn create_many(
        &self,
        visits: Vec<NewContainerVisit>,
    ) -> Result<Vec<ContainerVisit>, TerminalError> {
        Ok(visits
            .into_iter()
            .zip(1..)
            .map(|(visit, id)| stored(id, visit))
            .collect())
    }
    async fn get_by_id(&self, _id: VisitId) -> Result<Option<ContainerVisit>, TerminalError> {
        Ok(None)
    }
    async fn update(&self, visit: ContainerVisit) -> Result<ContainerVisit, TerminalError> {
        Ok(visit)
    }
    async fn delete(&self, _id: VisitId) -> Result<(), TerminalError> {
        Err(missing("ContainerVisit"))
    }
    async fn list(
        &self,
        _filter: VisitFilter,
        page: LimitOffset,
        _now: Timestamp,
    ) -> Result<Page<ContainerVisit>, TerminalError> {
        Ok(Page {
            count: 0,
            limit: page.limit,
            offset: page.offset,
            results: vec![],
        })
    }
    async fn statistics(&self, _now: Timestamp) -> Result<TerminalStatistics, TerminalError> {
        Ok(TerminalStatistics::default())
    }
    async fn add_image(
        &self,
        _visit_id: VisitId,
        _image: NewAttachment,
    ) -> Result<Attachment, TerminalError> {
        Err(missing("ContainerVisit"))
    }
    async fn remove_image(&self, _id: AttachmentId) -> Result<bool, TerminalError> {
        Ok(false)
    }
    async fn add_document(
        &self,
        _visit_id: VisitId,
        _document: NewAttachment,
    ) -> Result<Attachment, TerminalError> {
        Err(missing("ContainerVisit"))
    }
    async fn remove_document(&self, _id: AttachmentId) -> Result<bool, TerminalError> {
        Ok(false)
    }
}

impl CatalogRepository for StubCatalogRepo {
    async fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> Result<ServiceType, TerminalError> {
        Ok(ServiceType {
            id: ServiceTypeId::new(1),
            name: service_type.name,
            unit_of_measure: service_type.unit_of_measure,
        })
    }
    async fn get_service_type(
        &self,
        _id: ServiceTypeId,
    ) -> Result<Option<ServiceType>, TerminalError> {
        Ok(None)
    }
    async fn list_service_types(&self) -> Result<Vec<ServiceType>, TerminalError> {
        Ok(vec![])
    }
    async fn create_service(
        &self,
        _service: NewTerminalService,
    ) -> Result<TerminalService, TerminalError> {
        Err(missing("ServiceType"))
    }
    async fn get_service(&self, _id: ServiceId) -> Result<Option<TerminalService>, TerminalError> {
        Ok(None)
    }
    async fn list_services(&self) -> Result<Vec<TerminalService>, TerminalError> {
        Ok(vec![])
    }
    async fn create_contract(&self, contract: NewContract) -> Result<Contract, TerminalError> {
        Ok(Contract {
            id: ContractId::new(1),
            company_id: contract.company_id,
            name: contract.name,
            free_days: contract.free_days,
            is_active: contract.is_active,
        })
    }
    async fn get_contract(&self, _id: ContractId) -> Result<Option<Contract>, TerminalError> {
        Ok(None)
    }
    async fn find_active_contract(
        &self,
        _company_id: CompanyId,
    ) -> Result<Option<Contract>, TerminalError> {
        Ok(None)
    }
    async fn add_contract_service(
        &self,
        _contract_service: NewContractService,
    ) -> Result<ContractService, TerminalError> {
        Err(missing("Contract"))
    }
    async fn list_contract_services(
        &self,
        _contract_id: ContractId,
    ) -> Result<Vec<ContractService>, TerminalError> {
        Ok(vec![])
    }
}

pub fn stub_state() -> StubState {
    AppState::new(
        ContainerStorageService::new(
            StubVisitRepo,
            StubContainerRepo,
            StubCompanyRepo,
            StubCatalogRepo,
        ),
        CompanyService::new(StubCompanyRepo),
        CatalogService::new(StubCatalogRepo, StubCompanyRepo),
    )
}

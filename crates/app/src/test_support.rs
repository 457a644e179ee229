//! In-memory implementations of every port, shared by the service tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use terminal_domain::catalog::{
    ContractService, NewContractService, NewServiceType, NewTerminalService, ServiceType,
    TerminalService,
};
use terminal_domain::choices::{ContainerSize, ContainerState, TransportType, UnitOfMeasure};
use terminal_domain::company::{Company, Contract, NewContract};
use terminal_domain::container::Container;
use terminal_domain::error::{FieldErrors, NotFoundError, TerminalError, ValidationError};
use terminal_domain::id::{
    AppliedServiceId, AttachmentId, CompanyId, ContainerId, ContractId, ContractServiceId,
    ServiceId, ServiceTypeId, VisitId,
};
use terminal_domain::statistics::{SizeCount, TerminalStatistics};
use terminal_domain::time::{self, Timestamp};
use terminal_domain::visit::{
    AppliedService, Attachment, ContainerVisit, NewAttachment, NewContainerVisit,
};

use crate::pagination::{LimitOffset, Page};
use crate::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use crate::query::VisitFilter;

#[derive(Clone, Default)]
struct State {
    next_id: i64,
    companies: Vec<Company>,
    contracts: Vec<Contract>,
    service_types: Vec<ServiceType>,
    services: Vec<TerminalService>,
    contract_services: Vec<ContractService>,
    containers: Vec<Container>,
    visits: Vec<ContainerVisit>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate(&self, visit: &ContainerVisit) -> ContainerVisit {
        let mut visit = visit.clone();
        if let Some(container) = self.containers.iter().find(|c| c.id == visit.container.id) {
            visit.container = container.clone();
        }
        visit
    }

    fn set_in_storage(&mut self, id: ContainerId, in_storage: bool) {
        if let Some(container) = self.containers.iter_mut().find(|c| c.id == id) {
            container.in_storage = in_storage;
        }
    }

    fn upsert_container(&mut self, name: &str, size: ContainerSize) -> ContainerId {
        if let Some(existing) = self.containers.iter_mut().find(|c| c.name == name) {
            existing.size = size;
            return existing.id;
        }
        let id = ContainerId::new(self.next_id());
        self.containers.push(Container {
            id,
            name: name.to_string(),
            size,
            in_storage: false,
        });
        id
    }

    fn claim(&mut self, id: ContainerId) -> Result<(), TerminalError> {
        match self.containers.iter_mut().find(|c| c.id == id) {
            Some(container) if !container.in_storage => {
                container.in_storage = true;
                Ok(())
            }
            _ => Err(TerminalError::field(
                "container_name",
                ValidationError::ContainerInStorage,
            )),
        }
    }

    fn container_by_id(&self, id: ContainerId) -> Result<Container, TerminalError> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Container",
                    id: id.to_string(),
                }
                .into()
            })
    }

    fn insert_visit(&mut self, new: NewContainerVisit) -> Result<ContainerVisit, TerminalError> {
        let company = self
            .companies
            .iter()
            .find(|c| c.id == new.company_id)
            .cloned()
            .ok_or_else(|| NotFoundError {
                entity: "Company",
                id: new.company_id.to_string(),
            })?;

        let container_id = self.upsert_container(&new.container_name, new.container_size);
        if new.is_active() {
            self.claim(container_id)?;
        }
        let container = self.container_by_id(container_id)?;

        let mut services = Vec::with_capacity(new.services.len());
        for usage in new.services {
            let cs = self
                .contract_services
                .iter()
                .find(|cs| cs.id == usage.contract_service_id)
                .cloned()
                .ok_or_else(|| NotFoundError {
                    entity: "ContractService",
                    id: usage.contract_service_id.to_string(),
                })?;
            services.push(AppliedService {
                id: AppliedServiceId::new(self.next_id()),
                contract_service_id: cs.id,
                service_id: cs.service.id,
                name: cs.service.name,
                service_type: cs.service.service_type,
                container_size: cs.service.container_size,
                base_price: cs.service.base_price,
                price: cs.price,
                date_from: usage.date_from,
                date_to: usage.date_to,
                notes: usage.notes,
                performed_at: usage.performed_at,
            });
        }

        let visit = ContainerVisit {
            id: VisitId::new(self.next_id()),
            container,
            company,
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
            services,
            images: Vec::new(),
            documents: Vec::new(),
        };
        self.visits.push(visit.clone());
        Ok(visit)
    }
}

/// One shared store implementing all repository ports.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn seed_company(&self, name: &str) -> Company {
        self.with(|s| {
            let company = Company {
                id: CompanyId::new(s.next_id()),
                name: name.to_string(),
            };
            s.companies.push(company.clone());
            company
        })
    }

    pub fn seed_contract(&self, company: &Company, free_days: u32) -> Contract {
        self.with(|s| {
            let contract = Contract {
                id: ContractId::new(s.next_id()),
                company_id: company.id,
                name: format!("{} main", company.name),
                free_days,
                is_active: true,
            };
            s.contracts.push(contract.clone());
            contract
        })
    }

    pub fn seed_contract_service(
        &self,
        contract: &Contract,
        name: &str,
        unit: UnitOfMeasure,
        price: Decimal,
        multiple_usage: bool,
    ) -> ContractService {
        self.with(|s| {
            let service_type = ServiceType {
                id: ServiceTypeId::new(s.next_id()),
                name: format!("{name} type"),
                unit_of_measure: unit,
            };
            let service = TerminalService {
                id: ServiceId::new(s.next_id()),
                name: name.to_string(),
                description: String::new(),
                service_type,
                container_size: None,
                container_state: None,
                base_price: price,
                multiple_usage,
            };
            let cs = ContractService {
                id: ContractServiceId::new(s.next_id()),
                contract_id: contract.id,
                service,
                price,
            };
            s.contract_services.push(cs.clone());
            cs
        })
    }

    pub fn container(&self, name: &str) -> Option<Container> {
        self.with(|s| s.containers.iter().find(|c| c.name == name).cloned())
    }

    pub fn visit_count(&self) -> usize {
        self.with(|s| s.visits.len())
    }
}

impl CompanyRepository for InMemoryStore {
    fn create(&self, name: String) -> impl Future<Output = Result<Company, TerminalError>> + Send {
        let result = self.with(|s| {
            let company = Company {
                id: CompanyId::new(s.next_id()),
                name,
            };
            s.companies.push(company.clone());
            company
        });
        async { Ok(result) }
    }

    fn get_by_id(
        &self,
        id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send {
        let result = self.with(|s| s.companies.iter().find(|c| c.id == id).cloned());
        async { Ok(result) }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send {
        let result = self.with(|s| s.companies.iter().find(|c| c.name == name).cloned());
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Company>, TerminalError>> + Send {
        let mut result = self.with(|s| s.companies.clone());
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }
}

impl ContainerRepository for InMemoryStore {
    fn get_by_id(
        &self,
        id: ContainerId,
    ) -> impl Future<Output = Result<Option<Container>, TerminalError>> + Send {
        let result = self.with(|s| s.containers.iter().find(|c| c.id == id).cloned());
        async { Ok(result) }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Container>, TerminalError>> + Send {
        let result = self.container(name);
        async { Ok(result) }
    }
}

impl ContainerVisitRepository for InMemoryStore {
    fn create(
        &self,
        visit: NewContainerVisit,
    ) -> impl Future<Output = Result<ContainerVisit, TerminalError>> + Send {
        let result = self.with(|s| {
            let mut draft = s.clone();
            let visit = draft.insert_visit(visit)?;
            *s = draft;
            Ok(visit)
        });
        async { result }
    }

    fn create_many(
        &self,
        visits: Vec<NewContainerVisit>,
    ) -> impl Future<Output = Result<Vec<ContainerVisit>, TerminalError>> + Send {
        let result = self.with(|s| {
            let mut draft = s.clone();
            let total = visits.len();
            let mut created = Vec::with_capacity(total);
            for (index, visit) in visits.into_iter().enumerate() {
                match draft.insert_visit(visit) {
                    Ok(visit) => created.push(visit),
                    Err(TerminalError::Validation(errors)) => {
                        let mut row_errors = vec![FieldErrors::new(); total];
                        row_errors[index] = errors;
                        return Err(TerminalError::BatchValidation(row_errors));
                    }
                    Err(err) => return Err(err),
                }
            }
            *s = draft;
            Ok(created)
        });
        async { result }
    }

    fn get_by_id(
        &self,
        id: VisitId,
    ) -> impl Future<Output = Result<Option<ContainerVisit>, TerminalError>> + Send {
        let result = self.with(|s| s.visits.iter().find(|v| v.id == id).map(|v| s.hydrate(v)));
        async { Ok(result) }
    }

    fn update(
        &self,
        visit: ContainerVisit,
    ) -> impl Future<Output = Result<ContainerVisit, TerminalError>> + Send {
        let result = self.with(|s| {
            let index = s
                .visits
                .iter()
                .position(|v| v.id == visit.id)
                .ok_or_else(|| NotFoundError {
                    entity: "ContainerVisit",
                    id: visit.id.to_string(),
                })?;
            let mut draft = s.clone();
            let previous = draft.visits[index].container.id;
            let was_active = draft.visits[index].is_active();
            let container_id = draft.upsert_container(&visit.container.name, visit.container.size);
            let moved = container_id != previous;
            let active = visit.is_active();
            if was_active && (moved || !active) {
                draft.set_in_storage(previous, false);
            }
            if active && (moved || !was_active) {
                draft.claim(container_id)?;
            }

            let mut stored = visit;
            stored.container = draft.container_by_id(container_id)?;
            draft.visits[index] = stored.clone();
            *s = draft;
            Ok(stored)
        });
        async { result }
    }

    fn delete(&self, id: VisitId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        self.with(|s| {
            if let Some(index) = s.visits.iter().position(|v| v.id == id) {
                let visit = s.visits.remove(index);
                if visit.is_active() {
                    s.set_in_storage(visit.container.id, false);
                }
            }
        });
        async { Ok(()) }
    }

    fn list(
        &self,
        filter: VisitFilter,
        page: LimitOffset,
        now: Timestamp,
    ) -> impl Future<Output = Result<Page<ContainerVisit>, TerminalError>> + Send {
        let mut matching: Vec<ContainerVisit> = self.with(|s| {
            s.visits
                .iter()
                .filter(|v| filter.matches(v, now))
                .map(|v| s.hydrate(v))
                .collect()
        });
        matching.sort_by(|a, b| b.entry_time.cmp(&a.entry_time).then(b.id.cmp(&a.id)));
        let count = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .collect();
        async move {
            Ok(Page {
                count,
                limit: page.limit,
                offset: page.offset,
                results,
            })
        }
    }

    fn statistics(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<TerminalStatistics, TerminalError>> + Send {
        let today = now.date_naive();
        let result = self.with(|s| {
            let active: Vec<&ContainerVisit> = s.visits.iter().filter(|v| v.is_active()).collect();
            let count = |pred: &dyn Fn(&ContainerVisit) -> bool| {
                s.visits.iter().filter(|v| pred(v)).count() as i64
            };
            TerminalStatistics {
                total_visits: s.visits.len() as i64,
                in_terminal: active.len() as i64,
                left_terminal: count(&|v| !v.is_active()),
                empty_in_terminal: active
                    .iter()
                    .filter(|v| v.container_state == ContainerState::Empty)
                    .count() as i64,
                loaded_in_terminal: active
                    .iter()
                    .filter(|v| v.container_state == ContainerState::Loaded)
                    .count() as i64,
                in_terminal_by_size: ContainerSize::ALL
                    .iter()
                    .map(|&size| SizeCount {
                        size,
                        count: active.iter().filter(|v| v.container.size == size).count()
                            as i64,
                    })
                    .filter(|entry| entry.count > 0)
                    .collect(),
                arrived_today: count(&|v| v.entry_time.date_naive() == today),
                dispatched_today: count(&|v| {
                    v.exit_time.is_some_and(|exit| exit.date_naive() == today)
                }),
            }
        });
        async { Ok(result) }
    }

    fn add_image(
        &self,
        visit_id: VisitId,
        image: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, TerminalError>> + Send {
        let result = self.with(|s| attach(s, visit_id, image, |v| &mut v.images));
        async { result }
    }

    fn remove_image(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<bool, TerminalError>> + Send {
        let result = self.with(|s| detach(s, id, |v| &mut v.images));
        async move { Ok(result) }
    }

    fn add_document(
        &self,
        visit_id: VisitId,
        document: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, TerminalError>> + Send {
        let result = self.with(|s| attach(s, visit_id, document, |v| &mut v.documents));
        async { result }
    }

    fn remove_document(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<bool, TerminalError>> + Send {
        let result = self.with(|s| detach(s, id, |v| &mut v.documents));
        async move { Ok(result) }
    }
}

fn attach(
    s: &mut State,
    visit_id: VisitId,
    new: NewAttachment,
    list: impl Fn(&mut ContainerVisit) -> &mut Vec<Attachment>,
) -> Result<Attachment, TerminalError> {
    let id = AttachmentId::new(s.next_id());
    let visit = s
        .visits
        .iter_mut()
        .find(|v| v.id == visit_id)
        .ok_or_else(|| NotFoundError {
            entity: "ContainerVisit",
            id: visit_id.to_string(),
        })?;
    let attachment = Attachment {
        id,
        visit_id,
        name: new.name,
        url: new.url,
    };
    list(visit).push(attachment.clone());
    Ok(attachment)
}

fn detach(
    s: &mut State,
    id: AttachmentId,
    list: impl Fn(&mut ContainerVisit) -> &mut Vec<Attachment>,
) -> bool {
    for visit in &mut s.visits {
        let attachments = list(visit);
        if let Some(index) = attachments.iter().position(|a| a.id == id) {
            attachments.remove(index);
            return true;
        }
    }
    false
}

impl CatalogRepository for InMemoryStore {
    fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> impl Future<Output = Result<ServiceType, TerminalError>> + Send {
        let result = self.with(|s| {
            let created = ServiceType {
                id: ServiceTypeId::new(s.next_id()),
                name: service_type.name,
                unit_of_measure: service_type.unit_of_measure,
            };
            s.service_types.push(created.clone());
            created
        });
        async { Ok(result) }
    }

    fn get_service_type(
        &self,
        id: ServiceTypeId,
    ) -> impl Future<Output = Result<Option<ServiceType>, TerminalError>> + Send {
        let result = self.with(|s| s.service_types.iter().find(|t| t.id == id).cloned());
        async { Ok(result) }
    }

    fn list_service_types(
        &self,
    ) -> impl Future<Output = Result<Vec<ServiceType>, TerminalError>> + Send {
        let result = self.with(|s| s.service_types.clone());
        async { Ok(result) }
    }

    fn create_service(
        &self,
        service: NewTerminalService,
    ) -> impl Future<Output = Result<TerminalService, TerminalError>> + Send {
        let result = self.with(|s| {
            let service_type = s
                .service_types
                .iter()
                .find(|t| t.id == service.service_type_id)
                .cloned()
                .ok_or_else(|| NotFoundError {
                    entity: "ServiceType",
                    id: service.service_type_id.to_string(),
                })?;
            let created = TerminalService {
                id: ServiceId::new(s.next_id()),
                name: service.name,
                description: service.description,
                service_type,
                container_size: service.container_size,
                container_state: service.container_state,
                base_price: service.base_price,
                multiple_usage: service.multiple_usage,
            };
            s.services.push(created.clone());
            Ok(created)
        });
        async { result }
    }

    fn get_service(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<TerminalService>, TerminalError>> + Send {
        let result = self.with(|s| s.services.iter().find(|t| t.id == id).cloned());
        async { Ok(result) }
    }

    fn list_services(
        &self,
    ) -> impl Future<Output = Result<Vec<TerminalService>, TerminalError>> + Send {
        let result = self.with(|s| s.services.clone());
        async { Ok(result) }
    }

    fn create_contract(
        &self,
        contract: NewContract,
    ) -> impl Future<Output = Result<Contract, TerminalError>> + Send {
        let result = self.with(|s| {
            if contract.is_active {
                for existing in &mut s.contracts {
                    if existing.company_id == contract.company_id {
                        existing.is_active = false;
                    }
                }
            }
            let created = Contract {
                id: ContractId::new(s.next_id()),
                company_id: contract.company_id,
                name: contract.name,
                free_days: contract.free_days,
                is_active: contract.is_active,
            };
            s.contracts.push(created.clone());
            created
        });
        async { Ok(result) }
    }

    fn get_contract(
        &self,
        id: ContractId,
    ) -> impl Future<Output = Result<Option<Contract>, TerminalError>> + Send {
        let result = self.with(|s| s.contracts.iter().find(|c| c.id == id).cloned());
        async { Ok(result) }
    }

    fn find_active_contract(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Option<Contract>, TerminalError>> + Send {
        let result = self.with(|s| {
            s.contracts
                .iter()
                .find(|c| c.company_id == company_id && c.is_active)
                .cloned()
        });
        async { Ok(result) }
    }

    fn add_contract_service(
        &self,
        contract_service: NewContractService,
    ) -> impl Future<Output = Result<ContractService, TerminalError>> + Send {
        let result = self.with(|s| {
            let service = s
                .services
                .iter()
                .find(|t| t.id == contract_service.service_id)
                .cloned()
                .ok_or_else(|| NotFoundError {
                    entity: "Service",
                    id: contract_service.service_id.to_string(),
                })?;
            let created = ContractService {
                id: ContractServiceId::new(s.next_id()),
                contract_id: contract_service.contract_id,
                service,
                price: contract_service.price,
            };
            s.contract_services.push(created.clone());
            Ok(created)
        });
        async { result }
    }

    fn list_contract_services(
        &self,
        contract_id: ContractId,
    ) -> impl Future<Output = Result<Vec<ContractService>, TerminalError>> + Send {
        let result = self.with(|s| {
            s.contract_services
                .iter()
                .filter(|cs| cs.contract_id == contract_id)
                .cloned()
                .collect()
        });
        async { Ok(result) }
    }
}

pub fn ts(value: &str) -> Timestamp {
    time::parse(value).unwrap()
}

/// Active loaded 40ft visit of "Baltic Shipping", arrived by wagon.
pub fn visit_fixture(container_name: &str, entry: &str) -> ContainerVisit {
    ContainerVisit {
        id: VisitId::new(1),
        container: Container {
            id: ContainerId::new(1),
            name: container_name.to_string(),
            size: ContainerSize::Ft40,
            in_storage: true,
        },
        company: Company {
            id: CompanyId::new(1),
            name: "Baltic Shipping".into(),
        },
        contract: None,
        container_state: ContainerState::Loaded,
        container_owner: "MSC".into(),
        product_name: Some("Timber".into()),
        transport_type: TransportType::Wagon,
        transport_number: "52345678".into(),
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

/// Running per-operation service snapshot named `name`.
pub fn applied_fixture(id: i64, name: &str, from: &str) -> AppliedService {
    AppliedService {
        id: AppliedServiceId::new(id),
        contract_service_id: ContractServiceId::new(id),
        service_id: ServiceId::new(id),
        name: name.to_string(),
        service_type: ServiceType {
            id: ServiceTypeId::new(id),
            name: format!("{name} type"),
            unit_of_measure: UnitOfMeasure::Operation,
        },
        container_size: None,
        base_price: Decimal::new(1000, 2),
        price: Decimal::new(1000, 2),
        date_from: ts(from),
        date_to: None,
        notes: None,
        performed_at: None,
    }
}

//! Container storage service: registering, updating, dispatching and
//! listing container visits.

use std::collections::{HashMap, HashSet};

use terminal_domain::catalog::ContractService;
use terminal_domain::choices::{ContainerSize, ContainerState, TransportType};
use terminal_domain::company::{Company, Contract};
use terminal_domain::container;
use terminal_domain::error::{FieldErrors, NotFoundError, TerminalError, ValidationError};
use terminal_domain::id::{AttachmentId, CompanyId, VisitId};
use terminal_domain::statistics::TerminalStatistics;
use terminal_domain::time::{self, Timestamp};
use terminal_domain::visit::{
    Attachment, ContainerVisit, ContractTerms, NewAppliedService, NewAttachment,
    NewContainerVisit, ServiceUsage,
};

use crate::commands::{BatchRow, DispatchVisit, RegisterVisit, UpdateVisit};
use crate::pagination::{LimitOffset, Page};
use crate::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use crate::query::VisitFilter;

/// Application service for the container visit lifecycle.
pub struct ContainerStorageService<V, C, Co, K> {
    visits: V,
    containers: C,
    companies: Co,
    catalog: K,
}

impl<V, C, Co, K> ContainerStorageService<V, C, Co, K>
where
    V: ContainerVisitRepository,
    C: ContainerRepository,
    Co: CompanyRepository,
    K: CatalogRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(visits: V, containers: C, companies: Co, catalog: K) -> Self {
        Self {
            visits,
            containers,
            companies,
            catalog,
        }
    }

    /// Register a container arriving at the terminal.
    ///
    /// The visit is billed under the company's active contract; requested
    /// services must be priced by that contract and apply to the container.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when the container is already in
    /// storage, the company does not exist or a service is not available,
    /// or a storage error from the repositories.
    #[tracing::instrument(skip(self, cmd), fields(container = %cmd.container_name))]
    pub async fn register_container_entry(
        &self,
        cmd: RegisterVisit,
    ) -> Result<ContainerVisit, TerminalError> {
        let mut errors = FieldErrors::new();
        if let Err(err) = container::validate_name(&cmd.container_name) {
            errors.add("container_name", err);
        } else if self.is_in_storage(&cmd.container_name).await? {
            errors.add("container_name", ValidationError::ContainerInStorage);
        }
        if self.companies.get_by_id(cmd.company_id).await?.is_none() {
            errors.add("company_id", ValidationError::CustomerNotFound);
        }
        errors.into_result()?;

        let contract = self.catalog.find_active_contract(cmd.company_id).await?;
        let services = self
            .resolve_services(
                contract.as_ref(),
                (cmd.container_size, cmd.container_state),
                cmd.entry_time,
                cmd.services,
            )
            .await?;

        let new = services
            .into_iter()
            .fold(
                NewContainerVisit::builder()
                    .container(cmd.container_name, cmd.container_size)
                    .company_id(cmd.company_id)
                    .contract(contract.as_ref().map(ContractTerms::from))
                    .container_state(cmd.container_state)
                    .container_owner(cmd.container_owner)
                    .product_name(cmd.product_name)
                    .transport(cmd.transport_type, cmd.transport_number)
                    .entry_time(cmd.entry_time)
                    .notes(cmd.notes),
                |builder, service| builder.service(service),
            )
            .build()?;

        let visit = self.visits.create(new).await?;
        tracing::info!(visit_id = %visit.id, "container registered");
        Ok(visit)
    }

    /// Import many visits at once, all or nothing.
    ///
    /// Every row is checked before anything is stored. Rows carrying an exit
    /// time are stored as already dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::BatchValidation`] with one entry per row
    /// (empty for valid rows) when any row fails, or a storage error.
    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn register_container_batch_entry(
        &self,
        rows: Vec<BatchRow>,
    ) -> Result<Vec<ContainerVisit>, TerminalError> {
        let mut companies: HashMap<String, Option<Company>> = HashMap::new();
        let mut active_names: HashSet<String> = HashSet::new();
        let mut row_errors = Vec::with_capacity(rows.len());
        let mut ready = Vec::with_capacity(rows.len());

        for row in rows {
            let mut errors = FieldErrors::new();

            let state = ContainerState::from_alias(&row.container_state);
            if state.is_none() {
                errors.add("container_state", ValidationError::InvalidContainerState);
            }
            let transport = TransportType::from_alias(&row.transport_type);
            if transport.is_none() {
                errors.add("transport_type", ValidationError::InvalidTransportType);
            }
            let dispatch_method = row
                .dispatch_method
                .as_deref()
                .map(str::trim)
                .filter(|method| !method.is_empty());
            let exit_transport = dispatch_method.and_then(TransportType::from_alias);
            if dispatch_method.is_some() && exit_transport.is_none() {
                errors.add("dispatch_method", ValidationError::InvalidTransportType);
            }

            let company_name = row.company_name.trim().to_string();
            let company = match companies.get(&company_name) {
                Some(cached) => cached.clone(),
                None => {
                    let found = self.companies.find_by_name(&company_name).await?;
                    companies.insert(company_name, found.clone());
                    found
                }
            };
            if company.is_none() {
                errors.add("company_name", ValidationError::CustomerNotFound);
            }

            if row.exit_time.is_some_and(|exit| exit < row.entry_time) {
                errors.add("exit_time", ValidationError::ExitBeforeEntry);
            }
            if let Err(err) = container::validate_name(&row.container_name) {
                errors.add("container_name", err);
            } else if row.exit_time.is_none() {
                if !active_names.insert(row.container_name.clone()) {
                    errors.add("container_name", ValidationError::DuplicateInBatch);
                } else if self.is_in_storage(&row.container_name).await? {
                    errors.add("container_name", ValidationError::ContainerInStorage);
                }
            }

            if let (true, Some(state), Some(transport), Some(company)) =
                (errors.is_empty(), state, transport, company)
            {
                ready.push((row, state, transport, exit_transport, company));
            }
            row_errors.push(errors);
        }

        if row_errors.iter().any(|errors| !errors.is_empty()) {
            tracing::debug!(
                invalid = row_errors.iter().filter(|e| !e.is_empty()).count(),
                "batch rejected"
            );
            return Err(TerminalError::BatchValidation(row_errors));
        }

        let mut contracts: HashMap<CompanyId, Option<ContractTerms>> = HashMap::new();
        let mut visits = Vec::with_capacity(ready.len());
        for (row, state, transport, exit_transport, company) in ready {
            let contract = match contracts.get(&company.id) {
                Some(terms) => *terms,
                None => {
                    let terms = self
                        .catalog
                        .find_active_contract(company.id)
                        .await?
                        .as_ref()
                        .map(ContractTerms::from);
                    contracts.insert(company.id, terms);
                    terms
                }
            };
            let mut builder = NewContainerVisit::builder()
                .container(row.container_name, row.container_size)
                .company_id(company.id)
                .contract(contract)
                .container_state(state)
                .container_owner(row.container_owner)
                .product_name(row.product_name)
                .transport(transport, row.transport_number)
                .entry_time(row.entry_time);
            if let Some(exit_time) = row.exit_time {
                builder = builder.exit(exit_time, exit_transport, None);
            }
            visits.push(builder.build()?);
        }

        let created = self.visits.create_many(visits).await?;
        tracing::info!(count = created.len(), "batch registered");
        Ok(created)
    }

    /// Patch an existing visit.
    ///
    /// Renaming the container moves the visit to the container with the new
    /// name; the repository creates it when needed. Clearing the exit time
    /// re-opens the visit; setting it closes running services. The storage
    /// flag of a container only follows this visit when the visit holds it.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist,
    /// [`TerminalError::Validation`] when the company does not exist, the
    /// target container is held by another visit or the times are out of
    /// order, or a storage error.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn update_container_visit(
        &self,
        id: VisitId,
        cmd: UpdateVisit,
    ) -> Result<ContainerVisit, TerminalError> {
        let mut visit = self.get_container_visit(id).await?;
        let was_active = visit.is_active();
        let mut errors = FieldErrors::new();

        let company = self.companies.get_by_id(cmd.company_id).await?;
        if company.is_none() {
            errors.add("company_id", ValidationError::CustomerNotFound);
        }

        let entry_time = cmd.entry_time.unwrap_or(visit.entry_time);
        let exit_time = cmd.exit_time.unwrap_or(visit.exit_time);
        if exit_time.is_some_and(|exit| exit < entry_time) {
            errors.add("exit_time", ValidationError::ExitBeforeEntry);
        }

        let renamed = cmd.container_name != visit.container.name;
        let mut target = None;
        if let Err(err) = container::validate_name(&cmd.container_name) {
            errors.add("container_name", err);
        } else if renamed {
            target = self.containers.find_by_name(&cmd.container_name).await?;
        }
        let occupied = if renamed {
            target.as_ref().is_some_and(|c| c.in_storage)
        } else {
            !was_active && visit.container.in_storage
        };
        if exit_time.is_none() && occupied {
            errors.add("container_name", ValidationError::ContainerInStorage);
        }
        errors.into_result()?;

        let company = company
            .ok_or_else(|| TerminalError::field("company_id", ValidationError::CustomerNotFound))?;
        if company.id != visit.company.id {
            visit.contract = self
                .catalog
                .find_active_contract(company.id)
                .await?
                .as_ref()
                .map(ContractTerms::from);
        }
        visit.company = company;

        if let Some(existing) = target {
            visit.container = existing;
        }
        visit.container.name = cmd.container_name;
        visit.container.size = cmd.container_size;

        if let Some(state) = cmd.container_state {
            visit.container_state = state;
        }
        if let Some(owner) = cmd.container_owner {
            visit.container_owner = owner;
        }
        if let Some(product_name) = cmd.product_name {
            visit.product_name = product_name;
        }
        if let Some(kind) = cmd.transport_type {
            visit.transport_type = kind;
        }
        if let Some(number) = cmd.transport_number {
            visit.transport_number = number;
        }
        if let Some(kind) = cmd.exit_transport_type {
            visit.exit_transport_type = kind;
        }
        if let Some(number) = cmd.exit_transport_number {
            visit.exit_transport_number = number;
        }
        if let Some(notes) = cmd.notes {
            visit.notes = notes;
        }
        visit.entry_time = entry_time;
        visit.exit_time = exit_time;

        if let (true, Some(exit)) = (was_active, exit_time) {
            visit.close_running_services(exit);
        }

        let visit = self.visits.update(visit).await?;
        tracing::info!(visit_id = %visit.id, "container visit updated");
        Ok(visit)
    }

    /// Delete a visit and release its container.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_container_visit(&self, id: VisitId) -> Result<(), TerminalError> {
        let visit = self.get_container_visit(id).await?;
        self.visits.delete(visit.id).await?;
        tracing::info!(visit_id = %id, container = %visit.container.name, "container visit deleted");
        Ok(())
    }

    /// Look up a visit by id.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when no visit with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_container_visit(&self, id: VisitId) -> Result<ContainerVisit, TerminalError> {
        self.visits.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "ContainerVisit",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Filtered page of visits, newest entry first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_containers_visits(
        &self,
        filter: VisitFilter,
        page: LimitOffset,
    ) -> Result<Page<ContainerVisit>, TerminalError> {
        self.visits.list(filter, page, time::now()).await
    }

    /// Filtered page of one customer's visits.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the company does not exist,
    /// or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_containers_visits_by_company(
        &self,
        company_id: CompanyId,
        filter: VisitFilter,
        page: LimitOffset,
    ) -> Result<Page<ContainerVisit>, TerminalError> {
        if self.companies.get_by_id(company_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Company",
                id: company_id.to_string(),
            }
            .into());
        }
        let filter = VisitFilter {
            company_id: Some(company_id),
            ..filter
        };
        self.visits.list(filter, page, time::now()).await
    }

    /// Mark a container as having left the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist,
    /// [`TerminalError::Validation`] when it was already dispatched or the
    /// exit precedes the entry, or a storage error.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn dispatch_container_visit(
        &self,
        id: VisitId,
        cmd: DispatchVisit,
    ) -> Result<ContainerVisit, TerminalError> {
        let mut visit = self.get_container_visit(id).await?;
        visit.dispatch(
            cmd.exit_time,
            cmd.exit_transport_type,
            cmd.exit_transport_number,
        )?;
        let visit = self.visits.update(visit).await?;
        tracing::info!(visit_id = %visit.id, container = %visit.container.name, "container dispatched");
        Ok(visit)
    }

    /// Contract services that can still be applied to a visit.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_available_services(
        &self,
        id: VisitId,
    ) -> Result<Vec<ContractService>, TerminalError> {
        let visit = self.get_container_visit(id).await?;
        let Some(contract) = visit.contract else {
            return Ok(Vec::new());
        };
        let offered = self.catalog.list_contract_services(contract.id).await?;
        Ok(visit
            .available_services(&offered)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Attach image metadata to a visit.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist,
    /// [`TerminalError::Validation`] for a blank name or URL, or a storage
    /// error.
    #[tracing::instrument(skip(self, image))]
    pub async fn attach_image(
        &self,
        visit_id: VisitId,
        image: NewAttachment,
    ) -> Result<Attachment, TerminalError> {
        image.validate()?;
        self.get_container_visit(visit_id).await?;
        self.visits.add_image(visit_id, image).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the image does not exist, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_image(&self, id: AttachmentId) -> Result<(), TerminalError> {
        if self.visits.remove_image(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "Image",
                id: id.to_string(),
            }
            .into())
        }
    }

    /// Images attached to a visit, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_images(&self, visit_id: VisitId) -> Result<Vec<Attachment>, TerminalError> {
        Ok(self.get_container_visit(visit_id).await?.images)
    }

    /// Documents attached to a visit, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_documents(
        &self,
        visit_id: VisitId,
    ) -> Result<Vec<Attachment>, TerminalError> {
        Ok(self.get_container_visit(visit_id).await?.documents)
    }

    /// Attach document metadata to a visit.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the visit does not exist,
    /// [`TerminalError::Validation`] for a blank name or URL, or a storage
    /// error.
    #[tracing::instrument(skip(self, document))]
    pub async fn attach_document(
        &self,
        visit_id: VisitId,
        document: NewAttachment,
    ) -> Result<Attachment, TerminalError> {
        document.validate()?;
        self.get_container_visit(visit_id).await?;
        self.visits.add_document(visit_id, document).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when the document does not exist,
    /// or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_document(&self, id: AttachmentId) -> Result<(), TerminalError> {
        if self.visits.remove_document(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "Document",
                id: id.to_string(),
            }
            .into())
        }
    }

    /// Current occupancy of the terminal.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn statistics(&self) -> Result<TerminalStatistics, TerminalError> {
        self.visits.statistics(time::now()).await
    }

    async fn is_in_storage(&self, container_name: &str) -> Result<bool, TerminalError> {
        Ok(self
            .containers
            .find_by_name(container_name)
            .await?
            .is_some_and(|c| c.in_storage))
    }

    async fn resolve_services(
        &self,
        contract: Option<&Contract>,
        (size, state): (ContainerSize, ContainerState),
        entry_time: Timestamp,
        usages: Vec<ServiceUsage>,
    ) -> Result<Vec<NewAppliedService>, TerminalError> {
        if usages.is_empty() {
            return Ok(Vec::new());
        }
        let Some(contract) = contract else {
            return Err(TerminalError::field(
                "services",
                ValidationError::NoActiveContract,
            ));
        };
        let offered = self.catalog.list_contract_services(contract.id).await?;

        let mut errors = FieldErrors::new();
        let mut resolved: Vec<NewAppliedService> = Vec::with_capacity(usages.len());
        for (index, usage) in usages.into_iter().enumerate() {
            let requested = usage.contract_service_id;
            let Some(cs) = offered.iter().find(|cs| cs.id == requested) else {
                errors.add_nested(
                    "services",
                    index,
                    "id",
                    ValidationError::UnknownService(requested.as_i64()),
                );
                continue;
            };
            let repeated = resolved.iter().any(|r| r.contract_service_id == cs.id);
            if !cs.service.applies_to(size, state) || (repeated && !cs.service.multiple_usage) {
                errors.add_nested(
                    "services",
                    index,
                    "id",
                    ValidationError::ServiceUnavailable(requested.as_i64()),
                );
                continue;
            }
            resolved.push(NewAppliedService {
                contract_service_id: cs.id,
                date_from: usage.date_from.unwrap_or(entry_time),
                date_to: usage.date_to,
                notes: usage.notes,
                performed_at: usage.performed_at,
            });
        }
        errors.into_result()?;
        Ok(resolved)
    }
}

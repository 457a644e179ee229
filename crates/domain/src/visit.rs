//! Container visit: one storage episode of a container, from entry to dispatch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{ContractService, ServiceType};
use crate::choices::{ContainerSize, ContainerState, TransportType};
use crate::company::{Company, Contract};
use crate::container::{self, Container};
use crate::error::{FieldErrors, TerminalError, ValidationError};
use crate::id::{
    AppliedServiceId, AttachmentId, CompanyId, ContractId, ContractServiceId, ServiceId, VisitId,
};
use crate::time::Timestamp;

/// Free-day allowance of the contract a visit was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub id: ContractId,
    pub free_days: u32,
}

impl From<&Contract> for ContractTerms {
    fn from(contract: &Contract) -> Self {
        Self {
            id: contract.id,
            free_days: contract.free_days,
        }
    }
}

/// Image or document metadata attached to a visit.
///
/// The file itself lives in external object storage; `url` points at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub visit_id: VisitId,
    pub name: String,
    pub url: String,
}

/// Attachment fields supplied by a caller, before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub name: String,
    pub url: String,
}

impl NewAttachment {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when `name` or `url` is blank.
    pub fn validate(&self) -> Result<(), TerminalError> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", ValidationError::Blank);
        }
        if self.url.trim().is_empty() {
            errors.add("url", ValidationError::Blank);
        }
        errors.into_result()
    }
}

/// A contract service performed for a visit.
///
/// Carries a snapshot of the catalog entry so listings do not need to
/// re-resolve the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedService {
    pub id: AppliedServiceId,
    pub contract_service_id: ContractServiceId,
    pub service_id: ServiceId,
    pub name: String,
    pub service_type: ServiceType,
    pub container_size: Option<ContainerSize>,
    pub base_price: Decimal,
    pub price: Decimal,
    pub date_from: Timestamp,
    pub date_to: Option<Timestamp>,
    pub notes: Option<String>,
    pub performed_at: Option<String>,
}

impl AppliedService {
    /// A service is running until its `date_to` is set.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.date_to.is_none()
    }
}

/// Request to apply a contract service when registering a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUsage {
    pub contract_service_id: ContractServiceId,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub notes: Option<String>,
    pub performed_at: Option<String>,
}

/// A resolved [`ServiceUsage`], ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppliedService {
    pub contract_service_id: ContractServiceId,
    pub date_from: Timestamp,
    pub date_to: Option<Timestamp>,
    pub notes: Option<String>,
    pub performed_at: Option<String>,
}

/// One storage episode of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerVisit {
    pub id: VisitId,
    pub container: Container,
    pub company: Company,
    pub contract: Option<ContractTerms>,
    pub container_state: ContainerState,
    pub container_owner: String,
    pub product_name: Option<String>,
    pub transport_type: TransportType,
    pub transport_number: String,
    pub exit_transport_type: Option<TransportType>,
    pub exit_transport_number: Option<String>,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub notes: Option<String>,
    pub services: Vec<AppliedService>,
    pub images: Vec<Attachment>,
    pub documents: Vec<Attachment>,
}

/// Calendar days (UTC) spanned by `from..=to`, counting both ends; at least 1.
#[must_use]
pub fn calendar_days(from: Timestamp, to: Timestamp) -> i64 {
    ((to.date_naive() - from.date_naive()).num_days() + 1).max(1)
}

impl ContainerVisit {
    /// A visit is active while the container is still in the terminal.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.exit_time.is_none()
    }

    /// End of the storage period: the exit time, or `now` for active visits.
    #[must_use]
    pub fn storage_end(&self, now: Timestamp) -> Timestamp {
        self.exit_time.unwrap_or(now)
    }

    /// Number of calendar days the container has been (or was) stored.
    #[must_use]
    pub fn storage_days(&self, now: Timestamp) -> i64 {
        calendar_days(self.entry_time, self.storage_end(now))
    }

    /// Free days granted by the visit's contract, if any.
    #[must_use]
    pub fn free_days(&self) -> Option<u32> {
        self.contract.map(|c| c.free_days)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.container_state == ContainerState::Empty
    }

    /// Applied services that are still running.
    pub fn active_services(&self) -> impl Iterator<Item = &AppliedService> {
        self.services.iter().filter(|s| s.is_running())
    }

    /// Contract services that can still be billed to this visit.
    ///
    /// A service is offered when it applies to the container's size and
    /// state, and either allows multiple usage or has not been applied yet.
    #[must_use]
    pub fn available_services<'a>(
        &self,
        offered: &'a [ContractService],
    ) -> Vec<&'a ContractService> {
        offered
            .iter()
            .filter(|cs| {
                cs.service
                    .applies_to(self.container.size, self.container_state)
            })
            .filter(|cs| {
                cs.service.multiple_usage
                    || !self
                        .services
                        .iter()
                        .any(|applied| applied.contract_service_id == cs.id)
            })
            .collect()
    }

    /// Mark the container as having left the terminal.
    ///
    /// Running services are closed at `exit_time` and the container is
    /// released from storage.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when the visit was already
    /// dispatched or `exit_time` precedes the entry time.
    pub fn dispatch(
        &mut self,
        exit_time: Timestamp,
        exit_transport_type: TransportType,
        exit_transport_number: String,
    ) -> Result<(), TerminalError> {
        if !self.is_active() {
            return Err(TerminalError::field(
                "exit_time",
                ValidationError::AlreadyDispatched,
            ));
        }
        if exit_time < self.entry_time {
            return Err(TerminalError::field(
                "exit_time",
                ValidationError::ExitBeforeEntry,
            ));
        }
        self.exit_time = Some(exit_time);
        self.exit_transport_type = Some(exit_transport_type);
        self.exit_transport_number = Some(exit_transport_number);
        self.close_running_services(exit_time);
        self.container.in_storage = false;
        Ok(())
    }

    /// Set `date_to` of every running service, never before its `date_from`.
    pub fn close_running_services(&mut self, at: Timestamp) {
        for service in &mut self.services {
            if service.date_to.is_none() {
                service.date_to = Some(at.max(service.date_from));
            }
        }
    }
}

/// Visit fields supplied by a caller, before the row exists.
///
/// The repository resolves `container_name` to an existing container row
/// (or creates one) and marks it in storage when the visit is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContainerVisit {
    pub container_name: String,
    pub container_size: ContainerSize,
    pub company_id: CompanyId,
    pub contract: Option<ContractTerms>,
    pub container_state: ContainerState,
    pub container_owner: String,
    pub product_name: Option<String>,
    pub transport_type: TransportType,
    pub transport_number: String,
    pub exit_transport_type: Option<TransportType>,
    pub exit_transport_number: Option<String>,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub notes: Option<String>,
    pub services: Vec<NewAppliedService>,
}

impl NewContainerVisit {
    /// Create a builder for constructing a [`NewContainerVisit`].
    #[must_use]
    pub fn builder() -> NewContainerVisitBuilder {
        NewContainerVisitBuilder::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] listing every failing field.
    pub fn validate(&self) -> Result<(), TerminalError> {
        let mut errors = FieldErrors::new();
        if let Err(err) = container::validate_name(&self.container_name) {
            errors.add("container_name", err);
        }
        if self.exit_time.is_some_and(|exit| exit < self.entry_time) {
            errors.add("exit_time", ValidationError::ExitBeforeEntry);
        }
        for (index, service) in self.services.iter().enumerate() {
            if service.date_to.is_some_and(|to| to < service.date_from) {
                errors.add_nested("services", index, "date_to", ValidationError::EndBeforeStart);
            }
        }
        errors.into_result()
    }
}

/// Step-by-step builder for [`NewContainerVisit`].
#[derive(Debug)]
pub struct NewContainerVisitBuilder {
    container_name: Option<String>,
    container_size: ContainerSize,
    company_id: Option<CompanyId>,
    contract: Option<ContractTerms>,
    container_state: ContainerState,
    container_owner: String,
    product_name: Option<String>,
    transport_type: TransportType,
    transport_number: String,
    exit: Option<(Timestamp, Option<TransportType>, Option<String>)>,
    entry_time: Option<Timestamp>,
    notes: Option<String>,
    services: Vec<NewAppliedService>,
}

impl Default for NewContainerVisitBuilder {
    fn default() -> Self {
        Self {
            container_name: None,
            container_size: ContainerSize::Ft20,
            company_id: None,
            contract: None,
            container_state: ContainerState::Empty,
            container_owner: String::new(),
            product_name: None,
            transport_type: TransportType::Auto,
            transport_number: String::new(),
            exit: None,
            entry_time: None,
            notes: None,
            services: Vec::new(),
        }
    }
}

impl NewContainerVisitBuilder {
    #[must_use]
    pub fn container(mut self, name: impl Into<String>, size: ContainerSize) -> Self {
        self.container_name = Some(name.into());
        self.container_size = size;
        self
    }

    #[must_use]
    pub fn company_id(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    #[must_use]
    pub fn contract(mut self, contract: Option<ContractTerms>) -> Self {
        self.contract = contract;
        self
    }

    #[must_use]
    pub fn container_state(mut self, state: ContainerState) -> Self {
        self.container_state = state;
        self
    }

    #[must_use]
    pub fn container_owner(mut self, owner: impl Into<String>) -> Self {
        self.container_owner = owner.into();
        self
    }

    #[must_use]
    pub fn product_name(mut self, product_name: Option<String>) -> Self {
        self.product_name = product_name;
        self
    }

    #[must_use]
    pub fn transport(mut self, kind: TransportType, number: impl Into<String>) -> Self {
        self.transport_type = kind;
        self.transport_number = number.into();
        self
    }

    #[must_use]
    pub fn entry_time(mut self, entry_time: Timestamp) -> Self {
        self.entry_time = Some(entry_time);
        self
    }

    #[must_use]
    pub fn exit(
        mut self,
        exit_time: Timestamp,
        kind: Option<TransportType>,
        number: Option<String>,
    ) -> Self {
        self.exit = Some((exit_time, kind, number));
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub fn service(mut self, service: NewAppliedService) -> Self {
        self.services.push(service);
        self
    }

    /// Consume the builder, validate, and return a [`NewContainerVisit`].
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] if required fields are missing
    /// or invariants fail.
    pub fn build(self) -> Result<NewContainerVisit, TerminalError> {
        let mut missing = FieldErrors::new();
        if self.company_id.is_none() {
            missing.add("company_id", ValidationError::Required);
        }
        if self.entry_time.is_none() {
            missing.add("entry_time", ValidationError::Required);
        }
        let (Some(company_id), Some(entry_time)) = (self.company_id, self.entry_time) else {
            return Err(missing.into());
        };
        let (exit_time, exit_transport_type, exit_transport_number) = match self.exit {
            Some((time, kind, number)) => (Some(time), kind, number),
            None => (None, None, None),
        };
        let visit = NewContainerVisit {
            container_name: self.container_name.unwrap_or_default(),
            container_size: self.container_size,
            company_id,
            contract: self.contract,
            container_state: self.container_state,
            container_owner: self.container_owner,
            product_name: self.product_name,
            transport_type: self.transport_type,
            transport_number: self.transport_number,
            exit_transport_type,
            exit_transport_number,
            entry_time,
            exit_time,
            notes: self.notes,
            services: self.services,
        };
        visit.validate()?;
        Ok(visit)
    }
}

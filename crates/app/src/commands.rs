//! Inputs of the container storage use-cases.
//!
//! Driving adapters parse and shape-check requests into these structs; the
//! services then enforce the rules that need storage lookups.

use terminal_domain::choices::{ContainerSize, ContainerState, TransportType};
use terminal_domain::id::CompanyId;
use terminal_domain::time::Timestamp;
use terminal_domain::visit::ServiceUsage;

/// Register a container arriving at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterVisit {
    pub container_name: String,
    pub container_size: ContainerSize,
    pub company_id: CompanyId,
    pub container_state: ContainerState,
    pub container_owner: String,
    pub product_name: Option<String>,
    pub transport_type: TransportType,
    pub transport_number: String,
    pub entry_time: Timestamp,
    pub notes: Option<String>,
    pub services: Vec<ServiceUsage>,
}

/// One spreadsheet row of a batch import.
///
/// State and transport columns hold free text (`порожний`, `Wagon`, ...)
/// and are resolved by the import itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub container_name: String,
    pub container_size: ContainerSize,
    pub company_name: String,
    pub container_state: String,
    pub container_owner: String,
    pub product_name: Option<String>,
    pub transport_type: String,
    pub transport_number: String,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub dispatch_method: Option<String>,
}

/// Partial update of a visit.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the value; clearing `exit_time` re-opens a dispatched visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVisit {
    pub container_name: String,
    pub container_size: ContainerSize,
    pub company_id: CompanyId,
    pub container_state: Option<ContainerState>,
    pub container_owner: Option<String>,
    pub product_name: Option<Option<String>>,
    pub transport_type: Option<TransportType>,
    pub transport_number: Option<String>,
    pub exit_transport_type: Option<Option<TransportType>>,
    pub exit_transport_number: Option<Option<String>>,
    pub entry_time: Option<Timestamp>,
    pub exit_time: Option<Option<Timestamp>>,
    pub notes: Option<Option<String>>,
}

impl UpdateVisit {
    /// An update that only restates the required fields.
    #[must_use]
    pub fn new(container_name: impl Into<String>, size: ContainerSize, company_id: CompanyId) -> Self {
        Self {
            container_name: container_name.into(),
            container_size: size,
            company_id,
            container_state: None,
            container_owner: None,
            product_name: None,
            transport_type: None,
            transport_number: None,
            exit_transport_type: None,
            exit_transport_number: None,
            entry_time: None,
            exit_time: None,
            notes: None,
        }
    }
}

/// Mark a container as having left the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchVisit {
    pub exit_time: Timestamp,
    pub exit_transport_type: TransportType,
    pub exit_transport_number: String,
}

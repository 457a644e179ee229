//! JSON views of visits returned by the API.
//!
//! Timestamps are rendered with [`time::format`]; prices are decimal strings.

use rust_decimal::Decimal;
use serde::Serialize;

use terminal_domain::catalog::{ContractService, ServiceType};
use terminal_domain::choices::{ContainerSize, ContainerState, TransportType};
use terminal_domain::company::Company;
use terminal_domain::id::{
    AppliedServiceId, AttachmentId, CompanyId, ContainerId, ContractServiceId, VisitId,
};
use terminal_domain::time::{self, Timestamp};
use terminal_domain::visit::{AppliedService, Attachment, ContainerVisit};

fn format_opt(ts: Option<Timestamp>) -> Option<String> {
    ts.map(time::format)
}

#[derive(Debug, Serialize)]
pub struct ContainerRef {
    pub id: ContainerId,
    pub name: String,
    pub size: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CompanyRef {
    pub id: CompanyId,
    pub name: String,
}

impl From<&Company> for CompanyRef {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageView {
    pub id: AttachmentId,
    pub image: String,
    pub name: String,
}

impl From<&Attachment> for ImageView {
    fn from(image: &Attachment) -> Self {
        Self {
            id: image.id,
            image: image.url.clone(),
            name: image.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: AttachmentId,
    pub document: String,
    pub name: String,
}

impl From<&Attachment> for DocumentView {
    fn from(document: &Attachment) -> Self {
        Self {
            id: document.id,
            document: document.url.clone(),
            name: document.name.clone(),
        }
    }
}

/// Body of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisteredVisit {
    pub id: VisitId,
    pub container: ContainerRef,
    pub container_state: ContainerState,
    pub transport_type: TransportType,
    pub transport_number: String,
    pub product_name: Option<String>,
    pub container_owner: String,
    pub company: CompanyRef,
    pub entry_time: String,
    pub notes: Option<String>,
}

impl From<&ContainerVisit> for RegisteredVisit {
    fn from(visit: &ContainerVisit) -> Self {
        Self {
            id: visit.id,
            container: ContainerRef {
                id: visit.container.id,
                name: visit.container.name.clone(),
                size: visit.container.size.as_str(),
            },
            container_state: visit.container_state,
            transport_type: visit.transport_type,
            transport_number: visit.transport_number.clone(),
            product_name: visit.product_name.clone(),
            container_owner: visit.container_owner.clone(),
            company: CompanyRef::from(&visit.company),
            entry_time: time::format(visit.entry_time),
            notes: visit.notes.clone(),
        }
    }
}

/// A service applied to a visit, priced at the time it was applied.
#[derive(Debug, Serialize)]
pub struct AppliedServiceView {
    pub id: AppliedServiceId,
    pub name: String,
    pub date_from: String,
    pub date_to: Option<String>,
    pub notes: Option<String>,
    pub performed_at: Option<String>,
    pub service_type: ServiceType,
    pub base_price: Decimal,
    pub price: Decimal,
}

impl From<&AppliedService> for AppliedServiceView {
    fn from(service: &AppliedService) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            date_from: time::format(service.date_from),
            date_to: format_opt(service.date_to),
            notes: service.notes.clone(),
            performed_at: service.performed_at.clone(),
            service_type: service.service_type.clone(),
            base_price: service.base_price,
            price: service.price,
        }
    }
}

/// A visit with its container, customer, attachments and services.
///
/// The list endpoint shows the container size label (`20ft HC`), the detail
/// endpoint its wire value (`20HC`).
#[derive(Debug, Serialize)]
pub struct VisitView {
    pub id: VisitId,
    pub container: ContainerRef,
    pub company: CompanyRef,
    pub images: Vec<ImageView>,
    pub documents: Vec<DocumentView>,
    pub product_name: Option<String>,
    pub container_owner: String,
    pub transport_type: TransportType,
    pub transport_number: String,
    pub exit_transport_type: Option<TransportType>,
    pub exit_transport_number: Option<String>,
    pub container_state: ContainerState,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub storage_days: i64,
    pub notes: Option<String>,
    pub free_days: Option<u32>,
    pub services: Vec<AppliedServiceView>,
}

impl VisitView {
    pub fn list_item(visit: &ContainerVisit, now: Timestamp) -> Self {
        Self::build(visit, now, visit.container.size.label())
    }

    pub fn detail(visit: &ContainerVisit, now: Timestamp) -> Self {
        Self::build(visit, now, visit.container.size.as_str())
    }

    fn build(visit: &ContainerVisit, now: Timestamp, size: &'static str) -> Self {
        Self {
            id: visit.id,
            container: ContainerRef {
                id: visit.container.id,
                name: visit.container.name.clone(),
                size,
            },
            company: CompanyRef::from(&visit.company),
            images: visit.images.iter().map(ImageView::from).collect(),
            documents: visit.documents.iter().map(DocumentView::from).collect(),
            product_name: visit.product_name.clone(),
            container_owner: visit.container_owner.clone(),
            transport_type: visit.transport_type,
            transport_number: visit.transport_number.clone(),
            exit_transport_type: visit.exit_transport_type,
            exit_transport_number: visit.exit_transport_number.clone(),
            container_state: visit.container_state,
            entry_time: time::format(visit.entry_time),
            exit_time: format_opt(visit.exit_time),
            storage_days: visit.storage_days(now),
            notes: visit.notes.clone(),
            free_days: visit.free_days(),
            services: visit.services.iter().map(AppliedServiceView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerContainer {
    pub id: ContainerId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ActiveServiceView {
    pub id: AppliedServiceId,
    pub name: String,
    pub service_type: String,
    pub container_size: Option<ContainerSize>,
    pub price: Decimal,
}

/// One row of a customer's visit list, with the running bill.
#[derive(Debug, Serialize)]
pub struct CustomerVisitItem {
    pub id: VisitId,
    pub container: CustomerContainer,
    pub company: CompanyRef,
    pub images: Vec<ImageView>,
    pub documents: Vec<DocumentView>,
    pub is_empty: bool,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub storage_days: i64,
    pub notes: Option<String>,
    pub total_storage_cost: Decimal,
    pub active_services: Vec<ActiveServiceView>,
}

impl CustomerVisitItem {
    pub fn new(visit: &ContainerVisit, now: Timestamp) -> Self {
        Self {
            id: visit.id,
            container: CustomerContainer {
                id: visit.container.id,
                name: visit.container.name.clone(),
                kind: visit.container.size.label(),
            },
            company: CompanyRef::from(&visit.company),
            images: visit.images.iter().map(ImageView::from).collect(),
            documents: visit.documents.iter().map(DocumentView::from).collect(),
            is_empty: visit.is_empty(),
            entry_time: time::format(visit.entry_time),
            exit_time: format_opt(visit.exit_time),
            storage_days: visit.storage_days(now),
            notes: visit.notes.clone(),
            total_storage_cost: visit.total_storage_cost(now),
            active_services: visit
                .active_services()
                .map(|service| ActiveServiceView {
                    id: service.id,
                    name: service.name.clone(),
                    service_type: service.service_type.name.clone(),
                    container_size: service.container_size,
                    price: service.price,
                })
                .collect(),
        }
    }
}

/// A contract service that can still be applied to a visit.
#[derive(Debug, Serialize)]
pub struct AvailableServiceView {
    pub id: ContractServiceId,
    pub name: String,
    pub description: String,
    pub container_size: Option<ContainerSize>,
    pub container_state: Option<ContainerState>,
    pub service_type: ServiceType,
    pub base_price: Decimal,
    pub multiple_usage: bool,
    pub price: Decimal,
}

impl From<ContractService> for AvailableServiceView {
    fn from(offer: ContractService) -> Self {
        let service = offer.service;
        Self {
            id: offer.id,
            name: service.name,
            description: service.description,
            container_size: service.container_size,
            container_state: service.container_state,
            service_type: service.service_type,
            base_price: service.base_price,
            multiple_usage: service.multiple_usage,
            price: offer.price,
        }
    }
}

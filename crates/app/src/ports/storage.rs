//! Storage port: repository traits for companies, containers and visits.

use std::future::Future;

use terminal_domain::company::Company;
use terminal_domain::container::Container;
use terminal_domain::error::TerminalError;
use terminal_domain::id::{AttachmentId, CompanyId, ContainerId, VisitId};
use terminal_domain::statistics::TerminalStatistics;
use terminal_domain::time::Timestamp;
use terminal_domain::visit::{Attachment, ContainerVisit, NewAttachment, NewContainerVisit};

use crate::pagination::{LimitOffset, Page};
use crate::query::VisitFilter;

/// Repository for persisting and querying [`Company`] records.
pub trait CompanyRepository {
    /// Create a new company.
    fn create(&self, name: String) -> impl Future<Output = Result<Company, TerminalError>> + Send;

    /// Get a company by its identifier.
    fn get_by_id(
        &self,
        id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send;

    /// Find a company by its exact name.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send;

    /// Get all companies ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Company>, TerminalError>> + Send;
}

/// Read access to [`Container`] rows. Container names are unique.
///
/// Rows are written only through [`ContainerVisitRepository`], which keeps
/// the `in_storage` flag in step with the visit holding the container.
pub trait ContainerRepository {
    /// Get a container by its identifier.
    fn get_by_id(
        &self,
        id: ContainerId,
    ) -> impl Future<Output = Result<Option<Container>, TerminalError>> + Send;

    /// Find a container by its unique name.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Container>, TerminalError>> + Send;
}

/// Repository for [`ContainerVisit`]s and their attachments.
pub trait ContainerVisitRepository {
    /// Store a visit together with its applied services.
    ///
    /// The container is looked up by name (created when missing) and its size
    /// is refreshed. An active visit claims the container atomically: when
    /// another visit already holds it nothing is stored and the call fails
    /// with a `container_name` validation error.
    fn create(
        &self,
        visit: NewContainerVisit,
    ) -> impl Future<Output = Result<ContainerVisit, TerminalError>> + Send;

    /// Store several visits atomically: either all of them or none.
    ///
    /// A container claimed by another visit fails the whole batch with
    /// [`TerminalError::BatchValidation`], the error sitting at the offending
    /// row.
    fn create_many(
        &self,
        visits: Vec<NewContainerVisit>,
    ) -> impl Future<Output = Result<Vec<ContainerVisit>, TerminalError>> + Send;

    /// Get a visit with its services, images and documents.
    fn get_by_id(
        &self,
        id: VisitId,
    ) -> impl Future<Output = Result<Option<ContainerVisit>, TerminalError>> + Send;

    /// Persist the mutable fields of an existing visit.
    ///
    /// Writes the visit row, the `date_to` of applied services and the size
    /// of the container named by `visit.container.name`, creating that
    /// container when it does not exist yet.
    ///
    /// Storage flags only move with this visit: a visit that was active
    /// releases the container it leaves (or its own container when it gets
    /// an exit time), and a visit that becomes active, or moves while active,
    /// claims its container. A claim on a container held by another visit
    /// fails with a `container_name` validation error and stores nothing.
    fn update(
        &self,
        visit: ContainerVisit,
    ) -> impl Future<Output = Result<ContainerVisit, TerminalError>> + Send;

    /// Delete a visit and everything attached to it, releasing the container.
    fn delete(&self, id: VisitId) -> impl Future<Output = Result<(), TerminalError>> + Send;

    /// Filtered page of visits ordered newest entry first.
    ///
    /// `now` is the reference point for storage-day filtering.
    fn list(
        &self,
        filter: VisitFilter,
        page: LimitOffset,
        now: Timestamp,
    ) -> impl Future<Output = Result<Page<ContainerVisit>, TerminalError>> + Send;

    /// Occupancy counters, with "today" relative to `now`.
    fn statistics(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<TerminalStatistics, TerminalError>> + Send;

    /// Attach an image to a visit.
    fn add_image(
        &self,
        visit_id: VisitId,
        image: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, TerminalError>> + Send;

    /// Remove an image, returning `false` when it did not exist.
    fn remove_image(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<bool, TerminalError>> + Send;

    /// Attach a document to a visit.
    fn add_document(
        &self,
        visit_id: VisitId,
        document: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, TerminalError>> + Send;

    /// Remove a document, returning `false` when it did not exist.
    fn remove_document(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<bool, TerminalError>> + Send;
}

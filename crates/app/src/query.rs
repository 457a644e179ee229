//! Visit list filtering.
//!
//! [`VisitFilter`] is the adapter-neutral description of a visit search.
//! SQL adapters translate it into a `WHERE` clause; [`VisitFilter::matches`]
//! is the reference semantics used by in-memory implementations.

use chrono::NaiveDate;
use terminal_domain::choices::{ContainerSize, ContainerState, VisitStatus};
use terminal_domain::id::CompanyId;
use terminal_domain::time::Timestamp;
use terminal_domain::visit::ContainerVisit;

/// Inclusive range of UTC calendar dates. Either end may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// A range covering a single day.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self {
            from: Some(date),
            to: Some(date),
        }
    }

    #[must_use]
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Criteria for listing visits. Every criterion is optional and they combine
/// with AND.
///
/// Text criteria match case-insensitively: names, owners, products, numbers
/// and notes as substrings; transport types exactly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitFilter {
    pub company_id: Option<CompanyId>,
    pub status: VisitStatus,
    pub company_name: Option<String>,
    pub container_name: Option<String>,
    /// Any of these sizes.
    pub container_sizes: Vec<ContainerSize>,
    pub container_size: Option<ContainerSize>,
    pub container_state: Option<ContainerState>,
    pub is_empty: Option<bool>,
    pub product_name: Option<String>,
    pub container_owner: Option<String>,
    pub transport_type: Option<String>,
    pub transport_number: Option<String>,
    pub exit_transport_type: Option<String>,
    pub exit_transport_number: Option<String>,
    /// Name of a service still running on the visit.
    pub active_service: Option<String>,
    /// Name of a service already closed on the visit.
    pub dispatch_service: Option<String>,
    pub entry_date: DateRange,
    pub exit_date: DateRange,
    /// Exact number of storage days.
    pub storage_days: Option<i64>,
    pub notes: Option<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn optional_contains(value: Option<&str>, needle: Option<&String>) -> bool {
    needle.is_none_or(|needle| value.is_some_and(|value| contains_ci(value, needle)))
}

fn optional_equals(value: Option<&str>, expected: Option<&String>) -> bool {
    expected.is_none_or(|expected| value.is_some_and(|value| value.eq_ignore_ascii_case(expected)))
}

impl VisitFilter {
    /// Whether `visit` satisfies every criterion, evaluated at `now`.
    #[must_use]
    pub fn matches(&self, visit: &ContainerVisit, now: Timestamp) -> bool {
        let status = match self.status {
            VisitStatus::InTerminal => visit.is_active(),
            VisitStatus::LeftTerminal => !visit.is_active(),
            VisitStatus::All => true,
        };
        let exit_date = match visit.exit_time {
            Some(exit) => self.exit_date.contains(exit.date_naive()),
            None => self.exit_date.is_unbounded(),
        };

        status
            && exit_date
            && self.company_id.is_none_or(|id| visit.company.id == id)
            && optional_contains(Some(visit.company.name.as_str()), self.company_name.as_ref())
            && optional_contains(Some(visit.container.name.as_str()), self.container_name.as_ref())
            && (self.container_sizes.is_empty()
                || self.container_sizes.contains(&visit.container.size))
            && self.container_size.is_none_or(|size| visit.container.size == size)
            && self.container_state.is_none_or(|state| visit.container_state == state)
            && self.is_empty.is_none_or(|empty| visit.is_empty() == empty)
            && optional_contains(visit.product_name.as_deref(), self.product_name.as_ref())
            && optional_contains(Some(visit.container_owner.as_str()), self.container_owner.as_ref())
            && optional_equals(
                Some(visit.transport_type.as_str()),
                self.transport_type.as_ref(),
            )
            && optional_contains(Some(visit.transport_number.as_str()), self.transport_number.as_ref())
            && optional_equals(
                visit.exit_transport_type.map(|kind| kind.as_str()),
                self.exit_transport_type.as_ref(),
            )
            && optional_contains(
                visit.exit_transport_number.as_deref(),
                self.exit_transport_number.as_ref(),
            )
            && self.active_service.as_ref().is_none_or(|name| {
                visit
                    .services
                    .iter()
                    .any(|s| s.is_running() && contains_ci(&s.name, name))
            })
            && self.dispatch_service.as_ref().is_none_or(|name| {
                visit
                    .services
                    .iter()
                    .any(|s| !s.is_running() && contains_ci(&s.name, name))
            })
            && self.entry_date.contains(visit.entry_time.date_naive())
            && self.storage_days.is_none_or(|days| visit.storage_days(now) == days)
            && optional_contains(visit.notes.as_deref(), self.notes.as_ref())
    }
}

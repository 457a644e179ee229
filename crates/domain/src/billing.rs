//! Billing: quantities and totals of services applied to a visit.

use rust_decimal::Decimal;

use crate::catalog::normalize_price;
use crate::choices::UnitOfMeasure;
use crate::time::Timestamp;
use crate::visit::{AppliedService, ContainerVisit, calendar_days};

/// Billable quantity of an applied service.
///
/// Per-day services cover `date_from` up to `date_to`, or `visit_end` while
/// still running, minus the contract's free days. Every other unit is billed
/// once.
#[must_use]
pub fn quantity(service: &AppliedService, visit_end: Timestamp, free_days: u32) -> i64 {
    match service.service_type.unit_of_measure {
        UnitOfMeasure::Day => {
            let end = service.date_to.unwrap_or(visit_end);
            (calendar_days(service.date_from, end) - i64::from(free_days)).max(0)
        }
        UnitOfMeasure::Container | UnitOfMeasure::Operation | UnitOfMeasure::Unit => 1,
    }
}

/// Contract price times quantity.
#[must_use]
pub fn line_total(service: &AppliedService, visit_end: Timestamp, free_days: u32) -> Decimal {
    service.price * Decimal::from(quantity(service, visit_end, free_days))
}

impl ContainerVisit {
    /// Sum of every applied service's line total, rounded to cents.
    #[must_use]
    pub fn total_storage_cost(&self, now: Timestamp) -> Decimal {
        let end = self.storage_end(now);
        let free_days = self.free_days().unwrap_or(0);
        let total: Decimal = self
            .services
            .iter()
            .map(|service| line_total(service, end, free_days))
            .sum();
        normalize_price(total)
    }
}

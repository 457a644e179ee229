//! Service catalog: billable terminal operations and their contract prices.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::choices::{ContainerSize, ContainerState, UnitOfMeasure};
use crate::error::{FieldErrors, TerminalError, ValidationError};
use crate::id::{ContractId, ContractServiceId, ServiceId, ServiceTypeId};

/// Number of fractional digits kept for every price.
pub const PRICE_SCALE: u32 = 2;

/// Round a price to [`PRICE_SCALE`] digits and fix its scale so it renders as `"12.50"`.
#[must_use]
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut price = price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(PRICE_SCALE);
    price
}

/// Category of service with its billing unit (e.g. "Storage" billed per day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: ServiceTypeId,
    pub name: String,
    pub unit_of_measure: UnitOfMeasure,
}

/// A billable operation offered by the terminal.
///
/// `container_size` and `container_state` restrict the containers the
/// service applies to; `None` means any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalService {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub container_size: Option<ContainerSize>,
    pub container_state: Option<ContainerState>,
    pub base_price: Decimal,
    pub multiple_usage: bool,
}

impl TerminalService {
    /// Whether this service may be billed for a container of the given size and state.
    #[must_use]
    pub fn applies_to(&self, size: ContainerSize, state: ContainerState) -> bool {
        self.container_size.is_none_or(|s| s == size)
            && self.container_state.is_none_or(|s| s == state)
    }
}

/// A catalog service priced for one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractService {
    pub id: ContractServiceId,
    pub contract_id: ContractId,
    pub service: TerminalService,
    pub price: Decimal,
}

/// Service type fields supplied by a caller, before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceType {
    pub name: String,
    pub unit_of_measure: UnitOfMeasure,
}

impl NewServiceType {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), TerminalError> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", ValidationError::Blank);
        }
        errors.into_result()
    }
}

/// Terminal service fields supplied by a caller, before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTerminalService {
    pub name: String,
    pub description: String,
    pub service_type_id: ServiceTypeId,
    pub container_size: Option<ContainerSize>,
    pub container_state: Option<ContainerState>,
    pub base_price: Decimal,
    pub multiple_usage: bool,
}

impl NewTerminalService {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when `name` is blank or the
    /// base price is negative.
    pub fn validate(&self) -> Result<(), TerminalError> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", ValidationError::Blank);
        }
        if self.base_price.is_sign_negative() {
            errors.add("base_price", ValidationError::Negative);
        }
        errors.into_result()
    }
}

/// Contract price for a catalog service, before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContractService {
    pub contract_id: ContractId,
    pub service_id: ServiceId,
    pub price: Decimal,
}

impl NewContractService {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when the price is negative.
    pub fn validate(&self) -> Result<(), TerminalError> {
        if self.price.is_sign_negative() {
            return Err(TerminalError::field("price", ValidationError::Negative));
        }
        Ok(())
    }
}

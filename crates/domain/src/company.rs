//! Company: a customer account and its storage contract.

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, TerminalError, ValidationError};
use crate::id::{CompanyId, ContractId};

/// Maximum length of a company or contract name.
pub const MAX_NAME_LEN: usize = 255;

/// A customer of the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

impl Company {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when `name` is blank or too long.
    pub fn validate_name(name: &str) -> Result<(), TerminalError> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, name);
        errors.into_result()
    }
}

/// Storage agreement between the terminal and a company.
///
/// The active contract supplies the free-day allowance and the prices of
/// the services billed to the company's visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub company_id: CompanyId,
    pub name: String,
    pub free_days: u32,
    pub is_active: bool,
}

/// Contract fields supplied by a caller, before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub company_id: CompanyId,
    pub name: String,
    pub free_days: u32,
    pub is_active: bool,
}

impl NewContract {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when `name` is blank or too long.
    pub fn validate(&self) -> Result<(), TerminalError> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);
        errors.into_result()
    }
}

fn check_name(errors: &mut FieldErrors, name: &str) {
    if name.trim().is_empty() {
        errors.add("name", ValidationError::Blank);
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.add("name", ValidationError::TooLong { max: MAX_NAME_LEN });
    }
}

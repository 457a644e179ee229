//! Container: a physical box identified by its name (owner code + serial).

use serde::{Deserialize, Serialize};

use crate::choices::ContainerSize;
use crate::error::ValidationError;
use crate::id::ContainerId;

/// Maximum length of a container name (ISO 6346 identifiers are 11 characters).
pub const MAX_NAME_LEN: usize = 11;

/// A container known to the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    pub size: ContainerSize,
    pub in_storage: bool,
}

/// Check a container name: non-blank and at most [`MAX_NAME_LEN`] characters.
///
/// # Errors
///
/// Returns [`ValidationError::Blank`] or [`ValidationError::TooLong`].
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Blank);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong { max: MAX_NAME_LEN });
    }
    Ok(())
}

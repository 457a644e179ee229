//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`TerminalError`] via `From`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Top-level error returned by domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    /// One or more fields of a request failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] FieldErrors),

    /// A batch import failed; one [`FieldErrors`] per submitted row.
    #[error("batch validation error ({} rows)", .0.len())]
    BatchValidation(Vec<FieldErrors>),

    /// A referenced record does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TerminalError {
    /// Shortcut for a validation failure on a single field.
    #[must_use]
    pub fn field(name: &str, error: ValidationError) -> Self {
        Self::Validation(FieldErrors::single(name, error))
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("This field is required.")]
    Required,
    #[error("This field may not be blank.")]
    Blank,
    #[error("This field may not be null.")]
    Null,
    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },
    #[error("\"{0}\" is not a valid choice.")]
    InvalidChoice(String),
    #[error("Invalid container size")]
    InvalidContainerSize,
    #[error("Invalid container state")]
    InvalidContainerState,
    #[error("Invalid transport type")]
    InvalidTransportType,
    #[error("Container is already in storage")]
    ContainerInStorage,
    #[error("Container appears more than once in this batch")]
    DuplicateInBatch,
    #[error("Customer does not exist")]
    CustomerNotFound,
    #[error("Customer has no active contract")]
    NoActiveContract,
    #[error("Company with this name already exists")]
    DuplicateName,
    #[error(
        "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z]."
    )]
    InvalidDateTime,
    #[error("Date has wrong format. Use one of these formats instead: YYYY-MM-DD.")]
    InvalidDate,
    #[error("A valid integer is required.")]
    InvalidInteger,
    #[error("Must be a valid boolean.")]
    InvalidBoolean,
    #[error("A valid number is required.")]
    InvalidDecimal,
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
    #[error("Expected a list of items.")]
    NotAList,
    #[error("Invalid data. Expected a dictionary.")]
    NotAnObject,
    #[error("Not a valid string.")]
    InvalidString,
    #[error("Exit time cannot be earlier than entry time")]
    ExitBeforeEntry,
    #[error("End date cannot be earlier than start date")]
    EndBeforeStart,
    #[error("Container has already left the terminal")]
    AlreadyDispatched,
    #[error("Service {0} is not available for this container visit")]
    ServiceUnavailable(i64),
    #[error("Service {0} does not exist")]
    UnknownService(i64),
    #[error("Service type {0} does not exist")]
    UnknownServiceType(i64),
}

/// Field name → validation messages, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors containing a single failure.
    #[must_use]
    pub fn single(field: &str, error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    /// Record a failure for `field`.
    pub fn add(&mut self, field: &str, error: ValidationError) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(error.to_string());
    }

    /// Record a failure nested under `field` (e.g. `services[1].id`).
    pub fn add_nested(&mut self, field: &str, index: usize, sub: &str, error: ValidationError) {
        self.add(&format!("{field}[{index}].{sub}"), error);
    }

    /// Move every failure of `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// `Ok(())` when empty, otherwise a [`TerminalError::Validation`].
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), TerminalError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TerminalError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

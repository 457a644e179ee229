//! Field-by-field reading of JSON request bodies.
//!
//! Every accessor records its failure in a shared [`FieldErrors`] and
//! returns `None`, so a handler reads all of its fields first and reports
//! every problem in one response.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use terminal_domain::error::{FieldErrors, TerminalError, ValidationError};
use terminal_domain::time::{self, Timestamp};

/// Rules of a text field.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Text {
    allow_blank: bool,
    max_len: Option<usize>,
}

impl Text {
    pub(crate) const fn new() -> Self {
        Self {
            allow_blank: false,
            max_len: None,
        }
    }

    pub(crate) const fn blank_ok(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub(crate) const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    /// Surrounding whitespace is trimmed before the rules apply.
    pub(crate) fn parse(self, value: &Value) -> Result<String, ValidationError> {
        let text = match value {
            Value::String(text) => text.trim().to_owned(),
            Value::Number(number) => number.to_string(),
            _ => return Err(ValidationError::InvalidString),
        };
        if text.is_empty() && !self.allow_blank {
            return Err(ValidationError::Blank);
        }
        if let Some(max) = self.max_len
            && text.chars().count() > max
        {
            return Err(ValidationError::TooLong { max });
        }
        Ok(text)
    }
}

/// One of the wire values of a choice.
pub(crate) fn choice<T: FromStr>(value: &Value) -> Result<T, ValidationError> {
    let raw = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    raw.parse().map_err(|_| ValidationError::InvalidChoice(raw))
}

/// A choice where an empty string means "no value".
pub(crate) fn blank_or_choice<T: FromStr>(value: &Value) -> Result<Option<T>, ValidationError> {
    match value {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        other => choice(other).map(Some),
    }
}

pub(crate) fn integer(value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0)
                    .map(|float| float as i64)
            })
            .ok_or(ValidationError::InvalidInteger),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidInteger),
        _ => Err(ValidationError::InvalidInteger),
    }
}

pub(crate) fn non_negative(value: &Value) -> Result<u32, ValidationError> {
    let number = integer(value)?;
    if number < 0 {
        return Err(ValidationError::Negative);
    }
    u32::try_from(number).map_err(|_| ValidationError::InvalidInteger)
}

pub(crate) fn datetime(value: &Value) -> Result<Timestamp, ValidationError> {
    value
        .as_str()
        .and_then(|text| time::parse(text.trim()).ok())
        .ok_or(ValidationError::InvalidDateTime)
}

/// Boolean spellings accepted in bodies and query strings.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn boolean(value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => parse_bool(text).ok_or(ValidationError::InvalidBoolean),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(ValidationError::InvalidBoolean),
        },
        _ => Err(ValidationError::InvalidBoolean),
    }
}

pub(crate) fn decimal(value: &Value) -> Result<Decimal, ValidationError> {
    let raw = match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return Err(ValidationError::InvalidDecimal),
    };
    Decimal::from_str(&raw).map_err(|_| ValidationError::InvalidDecimal)
}

/// Reader over one JSON object.
pub(crate) struct Fields<'a> {
    body: Option<&'a Map<String, Value>>,
    prefix: String,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(body: &'a Value) -> Self {
        Self::with_prefix(body, String::new())
    }

    /// Reader for the `index`-th object of the list `field`; errors are
    /// reported as `field[index].name`.
    pub(crate) fn nested(body: &'a Value, field: &str, index: usize) -> Self {
        Self::with_prefix(body, format!("{field}[{index}]."))
    }

    fn with_prefix(body: &'a Value, prefix: String) -> Self {
        let mut fields = Self {
            body: body.as_object(),
            prefix,
            errors: FieldErrors::new(),
        };
        if fields.body.is_none() {
            fields.fail("non_field_errors", ValidationError::NotAnObject);
        }
        fields
    }

    fn fail(&mut self, name: &str, error: ValidationError) {
        let key = format!("{}{name}", self.prefix);
        self.errors.add(&key, error);
    }

    /// Outer `None`: absent or invalid. `Some(None)`: explicit `null`.
    fn read<T>(
        &mut self,
        name: &str,
        required: bool,
        allow_null: bool,
        parse: impl FnOnce(&'a Value) -> Result<T, ValidationError>,
    ) -> Option<Option<T>> {
        let body = self.body?;
        match body.get(name) {
            None => {
                if required {
                    self.fail(name, ValidationError::Required);
                }
                None
            }
            Some(Value::Null) if allow_null => Some(None),
            Some(Value::Null) => {
                self.fail(name, ValidationError::Null);
                None
            }
            Some(value) => match parse(value) {
                Ok(parsed) => Some(Some(parsed)),
                Err(err) => {
                    self.fail(name, err);
                    None
                }
            },
        }
    }

    /// A field that must be present and not `null`.
    pub(crate) fn required<T>(
        &mut self,
        name: &str,
        parse: impl FnOnce(&'a Value) -> Result<T, ValidationError>,
    ) -> Option<T> {
        self.read(name, true, false, parse).flatten()
    }

    /// A field that may be omitted but not `null`.
    pub(crate) fn optional<T>(
        &mut self,
        name: &str,
        parse: impl FnOnce(&'a Value) -> Result<T, ValidationError>,
    ) -> Option<T> {
        self.read(name, false, false, parse).flatten()
    }

    /// A field that accepts `null`.
    pub(crate) fn nullable<T>(
        &mut self,
        name: &str,
        required: bool,
        parse: impl FnOnce(&'a Value) -> Result<T, ValidationError>,
    ) -> Option<Option<T>> {
        self.read(name, required, true, parse)
    }

    /// Items of a required list field.
    pub(crate) fn list(&mut self, name: &str) -> Option<&'a [Value]> {
        self.required(name, |value| {
            value
                .as_array()
                .map(Vec::as_slice)
                .ok_or(ValidationError::NotAList)
        })
    }

    /// Take over the failures of a nested reader.
    pub(crate) fn absorb(&mut self, nested: Fields<'_>) {
        self.errors.merge(nested.errors);
    }

    #[must_use]
    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// The recorded failures as a validation error.
    pub(crate) fn into_error(self) -> TerminalError {
        TerminalError::Validation(self.errors)
    }

    /// `Ok(())` when every field read so far was valid.
    pub(crate) fn finish(self) -> Result<(), TerminalError> {
        self.errors.into_result()
    }
}

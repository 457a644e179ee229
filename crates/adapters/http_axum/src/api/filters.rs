//! Query-string parsing for the visit list endpoints.
//!
//! Empty parameters are ignored. Malformed ones are reported as field errors
//! under the parameter name.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;

use terminal_app::pagination::LimitOffset;
use terminal_app::query::{DateRange, VisitFilter};
use terminal_domain::choices::ContainerSize;
use terminal_domain::error::{FieldErrors, TerminalError, ValidationError};

use super::fields::parse_bool;

type Params = HashMap<String, String>;

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn text(params: &Params, name: &str) -> Option<String> {
    param(params, name).map(str::to_owned)
}

fn date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate)
}

/// `2024-05-01` (one day), `2024-05-01,2024-05-31`, or a range with one
/// open end (`2024-05-01,` / `,2024-05-31`).
fn date_range(raw: &str) -> Result<DateRange, ValidationError> {
    match raw.split_once(',') {
        Some((from, to)) => Ok(DateRange {
            from: date(from)?,
            to: date(to)?,
        }),
        None => date(raw)?
            .map(DateRange::day)
            .ok_or(ValidationError::InvalidDate),
    }
}

/// Collects parsed criteria and the errors of malformed ones.
struct Reader<'a> {
    params: &'a Params,
    errors: FieldErrors,
}

impl<'a> Reader<'a> {
    fn new(params: &'a Params) -> Self {
        Self {
            params,
            errors: FieldErrors::new(),
        }
    }

    fn parse<T>(
        &mut self,
        name: &str,
        parse: impl FnOnce(&str) -> Result<T, ValidationError>,
    ) -> Option<T> {
        let raw = param(self.params, name)?;
        match parse(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.add(name, err);
                None
            }
        }
    }

    fn choice<T: FromStr>(&mut self, name: &str) -> Option<T> {
        self.parse(name, |raw| {
            raw.parse()
                .map_err(|_| ValidationError::InvalidChoice(raw.to_owned()))
        })
    }

    fn sizes(&mut self, name: &str) -> Vec<ContainerSize> {
        self.parse(name, |raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|size| !size.is_empty())
                .map(|size| {
                    size.parse::<ContainerSize>()
                        .map_err(|_| ValidationError::InvalidChoice(size.to_owned()))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .unwrap_or_default()
    }

    fn boolean(&mut self, name: &str) -> Option<bool> {
        self.parse(name, |raw| parse_bool(raw).ok_or(ValidationError::InvalidBoolean))
    }

    fn integer(&mut self, name: &str) -> Option<i64> {
        self.parse(name, |raw| raw.parse().map_err(|_| ValidationError::InvalidInteger))
    }

    fn date_range(&mut self, name: &str) -> DateRange {
        self.parse(name, date_range).unwrap_or_default()
    }

    fn finish(self, filter: VisitFilter) -> Result<VisitFilter, TerminalError> {
        self.errors.into_result()?;
        Ok(filter)
    }
}

/// Filter of `GET /api/containers_visit_list`.
pub(crate) fn visit_filter(params: &Params) -> Result<VisitFilter, TerminalError> {
    let mut reader = Reader::new(params);
    let filter = VisitFilter {
        company_id: None,
        status: reader.choice("status").unwrap_or_default(),
        company_name: text(params, "company_name"),
        container_name: text(params, "container_name"),
        container_sizes: reader.sizes("types"),
        container_size: reader.choice("container_size"),
        container_state: reader.choice("container_state"),
        is_empty: reader.boolean("is_empty"),
        product_name: text(params, "product_name"),
        container_owner: text(params, "container_owner"),
        transport_type: text(params, "transport_type"),
        transport_number: text(params, "transport_number"),
        exit_transport_type: text(params, "exit_transport_type"),
        exit_transport_number: text(params, "exit_transport_number"),
        active_service: text(params, "active_services"),
        dispatch_service: text(params, "dispatch_services"),
        entry_date: reader.date_range("entry_time"),
        exit_date: reader.date_range("exit_time"),
        storage_days: reader.integer("storage_days"),
        notes: text(params, "notes"),
    };
    reader.finish(filter)
}

/// Filter of `GET /api/container_visit_list/by_company/{company_id}`.
///
/// The company itself comes from the path.
pub(crate) fn company_visit_filter(params: &Params) -> Result<VisitFilter, TerminalError> {
    let mut reader = Reader::new(params);
    let filter = VisitFilter {
        status: reader.choice("status").unwrap_or_default(),
        company_name: text(params, "company"),
        container_name: text(params, "container"),
        container_sizes: reader.sizes("types"),
        is_empty: reader.boolean("is_empty"),
        entry_date: reader.date_range("entry_time"),
        storage_days: reader.integer("storage_days"),
        notes: text(params, "notes"),
        ..VisitFilter::default()
    };
    reader.finish(filter)
}

pub(crate) fn page(params: &Params) -> LimitOffset {
    LimitOffset::from_query(
        params.get("limit").map(String::as_str),
        params.get("offset").map(String::as_str),
    )
}

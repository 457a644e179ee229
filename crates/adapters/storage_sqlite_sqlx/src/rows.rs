//! Column decoding helpers shared by the repositories.
//!
//! Timestamps are stored as RFC 3339 text, decimals as text and choices as
//! their wire values.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use terminal_domain::choices::UnknownChoice;
use terminal_domain::time::{self, Timestamp};

fn decode_err<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

pub(crate) fn choice<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownChoice>,
{
    let value: String = row.try_get(column)?;
    T::from_str(&value).map_err(decode_err)
}

pub(crate) fn optional_choice<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr<Err = UnknownChoice>,
{
    let value: Option<String> = row.try_get(column)?;
    value
        .as_deref()
        .map(T::from_str)
        .transpose()
        .map_err(decode_err)
}

pub(crate) fn timestamp(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    let value: String = row.try_get(column)?;
    time::parse(&value).map_err(decode_err)
}

pub(crate) fn optional_timestamp(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Timestamp>, sqlx::Error> {
    let value: Option<String> = row.try_get(column)?;
    value
        .as_deref()
        .map(time::parse)
        .transpose()
        .map_err(decode_err)
}

pub(crate) fn decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value).map_err(decode_err)
}

pub(crate) fn count(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(decode_err)
}

/// JSON array of ids, expanded in SQL with `json_each`.
pub(crate) fn id_list(ids: impl IntoIterator<Item = i64>) -> String {
    let joined = ids
        .into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}

pub(crate) fn optional_timestamp_text(value: Option<Timestamp>) -> Option<String> {
    value.map(time::format)
}

//! `limit`/`offset` pagination envelope.

use axum::http::Uri;
use serde::Serialize;

use terminal_app::pagination::Page;

/// Paginated list response.
///
/// `next` and `previous` repeat the request path and query with adjusted
/// `limit`/`offset` parameters, or are `null` at either end.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub limit: u32,
    pub offset: u64,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wrap a page of results fetched for the request at `uri`.
    pub fn new(page: Page<T>, uri: &Uri) -> Self {
        let next = page
            .next_offset()
            .map(|offset| page_link(uri, page.limit, Some(offset)));
        let previous = page
            .previous_offset()
            .map(|offset| page_link(uri, page.limit, (offset > 0).then_some(offset)));

        Self {
            limit: page.limit,
            offset: page.offset,
            count: page.count,
            next,
            previous,
            results: page.results,
        }
    }
}

/// Rebuild `uri` with `limit` and `offset` replaced; other parameters are
/// kept verbatim. A `None` offset drops the parameter (first page).
fn page_link(uri: &Uri, limit: u32, offset: Option<u64>) -> String {
    let mut params: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|param| !param.is_empty())
        .filter(|param| {
            let key = param.split_once('=').map_or(*param, |(key, _)| key);
            key != "limit" && key != "offset"
        })
        .map(str::to_owned)
        .collect();
    params.push(format!("limit={limit}"));
    if let Some(offset) = offset {
        params.push(format!("offset={offset}"));
    }
    format!("{}?{}", uri.path(), params.join("&"))
}

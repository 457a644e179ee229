//! Limit/offset pagination.
//!
//! Mirrors the usual REST conventions: a missing, zero, negative or
//! non-numeric `limit` falls back to the default, anything above the maximum
//! is clamped, and a bad `offset` falls back to 0.

/// Pagination request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: u32,
    pub offset: u64,
}

impl LimitOffset {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Build from raw query-string values.
    #[must_use]
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|&limit| limit > 0)
            .map_or(Self::DEFAULT_LIMIT, |limit| {
                u32::try_from(limit.min(u64::from(Self::MAX_LIMIT))).unwrap_or(Self::MAX_LIMIT)
            });
        let offset = offset
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Self { limit, offset }
    }
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub count: u64,
    pub limit: u32,
    pub offset: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Transform every result, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            limit: self.limit,
            offset: self.offset,
            results: self.results.into_iter().map(f).collect(),
        }
    }

    /// Offset of the following page, if there is one.
    #[must_use]
    pub fn next_offset(&self) -> Option<u64> {
        self.offset
            .checked_add(u64::from(self.limit))
            .filter(|&next| next < self.count)
    }

    /// Offset of the preceding page, if there is one.
    #[must_use]
    pub fn previous_offset(&self) -> Option<u64> {
        (self.offset > 0).then(|| self.offset.saturating_sub(u64::from(self.limit)))
    }
}

//! Paging and sorting parameters for list queries.
//!
//! # Invariants
//! - `sort` must appear in `sort_safelist`; a leading `-` means descending.
//! - `limit()`/`offset()` are only meaningful after [`validate_filters`].

use crate::validator::{permitted_value, Validator};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort keys accepted for school listings.
pub const SCHOOL_SORT_SAFELIST: &[&str] = &[
    "id", "name", "level", "contact", "-id", "-name", "-level", "-contact",
];

/// Columns that may appear in a generated `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Level,
    Contact,
}

impl SortColumn {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "level" => Some(Self::Level),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Level => "level",
            Self::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Requested page, page size and sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    #[serde(skip, default = "default_safelist")]
    pub sort_safelist: &'static [&'static str],
}

fn default_safelist() -> &'static [&'static str] {
    SCHOOL_SORT_SAFELIST
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_string(),
            sort_safelist: SCHOOL_SORT_SAFELIST,
        }
    }
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            ..Self::default()
        }
    }

    /// Resolves the sort key to a fixed column and direction.
    ///
    /// Returns `None` when the key is not in the safelist or names no known
    /// column.
    pub fn sort_order(&self) -> Option<(SortColumn, SortDirection)> {
        if !permitted_value(&self.sort.as_str(), self.sort_safelist) {
            return None;
        }

        let (key, direction) = match self.sort.strip_prefix('-') {
            Some(key) => (key, SortDirection::Desc),
            None => (self.sort.as_str(), SortDirection::Asc),
        };
        SortColumn::from_key(key).map(|column| (column, direction))
    }

    pub fn limit(&self) -> i64 {
        self.page_size.max(0)
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }
}

/// Checks page bounds and the sort key against the safelist.
pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(
        filters.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(&filters.sort.as_str(), filters.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

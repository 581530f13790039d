//! List query planning.
//!
//! Turns the selective-harvesting arguments of a list request into a
//! structured [`QuerySpec`]. Stores evaluate it directly; no query
//! text is ever assembled from request values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::config::{PagingMode, ProviderConfig};
use crate::error::OaiError;
use crate::types::{Resource, set_id};

/// A single conjunctive filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Resource kind equals the value.
    KindEquals(String),
    /// Last modification at or after the instant.
    ModifiedFrom(DateTime<Utc>),
    /// Last modification at or before the instant.
    ModifiedUntil(DateTime<Utc>),
    /// Resource carries `predicate` with exactly `value`.
    PropertyEquals { predicate: String, value: String },
}

impl Filter {
    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            Filter::KindEquals(kind) => &resource.kind == kind,
            Filter::ModifiedFrom(from) => resource.last_modified >= *from,
            Filter::ModifiedUntil(until) => resource.last_modified <= *until,
            Filter::PropertyEquals { predicate, value } => {
                resource.property_values(predicate).any(|v| v == value)
            }
        }
    }
}

/// A bounded list query handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// All filters must match.
    pub filters: Vec<Filter>,
    pub limit: u64,
    pub offset: u64,
}

impl QuerySpec {
    /// Whether a resource satisfies every filter.
    pub fn matches(&self, resource: &Resource) -> bool {
        self.filters.iter().all(|f| f.matches(resource))
    }

    /// `(offset, limit)` as iterator bounds, saturating on narrow targets.
    pub fn window(&self) -> (usize, usize) {
        let clamp = |n: u64| usize::try_from(n).unwrap_or(usize::MAX);
        (clamp(self.offset), clamp(self.limit))
    }
}

/// Which end of a date range a value bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    From,
    Until,
}

/// Parse an OAI datestamp.
///
/// Accepts `YYYY-MM-DDThh:mm:ssZ` and the day granularity `YYYY-MM-DD`, which
/// covers the whole day for either bound.
pub fn parse_datestamp(value: &str, bound: Bound) -> Result<DateTime<Utc>, OaiError> {
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ") {
        Ok(dt) => Ok(dt.and_utc()),
        Err(full_err) => {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                OaiError::bad_argument(format!("invalid datestamp '{}': {}", value, full_err))
            })?;
            let (h, m, s) = match bound {
                Bound::From => (0, 0, 0),
                Bound::Until => (23, 59, 59),
            };
            date.and_hms_opt(h, m, s)
                .map(|dt| dt.and_utc())
                .ok_or_else(|| OaiError::bad_argument(format!("invalid datestamp '{}'", value)))
        }
    }
}

/// Builds list queries under the configured paging and set policies.
#[derive(Debug, Clone)]
pub struct ListPlanner {
    sets_enabled: bool,
    membership_property: String,
    page_size: u64,
    paging: PagingMode,
}

impl ListPlanner {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            sets_enabled: config.sets_enabled,
            membership_property: config.properties.is_part_of_set.clone(),
            page_size: config.max_list_size,
            paging: config.paging,
        }
    }

    /// Maximum number of items per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn paging(&self) -> PagingMode {
        self.paging
    }

    /// Plan one page of a list query.
    ///
    /// Fails with `badArgument` for unparsable dates and with
    /// `noSetHierarchy` for a set filter while sets are disabled.
    pub fn plan(
        &self,
        kind: &str,
        from: Option<&str>,
        until: Option<&str>,
        set: Option<&str>,
        offset: u64,
    ) -> Result<QuerySpec, OaiError> {
        let from = from.map(|v| parse_datestamp(v, Bound::From)).transpose()?;
        let until = until.map(|v| parse_datestamp(v, Bound::Until)).transpose()?;

        if set.is_some() && !self.sets_enabled {
            return Err(OaiError::no_set_hierarchy("Sets are not enabled"));
        }

        let mut filters = vec![Filter::KindEquals(kind.to_string())];
        if let Some(from) = from {
            filters.push(Filter::ModifiedFrom(from));
        }
        if let Some(until) = until {
            filters.push(Filter::ModifiedUntil(until));
        }
        if let Some(set) = set {
            filters.push(Filter::PropertyEquals {
                predicate: self.membership_property.clone(),
                value: set_id(set).to_string(),
            });
        }

        let limit = match self.paging {
            PagingMode::FullPage => self.page_size,
            PagingMode::Lookahead => self.page_size.saturating_add(1),
        };

        Ok(QuerySpec {
            filters,
            limit,
            offset,
        })
    }
}

//! Order listing request model.
//!
//! The listing endpoint receives four untyped, optional parameters:
//!
//! | Parameter | Meaning                                  | Default              |
//! |-----------|------------------------------------------|----------------------|
//! | `search`  | case-insensitive substring filter        | no filter            |
//! | `start`   | rows to skip (non-negative integer)      | `0`                  |
//! | `length`  | maximum rows to return (positive integer)| unlimited            |
//! | `sort`    | comma-separated signed sort tokens       | `-timestamp`         |
//!
//! [`OrderListQuery::try_from`] validates them before any storage is touched.
//! Every failure is a [`ListingError`], which callers surface as a client error.
//!
//! # Sort tokens
//!
//! A token is an optional sign followed by a field name: `-total`, `+customer`,
//! `timestamp`. `+` or no sign sorts ascending, `-` sorts descending. A `+` sent
//! unencoded in a query string arrives as a space, which is trimmed away and so
//! also sorts ascending.
//!
//! Field names resolve through the closed [`SortField`] table. Anything outside
//! it (including `status`, which orders do not have) is rejected.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Error type for invalid listing parameters.
///
/// All variants are caller mistakes and map to `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    /// `start` is not a non-negative integer
    #[error("invalid start {0:?}: expected a non-negative integer")]
    InvalidStart(String),

    /// `length` is not a positive integer
    #[error("invalid length {0:?}: expected a positive integer")]
    InvalidLength(String),

    /// A sort token names a field outside the sortable set
    #[error("invalid sort field {0:?}: expected one of customer, total, timestamp, id")]
    InvalidSortField(String),

    /// A sort token is empty or has no field name after its sign
    #[error("malformed sort token {0:?}")]
    MalformedSort(String),
}

// ============================================================================
// Sorting
// ============================================================================

/// Direction of a single sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first (`+`)
    Ascending,
    /// Largest first (`-`)
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    const fn sign(self) -> char {
        match self {
            Self::Ascending => '+',
            Self::Descending => '-',
        }
    }
}

/// The closed set of fields an order listing can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Customer name
    Customer,
    /// Aggregated order total
    Total,
    /// Order placement time
    Timestamp,
    /// Order ID
    Id,
}

impl SortField {
    /// Every sortable field.
    pub const ALL: [Self; 4] = [Self::Customer, Self::Total, Self::Timestamp, Self::Id];

    /// Name of the field as it appears in a sort token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Total => "total",
            Self::Timestamp => "timestamp",
            Self::Id => "id",
        }
    }
}

impl FromStr for SortField {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "total" => Ok(Self::Total),
            "timestamp" => Ok(Self::Timestamp),
            "id" => Ok(Self::Id),
            other => Err(ListingError::InvalidSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `ORDER BY` key: a field and a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Field to sort by
    pub field: SortField,
    /// Direction to sort in
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending key on `field`.
    #[must_use]
    pub const fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Descending key on `field`.
    #[must_use]
    pub const fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Parse a single sort token such as `-total` or `+customer`.
    ///
    /// # Errors
    ///
    /// - [`ListingError::MalformedSort`] if the token has no field name
    /// - [`ListingError::InvalidSortField`] if the field is not sortable
    pub fn parse(token: &str) -> Result<Self, ListingError> {
        let trimmed = token.trim();
        let (direction, name) = if let Some(rest) = trimmed.strip_prefix('-') {
            (SortDirection::Descending, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (SortDirection::Ascending, rest)
        } else {
            (SortDirection::Ascending, trimmed)
        };

        if name.is_empty() {
            return Err(ListingError::MalformedSort(token.to_string()));
        }

        Ok(Self {
            field: name.parse()?,
            direction,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.sign(), self.field)
    }
}

/// Parse a comma-separated list of sort tokens, primary key first.
///
/// # Errors
///
/// Returns the first [`ListingError`] raised by [`SortKey::parse`].
pub fn parse_sort(raw: &str) -> Result<Vec<SortKey>, ListingError> {
    raw.split(',').map(SortKey::parse).collect()
}

static DEFAULT_SORT: [SortKey; 1] = [SortKey::descending(SortField::Timestamp)];

// ============================================================================
// Request
// ============================================================================

/// Raw listing parameters, exactly as they arrive in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderListParams {
    /// Free-text filter
    pub search: Option<String>,
    /// Row offset
    pub start: Option<String>,
    /// Page size
    pub length: Option<String>,
    /// Comma-separated sort tokens
    pub sort: Option<String>,
}

/// A validated order listing request.
///
/// Built from [`OrderListParams`] via `TryFrom`, or directly with the `with_*`
/// builders in code and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderListQuery {
    search: Option<String>,
    start: u64,
    length: Option<u64>,
    sort: Vec<SortKey>,
}

impl OrderListQuery {
    /// Unfiltered, unpaginated listing with the default sort.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by `term`. An empty term clears the filter.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    /// Skip the first `start` matching rows.
    #[must_use]
    pub const fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Return at most `length` rows.
    #[must_use]
    pub const fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Sort by `keys`, primary key first. An empty list restores the default.
    #[must_use]
    pub fn with_sort(mut self, keys: impl Into<Vec<SortKey>>) -> Self {
        self.sort = keys.into();
        self
    }

    /// The search term, if filtering.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Rows to skip.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Maximum rows to return, `None` for unlimited.
    #[must_use]
    pub const fn length(&self) -> Option<u64> {
        self.length
    }

    /// The requested sort keys, or `-timestamp` when none were given.
    #[must_use]
    pub fn sort_keys(&self) -> &[SortKey] {
        if self.sort.is_empty() {
            &DEFAULT_SORT
        } else {
            &self.sort
        }
    }

    /// The sort keys every backend applies: [`Self::sort_keys`] followed by
    /// `+id` unless `id` is already a key, so the row order is total and
    /// pages never overlap.
    #[must_use]
    pub fn effective_sort(&self) -> Vec<SortKey> {
        let mut keys = self.sort_keys().to_vec();
        if !keys.iter().any(|key| key.field == SortField::Id) {
            keys.push(SortKey::ascending(SortField::Id));
        }
        keys
    }

    /// `ILIKE` pattern for the search term, with `\`, `%` and `_` escaped so
    /// the term matches literally anywhere in the text.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for ch in term.chars() {
                if matches!(ch, '\\' | '%' | '_') {
                    pattern.push('\\');
                }
                pattern.push(ch);
            }
            pattern.push('%');
            pattern
        })
    }

    /// Whether `text` satisfies the search term (always true without one).
    #[must_use]
    pub fn search_matches(&self, text: &str) -> bool {
        self.search
            .as_deref()
            .is_none_or(|term| text.to_lowercase().contains(&term.to_lowercase()))
    }
}

impl TryFrom<OrderListParams> for OrderListQuery {
    type Error = ListingError;

    fn try_from(params: OrderListParams) -> Result<Self, Self::Error> {
        let start = match non_empty(params.start) {
            Some(raw) => parse_count(&raw).ok_or(ListingError::InvalidStart(raw))?,
            None => 0,
        };

        let length = match non_empty(params.length) {
            Some(raw) => Some(
                parse_count(&raw)
                    .filter(|length| *length > 0)
                    .ok_or(ListingError::InvalidLength(raw))?,
            ),
            None => None,
        };

        let sort = match non_empty(params.sort) {
            Some(raw) => parse_sort(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            search: non_empty(params.search),
            start,
            length,
            sort,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Row counts must fit a SQL `BIGINT`.
fn parse_count(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|n| i64::try_from(*n).is_ok())
}

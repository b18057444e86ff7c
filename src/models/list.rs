//! List view models
//!
//! This module provides:
//! - `PageSize`, the closed set of page sizes the screens offer
//! - `SortDirection`, `Coercion`, `SortField` and `SortSpec` for ordering
//! - `VisiblePage`, the result of a derived read

use serde::{Deserialize, Serialize};

use crate::list::ListError;

/// Records per page
///
/// Only the sizes offered by the page-size selector are representable, so an
/// out-of-range size is rejected when it is parsed rather than at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    /// 10 records per page (default)
    #[default]
    Ten,
    /// 25 records per page
    TwentyFive,
    /// 50 records per page
    Fifty,
    /// 100 records per page
    Hundred,
}

impl PageSize {
    /// Every valid page size, smallest first
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    /// Number of records per page
    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    /// Total page count for `total` records; never less than one
    pub fn total_pages(self, total: usize) -> usize {
        total.div_ceil(self.get()).max(1)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = ListError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(PageSize::Ten),
            25 => Ok(PageSize::TwentyFive),
            50 => Ok(PageSize::Fifty),
            100 => Ok(PageSize::Hundred),
            other => Err(ListError::InvalidPageSize(other)),
        }
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first (default)
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// The opposite direction
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Column header arrow
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }

    /// Apply the direction to an ascending ordering
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// How a field's raw value is turned into a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    /// Leading numeric value; anything else counts as 0
    Numeric,
    /// Timestamp; unparsable values count as the epoch
    Date,
    /// Case-insensitive text; null counts as ""
    Text,
}

/// A sortable column registered with a list controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Record field name
    pub name: String,
    /// Key coercion rule
    pub coercion: Coercion,
}

impl SortField {
    /// Register a field with an explicit coercion
    pub fn new(name: impl Into<String>, coercion: Coercion) -> Self {
        Self {
            name: name.into(),
            coercion,
        }
    }

    /// Numeric column
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, Coercion::Numeric)
    }

    /// Date column
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, Coercion::Date)
    }

    /// Text column
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, Coercion::Text)
    }
}

/// Active sort: a registered field plus direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field being sorted on
    pub field: String,
    /// Direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a sort spec
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// One page of a list plus summary counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisiblePage<R> {
    /// Records on the current page, in display order
    pub records: Vec<R>,
    /// Records left after filtering
    pub total_filtered: usize,
    /// Records before filtering
    pub total_raw: usize,
    /// Current page (1-indexed)
    pub current_page: usize,
    /// Total number of pages (at least 1)
    pub total_pages: usize,
    /// Records per page
    pub page_size: PageSize,
}

impl<R> VisiblePage<R> {
    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the number of records on the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 1-based positions of the first and last record shown, for
    /// "Showing X to Y of N" footers. `None` when the page is empty.
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.records.is_empty() {
            return None;
        }
        let first = (self.current_page - 1) * self.page_size.get() + 1;
        Some((first, first + self.records.len() - 1))
    }
}

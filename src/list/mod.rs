//! List controller
//!
//! One `ListController` backs one management screen. It owns the raw record
//! set fetched from the API and turns it into the page the table shows:
//!
//! 1. filter: every active filter, combined with AND
//! 2. sort: the active sort field, stable in both directions
//! 3. paginate: the slice for the current page
//!
//! The pipeline runs on every `visible_page` call; nothing derived is cached,
//! so a read always reflects the latest inputs.
//!
//! The free-text search filter is debounced: keystrokes update a pending
//! value that is applied once input has been quiet for the configured window.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mediadesk::list::{FilterSpec, ListConfig, ListController};
//! use mediadesk::models::{Record, SortField};
//!
//! let config = ListConfig::new()
//!     .with_filter(FilterSpec::search("search", ["page_name", "username"]))
//!     .with_filter(FilterSpec::select("status", "status"))
//!     .with_sort_field(SortField::numeric("followers_count"));
//! let controller: ListController<Record> = ListController::new(config)?;
//! controller.set_records(records);
//! controller.set_filter_value("status", "approved");
//! let page = controller.visible_page();
//! ```

pub mod debounce;
pub mod filter;
pub mod sort;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use filter::{FilterKind, FilterSpec};
pub use sort::{parse_leading_number, parse_timestamp, SortKey};

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

use crate::models::{FieldAccess, PageSize, Record, SortDirection, SortField, SortSpec, VisiblePage};

/// Error types for list controller construction and record decoding
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// Page size outside the supported set
    #[error("Invalid page size: {0} (expected 10, 25, 50 or 100)")]
    InvalidPageSize(usize),

    /// Record payload was not a JSON array
    #[error("Expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    /// Array element was not a JSON object
    #[error("Record {index} is not a JSON object (got {kind})")]
    NotAnObject { index: usize, kind: &'static str },

    /// Two filters registered under one name
    #[error("Duplicate filter name: {0}")]
    DuplicateFilter(String),

    /// More than one debounced search filter
    #[error("Only one search filter is allowed; '{0}' is a second one")]
    MultipleSearchFilters(String),

    /// Default sort names a field that was not registered as sortable
    #[error("Sort field is not registered: {0}")]
    UnknownSortField(String),
}

/// Declarative controller setup, supplied once at construction
#[derive(Debug, Clone)]
pub struct ListConfig {
    /// Registered filters
    pub filters: Vec<FilterSpec>,
    /// Sortable fields
    pub sort_fields: Vec<SortField>,
    /// Sort applied before the user picks a column
    pub default_sort: Option<SortSpec>,
    /// Initial page size
    pub page_size: PageSize,
    /// Quiet window for the search filter
    pub debounce: Duration,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort_fields: Vec::new(),
            default_sort: None,
            page_size: PageSize::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ListConfig {
    /// Empty configuration: no filters, no sortable fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    /// Register a sortable field
    pub fn with_sort_field(mut self, field: SortField) -> Self {
        self.sort_fields.push(field);
        self
    }

    /// Set the initial sort
    pub fn with_default_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = Some(SortSpec::new(field, direction));
        self
    }

    /// Set the initial page size
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the search debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Look up a filter by name
    pub fn filter(&self, name: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Look up a sortable field by name
    pub fn sort_field(&self, name: &str) -> Option<&SortField> {
        self.sort_fields.iter().find(|f| f.name == name)
    }

    /// Name of the debounced search filter, if one is registered
    pub fn search_filter(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.is_search())
            .map(|f| f.name.as_str())
    }

    /// Check the registrations are consistent
    pub fn validate(&self) -> Result<(), ListError> {
        let mut names = HashSet::new();
        let mut seen_search = false;
        for filter in &self.filters {
            if !names.insert(filter.name.as_str()) {
                return Err(ListError::DuplicateFilter(filter.name.clone()));
            }
            if filter.is_search() {
                if seen_search {
                    return Err(ListError::MultipleSearchFilters(filter.name.clone()));
                }
                seen_search = true;
            }
        }

        if let Some(sort) = &self.default_sort {
            if self.sort_field(&sort.field).is_none() {
                return Err(ListError::UnknownSortField(sort.field.clone()));
            }
        }
        Ok(())
    }
}

/// Whether a search value is waiting for its quiet window to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// No pending search commit
    Idle,
    /// A debounce timer is running
    PendingSearch,
}

#[derive(Debug)]
struct PendingSearch {
    value: String,
    generation: u64,
}

#[derive(Debug)]
struct ControllerState<R> {
    records: Vec<R>,
    /// Effective filter values; the search entry only changes on commit
    values: HashMap<String, String>,
    pending: Option<PendingSearch>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: PageSize,
}

#[derive(Debug)]
struct Shared<R> {
    config: ListConfig,
    state: Mutex<ControllerState<R>>,
    revision: watch::Sender<u64>,
}

impl<R: FieldAccess> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, ControllerState<R>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Signal subscribers that derived reads are stale
    fn invalidate(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    fn filtered<'s>(&self, state: &'s ControllerState<R>) -> Vec<&'s R> {
        let active: Vec<(&FilterSpec, &str)> = self
            .config
            .filters
            .iter()
            .filter_map(|filter| {
                state
                    .values
                    .get(&filter.name)
                    .filter(|value| !value.is_empty())
                    .map(|value| (filter, value.as_str()))
            })
            .collect();

        state
            .records
            .iter()
            .filter(|record| filter::matches_all(*record, active.iter().copied()))
            .collect()
    }

    fn ordered<'s>(&self, state: &'s ControllerState<R>) -> Vec<&'s R> {
        let filtered = self.filtered(state);
        let Some(spec) = &state.sort else {
            return filtered;
        };
        match self.config.sort_field(&spec.field) {
            Some(field) => sort::sort_stable(filtered, &field.name, field.coercion, spec.direction),
            None => filtered,
        }
    }

    fn total_pages(&self, state: &ControllerState<R>) -> usize {
        state.page_size.total_pages(self.filtered(state).len())
    }

    fn apply_search(&self, state: &mut ControllerState<R>, value: String) {
        let Some(name) = self.config.search_filter() else {
            return;
        };
        if value.is_empty() {
            state.values.remove(name);
        } else {
            state.values.insert(name.to_string(), value);
        }
        state.page = 1;
    }

    /// Timer callback: apply the pending search if it is still the newest
    fn commit_search(&self, generation: u64) {
        let committed = {
            let mut state = self.lock();
            match state.pending.take() {
                Some(pending) if pending.generation == generation => {
                    tracing::debug!(value = %pending.value, "Search committed");
                    self.apply_search(&mut state, pending.value);
                    true
                }
                other => {
                    state.pending = other;
                    false
                }
            }
        };
        if committed {
            self.invalidate();
        }
    }
}

/// Client-side filter, sort and paginate pipeline for one screen
///
/// All operations take `&self`; state lives behind a mutex so the debounce
/// timer can commit search values. No operation fails on bad input: unknown
/// filters and sort fields are ignored, out-of-range pages are clamped and
/// malformed field values are coerced.
pub struct ListController<R> {
    shared: Arc<Shared<R>>,
    debouncer: Debouncer,
}

impl<R> std::fmt::Debug for ListController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController")
            .field("config", &self.shared.config)
            .field("revision", &*self.shared.revision.borrow())
            .finish()
    }
}

impl<R> ListController<R>
where
    R: FieldAccess + Clone + Send + 'static,
{
    /// Create a controller with no records
    ///
    /// # Errors
    /// Returns an error if the configuration registers duplicate filter
    /// names, more than one search filter, or a default sort on an
    /// unregistered field.
    pub fn new(config: ListConfig) -> Result<Self, ListError> {
        config.validate()?;

        let state = ControllerState {
            records: Vec::new(),
            values: HashMap::new(),
            pending: None,
            sort: config.default_sort.clone(),
            page: 1,
            page_size: config.page_size,
        };
        let debouncer = Debouncer::new(config.debounce);
        let (revision, _) = watch::channel(0);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(state),
                revision,
            }),
            debouncer,
        })
    }

    /// The configuration this controller was built with
    pub fn config(&self) -> &ListConfig {
        &self.shared.config
    }

    /// Replace the raw record set.
    ///
    /// Filters, sort and the requested page are kept; the page is clamped
    /// on the next read if the new set is shorter.
    pub fn set_records(&self, records: Vec<R>) {
        let count = records.len();
        self.shared.lock().records = records;
        tracing::debug!(count, "Records replaced");
        self.shared.invalidate();
    }

    /// Run `f` over a snapshot of the raw, unfiltered records.
    ///
    /// The lock is released before `f` runs, so `f` may call back into the
    /// controller.
    pub fn with_records<T>(&self, f: impl FnOnce(&[R]) -> T) -> T {
        let records = self.shared.lock().records.clone();
        f(&records)
    }

    /// Update one filter's value and go back to the first page.
    ///
    /// The search filter's value is applied only after the debounce window;
    /// each call restarts the window and replaces the pending value. Unknown
    /// filter names are ignored.
    pub fn set_filter_value(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(filter) = self.shared.config.filter(name) else {
            tracing::debug!(filter = name, "Ignoring value for unknown filter");
            return;
        };

        if filter.is_search() {
            self.set_search(value);
            return;
        }

        {
            let mut state = self.shared.lock();
            if value.is_empty() {
                state.values.remove(name);
            } else {
                state.values.insert(name.to_string(), value);
            }
            state.page = 1;
        }
        self.shared.invalidate();
    }

    fn set_search(&self, value: String) {
        let mut state = self.shared.lock();
        let shared = Arc::clone(&self.shared);

        // Scheduled while holding the state lock so the commit cannot observe
        // the previous pending value.
        match self
            .debouncer
            .schedule(move |generation| shared.commit_search(generation))
        {
            Some(generation) => {
                state.pending = Some(PendingSearch { value, generation });
            }
            None => {
                tracing::warn!("No async runtime available, applying search without debounce");
                state.pending = None;
                self.shared.apply_search(&mut state, value);
                drop(state);
                self.shared.invalidate();
            }
        }
    }

    /// Apply the pending search value now instead of waiting for the timer
    pub fn flush_search(&self) {
        self.debouncer.cancel();
        let flushed = {
            let mut state = self.shared.lock();
            match state.pending.take() {
                Some(pending) => {
                    self.shared.apply_search(&mut state, pending.value);
                    true
                }
                None => false,
            }
        };
        if flushed {
            self.shared.invalidate();
        }
    }

    /// Empty every filter, drop any pending search and go back to page 1
    pub fn clear_filters(&self) {
        self.debouncer.cancel();
        {
            let mut state = self.shared.lock();
            state.values.clear();
            state.pending = None;
            state.page = 1;
        }
        self.shared.invalidate();
    }

    /// Effective (committed) value of a filter
    pub fn filter_value(&self, name: &str) -> Option<String> {
        self.shared.lock().values.get(name).cloned()
    }

    /// Search value waiting for its debounce window
    pub fn pending_search(&self) -> Option<String> {
        self.shared
            .lock()
            .pending
            .as_ref()
            .map(|pending| pending.value.clone())
    }

    /// Current debounce phase
    pub fn phase(&self) -> ControllerPhase {
        if self.shared.lock().pending.is_some() {
            ControllerPhase::PendingSearch
        } else {
            ControllerPhase::Idle
        }
    }

    /// Change the sort and go back to the first page.
    ///
    /// Re-selecting the active field without a direction toggles it; any
    /// other field starts ascending unless a direction is given.
    /// Unregistered fields are ignored.
    pub fn set_sort(&self, field: &str, direction: Option<SortDirection>) {
        if self.shared.config.sort_field(field).is_none() {
            tracing::debug!(field, "Ignoring sort on unregistered field");
            return;
        }

        {
            let mut state = self.shared.lock();
            let next = match (&state.sort, direction) {
                (_, Some(direction)) => direction,
                (Some(active), None) if active.field == field => active.direction.toggled(),
                (_, None) => SortDirection::Asc,
            };
            state.sort = Some(SortSpec::new(field, next));
            state.page = 1;
        }
        self.shared.invalidate();
    }

    /// Active sort, if any
    pub fn sort(&self) -> Option<SortSpec> {
        self.shared.lock().sort.clone()
    }

    /// Header arrow for `field`: `↑`/`↓` when it is the active sort, else ""
    pub fn sort_indicator(&self, field: &str) -> &'static str {
        match &self.shared.lock().sort {
            Some(sort) if sort.field == field => sort.direction.indicator(),
            _ => "",
        }
    }

    /// Change the page size and go back to the first page
    pub fn set_page_size(&self, page_size: PageSize) {
        {
            let mut state = self.shared.lock();
            state.page_size = page_size;
            state.page = 1;
        }
        self.shared.invalidate();
    }

    /// Jump to a page, clamped to `[1, total_pages]`
    pub fn set_page(&self, page: usize) {
        {
            let mut state = self.shared.lock();
            let total_pages = self.shared.total_pages(&state);
            state.page = page.clamp(1, total_pages);
        }
        self.shared.invalidate();
    }

    /// Advance one page, staying on the last page
    pub fn next_page(&self) {
        let current = self.visible_page_number();
        self.set_page(current.saturating_add(1));
    }

    /// Go back one page, staying on the first page
    pub fn previous_page(&self) {
        let current = self.visible_page_number();
        self.set_page(current.saturating_sub(1));
    }

    fn visible_page_number(&self) -> usize {
        let state = self.shared.lock();
        state.page.clamp(1, self.shared.total_pages(&state))
    }

    /// Derive the current page.
    ///
    /// The requested page is clamped for this read only and is never stored,
    /// so it comes back if the record set grows again. Calling this twice
    /// with no change in between yields equal pages.
    pub fn visible_page(&self) -> VisiblePage<R> {
        let state = self.shared.lock();
        let ordered = self.shared.ordered(&state);
        let total_filtered = ordered.len();
        let total_pages = state.page_size.total_pages(total_filtered);
        let current_page = state.page.clamp(1, total_pages);
        let size = state.page_size.get();

        let page = VisiblePage {
            records: ordered
                .into_iter()
                .skip((current_page - 1) * size)
                .take(size)
                .cloned()
                .collect(),
            total_filtered,
            total_raw: state.records.len(),
            current_page,
            total_pages,
            page_size: state.page_size,
        };
        page
    }

    /// Sorted, distinct, non-empty values of `field` across the raw records,
    /// for populating filter dropdowns
    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        let state = self.shared.lock();
        state
            .records
            .iter()
            .filter_map(|record| record.field(field).as_text().map(|text| text.into_owned()))
            .filter(|text| !text.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Subscribe to state changes; the value is a revision counter that
    /// increases whenever a derived read would change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        *self.shared.revision.borrow()
    }

    /// Cancel the pending search commit, if any. Called when the owning
    /// screen goes away.
    pub fn shutdown(&self) {
        self.debouncer.cancel();
        self.shared.lock().pending = None;
    }
}

impl ListController<Record> {
    /// Replace the records from a raw JSON payload.
    ///
    /// # Errors
    /// Returns an error, leaving the current records untouched, if the
    /// payload is not an array of objects.
    pub fn set_records_json(&self, value: serde_json::Value) -> Result<(), ListError> {
        let records = Record::list_from_json(value)?;
        self.set_records(records);
        Ok(())
    }
}

//! Table data state: canonical rows, derived rows and everything that shapes
//! what a table shows.
//!
//! `TableState` is a plain container. It never renders and never sorts or
//! filters by itself; plugins and the managed-table pipeline compute derived
//! rows and hand them back through [`TableState::set_filtered_data`]. Every
//! mutator that changes what should appear on screen runs the matching hook
//! synchronously before returning.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use serde_json::json;
//! use tablekit::state::{Hook, HookEvent, TableState};
//!
//! let mut state: TableState<serde_json::Value> = TableState::new();
//! let seen = Rc::new(std::cell::Cell::new(0));
//! let counter = Rc::clone(&seen);
//! state.register_hook(Hook::DataChange, move |event| {
//!     if let HookEvent::DataChange { data, .. } = event {
//!         counter.set(data.len());
//!     }
//! });
//!
//! state.set_data(vec![Rc::new(json!({"id": 1})), Rc::new(json!({"id": 2}))]);
//! assert_eq!(seen.get(), 2);
//! assert_eq!(state.filtered_data().len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::markup::Container;
use crate::value::RowId;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Sort direction of the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
    /// Unsorted.
    #[default]
    None,
}

impl SortDirection {
    /// The next direction in the `none → asc → desc → none` cycle.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::None => "none",
        })
    }
}

/// The active sort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    /// Sorted column, `None` when unsorted.
    pub column: Option<String>,
    /// Direction; `None` when unsorted.
    pub direction: SortDirection,
}

impl SortState {
    /// Returns the column and direction when a sort is active.
    #[must_use]
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.column, self.direction) {
            (Some(column), SortDirection::Asc | SortDirection::Desc) => {
                Some((column.as_str(), self.direction))
            }
            _ => None,
        }
    }
}

/// Value of one column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Cell value must be one of these.
    Values(BTreeSet<String>),
    /// Cell text must contain this, case-insensitively.
    Search(String),
    /// Cell number must lie within the bounds (inclusive).
    Range {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
    },
}

impl FilterValue {
    /// Builds a `Values` filter.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    /// Returns whether the filter restricts anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Values(values) => !values.is_empty(),
            Self::Search(text) => !text.trim().is_empty(),
            Self::Range { min, max } => min.is_some() || max.is_some(),
        }
    }
}

/// Active filters by column id.
pub type Filters = BTreeMap<String, FilterValue>;

/// Selected row ids.
pub type Selection = BTreeSet<RowId>;

/// Named hook points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Canonical or derived rows changed.
    DataChange,
    /// Sort column or direction changed.
    Sort,
    /// Filters or search query changed.
    Filter,
    /// Selection changed.
    Select,
    /// A render is about to start.
    BeforeRender,
    /// A render finished.
    Render,
}

/// Payload passed to hooks.
pub enum HookEvent<'a, R> {
    /// Rows changed.
    DataChange {
        /// Canonical rows.
        data: &'a [Rc<R>],
        /// Derived rows.
        filtered: &'a [Rc<R>],
    },
    /// Sort changed.
    Sort {
        /// The new sort.
        sort: &'a SortState,
    },
    /// Filters or search changed.
    Filter {
        /// Active filters.
        filters: &'a Filters,
        /// Search query.
        search: &'a str,
    },
    /// Selection changed.
    Select {
        /// Current selection.
        selection: &'a Selection,
    },
    /// About to render these rows.
    BeforeRender {
        /// Rows about to be rendered.
        rows: &'a [Rc<R>],
    },
    /// Rendered these rows into the container.
    Render {
        /// The table's container.
        container: &'a Container,
        /// Rows rendered.
        rows: &'a [Rc<R>],
        /// Whether the header was rebuilt.
        full: bool,
    },
}

impl<R> HookEvent<'_, R> {
    /// The hook point this event is delivered to.
    #[must_use]
    pub fn hook(&self) -> Hook {
        match self {
            Self::DataChange { .. } => Hook::DataChange,
            Self::Sort { .. } => Hook::Sort,
            Self::Filter { .. } => Hook::Filter,
            Self::Select { .. } => Hook::Select,
            Self::BeforeRender { .. } => Hook::BeforeRender,
            Self::Render { .. } => Hook::Render,
        }
    }
}

/// Handle returned by [`TableState::register_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

type HookFn<R> = Box<dyn FnMut(&HookEvent<'_, R>)>;

struct HookRegistry<R> {
    next_id: u64,
    entries: Vec<(HookId, Hook, HookFn<R>)>,
}

impl<R> HookRegistry<R> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn register(&mut self, hook: Hook, f: HookFn<R>) -> HookId {
        self.next_id += 1;
        let id = HookId(self.next_id);
        self.entries.push((id, hook, f));
        id
    }

    fn unregister(&mut self, id: HookId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    fn run(&mut self, event: &HookEvent<'_, R>) {
        let hook = event.hook();
        for (id, _, f) in self.entries.iter_mut().filter(|(_, h, _)| *h == hook) {
            trace!(?hook, hook_id = id.0, "running hook");
            f(event);
        }
    }
}

/// Data and view state of one table instance.
pub struct TableState<R> {
    data: Vec<Rc<R>>,
    filtered: Vec<Rc<R>>,
    sort: SortState,
    filters: Filters,
    search_query: String,
    selection: Selection,
    visible_columns: Option<HashSet<String>>,
    page: usize,
    page_size: usize,
    total_items: usize,
    hooks: HookRegistry<R>,
}

impl<R> fmt::Debug for TableState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("data", &self.data.len())
            .field("filtered", &self.filtered.len())
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("search_query", &self.search_query)
            .field("selection", &self.selection.len())
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("total_items", &self.total_items)
            .field("hooks", &self.hooks.entries.len())
            .finish()
    }
}

impl<R> Default for TableState<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> TableState<R> {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            filtered: Vec::new(),
            sort: SortState::default(),
            filters: Filters::new(),
            search_query: String::new(),
            selection: Selection::new(),
            visible_columns: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_items: 0,
            hooks: HookRegistry::new(),
        }
    }

    /// Sets the page size (builder pattern).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Replaces the canonical rows; derived rows reset to a copy.
    pub fn set_data(&mut self, data: Vec<Rc<R>>) {
        self.filtered = data.clone();
        self.data = data;
        self.set_total_items(self.filtered.len());
        self.hooks.run(&HookEvent::DataChange {
            data: &self.data,
            filtered: &self.filtered,
        });
    }

    /// Canonical rows.
    #[must_use]
    pub fn data(&self) -> &[Rc<R>] {
        &self.data
    }

    /// Replaces the derived rows.
    ///
    /// Callers pass rows taken from [`TableState::data`]; the state does not
    /// copy them.
    pub fn set_filtered_data(&mut self, filtered: Vec<Rc<R>>) {
        self.filtered = filtered;
        self.hooks.run(&HookEvent::DataChange {
            data: &self.data,
            filtered: &self.filtered,
        });
    }

    /// Derived rows.
    #[must_use]
    pub fn filtered_data(&self) -> &[Rc<R>] {
        &self.filtered
    }

    // ------------------------------------------------------------------
    // Sort, filters, search
    // ------------------------------------------------------------------

    /// Sets the active sort. `SortDirection::None` clears the column.
    pub fn set_sort(&mut self, column: Option<&str>, direction: SortDirection) {
        self.sort = match (column, direction) {
            (Some(column), SortDirection::Asc | SortDirection::Desc) => SortState {
                column: Some(column.to_string()),
                direction,
            },
            _ => SortState::default(),
        };
        self.hooks.run(&HookEvent::Sort { sort: &self.sort });
    }

    /// The active sort.
    #[must_use]
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Sets or, for an inactive value, removes one column filter.
    pub fn set_filter(&mut self, column: &str, value: FilterValue) {
        if value.is_active() {
            self.filters.insert(column.to_string(), value);
        } else {
            self.filters.remove(column);
        }
        self.run_filter_hook();
    }

    /// Removes one column filter.
    pub fn remove_filter(&mut self, column: &str) {
        if self.filters.remove(column).is_some() {
            self.run_filter_hook();
        }
    }

    /// Replaces every filter.
    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters
            .into_iter()
            .filter(|(_, value)| value.is_active())
            .collect();
        self.run_filter_hook();
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.run_filter_hook();
    }

    /// Active filters.
    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Filter on one column.
    #[must_use]
    pub fn filter(&self, column: &str) -> Option<&FilterValue> {
        self.filters.get(column)
    }

    /// Sets the search query.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.run_filter_hook();
    }

    /// The search query.
    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    fn run_filter_hook(&mut self) {
        self.hooks.run(&HookEvent::Filter {
            filters: &self.filters,
            search: &self.search_query,
        });
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Selects one row.
    pub fn select_row(&mut self, id: RowId) {
        if self.selection.insert(id) {
            self.run_select_hook();
        }
    }

    /// Deselects one row.
    pub fn deselect_row(&mut self, id: &RowId) {
        if self.selection.remove(id) {
            self.run_select_hook();
        }
    }

    /// Flips one row; returns whether it is now selected.
    pub fn toggle_row(&mut self, id: RowId) -> bool {
        let selected = if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        };
        self.run_select_hook();
        selected
    }

    /// Adds every id to the selection.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = RowId>) {
        self.selection.extend(ids);
        self.run_select_hook();
    }

    /// Removes the given ids from the selection.
    pub fn deselect_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a RowId>) {
        for id in ids {
            self.selection.remove(id);
        }
        self.run_select_hook();
    }

    /// Clears the selection.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
        self.run_select_hook();
    }

    /// Returns whether a row is selected.
    #[must_use]
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.contains(id)
    }

    /// Selected ids, including ids not currently shown.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    fn run_select_hook(&mut self) {
        self.hooks.run(&HookEvent::Select {
            selection: &self.selection,
        });
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Sets the 1-based page, clamped to the available pages.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Current 1-based page.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Sets the page size (at least 1) and re-clamps the page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.set_page(self.page);
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Sets the item count pagination works against.
    pub fn set_total_items(&mut self, total: usize) {
        self.total_items = total;
        self.set_page(self.page);
    }

    /// Item count pagination works against.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of pages; at least 1.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// The slice of derived rows on the current page.
    #[must_use]
    pub fn paginated_data(&self) -> Vec<Rc<R>> {
        let start = (self.page - 1) * self.page_size;
        if start >= self.filtered.len() {
            return Vec::new();
        }
        let end = (start + self.page_size).min(self.filtered.len());
        self.filtered[start..end].to_vec()
    }

    // ------------------------------------------------------------------
    // Column visibility
    // ------------------------------------------------------------------

    /// Sets the visible columns; `None` shows every column.
    pub fn set_visible_columns(&mut self, columns: Option<HashSet<String>>) {
        self.visible_columns = columns;
    }

    /// Visible columns, `None` when all are visible.
    #[must_use]
    pub fn visible_columns(&self) -> Option<&HashSet<String>> {
        self.visible_columns.as_ref()
    }

    /// Returns whether a column is visible.
    #[must_use]
    pub fn is_column_visible(&self, column: &str) -> bool {
        self.visible_columns
            .as_ref()
            .is_none_or(|visible| visible.contains(column))
    }

    // ------------------------------------------------------------------
    // Hooks and lifecycle
    // ------------------------------------------------------------------

    /// Subscribes `f` to a hook point; hooks run in registration order.
    pub fn register_hook<F>(&mut self, hook: Hook, f: F) -> HookId
    where
        F: FnMut(&HookEvent<'_, R>) + 'static,
    {
        self.hooks.register(hook, Box::new(f))
    }

    /// Unsubscribes a hook; returns whether it was registered.
    pub fn unregister_hook(&mut self, id: HookId) -> bool {
        self.hooks.unregister(id)
    }

    /// Delivers an event to its hook point.
    pub fn run_hook(&mut self, event: &HookEvent<'_, R>) {
        self.hooks.run(event);
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.entries.len()
    }

    /// Unregisters every hook and clears the selection. Safe to repeat.
    pub fn destroy(&mut self) {
        self.hooks.entries.clear();
        self.selection.clear();
    }
}

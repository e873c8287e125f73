//! Managed tables: one core, its plugins, search, column visibility, paging
//! and a stats readout wired into a single object.
//!
//! Every data or query change runs the same pipeline:
//!
//! ```text
//! data → data_transform → pre_filter
//!   → column filters → text search → sort → page slice → render
//! ```
//!
//! `data_transform` and `pre_filter` run again on every pass, so they may
//! read state that changes outside the table; call
//! [`ManagedTable::refilter`] after changing it. The stats total counts the
//! rows left after `pre_filter`.
//!
//! Search input is debounced: [`ManagedTable::on_search_input`] returns a
//! [`Cmd`] that yields a [`SearchTick`] after the debounce delay, and only
//! the newest tick of an active table is applied when fed back through
//! [`ManagedTable::update`].
//!
//! Several tables can share one [`SearchInput`] (one per tab). Only the
//! active table reads or writes it; [`ManagedTable::deactivate`] releases
//! it and invalidates pending ticks without touching the table's state.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::column::Column;
use crate::core::{EmptyState, Outcome, RenderKind, TableCore, TableOptions};
use crate::error::Result;
use crate::event::{Action, PageMove, TableEvent};
use crate::markup::{Container, ContainerRef, Document, Element};
use crate::message::{tick, Cmd, Message};
use crate::plugins::checkboxes::{BatchActionBar, CheckboxesPlugin};
use crate::plugins::filters::{effective_config, filter_data, FilterConfig, FiltersPlugin};
use crate::plugins::sorting::{sort_data, SortingPlugin};
use crate::state::{TableState, DEFAULT_PAGE_SIZE};
use crate::value::{Record, RowId};

/// Delay between the last keystroke and the search being applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Language of the stats readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Ukrainian.
    #[default]
    Uk,
    /// English.
    En,
}

/// Row counts shown under a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Rows passing every filter and the search.
    pub shown: usize,
    /// Rows in the table.
    pub total: usize,
}

impl Stats {
    /// The readout text.
    #[must_use]
    pub fn text(&self, locale: Locale) -> String {
        match locale {
            Locale::Uk => format!("Показано {} з {}", self.shown, self.total),
            Locale::En => format!("Shown {} of {}", self.shown, self.total),
        }
    }
}

#[derive(Debug, Default)]
struct SearchInputInner {
    value: String,
    owner: Option<String>,
}

/// A search box shared by several tables.
///
/// Cloning shares the box.
#[derive(Debug, Clone, Default)]
pub struct SearchInput(Rc<RefCell<SearchInputInner>>);

impl SearchInput {
    /// Creates an empty, unowned input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    #[must_use]
    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    /// Replaces the text, as typing would.
    pub fn set_value(&self, value: impl Into<String>) {
        self.0.borrow_mut().value = value.into();
    }

    /// Id of the table currently owning the input.
    #[must_use]
    pub fn owner(&self) -> Option<String> {
        self.0.borrow().owner.clone()
    }

    /// Whether `table` owns the input.
    #[must_use]
    pub fn is_owned_by(&self, table: &str) -> bool {
        self.0.borrow().owner.as_deref() == Some(table)
    }

    fn claim(&self, table: &str, value: &str) {
        let mut inner = self.0.borrow_mut();
        inner.owner = Some(table.to_string());
        inner.value = value.to_string();
    }

    fn release(&self, table: &str) {
        let mut inner = self.0.borrow_mut();
        if inner.owner.as_deref() == Some(table) {
            inner.owner = None;
        }
    }

    /// The input's markup.
    #[must_use]
    pub fn element(&self) -> Element {
        let inner = self.0.borrow();
        let mut el = Element::new("input")
            .class("table-search")
            .attr("type", "search")
            .attr("data-action", "search")
            .attr("value", inner.value.as_str());
        if let Some(owner) = &inner.owner {
            el.set_attr("data-owner", owner.as_str());
        }
        el
    }
}

/// Debounced search message for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTick {
    /// Table the tick belongs to.
    pub table: String,
    /// Generation; only the newest generation is applied.
    pub tag: u64,
}

type RowFilter<R> = Box<dyn Fn(&[Rc<R>]) -> Vec<Rc<R>>>;
type RowTransform<R> = Box<dyn Fn(Vec<Rc<R>>) -> Vec<Rc<R>>>;

/// Construction options for a [`ManagedTable`].
pub struct ManagedOptions<R> {
    table: TableOptions<R>,
    sorting: bool,
    filters: Option<FilterConfig>,
    selection: bool,
    batch_bar: Option<Rc<RefCell<dyn BatchActionBar>>>,
    column_selector: bool,
    page_size: usize,
    debounce: Duration,
    locale: Locale,
    visible_columns: Option<HashSet<String>>,
    search_input: Option<SearchInput>,
    data_transform: Option<RowTransform<R>>,
    pre_filter: Option<RowFilter<R>>,
}

impl<R> Default for ManagedOptions<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for ManagedOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedOptions")
            .field("table", &self.table)
            .field("sorting", &self.sorting)
            .field("filters", &self.filters)
            .field("selection", &self.selection)
            .field("column_selector", &self.column_selector)
            .field("page_size", &self.page_size)
            .field("debounce", &self.debounce)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl<R> ManagedOptions<R> {
    /// Sorting and the column selector on; no filters, no selection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: TableOptions::new(),
            sorting: true,
            filters: None,
            selection: false,
            batch_bar: None,
            column_selector: true,
            page_size: DEFAULT_PAGE_SIZE,
            debounce: SEARCH_DEBOUNCE,
            locale: Locale::default(),
            visible_columns: None,
            search_input: None,
            data_transform: None,
            pre_filter: None,
        }
    }

    /// Enables or disables header sorting (builder pattern).
    #[must_use]
    pub fn sorting(mut self, on: bool) -> Self {
        self.sorting = on;
        self
    }

    /// Enables column filters with this configuration (builder pattern).
    #[must_use]
    pub fn filters(mut self, config: FilterConfig) -> Self {
        self.filters = Some(config);
        self
    }

    /// Enables row checkboxes (builder pattern).
    #[must_use]
    pub fn selection(mut self, on: bool) -> Self {
        self.selection = on;
        self
    }

    /// Enables row checkboxes mirrored into `bar` (builder pattern).
    #[must_use]
    pub fn batch_bar(mut self, bar: Rc<RefCell<dyn BatchActionBar>>) -> Self {
        self.selection = true;
        self.batch_bar = Some(bar);
        self
    }

    /// Shows or hides the column-visibility selector (builder pattern).
    #[must_use]
    pub fn column_selector(mut self, on: bool) -> Self {
        self.column_selector = on;
        self
    }

    /// Rows per page (builder pattern).
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Search debounce delay (builder pattern).
    #[must_use]
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    /// Stats language (builder pattern).
    #[must_use]
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Initially visible columns (builder pattern).
    #[must_use]
    pub fn visible_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Shares `input` with other tables (builder pattern).
    #[must_use]
    pub fn search_input(mut self, input: SearchInput) -> Self {
        self.search_input = Some(input);
        self
    }

    /// Placeholder for an empty result (builder pattern).
    #[must_use]
    pub fn empty_state(mut self, empty: EmptyState) -> Self {
        self.table = self.table.empty_state(empty);
        self
    }

    /// Row identity function (builder pattern).
    #[must_use]
    pub fn row_id(mut self, f: impl Fn(&R, usize) -> RowId + 'static) -> Self {
        self.table = self.table.row_id(f);
        self
    }

    /// Row-click callback (builder pattern).
    #[must_use]
    pub fn on_row_click(mut self, f: impl FnMut(&RowId, &Rc<R>) + 'static) -> Self {
        self.table = self.table.on_row_click(f);
        self
    }

    /// Transforms rows once whenever data is set (builder pattern).
    #[must_use]
    pub fn data_transform(mut self, f: impl Fn(Vec<Rc<R>>) -> Vec<Rc<R>> + 'static) -> Self {
        self.data_transform = Some(Box::new(f));
        self
    }

    /// Narrows rows before column filters on every pipeline run (builder
    /// pattern).
    #[must_use]
    pub fn pre_filter(mut self, f: impl Fn(&[Rc<R>]) -> Vec<Rc<R>> + 'static) -> Self {
        self.pre_filter = Some(Box::new(f));
        self
    }
}

/// A table with its plugins, search, column selector, pager and stats.
pub struct ManagedTable<R> {
    id: String,
    core: TableCore<R>,
    state: TableState<R>,
    toolbar: Container,
    pager: Container,
    filter_config: FilterConfig,
    data_transform: Option<RowTransform<R>>,
    pre_filter: Option<RowFilter<R>>,
    search: SearchInput,
    pending_query: Option<String>,
    search_tag: u64,
    scope_total: usize,
    debounce: Duration,
    locale: Locale,
    column_selector: bool,
    active: bool,
    destroyed: bool,
}

impl<R> fmt::Debug for ManagedTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedTable")
            .field("id", &self.id)
            .field("core", &self.core)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("search_tag", &self.search_tag)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<R: Record + 'static> ManagedTable<R> {
    /// Creates a managed table rendering into `target`. The toolbar and
    /// pager get their own containers, see [`ManagedTable::toolbar`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContainerNotFound`] when `target` is an id.
    pub fn new(
        target: impl Into<ContainerRef>,
        columns: Vec<Column>,
        options: ManagedOptions<R>,
    ) -> Result<Self> {
        let container = target.into().resolve(None)?;
        let id = container.id();
        let toolbar = Container::new(format!("{id}-toolbar"));
        let pager = Container::new(format!("{id}-pager"));
        Self::build(container, toolbar, pager, columns, options)
    }

    /// Creates a managed table on the container mounted under `id`, mounting
    /// `{id}-toolbar` and `{id}-pager` next to it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContainerNotFound`] when nothing is mounted
    /// under `id`.
    pub fn in_document(
        doc: &mut Document,
        id: &str,
        columns: Vec<Column>,
        options: ManagedOptions<R>,
    ) -> Result<Self> {
        let container = ContainerRef::from(id).resolve(Some(doc))?;
        let toolbar = doc.mount(&format!("{id}-toolbar"));
        let pager = doc.mount(&format!("{id}-pager"));
        Self::build(container, toolbar, pager, columns, options)
    }

    fn build(
        container: Container,
        toolbar: Container,
        pager: Container,
        columns: Vec<Column>,
        options: ManagedOptions<R>,
    ) -> Result<Self> {
        let id = container.id();
        let filter_config = options
            .filters
            .as_ref()
            .map(|config| effective_config(&columns, config))
            .unwrap_or_default();
        let mut state = TableState::new().with_page_size(options.page_size);
        state.set_visible_columns(options.visible_columns);

        let mut core = TableCore::new(container, columns, options.table)?;
        if options.sorting {
            core.use_plugin(&mut state, Box::new(SortingPlugin::delegated()));
        }
        if let Some(config) = options.filters {
            core.use_plugin(&mut state, Box::new(FiltersPlugin::new(config).delegated()));
        }
        if options.selection {
            let plugin = match options.batch_bar {
                Some(bar) => CheckboxesPlugin::new().batch_bar(bar),
                None => CheckboxesPlugin::new(),
            };
            core.use_plugin(&mut state, Box::new(plugin));
        }

        Ok(Self {
            id,
            core,
            state,
            toolbar,
            pager,
            filter_config,
            data_transform: options.data_transform,
            pre_filter: options.pre_filter,
            search: options.search_input.unwrap_or_default(),
            pending_query: None,
            search_tag: 0,
            scope_total: 0,
            debounce: options.debounce,
            locale: options.locale,
            column_selector: options.column_selector,
            active: false,
            destroyed: false,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Table id (the container id).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The render core.
    #[must_use]
    pub fn core(&self) -> &TableCore<R> {
        &self.core
    }

    /// The table state.
    #[must_use]
    pub fn state(&self) -> &TableState<R> {
        &self.state
    }

    /// The table state, for hooks and direct selection changes.
    pub fn state_mut(&mut self) -> &mut TableState<R> {
        &mut self.state
    }

    /// Container holding the column selector and stats.
    #[must_use]
    pub fn toolbar(&self) -> &Container {
        &self.toolbar
    }

    /// Container holding the pager.
    #[must_use]
    pub fn pager(&self) -> &Container {
        &self.pager
    }

    /// The search input this table reads when active.
    #[must_use]
    pub fn search_input(&self) -> &SearchInput {
        &self.search
    }

    /// Whether this table owns the search input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.owns_input()
    }

    /// Current row counts.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            shown: self.state.filtered_data().len(),
            total: self.scope_total,
        }
    }

    /// Current readout text.
    #[must_use]
    pub fn stats_text(&self) -> String {
        self.stats().text(self.locale)
    }

    /// Toolbar, table and pager serialized together.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            "{}{}{}",
            self.toolbar.to_html(),
            self.core.container().to_html(),
            self.pager.to_html()
        )
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    fn search_rows(&self, rows: Vec<Rc<R>>) -> Vec<Rc<R>> {
        let query = self.state.search_query().trim().to_lowercase();
        if query.is_empty() {
            return rows;
        }
        let terms: Vec<&str> = query.split_whitespace().collect();
        let columns: Vec<&Column> = self
            .core
            .columns()
            .iter()
            .filter(|c| c.searchable && self.state.is_column_visible(&c.id))
            .collect();
        rows.into_iter()
            .filter(|row| {
                let texts: Vec<String> = columns
                    .iter()
                    .map(|c| c.text(&**row).to_lowercase())
                    .collect();
                terms
                    .iter()
                    .all(|term| texts.iter().any(|text| text.contains(term)))
            })
            .collect()
    }

    /// Returns the derived rows and the size of the pre-filtered scope.
    fn derive_rows(&self) -> (Vec<Rc<R>>, usize) {
        let data = self.state.data().to_vec();
        let data = match &self.data_transform {
            Some(f) => f(data),
            None => data,
        };
        let scoped = match &self.pre_filter {
            Some(f) => f(&data),
            None => data,
        };
        let scope = scoped.len();
        let rows = filter_data(&scoped, self.state.filters(), &self.filter_config);
        let rows = self.search_rows(rows);
        let rows = match self.state.sort().active() {
            Some((column, direction)) => match self.core.column(column) {
                Some(column) => sort_data(&rows, column, direction),
                None => rows,
            },
            None => rows,
        };
        (rows, scope)
    }

    fn recompute(&mut self) {
        let (rows, scope) = self.derive_rows();
        let total = rows.len();
        self.scope_total = scope;
        self.state.set_filtered_data(rows);
        self.state.set_total_items(total);
    }

    fn owns_input(&self) -> bool {
        self.active && self.search.is_owned_by(&self.id)
    }

    fn draw(&mut self, kind: RenderKind) {
        if self.destroyed {
            return;
        }
        let page = self.state.paginated_data();
        match kind {
            RenderKind::Full => self.core.render(&mut self.state, Some(page.as_slice())),
            RenderKind::Rows => self.core.update_rows(&mut self.state, Some(page.as_slice())),
        }
        self.sync_chrome();
        debug!(
            table = %self.id,
            page = self.state.page(),
            rows = page.len(),
            shown = self.state.filtered_data().len(),
            "managed table drawn"
        );
    }

    fn sync_chrome(&self) {
        let mut toolbar = Element::new("div").class("managed-toolbar");
        if self.column_selector {
            toolbar = toolbar.child(self.selector());
        }
        let stats = self.stats();
        toolbar = toolbar.child(
            Element::new("span")
                .class("table-stats")
                .attr("data-shown", stats.shown.to_string())
                .attr("data-total", stats.total.to_string())
                .text(stats.text(self.locale)),
        );
        self.toolbar.borrow_mut().children = vec![toolbar.into()];
        self.pager.borrow_mut().children = vec![self.pager_element().into()];
    }

    fn selector(&self) -> Element {
        Element::new("div")
            .class("column-selector")
            .children(self.core.columns().iter().map(|column| {
                let mut checkbox = Element::new("input").attr("type", "checkbox");
                if self.state.is_column_visible(&column.id) {
                    checkbox.set_attr("checked", "checked");
                }
                Element::new("label")
                    .class("column-option")
                    .attr("data-action", "toggle-column")
                    .attr("data-column", column.id.as_str())
                    .child(checkbox)
                    .child(Element::new("span").text(column.label.as_str()))
            }))
    }

    fn pager_element(&self) -> Element {
        let page = self.state.page();
        let pages = self.state.total_pages();
        let mut prev = Element::new("button")
            .class("page-prev")
            .attr("data-action", "page-prev")
            .text("‹");
        if page <= 1 {
            prev.set_attr("disabled", "disabled");
        }
        let mut next = Element::new("button")
            .class("page-next")
            .attr("data-action", "page-next")
            .text("›");
        if page >= pages {
            next.set_attr("disabled", "disabled");
        }
        let mut el = Element::new("div")
            .class("table-pager")
            .child(prev)
            .child(Element::new("span").class("page-info").text(format!("{page}/{pages}")))
            .child(next);
        el.toggle_class("hidden", pages <= 1);
        el
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Replaces the rows and renders in full.
    pub fn set_data(&mut self, rows: Vec<Rc<R>>) {
        if self.destroyed {
            return;
        }
        self.state.set_data(rows);
        self.recompute();
        self.draw(RenderKind::Full);
    }

    /// Re-runs the pipeline, e.g. after whatever `data_transform` or
    /// `pre_filter` reads changed.
    pub fn refilter(&mut self) {
        if self.destroyed {
            return;
        }
        self.recompute();
        self.draw(RenderKind::Rows);
    }

    /// Applies a search immediately and goes back to page 1.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        if self.destroyed {
            return;
        }
        let query = query.into();
        if self.owns_input() {
            self.search.set_value(query.as_str());
        }
        self.pending_query = None;
        self.state.set_search_query(query);
        self.state.set_page(1);
        self.recompute();
        self.draw(RenderKind::Rows);
    }

    /// Moves to a 1-based page (clamped).
    pub fn set_page(&mut self, page: usize) {
        if self.destroyed {
            return;
        }
        self.state.set_page(page);
        self.draw(RenderKind::Rows);
    }

    /// Changes the page size and goes back to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        if self.destroyed {
            return;
        }
        self.state.set_page_size(page_size);
        self.state.set_page(1);
        self.draw(RenderKind::Rows);
    }

    /// Shows or hides a column. The last visible column cannot be hidden.
    ///
    /// Returns whether visibility changed.
    pub fn toggle_column(&mut self, column: &str) -> bool {
        if self.destroyed || self.core.column(column).is_none() {
            return false;
        }
        let all: Vec<String> = self.core.columns().iter().map(|c| c.id.clone()).collect();
        let mut visible: HashSet<String> = all
            .iter()
            .filter(|id| self.state.is_column_visible(id))
            .cloned()
            .collect();
        if !visible.remove(column) {
            visible.insert(column.to_string());
        } else if visible.is_empty() {
            return false;
        }
        let ids = (visible.len() < all.len()).then_some(visible);
        self.core.set_visible_columns(&mut self.state, ids);

        if self.state.search_query().trim().is_empty() {
            self.sync_chrome();
        } else {
            self.recompute();
            self.draw(RenderKind::Rows);
        }
        true
    }

    /// Handles a click or input routed to this table.
    ///
    /// Column toggles and pager buttons are handled here; everything else
    /// goes through the core's dispatch table. Search input goes through
    /// [`ManagedTable::on_search_input`] instead.
    pub fn handle(&mut self, event: &TableEvent) -> Outcome {
        if self.destroyed {
            return Outcome::Ignored;
        }
        let action = event.action();
        trace!(table = %self.id, ?action, "managed table event");
        if matches!(action, Action::ToggleColumn(_) | Action::Page(_)) {
            self.core.dismiss_panels(&mut self.state, event);
        }
        match &action {
            Action::ToggleColumn(column) => {
                if self.toggle_column(column) {
                    Outcome::Handled
                } else {
                    Outcome::Ignored
                }
            }
            Action::Page(page_move) => {
                let page = self.state.page();
                let target = match page_move {
                    PageMove::Prev => page.saturating_sub(1),
                    PageMove::Next => page + 1,
                    PageMove::Goto(n) => *n,
                };
                self.set_page(target);
                Outcome::Handled
            }
            Action::Search(_) => Outcome::Ignored,
            _ => {
                let outcome = self.core.dispatch_action(&mut self.state, &action, event);
                match outcome {
                    Outcome::Filtered => {
                        self.state.set_page(1);
                        self.recompute();
                        self.draw(RenderKind::Rows);
                    }
                    Outcome::Sorted => {
                        self.recompute();
                        self.draw(RenderKind::Rows);
                    }
                    _ => {}
                }
                outcome
            }
        }
    }

    /// Records typed search text and returns the debounce command.
    ///
    /// Inactive tables ignore input and return `None`.
    pub fn on_search_input(&mut self, text: impl Into<String>) -> Option<Cmd> {
        if self.destroyed || !self.owns_input() {
            return None;
        }
        let text = text.into();
        self.search.set_value(text.as_str());
        self.pending_query = Some(text);
        self.search_tag += 1;
        let tick_msg = SearchTick {
            table: self.id.clone(),
            tag: self.search_tag,
        };
        Some(tick(self.debounce, move |_| Message::new(tick_msg)))
    }

    /// Applies a message produced by one of this table's commands.
    ///
    /// Returns whether the message changed anything. Ticks for other tables,
    /// stale ticks and ticks arriving while inactive are dropped.
    pub fn update(&mut self, msg: &Message) -> bool {
        let Some(tick) = msg.downcast_ref::<SearchTick>() else {
            return false;
        };
        if tick.table != self.id || tick.tag != self.search_tag || !self.owns_input() {
            trace!(table = %self.id, tag = tick.tag, "stale search tick dropped");
            return false;
        }
        let Some(query) = self.pending_query.take() else {
            return false;
        };
        self.set_search_query(query);
        true
    }

    /// Claims the shared search input. Safe to repeat; a table whose claim
    /// was taken over by another table claims it back.
    pub fn activate(&mut self) {
        if self.destroyed || self.owns_input() {
            return;
        }
        self.search.claim(&self.id, self.state.search_query());
        self.active = true;
        debug!(table = %self.id, "managed table activated");
    }

    /// Releases the search input and drops pending search ticks; the table
    /// keeps its state. Safe to repeat.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.search.release(&self.id);
        self.pending_query = None;
        self.search_tag += 1;
        self.active = false;
        debug!(table = %self.id, "managed table deactivated");
    }

    /// Deactivates, destroys plugins and state, and clears the chrome.
    /// Safe to repeat.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.deactivate();
        self.core.destroy(&mut self.state);
        self.toolbar.borrow_mut().children.clear();
        self.pager.borrow_mut().children.clear();
        self.destroyed = true;
    }
}

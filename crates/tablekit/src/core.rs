//! The render core and the plugin protocol.
//!
//! [`TableCore`] turns `(columns, rows)` into header and row markup inside a
//! [`Container`]. It holds no table data of its own: rows come from the
//! [`TableState`] passed into every call (or from an explicit slice), and all
//! behaviour beyond plain rendering lives in [`Plugin`]s.
//!
//! The rendered layout is:
//!
//! ```text
//! div#container.tk-table
//! ├── div.table-header
//! │   ├── div.header-cell[data-column]   label, sort marker, plugin icons
//! │   └── div.header-actions             plugin controls (select-all)
//! ├── div.table-row[data-row-id]         one per row
//! │   ├── div.cell[data-column]
//! │   └── div.row-actions                plugin controls (row checkbox)
//! └── div.table-empty                    only when there are no rows
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use serde_json::json;
//! use tablekit::column::{col, ColumnOverrides, ColumnType};
//! use tablekit::core::{TableCore, TableOptions};
//! use tablekit::markup::Container;
//! use tablekit::state::TableState;
//!
//! let columns = vec![col("word", "Word", ColumnType::Name, ColumnOverrides::default())];
//! let mut state = TableState::new();
//! state.set_data(vec![Rc::new(json!({"id": 1, "word": "spam"}))]);
//!
//! let mut core = TableCore::new(Container::new("words"), columns, TableOptions::new()).unwrap();
//! core.render(&mut state, None);
//! assert_eq!(core.rendered_ids().len(), 1);
//! assert!(core.container().to_html().contains("<strong>spam</strong>"));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::column::Column;
use crate::error::Result;
use crate::event::{Action, ActionKind, TableEvent};
use crate::markup::{Container, ContainerRef, Document, Element, Node};
use crate::state::{HookEvent, TableState};
use crate::value::{default_row_id, Record, RowId};

/// Class toggled on cells of hidden columns.
pub const HIDDEN_CLASS: &str = "column-hidden";

/// Computes a row's identity from the row and its index in the rendered rows.
pub type RowIdFn<R> = Rc<dyn Fn(&R, usize) -> RowId>;

type RowClickFn<R> = Box<dyn FnMut(&RowId, &Rc<R>)>;
type AfterRenderFn<R> = Box<dyn FnMut(&Container, &[Rc<R>])>;

/// Placeholder shown when there are no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyState {
    /// Message text.
    pub message: String,
    /// Optional icon text shown above the message.
    #[serde(default)]
    pub icon: Option<String>,
}

impl EmptyState {
    /// A placeholder with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            icon: None,
        }
    }

    /// Sets the icon (builder pattern).
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    fn element(&self) -> Element {
        let mut el = Element::new("div").class("table-empty");
        if let Some(icon) = &self.icon {
            el = el.child(Element::new("span").class("empty-icon").text(icon.clone()));
        }
        el.child(Element::new("p").class("empty-message").text(self.message.clone()))
    }
}

/// Construction options for a [`TableCore`].
pub struct TableOptions<R> {
    row_id: Option<RowIdFn<R>>,
    empty_state: Option<EmptyState>,
    paginate: bool,
    on_row_click: Option<RowClickFn<R>>,
    on_after_render: Option<AfterRenderFn<R>>,
}

impl<R> Default for TableOptions<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for TableOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("row_id", &self.row_id.is_some())
            .field("empty_state", &self.empty_state)
            .field("paginate", &self.paginate)
            .field("on_row_click", &self.on_row_click.is_some())
            .field("on_after_render", &self.on_after_render.is_some())
            .finish()
    }
}

impl<R> TableOptions<R> {
    /// Default options: default row ids, no placeholder, no pagination.
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_id: None,
            empty_state: None,
            paginate: false,
            on_row_click: None,
            on_after_render: None,
        }
    }

    /// Sets the row identity function (builder pattern).
    #[must_use]
    pub fn row_id(mut self, f: impl Fn(&R, usize) -> RowId + 'static) -> Self {
        self.row_id = Some(Rc::new(f));
        self
    }

    /// Sets the empty-state placeholder (builder pattern).
    #[must_use]
    pub fn empty_state(mut self, empty: EmptyState) -> Self {
        self.empty_state = Some(empty);
        self
    }

    /// Renders `paginated_data` instead of `filtered_data` by default
    /// (builder pattern).
    #[must_use]
    pub fn paginate(mut self, paginate: bool) -> Self {
        self.paginate = paginate;
        self
    }

    /// Sets the row-click callback (builder pattern).
    #[must_use]
    pub fn on_row_click(mut self, f: impl FnMut(&RowId, &Rc<R>) + 'static) -> Self {
        self.on_row_click = Some(Box::new(f));
        self
    }

    /// Sets a callback run after every render (builder pattern).
    #[must_use]
    pub fn on_after_render(mut self, f: impl FnMut(&Container, &[Rc<R>]) + 'static) -> Self {
        self.on_after_render = Some(Box::new(f));
        self
    }
}

/// Which render path just ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Header and rows were rebuilt.
    Full,
    /// Only rows were replaced; the header node is the same.
    Rows,
}

/// A re-render requested by a plugin while handling an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    /// Incremental row update.
    Rows,
    /// Full render.
    Full,
}

/// Result of dispatching an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing handled the action.
    Ignored,
    /// Handled; only plugin-owned markup changed.
    Handled,
    /// The sort in state changed.
    Sorted,
    /// The filters in state changed.
    Filtered,
    /// The selection changed.
    Selected,
    /// A row was clicked.
    RowClicked(RowId),
}

/// A behaviour attached to a [`TableCore`].
///
/// Plugins are held by the core and receive the state explicitly on every
/// call. While a plugin handles an action it must not render directly;
/// it asks for a re-render with [`TableCore::request_redraw`], which the core
/// performs once every plugin has returned.
pub trait Plugin<R> {
    /// Plugin name, for logs.
    fn name(&self) -> &'static str;

    /// Action kinds routed to this plugin.
    fn actions(&self) -> &'static [ActionKind] {
        &[]
    }

    /// Called once when the plugin is attached.
    fn init(&mut self, _core: &mut TableCore<R>, _state: &mut TableState<R>) {}

    /// Called after every render, before the Render hooks.
    fn on_render(&mut self, _core: &TableCore<R>, _state: &mut TableState<R>, _kind: RenderKind) {}

    /// Handles a routed action.
    fn handle(
        &mut self,
        _action: &Action,
        _event: &TableEvent,
        _core: &mut TableCore<R>,
        _state: &mut TableState<R>,
    ) -> Outcome {
        Outcome::Ignored
    }

    /// Releases whatever the plugin attached. Must be safe to repeat and
    /// safe without a prior `init`.
    fn destroy(&mut self, _state: &mut TableState<R>) {}
}

/// Stateless render engine for one container.
pub struct TableCore<R> {
    container: Container,
    columns: Vec<Column>,
    options: TableOptions<R>,
    plugins: Vec<Box<dyn Plugin<R>>>,
    routes: HashMap<ActionKind, Vec<usize>>,
    rendered: Vec<(RowId, Rc<R>)>,
    pending: Option<Redraw>,
    renders: usize,
    destroyed: bool,
}

impl<R> fmt::Debug for TableCore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCore")
            .field("container", &self.container.id())
            .field("columns", &self.columns.len())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("rendered", &self.rendered.len())
            .field("renders", &self.renders)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<R: Record + 'static> TableCore<R> {
    /// Creates a core rendering into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContainerNotFound`] when `target` is an id;
    /// ids need a document, see [`TableCore::in_document`].
    pub fn new(
        target: impl Into<ContainerRef>,
        columns: Vec<Column>,
        options: TableOptions<R>,
    ) -> Result<Self> {
        Self::resolve(target.into(), None, columns, options)
    }

    /// Creates a core rendering into the container mounted under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ContainerNotFound`] when nothing is mounted
    /// under `id`.
    pub fn in_document(
        doc: &Document,
        id: &str,
        columns: Vec<Column>,
        options: TableOptions<R>,
    ) -> Result<Self> {
        Self::resolve(ContainerRef::from(id), Some(doc), columns, options)
    }

    fn resolve(
        target: ContainerRef,
        doc: Option<&Document>,
        columns: Vec<Column>,
        options: TableOptions<R>,
    ) -> Result<Self> {
        let container = target.resolve(doc)?;
        Ok(Self {
            container,
            columns,
            options,
            plugins: Vec::new(),
            routes: HashMap::new(),
            rendered: Vec::new(),
            pending: None,
            renders: 0,
            destroyed: false,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The container rendered into.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column.
    #[must_use]
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Ids of the rows in the last render, in order.
    #[must_use]
    pub fn rendered_ids(&self) -> Vec<RowId> {
        self.rendered.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Rows in the last render, in order.
    #[must_use]
    pub fn rendered_rows(&self) -> Vec<Rc<R>> {
        self.rendered.iter().map(|(_, row)| Rc::clone(row)).collect()
    }

    /// Number of renders so far, full and incremental.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Whether the default render source is the current page.
    #[must_use]
    pub fn paginates(&self) -> bool {
        self.options.paginate
    }

    /// Names of attached plugins, in attach order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Whether [`TableCore::destroy`] ran.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Identity of `row` at `index`.
    pub fn row_id(&self, row: &R, index: usize) -> RowId {
        match &self.options.row_id {
            Some(f) => f(row, index),
            None => default_row_id(row, index),
        }
    }

    /// The rendered row element with `id`, cloned.
    #[must_use]
    pub fn row_element(&self, id: &RowId) -> Option<Element> {
        self.container
            .borrow()
            .find(&|e| e.has_class("table-row") && e.get_attr("data-row-id") == Some(id.as_str()))
            .cloned()
    }

    /// The rendered header cell for `column`, cloned.
    #[must_use]
    pub fn header_cell(&self, column: &str) -> Option<Element> {
        self.container
            .borrow()
            .find(&|e| e.has_class("header-cell") && e.get_attr("data-column") == Some(column))
            .cloned()
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn source_rows(&self, state: &TableState<R>) -> Vec<Rc<R>> {
        if self.options.paginate {
            state.paginated_data()
        } else {
            state.filtered_data().to_vec()
        }
    }

    /// Full render of `data`, or of the default source when `None`.
    pub fn render(&mut self, state: &mut TableState<R>, data: Option<&[Rc<R>]>) {
        if self.destroyed {
            return;
        }
        let rows = data.map_or_else(|| self.source_rows(state), <[Rc<R>]>::to_vec);
        state.run_hook(&HookEvent::BeforeRender { rows: &rows });

        let header = self.header(state);
        let body = self.body(state, &rows);
        {
            let mut root = self.container.borrow_mut();
            root.add_class("tk-table");
            root.children.clear();
            root.children.push(Node::Element(header));
            root.children.extend(body.into_iter().map(Node::Element));
        }
        debug!(container = %self.container.id(), rows = rows.len(), "table rendered");
        self.finish_render(state, &rows, RenderKind::Full);
    }

    /// Replaces only the row nodes, keeping the header node.
    ///
    /// Falls back to a full render when nothing was rendered yet.
    pub fn update_rows(&mut self, state: &mut TableState<R>, data: Option<&[Rc<R>]>) {
        if self.destroyed {
            return;
        }
        let has_header = self
            .container
            .borrow()
            .element_children()
            .any(|e| e.has_class("table-header"));
        if !has_header {
            self.render(state, data);
            return;
        }

        let rows = data.map_or_else(|| self.source_rows(state), <[Rc<R>]>::to_vec);
        state.run_hook(&HookEvent::BeforeRender { rows: &rows });

        let body = self.body(state, &rows);
        {
            let mut root = self.container.borrow_mut();
            root.children.retain(|node| {
                node.as_element()
                    .is_none_or(|e| !e.has_class("table-row") && !e.has_class("table-empty"))
            });
            let at = root
                .children
                .iter()
                .position(|n| n.as_element().is_some_and(|e| e.has_class("table-header")))
                .map_or(0, |i| i + 1);
            root.children
                .splice(at..at, body.into_iter().map(Node::Element));
        }
        debug!(container = %self.container.id(), rows = rows.len(), "table rows updated");
        self.finish_render(state, &rows, RenderKind::Rows);
    }

    fn finish_render(&mut self, state: &mut TableState<R>, rows: &[Rc<R>], kind: RenderKind) {
        self.renders += 1;

        let mut plugins = std::mem::take(&mut self.plugins);
        for plugin in &mut plugins {
            plugin.on_render(self, state, kind);
        }
        self.plugins = plugins;

        state.run_hook(&HookEvent::Render {
            container: &self.container,
            rows,
            full: kind == RenderKind::Full,
        });
        if let Some(f) = self.options.on_after_render.as_mut() {
            f(&self.container, rows);
        }
    }

    fn header(&self, state: &TableState<R>) -> Element {
        let mut header = Element::new("div").class("table-header");
        for column in &self.columns {
            let mut cell = Element::new("div")
                .class("header-cell")
                .class(column.alignment.class())
                .attr("data-column", column.id.as_str())
                .attr("data-weight", column.render_weight.to_string())
                .attr("style", format!("flex: {}", column.render_weight))
                .child(
                    Element::new("span")
                        .class("header-label")
                        .text(column.label.as_str()),
                );
            if column.sortable {
                cell.add_class("sortable");
                cell.set_attr("data-action", "sort");
                cell = cell.child(Element::new("span").class("sort-marker"));
            }
            if column.filterable {
                cell.add_class("filterable");
            }
            cell.toggle_class(HIDDEN_CLASS, !state.is_column_visible(&column.id));
            header = header.child(cell);
        }
        header.child(Element::new("div").class("header-actions"))
    }

    fn body(&mut self, state: &TableState<R>, rows: &[Rc<R>]) -> Vec<Element> {
        self.rendered = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (self.row_id(row, i), Rc::clone(row)))
            .collect();

        if rows.is_empty() {
            return self
                .options
                .empty_state
                .as_ref()
                .map(EmptyState::element)
                .into_iter()
                .collect();
        }

        self.rendered
            .iter()
            .map(|(id, row)| self.row(state, id, row))
            .collect()
    }

    fn row(&self, state: &TableState<R>, id: &RowId, row: &R) -> Element {
        let mut el = Element::new("div")
            .class("table-row")
            .attr("data-action", "row")
            .attr("data-row-id", id.as_str());
        el.toggle_class("selected", state.is_selected(id));
        for column in &self.columns {
            let mut cell = Element::new("div")
                .class("cell")
                .class(column.alignment.class())
                .attr("data-column", column.id.as_str())
                .attr("style", format!("flex: {}", column.render_weight));
            if column.tooltip {
                let title = column.text(row);
                if !title.is_empty() {
                    cell.set_attr("title", title);
                }
            }
            cell.toggle_class(HIDDEN_CLASS, !state.is_column_visible(&column.id));
            cell.children = column.render_cell(row);
            el = el.child(cell);
        }
        el.child(Element::new("div").class("row-actions"))
    }

    /// Shows only `ids` (or every column for `None`) by toggling
    /// [`HIDDEN_CLASS`] on rendered cells. Nothing is re-rendered.
    pub fn set_visible_columns(&mut self, state: &mut TableState<R>, ids: Option<HashSet<String>>) {
        state.set_visible_columns(ids);
        let touched = self.container.borrow_mut().for_each_mut(
            &|e| {
                (e.has_class("header-cell") || e.has_class("cell"))
                    && e.get_attr("data-column").is_some()
            },
            &mut |e| {
                let visible = e
                    .get_attr("data-column")
                    .is_none_or(|column| state.is_column_visible(column));
                e.toggle_class(HIDDEN_CLASS, !visible);
            },
        );
        trace!(cells = touched, "column visibility applied");
    }

    // ------------------------------------------------------------------
    // Plugins and dispatch
    // ------------------------------------------------------------------

    /// Attaches a plugin and runs its `init`.
    ///
    /// A plugin attached after the first render is brought up to date with
    /// an immediate `on_render(Full)`.
    pub fn use_plugin(&mut self, state: &mut TableState<R>, mut plugin: Box<dyn Plugin<R>>) {
        if self.destroyed {
            return;
        }
        plugin.init(self, state);
        if self.renders > 0 {
            plugin.on_render(self, state, RenderKind::Full);
        }
        let index = self.plugins.len();
        for kind in plugin.actions() {
            self.routes.entry(*kind).or_default().push(index);
        }
        debug!(plugin = plugin.name(), "plugin attached");
        self.plugins.push(plugin);
    }

    /// Asks for a re-render once the current dispatch finishes.
    pub fn request_redraw(&mut self, redraw: Redraw) {
        self.pending = Some(self.pending.map_or(redraw, |pending| pending.max(redraw)));
    }

    /// Routes an event to the row-click callback or to the plugins
    /// registered for its action kind.
    pub fn dispatch(&mut self, state: &mut TableState<R>, event: &TableEvent) -> Outcome {
        let action = event.action();
        self.dispatch_action(state, &action, event)
    }

    /// Routes an already parsed action.
    pub fn dispatch_action(
        &mut self,
        state: &mut TableState<R>,
        action: &Action,
        event: &TableEvent,
    ) -> Outcome {
        if self.destroyed {
            return Outcome::Ignored;
        }
        trace!(?action, "dispatching action");

        if action.dismisses_panels() {
            self.route(state, &Action::Outside, event);
        }
        let outcome = match action {
            Action::RowClick(id) => self.click_row(id),
            _ => self.route(state, action, event),
        };
        self.flush(state);
        outcome
    }

    /// Closes whatever panel a plugin has open, as a click outside it would.
    pub fn dismiss_panels(&mut self, state: &mut TableState<R>, event: &TableEvent) {
        if self.destroyed {
            return;
        }
        self.route(state, &Action::Outside, event);
        self.flush(state);
    }

    fn route(&mut self, state: &mut TableState<R>, action: &Action, event: &TableEvent) -> Outcome {
        let Some(targets) = self.routes.get(&action.kind()).cloned() else {
            return Outcome::Ignored;
        };
        let mut plugins = std::mem::take(&mut self.plugins);
        let mut outcome = Outcome::Ignored;
        for index in targets {
            if let Some(plugin) = plugins.get_mut(index) {
                let result = plugin.handle(action, event, self, state);
                if result != Outcome::Ignored {
                    trace!(plugin = plugin.name(), ?result, "action handled");
                    outcome = result;
                }
            }
        }
        self.plugins = plugins;
        outcome
    }

    fn flush(&mut self, state: &mut TableState<R>) {
        match self.pending.take() {
            Some(Redraw::Full) => self.render(state, None),
            Some(Redraw::Rows) => self.update_rows(state, None),
            None => {}
        }
    }

    fn click_row(&mut self, id: &RowId) -> Outcome {
        let Some(row) = self
            .rendered
            .iter()
            .find(|(rendered, _)| rendered == id)
            .map(|(_, row)| Rc::clone(row))
        else {
            return Outcome::Ignored;
        };
        if let Some(f) = self.options.on_row_click.as_mut() {
            f(id, &row);
        }
        Outcome::RowClicked(id.clone())
    }

    /// Destroys every plugin, then the state. Safe to repeat.
    pub fn destroy(&mut self, state: &mut TableState<R>) {
        if self.destroyed {
            return;
        }
        for plugin in &mut self.plugins {
            plugin.destroy(state);
        }
        self.plugins.clear();
        self.routes.clear();
        self.rendered.clear();
        self.pending = None;
        state.destroy();
        self.destroyed = true;
        debug!(container = %self.container.id(), "table destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{col, ColumnOverrides, ColumnType};
    use crate::error::Error;
    use crate::state::Hook;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    fn columns() -> Vec<Column> {
        vec![
            col("id", "ID", ColumnType::IdText, ColumnOverrides::default()),
            col("word", "Word", ColumnType::Text, ColumnOverrides::default()),
            col(
                "note",
                "Note",
                ColumnType::Text,
                ColumnOverrides {
                    tooltip: Some(false),
                    ..Default::default()
                },
            ),
        ]
    }

    fn state_with(n: usize) -> TableState<Value> {
        let mut state = TableState::new();
        state.set_data(
            (1..=n)
                .map(|i| Rc::new(json!({"id": format!("w-{i}"), "word": format!("word {i}"), "note": "n"})))
                .collect(),
        );
        state
    }

    fn core() -> TableCore<Value> {
        TableCore::new(Container::new("t"), columns(), TableOptions::new()).unwrap()
    }

    fn count(core: &TableCore<Value>, class: &str) -> usize {
        core.container().borrow().find_all(&|e| e.has_class(class)).len()
    }

    #[test]
    fn test_unresolvable_container_is_an_error() {
        let err = TableCore::<Value>::new("missing", columns(), TableOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ContainerNotFound(id) if id == "missing"));

        let doc = Document::new();
        assert!(TableCore::<Value>::in_document(&doc, "missing", columns(), TableOptions::new()).is_err());
    }

    #[test]
    fn test_render_builds_header_and_rows() {
        let mut state = state_with(3);
        let mut core = core();
        core.render(&mut state, None);

        assert_eq!(count(&core, "table-header"), 1);
        assert_eq!(count(&core, "header-cell"), 3);
        assert_eq!(count(&core, "table-row"), 3);
        assert_eq!(count(&core, "row-actions"), 3);
        assert_eq!(
            core.rendered_ids(),
            vec![RowId::from("w-1"), RowId::from("w-2"), RowId::from("w-3")]
        );
    }

    #[test]
    fn test_tooltip_follows_column_flag() {
        let mut state = state_with(1);
        let mut core = core();
        core.render(&mut state, None);
        let row = core.row_element(&RowId::from("w-1")).unwrap();
        let cells: Vec<_> = row.element_children().filter(|e| e.has_class("cell")).collect();
        assert_eq!(cells[1].get_attr("title"), Some("word 1"));
        assert_eq!(cells[2].get_attr("title"), None);
    }

    #[test]
    fn test_missing_value_renders_empty_cell() {
        let mut state = TableState::new();
        state.set_data(vec![Rc::new(json!({"id": "x"}))]);
        let mut core = core();
        core.render(&mut state, None);
        let row = core.row_element(&RowId::from("x")).unwrap();
        let word = row
            .find(&|e| e.has_class("cell") && e.get_attr("data-column") == Some("word"))
            .unwrap();
        assert!(word.children.is_empty());
    }

    #[test]
    fn test_empty_state_placeholder() {
        let mut state = state_with(0);
        let mut core = TableCore::new(
            Container::new("t"),
            columns(),
            TableOptions::new().empty_state(EmptyState::new("Nothing here").icon("∅")),
        )
        .unwrap();
        core.render(&mut state, None);
        assert_eq!(count(&core, "table-empty"), 1);
        assert!(core.container().to_html().contains("Nothing here"));

        state.set_data(vec![Rc::new(json!({"id": 1}))]);
        core.update_rows(&mut state, None);
        assert_eq!(count(&core, "table-empty"), 0);
        assert_eq!(count(&core, "table-row"), 1);
    }

    #[test]
    fn test_update_rows_keeps_header_node() {
        let mut state = state_with(3);
        let mut core = core();
        core.render(&mut state, None);
        core.container()
            .borrow_mut()
            .find_mut(&|e| e.has_class("header-actions"))
            .unwrap()
            .set_attr("data-plugin", "kept");

        let subset = state.data()[..1].to_vec();
        core.update_rows(&mut state, Some(&subset));

        let root = core.container().borrow();
        let first = root.element_children().next().unwrap();
        assert!(first.has_class("table-header"));
        assert!(root.find(&|e| e.get_attr("data-plugin") == Some("kept")).is_some());
        assert_eq!(root.find_all(&|e| e.has_class("table-row")).len(), 1);
    }

    #[test]
    fn test_paginate_option_renders_current_page() {
        let mut state = state_with(7);
        state.set_page_size(3);
        state.set_page(3);
        let mut core =
            TableCore::new(Container::new("t"), columns(), TableOptions::new().paginate(true)).unwrap();
        core.render(&mut state, None);
        assert_eq!(core.rendered_ids(), vec![RowId::from("w-7")]);
    }

    #[test]
    fn test_set_visible_columns_toggles_class_without_render() {
        let mut state = state_with(2);
        let mut core = core();
        core.render(&mut state, None);
        let renders = core.render_count();

        core.set_visible_columns(&mut state, Some(HashSet::from(["id".to_string()])));
        assert_eq!(core.render_count(), renders);
        // 2 hidden columns × (1 header + 2 rows)
        assert_eq!(count(&core, HIDDEN_CLASS), 6);

        core.update_rows(&mut state, None);
        assert_eq!(count(&core, HIDDEN_CLASS), 6);

        core.set_visible_columns(&mut state, None);
        assert_eq!(count(&core, HIDDEN_CLASS), 0);
    }

    #[test]
    fn test_hooks_and_after_render_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut state = state_with(2);
        let before = Rc::clone(&log);
        state.register_hook(Hook::BeforeRender, move |_| before.borrow_mut().push("before"));
        let render = Rc::clone(&log);
        state.register_hook(Hook::Render, move |event| {
            if let HookEvent::Render { full, .. } = event {
                render.borrow_mut().push(if *full { "render-full" } else { "render-rows" });
            }
        });
        let after = Rc::clone(&log);
        let mut core = TableCore::new(
            Container::new("t"),
            columns(),
            TableOptions::new().on_after_render(move |_, rows| {
                assert_eq!(rows.len(), 2);
                after.borrow_mut().push("after");
            }),
        )
        .unwrap();

        core.render(&mut state, None);
        core.update_rows(&mut state, None);
        assert_eq!(
            *log.borrow(),
            vec!["before", "render-full", "after", "before", "render-rows", "after"]
        );
    }

    #[test]
    fn test_row_click_dispatch() {
        let clicked = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&clicked);
        let mut state = state_with(2);
        let mut core = TableCore::new(
            Container::new("t"),
            columns(),
            TableOptions::new().on_row_click(move |id, row: &Rc<Value>| {
                *sink.borrow_mut() = Some((id.clone(), row["word"].clone()));
            }),
        )
        .unwrap();
        core.render(&mut state, None);

        let row = core.row_element(&RowId::from("w-2")).unwrap();
        let outcome = core.dispatch(&mut state, &TableEvent::click(&row));
        assert_eq!(outcome, Outcome::RowClicked(RowId::from("w-2")));
        assert_eq!(
            *clicked.borrow(),
            Some((RowId::from("w-2"), json!("word 2")))
        );

        let stale = Element::new("div").attr("data-action", "row").attr("data-row-id", "gone");
        assert_eq!(core.dispatch(&mut state, &TableEvent::click(&stale)), Outcome::Ignored);
    }

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Plugin<Value> for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn actions(&self) -> &'static [ActionKind] {
            &[ActionKind::ToggleAll, ActionKind::Outside]
        }

        fn init(&mut self, _core: &mut TableCore<Value>, _state: &mut TableState<Value>) {
            self.log.borrow_mut().push("init".into());
        }

        fn on_render(&mut self, _core: &TableCore<Value>, _state: &mut TableState<Value>, kind: RenderKind) {
            self.log.borrow_mut().push(format!("{kind:?}"));
        }

        fn handle(
            &mut self,
            action: &Action,
            _event: &TableEvent,
            core: &mut TableCore<Value>,
            _state: &mut TableState<Value>,
        ) -> Outcome {
            self.log.borrow_mut().push(format!("{:?}", action.kind()));
            core.request_redraw(Redraw::Rows);
            Outcome::Handled
        }

        fn destroy(&mut self, _state: &mut TableState<Value>) {
            self.log.borrow_mut().push("destroy".into());
        }
    }

    #[test]
    fn test_plugin_protocol() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut state = state_with(1);
        let mut core = core();
        core.use_plugin(&mut state, Box::new(Recorder { log: Rc::clone(&log) }));
        core.render(&mut state, None);

        let all = Element::new("input").attr("data-action", "select-all");
        assert_eq!(core.dispatch(&mut state, &TableEvent::click(&all)), Outcome::Handled);
        assert_eq!(core.dispatch(&mut state, &TableEvent::outside()), Outcome::Handled);

        let sort = Element::new("div").attr("data-action", "sort").attr("data-column", "id");
        assert_eq!(core.dispatch(&mut state, &TableEvent::click(&sort)), Outcome::Ignored);

        core.destroy(&mut state);
        core.destroy(&mut state);
        assert!(core.is_destroyed());
        // Clicks outside a panel reach Outside subscribers before their own
        // route; one redraw follows the whole dispatch.
        assert_eq!(
            *log.borrow(),
            vec![
                "init", "Full", "Outside", "ToggleAll", "Rows", "Outside", "Rows", "Outside",
                "Rows", "destroy"
            ]
        );
    }

    #[test]
    fn test_custom_row_id() {
        let mut state = state_with(2);
        let mut core = TableCore::new(
            Container::new("t"),
            columns(),
            TableOptions::new().row_id(|row: &Value, _| RowId::new(row["word"].as_str().unwrap_or_default())),
        )
        .unwrap();
        core.render(&mut state, None);
        assert_eq!(core.rendered_ids()[0], RowId::from("word 1"));
    }
}

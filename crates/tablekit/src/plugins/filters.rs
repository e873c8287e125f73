//! Per-column filters with a floating filter panel.
//!
//! Three kinds of filter exist: `values` (pick from the column's distinct
//! values or a fixed option list), `search` (case-insensitive substring) and
//! `range` (inclusive numeric bounds). Every configured column gets a filter
//! icon in its header cell; clicking it opens the panel for that column
//! right below the icon, or above it when the panel would run off the
//! bottom of the viewport. One panel is open at a time.
//!
//! [`filter_data`] is the predicate logic on its own, shared with the
//! managed-table pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::column::Column;
use crate::core::{Outcome, Plugin, Redraw, RenderKind, TableCore};
use crate::event::{Action, ActionKind, Bound, Rect, Size, TableEvent};
use crate::markup::{Container, Element};
use crate::plugins::sorting::natural_cmp;
use crate::state::{FilterValue, Filters, TableState};
use crate::value::{value_number, value_text, Record};

/// Gap between the anchor and the panel, in pixels.
const PANEL_GAP: i32 = 4;

/// Kind of filter configured for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Multi-select of values.
    #[default]
    Values,
    /// Substring search.
    Search,
    /// Numeric range.
    Range,
}

impl FilterKind {
    /// Whether `value` is the shape this kind filters with.
    #[must_use]
    pub fn accepts(self, value: &FilterValue) -> bool {
        matches!(
            (self, value),
            (Self::Values, FilterValue::Values(_))
                | (Self::Search, FilterValue::Search(_))
                | (Self::Range, FilterValue::Range { .. })
        )
    }
}

/// Filter configuration of one column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterColumnConfig {
    /// Filter kind.
    #[serde(default)]
    pub kind: FilterKind,
    /// Fixed options for a `values` filter; distinct column values otherwise.
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl FilterColumnConfig {
    /// A `values` filter over distinct column values.
    #[must_use]
    pub fn values() -> Self {
        Self::default()
    }

    /// A `search` filter.
    #[must_use]
    pub fn search() -> Self {
        Self {
            kind: FilterKind::Search,
            options: None,
        }
    }

    /// A `range` filter.
    #[must_use]
    pub fn range() -> Self {
        Self {
            kind: FilterKind::Range,
            options: None,
        }
    }

    /// Sets fixed options (builder pattern).
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

/// Filter configuration by column id.
pub type FilterConfig = BTreeMap<String, FilterColumnConfig>;

fn cell_texts(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        Some(value) => vec![value_text(value)],
        None => vec![String::new()],
    }
}

fn matches(row: &dyn Record, column: &str, filter: &FilterValue) -> bool {
    let value = row.field(column);
    match filter {
        FilterValue::Values(allowed) => cell_texts(value)
            .iter()
            .any(|text| allowed.contains(text)),
        FilterValue::Search(needle) => {
            let needle = needle.trim().to_lowercase();
            value
                .map(value_text)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        }
        FilterValue::Range { min, max } => value.and_then(value_number).is_some_and(|n| {
            min.is_none_or(|min| min.is_nan() || n >= min)
                && max.is_none_or(|max| max.is_nan() || n <= max)
        }),
    }
}

/// Returns the rows of `data` passing every active filter, in order.
///
/// Filters on columns missing from `config`, or whose value does not fit
/// the configured kind, are ignored.
pub fn filter_data<R: Record>(data: &[Rc<R>], filters: &Filters, config: &FilterConfig) -> Vec<Rc<R>> {
    let active: Vec<(&String, &FilterValue)> = filters
        .iter()
        .filter(|(column, value)| {
            value.is_active()
                && config
                    .get(column.as_str())
                    .is_some_and(|c| c.kind.accepts(value))
        })
        .collect();
    if active.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .filter(|row| {
            let row: &R = row;
            active.iter().all(|(column, filter)| matches(row, column, filter))
        })
        .cloned()
        .collect()
}

/// Distinct non-empty values of `column`, naturally ordered.
pub fn distinct_values<R: Record>(data: &[Rc<R>], column: &str) -> Vec<String> {
    let set: BTreeSet<String> = data
        .iter()
        .flat_map(|row| cell_texts(row.field(column)))
        .filter(|text| !text.trim().is_empty())
        .collect();
    let mut values: Vec<String> = set.into_iter().collect();
    values.sort_by(|a, b| natural_cmp(a, b).then_with(|| a.cmp(b)));
    values
}

/// `config` plus a default `values` entry for every filterable column
/// without one.
#[must_use]
pub fn effective_config(columns: &[Column], config: &FilterConfig) -> FilterConfig {
    let mut effective = config.clone();
    for column in columns.iter().filter(|c| c.filterable) {
        effective.entry(column.id.clone()).or_default();
    }
    effective
}

/// Where the filter panel goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPosition {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Whether the panel sits above the anchor.
    pub flipped: bool,
}

/// Places a panel of `panel` size below `anchor`, flipping it above when it
/// would overflow the bottom of `viewport` and there is room above, and
/// clamping it horizontally into the viewport.
#[must_use]
pub fn position_panel(anchor: Rect, panel: Size, viewport: Size) -> PanelPosition {
    let below = anchor.bottom() + PANEL_GAP;
    let above = anchor.y - PANEL_GAP - panel.height;
    let flipped = below + panel.height > viewport.height && above >= 0;
    let max_x = (viewport.width - panel.width).max(0);
    PanelPosition {
        x: anchor.x.clamp(0, max_x),
        y: if flipped { above } else { below },
        flipped,
    }
}

#[derive(Debug, Clone)]
struct OpenPanel {
    column: String,
    position: PanelPosition,
}

/// Header filter icons, the filter panel and filter application.
///
/// Standalone the plugin recomputes `filtered_data` from the canonical data
/// on every change and redraws the rows. [`FiltersPlugin::delegated`] only
/// records filters in state and reports [`Outcome::Filtered`].
#[derive(Debug, Clone)]
pub struct FiltersPlugin {
    config: FilterConfig,
    effective: FilterConfig,
    delegated: bool,
    panel_size: Size,
    open: Option<OpenPanel>,
    container: Option<Container>,
}

impl Default for FiltersPlugin {
    fn default() -> Self {
        Self::new(FilterConfig::new())
    }
}

impl FiltersPlugin {
    /// A plugin with explicit per-column configuration.
    ///
    /// Columns marked `filterable` without an entry get a `values` filter.
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            effective: FilterConfig::new(),
            delegated: false,
            panel_size: Size::new(240, 280),
            open: None,
            container: None,
        }
    }

    /// Only records filters; the owner applies them (builder pattern).
    #[must_use]
    pub fn delegated(mut self) -> Self {
        self.delegated = true;
        self
    }

    /// Sets the panel size used for positioning (builder pattern).
    #[must_use]
    pub fn panel_size(mut self, size: Size) -> Self {
        self.panel_size = size;
        self
    }

    /// Configuration in effect after `init`.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.effective
    }

    /// Column whose panel is open.
    #[must_use]
    pub fn open_column(&self) -> Option<&str> {
        self.open.as_ref().map(|p| p.column.as_str())
    }

    /// Recomputes `filtered_data` from the canonical data and goes back to
    /// page 1.
    pub fn apply_filters<R: Record>(&self, state: &mut TableState<R>) {
        let rows = filter_data(state.data(), state.filters(), &self.effective);
        let total = rows.len();
        debug!(rows = total, filters = state.filters().len(), "filters applied");
        state.set_filtered_data(rows);
        state.set_total_items(total);
        state.set_page(1);
    }

    fn sync_icons<R>(&self, root: &mut Element, state: &TableState<R>) {
        root.for_each_mut(&|e| e.has_class("header-cell"), &mut |cell| {
            let Some(column) = cell.get_attr("data-column").map(str::to_string) else {
                return;
            };
            if !self.effective.contains_key(&column) {
                return;
            }
            cell.add_class("filterable");
            let active = state.filter(&column).is_some();
            if let Some(icon) = cell.find_mut(&|e| e.has_class("filter-icon")) {
                icon.toggle_class("active", active);
                return;
            }
            let mut icon = Element::new("span")
                .class("filter-icon")
                .attr("data-action", "filter-open")
                .attr("data-column", column)
                .text("⏷");
            icon.toggle_class("active", active);
            cell.children.push(icon.into());
        });
    }

    fn sync_panel<R: Record>(&self, root: &mut Element, state: &TableState<R>) {
        root.children
            .retain(|n| n.as_element().is_none_or(|e| !e.has_class("filter-panel")));
        let Some(open) = &self.open else {
            return;
        };
        let Some(config) = self.effective.get(&open.column) else {
            return;
        };
        root.children.push(self.panel(open, config, state).into());
    }

    fn panel<R: Record>(&self, open: &OpenPanel, config: &FilterColumnConfig, state: &TableState<R>) -> Element {
        let column = open.column.as_str();
        let current = state.filter(column);
        let mut panel = Element::new("div")
            .class("filter-panel")
            .attr("data-column", column)
            .attr(
                "style",
                format!("left: {}px; top: {}px", open.position.x, open.position.y),
            )
            .child(
                Element::new("div")
                    .class("filter-panel-header")
                    .child(Element::new("span").class("filter-title").text(column))
                    .child(
                        Element::new("button")
                            .class("filter-close")
                            .attr("data-action", "filter-close")
                            .text("×"),
                    ),
            );
        panel.toggle_class("flip-up", open.position.flipped);

        let body = match config.kind {
            FilterKind::Values => {
                let selected = match current {
                    Some(FilterValue::Values(set)) => set.clone(),
                    _ => BTreeSet::new(),
                };
                let options = config
                    .options
                    .clone()
                    .unwrap_or_else(|| distinct_values(state.data(), column));
                Element::new("div").class("filter-options").children(options.into_iter().map(|option| {
                    let mut checkbox = Element::new("input").attr("type", "checkbox");
                    if selected.contains(&option) {
                        checkbox.set_attr("checked", "checked");
                    }
                    Element::new("label")
                        .class("filter-option")
                        .attr("data-action", "filter-value")
                        .attr("data-column", column)
                        .attr("data-value", option.as_str())
                        .child(checkbox)
                        .child(Element::new("span").text(option))
                }))
            }
            FilterKind::Search => {
                let text = match current {
                    Some(FilterValue::Search(text)) => text.clone(),
                    _ => String::new(),
                };
                Element::new("input")
                    .class("filter-search")
                    .attr("type", "search")
                    .attr("data-action", "filter-search")
                    .attr("data-column", column)
                    .attr("value", text)
            }
            FilterKind::Range => {
                let (min, max) = match current {
                    Some(FilterValue::Range { min, max }) => (*min, *max),
                    _ => (None, None),
                };
                let bound = |class: &str, action: &str, value: Option<f64>| {
                    Element::new("input")
                        .class(class)
                        .attr("type", "number")
                        .attr("data-action", action)
                        .attr("data-column", column)
                        .attr("value", value.map(|v| v.to_string()).unwrap_or_default())
                };
                Element::new("div")
                    .class("filter-range")
                    .child(bound("filter-min", "filter-min", min))
                    .child(bound("filter-max", "filter-max", max))
            }
        };
        panel.child(body).child(
            Element::new("button")
                .class("filter-clear")
                .attr("data-action", "filter-clear")
                .attr("data-column", column)
                .text("Clear"),
        )
    }

    fn refresh<R: Record>(&self, container: &Container, state: &TableState<R>) {
        let mut root = container.borrow_mut();
        self.sync_icons(&mut root, state);
        self.sync_panel(&mut root, state);
    }

    fn changed<R: Record + 'static>(&self, core: &mut TableCore<R>, state: &mut TableState<R>) -> Outcome {
        if !self.delegated {
            self.apply_filters(state);
            core.request_redraw(Redraw::Rows);
        }
        self.refresh(core.container(), state);
        Outcome::Filtered
    }

    fn kind_of(&self, column: &str) -> Option<FilterKind> {
        self.effective.get(column).map(|c| c.kind)
    }
}

impl<R: Record + 'static> Plugin<R> for FiltersPlugin {
    fn name(&self) -> &'static str {
        "filters"
    }

    fn actions(&self) -> &'static [ActionKind] {
        &[
            ActionKind::OpenFilter,
            ActionKind::ToggleFilterValue,
            ActionKind::FilterSearch,
            ActionKind::FilterRange,
            ActionKind::ClearFilter,
            ActionKind::CloseFilter,
            ActionKind::Outside,
        ]
    }

    fn init(&mut self, core: &mut TableCore<R>, _state: &mut TableState<R>) {
        self.effective = effective_config(core.columns(), &self.config);
        self.container = Some(core.container().clone());
    }

    fn on_render(&mut self, core: &TableCore<R>, state: &mut TableState<R>, _kind: RenderKind) {
        self.refresh(core.container(), state);
    }

    fn handle(
        &mut self,
        action: &Action,
        event: &TableEvent,
        core: &mut TableCore<R>,
        state: &mut TableState<R>,
    ) -> Outcome {
        match action {
            Action::OpenFilter(column) => {
                if self.kind_of(column).is_none() {
                    return Outcome::Ignored;
                }
                if self.open_column() == Some(column.as_str()) {
                    self.open = None;
                } else {
                    let anchor = event.anchor().unwrap_or_default();
                    self.open = Some(OpenPanel {
                        column: column.clone(),
                        position: position_panel(anchor, self.panel_size, event.viewport()),
                    });
                }
                self.refresh(core.container(), state);
                Outcome::Handled
            }
            Action::CloseFilter | Action::Outside => {
                if self.open.take().is_none() {
                    return Outcome::Ignored;
                }
                self.refresh(core.container(), state);
                Outcome::Handled
            }
            Action::ToggleFilterValue { column, value } => {
                if self.kind_of(column) != Some(FilterKind::Values) {
                    return Outcome::Ignored;
                }
                let mut values = match state.filter(column) {
                    Some(FilterValue::Values(set)) => set.clone(),
                    _ => BTreeSet::new(),
                };
                if !values.remove(value) {
                    values.insert(value.clone());
                }
                state.set_filter(column, FilterValue::Values(values));
                self.changed(core, state)
            }
            Action::FilterSearch { column, text } => {
                if self.kind_of(column) != Some(FilterKind::Search) {
                    return Outcome::Ignored;
                }
                state.set_filter(column, FilterValue::Search(text.clone()));
                self.changed(core, state)
            }
            Action::FilterRange { column, bound, text } => {
                if self.kind_of(column) != Some(FilterKind::Range) {
                    return Outcome::Ignored;
                }
                let (mut min, mut max) = match state.filter(column) {
                    Some(FilterValue::Range { min, max }) => (*min, *max),
                    _ => (None, None),
                };
                let parsed = value_number(&Value::String(text.clone()));
                match bound {
                    Bound::Min => min = parsed,
                    Bound::Max => max = parsed,
                }
                state.set_filter(column, FilterValue::Range { min, max });
                self.changed(core, state)
            }
            Action::ClearFilter(column) => {
                if self.kind_of(column).is_none() {
                    return Outcome::Ignored;
                }
                state.remove_filter(column);
                self.changed(core, state)
            }
            _ => Outcome::Ignored,
        }
    }

    fn destroy(&mut self, _state: &mut TableState<R>) {
        self.open = None;
        if let Some(container) = self.container.take() {
            let mut root = container.borrow_mut();
            root.children
                .retain(|n| n.as_element().is_none_or(|e| !e.has_class("filter-panel")));
            root.for_each_mut(&|e| e.has_class("header-cell"), &mut |cell| {
                cell.children.retain(|n| {
                    n.as_element().is_none_or(|e| !e.has_class("filter-icon"))
                });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Vec<Rc<Value>> {
        vec![
            Rc::new(json!({"id": 1, "status": "open", "word": "Spam", "qty": 5, "tags": ["a", "b"]})),
            Rc::new(json!({"id": 2, "status": "closed", "word": "eggs", "qty": "12,5"})),
            Rc::new(json!({"id": 3, "status": "open", "word": "ham", "qty": null, "tags": ["b"]})),
        ]
    }

    fn config() -> FilterConfig {
        FilterConfig::from([
            ("status".to_string(), FilterColumnConfig::values()),
            ("word".to_string(), FilterColumnConfig::search()),
            ("qty".to_string(), FilterColumnConfig::range()),
            ("tags".to_string(), FilterColumnConfig::values()),
        ])
    }

    fn ids(rows: &[Rc<Value>]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[test]
    fn test_no_filters_is_identity() {
        let data = data();
        let out = filter_data(&data, &Filters::new(), &config());
        assert_eq!(ids(&out), vec![1, 2, 3]);
        assert!(out.iter().zip(&data).all(|(a, b)| Rc::ptr_eq(a, b)));
    }

    #[test]
    fn test_values_filter() {
        let filters = Filters::from([("status".to_string(), FilterValue::values(["open"]))]);
        assert_eq!(ids(&filter_data(&data(), &filters, &config())), vec![1, 3]);

        let tags = Filters::from([("tags".to_string(), FilterValue::values(["a"]))]);
        assert_eq!(ids(&filter_data(&data(), &tags, &config())), vec![1]);
    }

    #[test]
    fn test_search_filter_is_case_insensitive() {
        let filters = Filters::from([("word".to_string(), FilterValue::Search("SPA".into()))]);
        assert_eq!(ids(&filter_data(&data(), &filters, &config())), vec![1]);
    }

    #[test]
    fn test_range_filter_is_inclusive_and_skips_non_numbers() {
        let filters = Filters::from([(
            "qty".to_string(),
            FilterValue::Range {
                min: Some(5.0),
                max: Some(12.5),
            },
        )]);
        assert_eq!(ids(&filter_data(&data(), &filters, &config())), vec![1, 2]);
    }

    #[test]
    fn test_range_filter_ignores_nan_bounds() {
        let filters = Filters::from([(
            "qty".to_string(),
            FilterValue::Range {
                min: Some(f64::NAN),
                max: Some(12.5),
            },
        )]);
        assert_eq!(ids(&filter_data(&data(), &filters, &config())), vec![1, 2]);
    }

    #[test]
    fn test_filters_compose() {
        let filters = Filters::from([
            ("status".to_string(), FilterValue::values(["open"])),
            ("qty".to_string(), FilterValue::Range { min: Some(1.0), max: None }),
        ]);
        assert_eq!(ids(&filter_data(&data(), &filters, &config())), vec![1]);
    }

    #[test]
    fn test_unknown_column_and_kind_mismatch_are_noops() {
        let unknown = Filters::from([("nope".to_string(), FilterValue::values(["x"]))]);
        assert_eq!(filter_data(&data(), &unknown, &config()).len(), 3);

        let mismatch = Filters::from([("word".to_string(), FilterValue::values(["x"]))]);
        assert_eq!(filter_data(&data(), &mismatch, &config()).len(), 3);
    }

    #[test]
    fn test_distinct_values() {
        assert_eq!(distinct_values(&data(), "status"), vec!["closed", "open"]);
        assert_eq!(distinct_values(&data(), "tags"), vec!["a", "b"]);
    }

    #[test]
    fn test_panel_below_anchor() {
        let pos = position_panel(Rect::new(100, 50, 20, 20), Size::new(240, 280), Size::new(1280, 800));
        assert_eq!(pos, PanelPosition { x: 100, y: 74, flipped: false });
    }

    #[test]
    fn test_panel_flips_above_near_bottom() {
        let pos = position_panel(Rect::new(100, 700, 20, 20), Size::new(240, 280), Size::new(1280, 800));
        assert!(pos.flipped);
        assert_eq!(pos.y, 700 - 4 - 280);
    }

    #[test]
    fn test_panel_does_not_flip_without_room_above() {
        let pos = position_panel(Rect::new(0, 100, 20, 20), Size::new(240, 280), Size::new(1280, 300));
        assert!(!pos.flipped);
    }

    #[test]
    fn test_panel_clamped_horizontally() {
        let pos = position_panel(Rect::new(1200, 50, 20, 20), Size::new(240, 280), Size::new(1280, 800));
        assert_eq!(pos.x, 1040);
    }

    #[test]
    fn test_kind_accepts() {
        assert!(FilterKind::Values.accepts(&FilterValue::values(["x"])));
        assert!(!FilterKind::Search.accepts(&FilterValue::values(["x"])));
        assert!(FilterKind::Range.accepts(&FilterValue::Range { min: None, max: Some(1.0) }));
    }
}

//! Column sorting.
//!
//! Clicking a sortable header walks that column through
//! `none → asc → desc → none`; clicking another column starts it at `asc`
//! and drops the previous sort. Only one column sorts at a time.
//!
//! The comparator comes from the column's [`SortType`]. Blank values always
//! sort last, whatever the direction, and values that do not parse for
//! their type compare as zero.

use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

use crate::column::{product_key, truthy, Column, SortType};
use crate::core::{Outcome, Plugin, Redraw, RenderKind, TableCore};
use crate::event::{Action, ActionKind, TableEvent};
use crate::markup::{Container, Element, Node};
use crate::state::{SortDirection, SortState, TableState};
use crate::value::{is_blank, value_number, value_text, Record};

static DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+").ok());

static DOTTED_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$").ok()
});

/// A comparable key extracted from one cell.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(String),
    Number(f64),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => natural_cmp(a, b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Case-insensitive comparison that orders runs of digits by value, so
/// `item2` sorts before `item10`.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let l = take_digits(&mut left);
                let r = take_digits(&mut right);
                let ord = l.len().cmp(&r.len()).then_with(|| l.cmp(&r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }
}

/// Parses the date formats found in the data: `DD.MM.YY`, `DD.MM.YYYY`
/// (optionally followed by `HH:MM[:SS]`), RFC 3339, and ISO dates with or
/// without a time.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Some(caps) = DOTTED_DATE.as_ref().and_then(|re| re.captures(text)) {
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let year_text = caps.get(3)?.as_str();
        let mut year = i32::try_from(num(3)?).ok()?;
        if year_text.len() == 2 {
            year += if year < 70 { 2000 } else { 1900 };
        }
        let date = NaiveDate::from_ymd_opt(year, num(2)?, num(1)?)?;
        return date.and_hms_opt(num(4).unwrap_or(0), num(5).unwrap_or(0), num(6).unwrap_or(0));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Numeric value of the first run of digits in an identifier such as
/// `ban-000123`.
#[must_use]
pub fn id_number(text: &str) -> Option<f64> {
    DIGITS.as_ref()?.find(text).and_then(|m| m.as_str().parse().ok())
}

fn sort_key(column: &Column, row: &dyn Record) -> Option<SortKey> {
    if let SortType::Product { primary, secondary } = &column.sort_type {
        let key = product_key(row, primary, secondary);
        return (!key.is_empty()).then(|| SortKey::Text(key.to_lowercase()));
    }
    let value = column.value(row);
    if is_blank(value) {
        return None;
    }
    let value = value?;
    let key = match column.sort_type {
        SortType::Number => SortKey::Number(value_number(value).unwrap_or(0.0)),
        SortType::Boolean => SortKey::Number(if truthy(value) { 1.0 } else { 0.0 }),
        SortType::Date => {
            let stamp = parse_date(&value_text(value)).map_or(0, |dt| dt.and_utc().timestamp());
            #[allow(clippy::cast_precision_loss)]
            let stamp = stamp as f64;
            SortKey::Number(stamp)
        }
        SortType::IdNumber | SortType::IdText => {
            SortKey::Number(id_number(&value_text(value)).unwrap_or(0.0))
        }
        SortType::String | SortType::Product { .. } | SortType::None => {
            SortKey::Text(value_text(value))
        }
    };
    Some(key)
}

/// Returns `data` ordered by `column` in `direction`.
///
/// The sort is stable. `SortDirection::None` and columns with
/// [`SortType::None`] return the rows in their given order.
pub fn sort_data<R: Record>(
    data: &[Rc<R>],
    column: &Column,
    direction: SortDirection,
) -> Vec<Rc<R>> {
    if direction == SortDirection::None || column.sort_type == SortType::None {
        return data.to_vec();
    }
    let mut keyed: Vec<(Option<SortKey>, Rc<R>)> = data
        .iter()
        .map(|row| (sort_key(column, &**row), Rc::clone(row)))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = a.compare(b);
            if direction == SortDirection::Desc { ord.reverse() } else { ord }
        }
    });
    keyed.into_iter().map(|(_, row)| row).collect()
}

/// Direction a click on `column` moves to from `current`.
#[must_use]
pub fn next_direction(current: &SortState, column: &str) -> SortDirection {
    match current.active() {
        Some((active, direction)) if active == column => direction.next(),
        _ => SortDirection::Asc,
    }
}

/// Marks header cells for `sort`: `sort-asc`/`sort-desc` on the active cell
/// and an arrow in its `sort-marker`; every other marker is emptied.
pub fn apply_indicators(root: &mut Element, sort: &SortState) {
    let active = sort.active();
    root.for_each_mut(&|e| e.has_class("header-cell"), &mut |cell| {
        let direction = match (active, cell.get_attr("data-column")) {
            (Some((column, direction)), Some(id)) if column == id => direction,
            _ => SortDirection::None,
        };
        cell.toggle_class("sort-asc", direction == SortDirection::Asc);
        cell.toggle_class("sort-desc", direction == SortDirection::Desc);
        if let Some(marker) = cell.find_mut(&|e| e.has_class("sort-marker")) {
            marker.children = match direction {
                SortDirection::Asc => vec![Node::Text("▲".into())],
                SortDirection::Desc => vec![Node::Text("▼".into())],
                SortDirection::None => Vec::new(),
            };
        }
    });
}

/// Sorts on header clicks.
///
/// Standalone (the default) the plugin reorders `filtered_data` itself and
/// redraws the rows; `direction = none` restores a copy of the canonical
/// data. [`SortingPlugin::delegated`] only records the sort in state and
/// reports [`Outcome::Sorted`] for an owner that runs its own pipeline.
#[derive(Debug, Default)]
pub struct SortingPlugin {
    delegated: bool,
    container: Option<Container>,
}

impl SortingPlugin {
    /// A plugin that applies sorts itself.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A plugin that only records sorts.
    #[must_use]
    pub fn delegated() -> Self {
        Self {
            delegated: true,
            container: None,
        }
    }
}

impl<R: Record + 'static> Plugin<R> for SortingPlugin {
    fn name(&self) -> &'static str {
        "sorting"
    }

    fn actions(&self) -> &'static [ActionKind] {
        &[ActionKind::Sort]
    }

    fn init(&mut self, core: &mut TableCore<R>, _state: &mut TableState<R>) {
        self.container = Some(core.container().clone());
    }

    fn on_render(&mut self, core: &TableCore<R>, state: &mut TableState<R>, _kind: RenderKind) {
        apply_indicators(&mut core.container().borrow_mut(), state.sort());
    }

    fn handle(
        &mut self,
        action: &Action,
        _event: &TableEvent,
        core: &mut TableCore<R>,
        state: &mut TableState<R>,
    ) -> Outcome {
        let Action::Sort(id) = action else {
            return Outcome::Ignored;
        };
        let Some(column) = core.column(id).filter(|c| c.sortable).cloned() else {
            return Outcome::Ignored;
        };

        let direction = next_direction(state.sort(), id);
        state.set_sort(Some(id.as_str()), direction);
        debug!(column = %id, %direction, delegated = self.delegated, "sort changed");

        if !self.delegated {
            let rows = match direction {
                SortDirection::None => state.data().to_vec(),
                _ => sort_data(state.filtered_data(), &column, direction),
            };
            state.set_filtered_data(rows);
            core.request_redraw(Redraw::Rows);
        }
        apply_indicators(&mut core.container().borrow_mut(), state.sort());
        Outcome::Sorted
    }

    fn destroy(&mut self, _state: &mut TableState<R>) {
        if let Some(container) = self.container.take() {
            apply_indicators(&mut container.borrow_mut(), &SortState::default());
        }
    }
}

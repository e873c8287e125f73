//! User interaction routed into tables.
//!
//! Rendered elements that react to the user carry a `data-action` attribute
//! (plus `data-column`, `data-row-id`, `data-value` or `data-page` as the
//! action needs). A host turns a click or an input on such an element into a
//! [`TableEvent`]; the table parses it once into a discriminated [`Action`]
//! and routes it through a dispatch table keyed by [`ActionKind`].

use std::collections::BTreeMap;

use crate::markup::Element;
use crate::value::RowId;

/// A rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }
}

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Size {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Which bound of a range filter an input edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Lower bound.
    Min,
    /// Upper bound.
    Max,
}

/// Page navigation requested by a pager control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    /// Previous page.
    Prev,
    /// Next page.
    Next,
    /// A specific 1-based page.
    Goto(usize),
}

/// A parsed user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A row body was clicked.
    RowClick(RowId),
    /// A sortable header was clicked.
    Sort(String),
    /// A header filter icon was clicked.
    OpenFilter(String),
    /// An option in a values filter was toggled.
    ToggleFilterValue {
        /// Filtered column.
        column: String,
        /// Option value.
        value: String,
    },
    /// The text of a search filter changed.
    FilterSearch {
        /// Filtered column.
        column: String,
        /// New text.
        text: String,
    },
    /// A bound of a range filter changed.
    FilterRange {
        /// Filtered column.
        column: String,
        /// Edited bound.
        bound: Bound,
        /// New text; blank clears the bound.
        text: String,
    },
    /// A column filter was cleared.
    ClearFilter(String),
    /// The filter panel's close button.
    CloseFilter,
    /// A row checkbox was toggled.
    ToggleRow(RowId),
    /// The header checkbox was toggled.
    ToggleAll,
    /// A column-visibility option was toggled.
    ToggleColumn(String),
    /// Pager navigation.
    Page(PageMove),
    /// The shared search input changed.
    Search(String),
    /// A click that hit nothing actionable.
    Outside,
}

/// Discriminant of [`Action`], used as the dispatch-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// [`Action::RowClick`]
    RowClick,
    /// [`Action::Sort`]
    Sort,
    /// [`Action::OpenFilter`]
    OpenFilter,
    /// [`Action::ToggleFilterValue`]
    ToggleFilterValue,
    /// [`Action::FilterSearch`]
    FilterSearch,
    /// [`Action::FilterRange`]
    FilterRange,
    /// [`Action::ClearFilter`]
    ClearFilter,
    /// [`Action::CloseFilter`]
    CloseFilter,
    /// [`Action::ToggleRow`]
    ToggleRow,
    /// [`Action::ToggleAll`]
    ToggleAll,
    /// [`Action::ToggleColumn`]
    ToggleColumn,
    /// [`Action::Page`]
    Page,
    /// [`Action::Search`]
    Search,
    /// [`Action::Outside`]
    Outside,
}

impl Action {
    /// The action's discriminant.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::RowClick(_) => ActionKind::RowClick,
            Self::Sort(_) => ActionKind::Sort,
            Self::OpenFilter(_) => ActionKind::OpenFilter,
            Self::ToggleFilterValue { .. } => ActionKind::ToggleFilterValue,
            Self::FilterSearch { .. } => ActionKind::FilterSearch,
            Self::FilterRange { .. } => ActionKind::FilterRange,
            Self::ClearFilter(_) => ActionKind::ClearFilter,
            Self::CloseFilter => ActionKind::CloseFilter,
            Self::ToggleRow(_) => ActionKind::ToggleRow,
            Self::ToggleAll => ActionKind::ToggleAll,
            Self::ToggleColumn(_) => ActionKind::ToggleColumn,
            Self::Page(_) => ActionKind::Page,
            Self::Search(_) => ActionKind::Search,
            Self::Outside => ActionKind::Outside,
        }
    }
    /// Whether the action comes from a click outside any filter panel and
    /// so closes an open one.
    #[must_use]
    pub fn dismisses_panels(&self) -> bool {
        matches!(
            self,
            Self::RowClick(_)
                | Self::Sort(_)
                | Self::ToggleRow(_)
                | Self::ToggleAll
                | Self::ToggleColumn(_)
                | Self::Page(_)
        )
    }
}

/// An interaction with a rendered element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// A click. `anchor` is the clicked element's box, used to place
    /// floating panels.
    Click {
        /// Attributes of the element carrying the `data-action`.
        target: BTreeMap<String, String>,
        /// Bounding box of the element.
        anchor: Option<Rect>,
        /// Current viewport.
        viewport: Size,
    },
    /// The value of an input changed.
    Input {
        /// Attributes of the input.
        target: BTreeMap<String, String>,
        /// New value.
        value: String,
    },
}

impl TableEvent {
    /// A click on `element` with no geometry.
    #[must_use]
    pub fn click(element: &Element) -> Self {
        Self::Click {
            target: element.attrs().clone(),
            anchor: None,
            viewport: Size::default(),
        }
    }

    /// A click on `element` whose box is `anchor`.
    #[must_use]
    pub fn click_at(element: &Element, anchor: Rect, viewport: Size) -> Self {
        Self::Click {
            target: element.attrs().clone(),
            anchor: Some(anchor),
            viewport,
        }
    }

    /// A click on empty space.
    #[must_use]
    pub fn outside() -> Self {
        Self::Click {
            target: BTreeMap::new(),
            anchor: None,
            viewport: Size::default(),
        }
    }

    /// A value change on `element`.
    #[must_use]
    pub fn input(element: &Element, value: impl Into<String>) -> Self {
        Self::Input {
            target: element.attrs().clone(),
            value: value.into(),
        }
    }

    /// The anchor box of a click.
    #[must_use]
    pub fn anchor(&self) -> Option<Rect> {
        match self {
            Self::Click { anchor, .. } => *anchor,
            Self::Input { .. } => None,
        }
    }

    /// The viewport of a click; the default viewport for inputs.
    #[must_use]
    pub fn viewport(&self) -> Size {
        match self {
            Self::Click { viewport, .. } => *viewport,
            Self::Input { .. } => Size::default(),
        }
    }

    /// Parses the event into an action.
    ///
    /// Clicks on elements without a recognised `data-action` (or missing
    /// the attributes the action needs) are [`Action::Outside`]; inputs
    /// without one are ignored the same way.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Click { target, .. } => parse_click(target).unwrap_or(Action::Outside),
            Self::Input { target, value } => {
                parse_input(target, value).unwrap_or(Action::Outside)
            }
        }
    }
}

fn parse_click(attrs: &BTreeMap<String, String>) -> Option<Action> {
    let get = |name: &str| attrs.get(name).cloned();
    let action = match attrs.get("data-action")?.as_str() {
        "row" => Action::RowClick(RowId::new(get("data-row-id")?)),
        "sort" => Action::Sort(get("data-column")?),
        "filter-open" => Action::OpenFilter(get("data-column")?),
        "filter-value" => Action::ToggleFilterValue {
            column: get("data-column")?,
            value: get("data-value")?,
        },
        "filter-clear" => Action::ClearFilter(get("data-column")?),
        "filter-close" => Action::CloseFilter,
        "select-row" => Action::ToggleRow(RowId::new(get("data-row-id")?)),
        "select-all" => Action::ToggleAll,
        "toggle-column" => Action::ToggleColumn(get("data-column")?),
        "page-prev" => Action::Page(PageMove::Prev),
        "page-next" => Action::Page(PageMove::Next),
        "page-goto" => Action::Page(PageMove::Goto(get("data-page")?.parse().ok()?)),
        _ => return None,
    };
    Some(action)
}

fn parse_input(attrs: &BTreeMap<String, String>, value: &str) -> Option<Action> {
    let column = || attrs.get("data-column").cloned();
    let action = match attrs.get("data-action")?.as_str() {
        "filter-search" => Action::FilterSearch {
            column: column()?,
            text: value.to_string(),
        },
        "filter-min" => Action::FilterRange {
            column: column()?,
            bound: Bound::Min,
            text: value.to_string(),
        },
        "filter-max" => Action::FilterRange {
            column: column()?,
            bound: Bound::Max,
            text: value.to_string(),
        },
        "search" => Action::Search(value.to_string()),
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(attrs: &[(&str, &str)]) -> Element {
        attrs
            .iter()
            .fold(Element::new("span"), |el, (k, v)| el.attr(*k, *v))
    }

    #[test]
    fn test_click_actions() {
        let sort = el(&[("data-action", "sort"), ("data-column", "name")]);
        assert_eq!(TableEvent::click(&sort).action(), Action::Sort("name".into()));

        let row = el(&[("data-action", "row"), ("data-row-id", "7")]);
        assert_eq!(TableEvent::click(&row).action(), Action::RowClick(RowId::from("7")));

        let value = el(&[
            ("data-action", "filter-value"),
            ("data-column", "status"),
            ("data-value", "open"),
        ]);
        assert_eq!(
            TableEvent::click(&value).action(),
            Action::ToggleFilterValue {
                column: "status".into(),
                value: "open".into()
            }
        );

        let goto = el(&[("data-action", "page-goto"), ("data-page", "3")]);
        assert_eq!(TableEvent::click(&goto).action(), Action::Page(PageMove::Goto(3)));
    }

    #[test]
    fn test_incomplete_or_unknown_clicks_are_outside() {
        let no_column = el(&[("data-action", "sort")]);
        assert_eq!(TableEvent::click(&no_column).action(), Action::Outside);

        let unknown = el(&[("data-action", "explode")]);
        assert_eq!(TableEvent::click(&unknown).action(), Action::Outside);

        assert_eq!(TableEvent::outside().action(), Action::Outside);

        let bad_page = el(&[("data-action", "page-goto"), ("data-page", "x")]);
        assert_eq!(TableEvent::click(&bad_page).action(), Action::Outside);
    }

    #[test]
    fn test_input_actions() {
        let min = el(&[("data-action", "filter-min"), ("data-column", "qty")]);
        assert_eq!(
            TableEvent::input(&min, "5").action(),
            Action::FilterRange {
                column: "qty".into(),
                bound: Bound::Min,
                text: "5".into()
            }
        );

        let search = el(&[("data-action", "search")]);
        assert_eq!(TableEvent::input(&search, "abc").action(), Action::Search("abc".into()));
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Action::ToggleAll.kind(), ActionKind::ToggleAll);
        assert_eq!(Action::Sort("a".into()).kind(), ActionKind::Sort);
        assert_eq!(Action::Outside.kind(), ActionKind::Outside);
        assert!(Action::Sort("id".into()).dismisses_panels());
        assert!(Action::ToggleAll.dismisses_panels());
        assert!(!Action::OpenFilter("id".into()).dismisses_panels());
        assert!(!Action::CloseFilter.dismisses_panels());
        assert!(!Action::Outside.dismisses_panels());
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.right(), 40);
    }
}

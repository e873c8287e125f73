//! Pagination charm: windowing for plain lists.
//!
//! A charm is attached by marker attributes rather than by construction. Any
//! container mounted in a [`Document`] whose root carries
//! `data-charm="pagination"` gets one from [`discover`]:
//!
//! ```text
//! div#changes[data-charm=pagination][data-page-size=10][data-display=dots]
//! ```
//!
//! The charm hides every element child outside the current page with the
//! `charm-hidden` class and appends a `pagination-controls` node. Code that
//! adds or removes children sends a [`RowsChanged`] message afterwards; the
//! charm never watches the tree itself.
//!
//! # Example
//!
//! ```rust
//! use tablekit::charm::{discover, RowsChanged};
//! use tablekit::markup::{Document, Element};
//! use tablekit::message::Message;
//!
//! let mut doc = Document::new();
//! let list = doc.insert(
//!     Element::new("ul")
//!         .attr("id", "changes")
//!         .attr("data-charm", "pagination")
//!         .attr("data-page-size", "2")
//!         .children((0..5).map(|i| Element::new("li").text(i.to_string()))),
//! );
//!
//! let mut charms = discover(&doc);
//! assert_eq!(charms[0].total_pages(), 3);
//!
//! list.borrow_mut().children.truncate(2);
//! assert!(charms[0].update(&Message::new(RowsChanged::new("changes"))));
//! assert_eq!(charms[0].total_pages(), 1);
//! ```

use tracing::debug;

use crate::event::{Action, PageMove, TableEvent};
use crate::markup::{Container, Document, Element};
use crate::message::Message;

/// Marker attribute value that attaches the charm.
pub const CHARM_NAME: &str = "pagination";

/// Page size used when `data-page-size` is missing or malformed.
pub const DEFAULT_CHARM_PAGE_SIZE: usize = 10;

/// Class hiding off-page children.
pub const CHARM_HIDDEN: &str = "charm-hidden";

/// Class of the controls node the charm maintains.
pub const CONTROLS_CLASS: &str = "pagination-controls";

/// Pagination label style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// Arabic numerals: "1/5"
    #[default]
    Arabic,
    /// Dot indicators: "●○○○○"
    Dots,
}

/// Tells a charm its container's children changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsChanged {
    /// Id of the container that changed.
    pub container: String,
}

impl RowsChanged {
    /// Creates the message for `container`.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
        }
    }
}

/// Finds every container marked with `data-charm="pagination"` and attaches
/// a charm to it.
#[must_use]
pub fn discover(doc: &Document) -> Vec<PaginationCharm> {
    doc.containers()
        .filter_map(|container| PaginationCharm::attach(container.clone()))
        .collect()
}

/// Windows the element children of a container.
#[derive(Debug, Clone)]
pub struct PaginationCharm {
    container: Container,
    /// Current page (0-indexed).
    page: usize,
    per_page: usize,
    total_pages: usize,
    /// Label style.
    pub display: Display,
    /// Character for the active page in Dots mode.
    pub active_dot: String,
    /// Character for inactive pages in Dots mode.
    pub inactive_dot: String,
    /// Format string for Arabic mode.
    pub arabic_format: String,
}

impl PaginationCharm {
    /// Attaches a charm to `container` and applies it immediately.
    #[must_use]
    pub fn new(container: Container, per_page: usize) -> Self {
        let mut charm = Self {
            container,
            page: 0,
            per_page: per_page.max(1),
            total_pages: 1,
            display: Display::Arabic,
            active_dot: "•".to_string(),
            inactive_dot: "○".to_string(),
            arabic_format: "{}/{}".to_string(),
        };
        charm.apply();
        charm
    }

    /// Attaches a charm when the container root carries the marker.
    ///
    /// Reads `data-page-size` (default 10) and `data-display` (`dots` or
    /// arabic).
    #[must_use]
    pub fn attach(container: Container) -> Option<Self> {
        let (per_page, display) = {
            let root = container.borrow();
            if root.get_attr("data-charm") != Some(CHARM_NAME) {
                return None;
            }
            let per_page = root
                .get_attr("data-page-size")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_CHARM_PAGE_SIZE);
            let display = match root.get_attr("data-display") {
                Some("dots") => Display::Dots,
                _ => Display::Arabic,
            };
            (per_page, display)
        };
        let mut charm = Self::new(container, per_page);
        if display != Display::Arabic {
            charm.display = display;
            charm.apply();
        }
        Some(charm)
    }

    /// The container being windowed.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Current page (0-indexed).
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of pages; at least 1.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Whether the first page is shown.
    #[must_use]
    pub fn on_first_page(&self) -> bool {
        self.page == 0
    }

    /// Whether the last page is shown.
    #[must_use]
    pub fn on_last_page(&self) -> bool {
        self.page == self.total_pages.saturating_sub(1)
    }

    /// Moves to a page (clamped) and re-applies.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.total_pages.saturating_sub(1));
        self.apply();
    }

    /// Navigates to the previous page.
    pub fn prev_page(&mut self) {
        if !self.on_first_page() {
            self.set_page(self.page - 1);
        }
    }

    /// Navigates to the next page.
    pub fn next_page(&mut self) {
        if !self.on_last_page() {
            self.set_page(self.page + 1);
        }
    }

    /// Handles prev/next clicks aimed at this charm's controls.
    ///
    /// Returns whether the event was consumed.
    pub fn handle(&mut self, event: &TableEvent) -> bool {
        match event.action() {
            Action::Page(PageMove::Prev) => self.prev_page(),
            Action::Page(PageMove::Next) => self.next_page(),
            Action::Page(PageMove::Goto(page)) => self.set_page(page.saturating_sub(1)),
            _ => return false,
        }
        true
    }

    /// Re-applies after a [`RowsChanged`] for this container.
    pub fn update(&mut self, msg: &Message) -> bool {
        match msg.downcast_ref::<RowsChanged>() {
            Some(changed) if changed.container == self.container.id() => {
                self.apply();
                true
            }
            _ => false,
        }
    }

    /// The label text.
    #[must_use]
    pub fn view(&self) -> String {
        match self.display {
            Display::Dots => (0..self.total_pages)
                .map(|i| {
                    if i == self.page {
                        self.active_dot.as_str()
                    } else {
                        self.inactive_dot.as_str()
                    }
                })
                .collect(),
            Display::Arabic => self
                .arabic_format
                .replacen("{}", &(self.page + 1).to_string(), 1)
                .replacen("{}", &self.total_pages.to_string(), 1),
        }
    }

    /// Recounts the items, clamps the page, toggles visibility and
    /// rebuilds the controls.
    pub fn apply(&mut self) {
        let mut root = self.container.borrow_mut();
        root.children.retain(|node| {
            node.as_element()
                .is_none_or(|e| !e.has_class(CONTROLS_CLASS))
        });

        let items = root.element_children().count();
        self.total_pages = items.div_ceil(self.per_page).max(1);
        self.page = self.page.min(self.total_pages - 1);
        let start = self.page * self.per_page;
        let end = start + self.per_page;

        for (index, child) in root
            .children
            .iter_mut()
            .filter_map(|n| n.as_element_mut())
            .enumerate()
        {
            child.toggle_class(CHARM_HIDDEN, index < start || index >= end);
        }
        root.children.push(self.controls().into());
        debug!(
            container = %root.id().unwrap_or_default(),
            items,
            page = self.page + 1,
            pages = self.total_pages,
            "pagination charm applied"
        );
    }

    fn controls(&self) -> Element {
        let mut prev = Element::new("button")
            .class("page-prev")
            .attr("data-action", "page-prev")
            .text("‹");
        if self.on_first_page() {
            prev.set_attr("disabled", "disabled");
        }
        let mut next = Element::new("button")
            .class("page-next")
            .attr("data-action", "page-next")
            .text("›");
        if self.on_last_page() {
            next.set_attr("disabled", "disabled");
        }
        let mut controls = Element::new("div")
            .class(CONTROLS_CLASS)
            .child(prev)
            .child(Element::new("span").class("page-label").text(self.view()))
            .child(next);
        controls.toggle_class(CHARM_HIDDEN, self.total_pages <= 1);
        controls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: usize, attrs: &[(&str, &str)]) -> Container {
        let mut el = Element::new("ul").attr("id", "list");
        for (name, value) in attrs {
            el.set_attr(*name, *value);
        }
        Container::from_element(
            el.children((0..items).map(|i| Element::new("li").text(i.to_string()))),
        )
    }

    fn visible(charm: &PaginationCharm) -> Vec<String> {
        charm
            .container()
            .borrow()
            .element_children()
            .filter(|e| e.tag == "li" && !e.has_class(CHARM_HIDDEN))
            .map(Element::text_content)
            .collect()
    }

    #[test]
    fn test_attach_requires_marker() {
        assert!(PaginationCharm::attach(list(3, &[])).is_none());
        let charm = PaginationCharm::attach(list(25, &[("data-charm", "pagination")])).unwrap();
        assert_eq!(charm.per_page(), DEFAULT_CHARM_PAGE_SIZE);
        assert_eq!(charm.total_pages(), 3);
    }

    #[test]
    fn test_malformed_page_size_uses_default() {
        let charm = PaginationCharm::attach(list(
            3,
            &[("data-charm", "pagination"), ("data-page-size", "zero")],
        ))
        .unwrap();
        assert_eq!(charm.per_page(), DEFAULT_CHARM_PAGE_SIZE);
    }

    #[test]
    fn test_navigation_windows_children() {
        let mut charm = PaginationCharm::new(list(5, &[]), 2);
        assert_eq!(visible(&charm), ["0", "1"]);
        assert_eq!(charm.view(), "1/3");

        charm.next_page();
        charm.next_page();
        charm.next_page();
        assert!(charm.on_last_page());
        assert_eq!(visible(&charm), ["4"]);

        charm.prev_page();
        assert_eq!(visible(&charm), ["2", "3"]);
    }

    #[test]
    fn test_single_controls_node() {
        let mut charm = PaginationCharm::new(list(5, &[]), 2);
        charm.apply();
        charm.apply();
        let root = charm.container().borrow();
        assert_eq!(root.find_all(&|e| e.has_class(CONTROLS_CLASS)).len(), 1);
    }

    #[test]
    fn test_rows_changed_clamps_page() {
        let mut charm = PaginationCharm::new(list(5, &[]), 2);
        charm.set_page(2);
        charm.container().borrow_mut().children.truncate(3);

        assert!(!charm.update(&Message::new(RowsChanged::new("other"))));
        assert_eq!(charm.page(), 2);
        assert!(charm.update(&Message::new(RowsChanged::new("list"))));
        assert_eq!(charm.page(), 1);
        assert_eq!(visible(&charm), ["2"]);
    }

    #[test]
    fn test_dots_view() {
        let mut charm = PaginationCharm::attach(list(
            9,
            &[
                ("data-charm", "pagination"),
                ("data-page-size", "3"),
                ("data-display", "dots"),
            ],
        ))
        .unwrap();
        assert_eq!(charm.view(), "•○○");
        charm.next_page();
        assert_eq!(charm.view(), "○•○");
    }

    #[test]
    fn test_handle_page_events() {
        let mut charm = PaginationCharm::new(list(5, &[]), 2);
        let next = Element::new("button").attr("data-action", "page-next");
        assert!(charm.handle(&TableEvent::click(&next)));
        assert_eq!(charm.page(), 1);
        assert!(!charm.handle(&TableEvent::outside()));
    }

    #[test]
    fn test_controls_hidden_for_single_page() {
        let charm = PaginationCharm::new(list(2, &[]), 10);
        let root = charm.container().borrow();
        let controls = root.find(&|e| e.has_class(CONTROLS_CLASS)).unwrap();
        assert!(controls.has_class(CHARM_HIDDEN));
    }
}

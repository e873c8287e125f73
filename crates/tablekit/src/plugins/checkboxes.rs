//! Row selection checkboxes.
//!
//! Every rendered row gets a checkbox in its `row-actions` cell and the
//! header gets a tri-state checkbox in `header-actions`. The header state is
//! never stored; it is derived from the rows currently rendered and the
//! selection, after every render and every toggle. "Select all" only covers
//! the rendered rows, i.e. the current page.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::core::{Outcome, Plugin, RenderKind, TableCore};
use crate::event::{Action, ActionKind, TableEvent};
use crate::markup::{Container, Element, Node};
use crate::state::{Hook, HookEvent, HookId, Selection, TableState};
use crate::value::{Record, RowId};

/// State of the header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// No rendered row is selected, or there are no rows.
    Unchecked,
    /// Every rendered row is selected.
    Checked,
    /// Some rendered rows are selected.
    Indeterminate,
}

impl HeaderState {
    /// Value of the checkbox's `data-state` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Checked => "checked",
            Self::Indeterminate => "indeterminate",
        }
    }
}

/// Derives the header checkbox state from the rendered ids.
#[must_use]
pub fn header_state(rendered: &[RowId], selection: &Selection) -> HeaderState {
    let selected = rendered.iter().filter(|id| selection.contains(*id)).count();
    match selected {
        0 => HeaderState::Unchecked,
        n if n == rendered.len() => HeaderState::Checked,
        _ => HeaderState::Indeterminate,
    }
}

/// Receives selection changes, e.g. a bar of bulk actions.
pub trait BatchActionBar {
    /// Called with the full selection after every change.
    fn selection_changed(&mut self, selection: &Selection);
}

/// Injects row and header checkboxes and handles their toggles.
#[derive(Default)]
pub struct CheckboxesPlugin {
    bar: Option<Rc<RefCell<dyn BatchActionBar>>>,
    hook: Option<HookId>,
    container: Option<Container>,
    rendered: Vec<RowId>,
}

impl fmt::Debug for CheckboxesPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckboxesPlugin")
            .field("bar", &self.bar.is_some())
            .field("hook", &self.hook)
            .field("rendered", &self.rendered.len())
            .finish_non_exhaustive()
    }
}

impl CheckboxesPlugin {
    /// A plugin without a batch-action bar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors every selection change into `bar` (builder pattern).
    #[must_use]
    pub fn batch_bar(mut self, bar: Rc<RefCell<dyn BatchActionBar>>) -> Self {
        self.bar = Some(bar);
        self
    }

    fn sync<R>(&self, root: &mut Element, state: &TableState<R>) {
        root.for_each_mut(&|e| e.has_class("table-row"), &mut |row| {
            let Some(id) = row.get_attr("data-row-id").map(RowId::new) else {
                return;
            };
            let selected = state.is_selected(&id);
            row.toggle_class("selected", selected);
            let Some(actions) = row.find_mut(&|e| e.has_class("row-actions")) else {
                return;
            };
            if actions.find(&|e| e.has_class("row-checkbox")).is_none() {
                actions.children.push(Node::Element(
                    Element::new("input")
                        .class("row-checkbox")
                        .attr("type", "checkbox")
                        .attr("data-action", "select-row")
                        .attr("data-row-id", id.as_str()),
                ));
            }
            if let Some(checkbox) = actions.find_mut(&|e| e.has_class("row-checkbox")) {
                set_checked(checkbox, selected);
            }
        });

        let header = header_state(&self.rendered, state.selection());
        if let Some(actions) = root.find_mut(&|e| e.has_class("header-actions")) {
            if actions.find(&|e| e.has_class("select-all")).is_none() {
                actions.children.push(Node::Element(
                    Element::new("input")
                        .class("select-all")
                        .attr("type", "checkbox")
                        .attr("data-action", "select-all"),
                ));
            }
            if let Some(checkbox) = actions.find_mut(&|e| e.has_class("select-all")) {
                set_checked(checkbox, header == HeaderState::Checked);
                checkbox.toggle_class("indeterminate", header == HeaderState::Indeterminate);
                checkbox.set_attr("data-state", header.as_str());
            }
        }
    }
}

fn set_checked(checkbox: &mut Element, checked: bool) {
    if checked {
        checkbox.set_attr("checked", "checked");
    } else {
        checkbox.remove_attr("checked");
    }
}

impl<R: Record + 'static> Plugin<R> for CheckboxesPlugin {
    fn name(&self) -> &'static str {
        "checkboxes"
    }

    fn actions(&self) -> &'static [ActionKind] {
        &[ActionKind::ToggleRow, ActionKind::ToggleAll]
    }

    fn init(&mut self, core: &mut TableCore<R>, state: &mut TableState<R>) {
        self.container = Some(core.container().clone());
        if let Some(bar) = &self.bar {
            let bar = Rc::clone(bar);
            self.hook = Some(state.register_hook(Hook::Select, move |event| {
                if let HookEvent::Select { selection } = event {
                    bar.borrow_mut().selection_changed(selection);
                }
            }));
        }
    }

    fn on_render(&mut self, core: &TableCore<R>, state: &mut TableState<R>, _kind: RenderKind) {
        self.rendered = core.rendered_ids();
        self.sync(&mut core.container().borrow_mut(), state);
    }

    fn handle(
        &mut self,
        action: &Action,
        _event: &TableEvent,
        core: &mut TableCore<R>,
        state: &mut TableState<R>,
    ) -> Outcome {
        match action {
            Action::ToggleRow(id) => {
                if !self.rendered.contains(id) {
                    return Outcome::Ignored;
                }
                state.toggle_row(id.clone());
            }
            Action::ToggleAll => {
                if self.rendered.is_empty() {
                    return Outcome::Ignored;
                }
                if header_state(&self.rendered, state.selection()) == HeaderState::Checked {
                    state.deselect_many(&self.rendered);
                } else {
                    state.select_all(self.rendered.iter().cloned());
                }
                debug!(rows = self.rendered.len(), selected = state.selection().len(), "select all toggled");
            }
            _ => return Outcome::Ignored,
        }
        self.sync(&mut core.container().borrow_mut(), state);
        Outcome::Selected
    }

    fn destroy(&mut self, state: &mut TableState<R>) {
        if let Some(hook) = self.hook.take() {
            state.unregister_hook(hook);
        }
        self.rendered.clear();
        if let Some(container) = self.container.take() {
            container.borrow_mut().for_each_mut(
                &|e| e.has_class("row-actions") || e.has_class("header-actions"),
                &mut |cell| {
                    cell.children.retain(|n| {
                        n.as_element()
                            .is_none_or(|e| !e.has_class("row-checkbox") && !e.has_class("select-all"))
                    });
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<RowId> {
        names.iter().map(|n| RowId::from(*n)).collect()
    }

    #[test]
    fn test_header_state() {
        let rendered = ids(&["a", "b"]);
        let mut selection = Selection::new();
        assert_eq!(header_state(&rendered, &selection), HeaderState::Unchecked);
        selection.insert(RowId::from("a"));
        assert_eq!(header_state(&rendered, &selection), HeaderState::Indeterminate);
        selection.insert(RowId::from("b"));
        assert_eq!(header_state(&rendered, &selection), HeaderState::Checked);
    }

    #[test]
    fn test_header_state_ignores_offscreen_selection() {
        let selection: Selection = ids(&["x", "y"]).into_iter().collect();
        assert_eq!(header_state(&ids(&["a"]), &selection), HeaderState::Unchecked);
        assert_eq!(header_state(&[], &selection), HeaderState::Unchecked);
    }

    #[test]
    fn test_set_checked() {
        let mut el = Element::new("input");
        set_checked(&mut el, true);
        assert_eq!(el.get_attr("checked"), Some("checked"));
        set_checked(&mut el, false);
        assert_eq!(el.get_attr("checked"), None);
    }
}

//! Managed tables for mutually exclusive tabs sharing one search input.
//!
//! [`TabTables`] owns the tables keyed by tab id. Switching tabs deactivates
//! the current table (releasing the input and dropping its pending search
//! ticks) before activating the next one, so at most one table ever reads
//! the input.

use tracing::debug;

use crate::core::Outcome;
use crate::event::TableEvent;
use crate::managed::{ManagedTable, SearchInput};
use crate::message::{Cmd, Message};
use crate::value::Record;

/// Owning context for the managed tables of a tabbed view.
pub struct TabTables<R> {
    search: SearchInput,
    tabs: Vec<(String, ManagedTable<R>)>,
    active: Option<usize>,
}

impl<R> Default for TabTables<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for TabTables<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabTables")
            .field("search", &self.search)
            .field("tabs", &self.tabs.iter().map(|(tab, _)| tab).collect::<Vec<_>>())
            .field("active", &self.active)
            .finish()
    }
}

impl<R> TabTables<R> {
    /// Creates an empty context with a fresh search input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            search: SearchInput::new(),
            tabs: Vec::new(),
            active: None,
        }
    }

    /// The shared input. Pass it to
    /// [`ManagedOptions::search_input`](crate::managed::ManagedOptions::search_input)
    /// when building each tab's table.
    #[must_use]
    pub fn search_input(&self) -> SearchInput {
        self.search.clone()
    }

    /// Tab ids in insertion order.
    #[must_use]
    pub fn tabs(&self) -> Vec<&str> {
        self.tabs.iter().map(|(tab, _)| tab.as_str()).collect()
    }

    /// Id of the active tab.
    #[must_use]
    pub fn active_tab(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.tabs.get(i))
            .map(|(tab, _)| tab.as_str())
    }

    fn position(&self, tab: &str) -> Option<usize> {
        self.tabs.iter().position(|(id, _)| id == tab)
    }
}

impl<R: Record + 'static> TabTables<R> {
    /// Adds a tab's table, destroying any table previously under `tab`.
    pub fn insert(&mut self, tab: impl Into<String>, table: ManagedTable<R>) {
        let tab = tab.into();
        match self.position(&tab) {
            Some(index) => {
                let was_active = self.active == Some(index);
                self.tabs[index].1.destroy();
                self.tabs[index].1 = table;
                if was_active {
                    self.tabs[index].1.activate();
                }
            }
            None => self.tabs.push((tab, table)),
        }
    }

    /// Makes `tab` the active tab. Returns `false` for unknown tabs.
    ///
    /// Switching to the already active tab is a no-op.
    pub fn switch_to(&mut self, tab: &str) -> bool {
        let Some(index) = self.position(tab) else {
            return false;
        };
        if self.active == Some(index) {
            return true;
        }
        if let Some((_, current)) = self.active.and_then(|i| self.tabs.get_mut(i)) {
            current.deactivate();
        }
        self.tabs[index].1.activate();
        self.active = Some(index);
        debug!(tab, "tab switched");
        true
    }

    /// The active table.
    #[must_use]
    pub fn active(&self) -> Option<&ManagedTable<R>> {
        self.active.and_then(|i| self.tabs.get(i)).map(|(_, t)| t)
    }

    /// The active table, mutably.
    pub fn active_mut(&mut self) -> Option<&mut ManagedTable<R>> {
        self.active
            .and_then(|i| self.tabs.get_mut(i))
            .map(|(_, t)| t)
    }

    /// A tab's table.
    #[must_use]
    pub fn get(&self, tab: &str) -> Option<&ManagedTable<R>> {
        self.tabs.iter().find(|(id, _)| id == tab).map(|(_, t)| t)
    }

    /// A tab's table, mutably.
    pub fn get_mut(&mut self, tab: &str) -> Option<&mut ManagedTable<R>> {
        self.tabs
            .iter_mut()
            .find(|(id, _)| id == tab)
            .map(|(_, t)| t)
    }

    /// Routes typed search text to the active table.
    pub fn on_search_input(&mut self, text: impl Into<String>) -> Option<Cmd> {
        self.active_mut()?.on_search_input(text)
    }

    /// Routes an event to the active table.
    pub fn handle(&mut self, event: &TableEvent) -> Outcome {
        self.active_mut()
            .map_or(Outcome::Ignored, |table| table.handle(event))
    }

    /// Offers a message to every table; returns whether one applied it.
    pub fn update(&mut self, msg: &Message) -> bool {
        self.tabs
            .iter_mut()
            .fold(false, |applied, (_, table)| table.update(msg) || applied)
    }

    /// Destroys and removes a tab's table. Returns whether it existed.
    pub fn remove(&mut self, tab: &str) -> bool {
        let Some(index) = self.position(tab) else {
            return false;
        };
        let (_, mut table) = self.tabs.remove(index);
        table.destroy();
        self.active = match self.active {
            Some(active) if active == index => None,
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        true
    }

    /// Destroys every table. Safe to repeat.
    pub fn destroy(&mut self) {
        for (_, table) in &mut self.tabs {
            table.destroy();
        }
        self.tabs.clear();
        self.active = None;
    }
}

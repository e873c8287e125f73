#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Tablekit
//!
//! A headless table engine: rows in, markup out, user interaction fed back
//! as explicit events.
//!
//! - **value** - the `Record` trait, row ids and value helpers
//! - **markup** - the in-memory element tree tables render into
//! - **column** - column types and the `ColumnTypeRegistry`
//! - **state** - `TableState`: data, derived rows, sort, filters, search,
//!   selection, pagination and hooks
//! - **event** - clicks and input turned into actions
//! - **core** - `TableCore`, the render core and plugin protocol
//! - **plugins** - sorting, filters and checkboxes
//! - **managed** - `ManagedTable`, everything wired together
//! - **tabs** - managed tables sharing one search input across tabs
//! - **charm** - `PaginationCharm`, windowing for plain lists
//! - **config** - declarative table configuration
//! - **text** - plain-text grid view
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use serde_json::json;
//! use tablekit::prelude::*;
//!
//! let columns = vec![
//!     col("id", "ID", ColumnType::IdText, ColumnOverrides::default()),
//!     col("word", "Word", ColumnType::Name, ColumnOverrides::default()),
//! ];
//! let mut table = ManagedTable::new(Container::new("words"), columns, ManagedOptions::new())?;
//! table.set_data(vec![
//!     Rc::new(json!({"id": "ban-2", "word": "eggs"})),
//!     Rc::new(json!({"id": "ban-10", "word": "ham"})),
//!     Rc::new(json!({"id": "ban-1", "word": "spam"})),
//! ]);
//!
//! let header = table.core().header_cell("id").unwrap();
//! table.handle(&TableEvent::click(&header));
//! assert_eq!(
//!     table.core().rendered_ids(),
//!     vec![RowId::from("ban-1"), RowId::from("ban-2"), RowId::from("ban-10")]
//! );
//! assert_eq!(table.stats_text(), "Показано 3 з 3");
//! # Ok::<(), tablekit::Error>(())
//! ```

pub mod charm;
pub mod column;
pub mod config;
pub mod core;
pub mod error;
pub mod event;
pub mod managed;
pub mod markup;
pub mod message;
pub mod plugins;
pub mod state;
pub mod tabs;
pub mod text;
pub mod value;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::charm::{discover, PaginationCharm, RowsChanged};
    pub use crate::column::{
        col, Alignment, Column, ColumnOverrides, ColumnType, ColumnTypePreset, ColumnTypeRegistry,
        SortType,
    };
    pub use crate::config::{ColumnConfig, TableConfig};
    pub use crate::core::{EmptyState, Outcome, Plugin, RenderKind, TableCore, TableOptions};
    pub use crate::error::{Error, Result};
    pub use crate::event::{Action, TableEvent};
    pub use crate::managed::{Locale, ManagedOptions, ManagedTable, SearchInput, SearchTick, Stats};
    pub use crate::markup::{Container, Document, Element};
    pub use crate::message::{Cmd, Message};
    pub use crate::plugins::{
        BatchActionBar, CheckboxesPlugin, FilterColumnConfig, FilterConfig, FilterKind,
        FiltersPlugin, SortingPlugin,
    };
    pub use crate::state::{FilterValue, Hook, HookEvent, SortDirection, TableState};
    pub use crate::tabs::TabTables;
    pub use crate::text::render_text;
    pub use crate::value::{Record, RowId};
}

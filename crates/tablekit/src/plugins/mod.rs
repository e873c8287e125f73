//! Behaviour plugins for [`TableCore`](crate::core::TableCore).
//!
//! | Plugin | Routed actions | Reports |
//! |--------|----------------|---------|
//! | [`SortingPlugin`] | `Sort` | [`Outcome::Sorted`](crate::core::Outcome::Sorted) |
//! | [`FiltersPlugin`] | filter panel actions, `Outside` | [`Outcome::Filtered`](crate::core::Outcome::Filtered) |
//! | [`CheckboxesPlugin`] | `ToggleRow`, `ToggleAll` | [`Outcome::Selected`](crate::core::Outcome::Selected) |

pub mod checkboxes;
pub mod filters;
pub mod sorting;

pub use checkboxes::{header_state, BatchActionBar, CheckboxesPlugin, HeaderState};
pub use filters::{
    distinct_values, effective_config, filter_data, position_panel, FilterColumnConfig,
    FilterConfig, FilterKind, FiltersPlugin, PanelPosition,
};
pub use sorting::{natural_cmp, next_direction, parse_date, sort_data, SortingPlugin};

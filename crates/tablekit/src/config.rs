//! Declarative table configuration.
//!
//! A [`TableConfig`] describes columns by type name plus overrides, and the
//! managed-table options around them. It loads from JSON, TOML or YAML.
//!
//! ```toml
//! page_size = 20
//! stats_locale = "en"
//! visible_columns = ["word", "lang"]
//!
//! [[columns]]
//! id = "word"
//! label = "Word"
//! type = "name"
//!
//! [[columns]]
//! id = "lang"
//! type = "code"
//! filterable = true
//!
//! [filters.lang]
//! kind = "values"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnOverrides, ColumnTypeRegistry};
use crate::core::EmptyState;
use crate::error::{Error, Result};
use crate::managed::{Locale, ManagedOptions, SEARCH_DEBOUNCE};
use crate::plugins::filters::FilterConfig;
use crate::state::DEFAULT_PAGE_SIZE;

fn default_type() -> String {
    "text".to_string()
}

/// One configured column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Field id.
    pub id: String,
    /// Header label; the id when missing.
    #[serde(default)]
    pub label: Option<String>,
    /// Registry type name.
    #[serde(rename = "type", default = "default_type")]
    pub type_name: String,
    /// Adjustments to the type preset.
    #[serde(flatten)]
    pub overrides: ColumnOverrides,
}

impl ColumnConfig {
    /// A `text` column labelled with its id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            type_name: default_type(),
            overrides: ColumnOverrides::default(),
        }
    }
}

/// Table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Columns in display order.
    pub columns: Vec<ColumnConfig>,
    /// Rows per page.
    pub page_size: usize,
    /// Search debounce in milliseconds.
    pub search_debounce_ms: u64,
    /// Column filters; empty disables the filters plugin.
    pub filters: FilterConfig,
    /// Placeholder for an empty result.
    pub empty_state: Option<EmptyState>,
    /// Stats language.
    pub stats_locale: Locale,
    /// Initially visible columns; all when missing.
    pub visible_columns: Option<Vec<String>>,
    /// Header sorting.
    pub sorting: bool,
    /// Row checkboxes.
    pub selection: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: u64::try_from(SEARCH_DEBOUNCE.as_millis()).unwrap_or(200),
            filters: FilterConfig::new(),
            empty_state: None,
            stats_locale: Locale::default(),
            visible_columns: None,
            sorting: true,
            selection: false,
        }
    }
}

impl TableConfig {
    /// Parses JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] or [`Error::Config`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] or [`Error::Config`].
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] or [`Error::Config`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when reading fails, a parse error, or
    /// [`Error::Config`] for unknown extensions and invalid contents.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some(ext) => Err(Error::Config(format!("unsupported config format: {ext}"))),
            None => Err(Error::Config(format!(
                "cannot infer config format of {}",
                path.display()
            ))),
        }
    }

    /// Checks that ids are unique and every reference names a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".into()));
        }
        let mut seen = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.id.trim().is_empty() {
                return Err(Error::Config("column id must not be empty".into()));
            }
            if seen.contains(&column.id.as_str()) {
                return Err(Error::Config(format!("duplicate column {:?}", column.id)));
            }
            seen.push(column.id.as_str());
        }
        if self.columns.is_empty() {
            return Ok(());
        }
        let unknown = self
            .filters
            .keys()
            .chain(self.visible_columns.iter().flatten())
            .find(|id| !seen.contains(&id.as_str()));
        match unknown {
            Some(id) => Err(Error::Config(format!("unknown column {id:?}"))),
            None => Ok(()),
        }
    }

    /// Builds the columns through `registry`. Columns with a filter entry
    /// are filterable unless they say otherwise.
    #[must_use]
    pub fn columns(&self, registry: &ColumnTypeRegistry) -> Vec<Column> {
        self.columns
            .iter()
            .map(|c| {
                let mut overrides = c.overrides.clone();
                if overrides.filterable.is_none() && self.filters.contains_key(&c.id) {
                    overrides.filterable = Some(true);
                }
                let label = c.label.as_deref().unwrap_or(&c.id);
                registry.col(&c.id, label, &c.type_name, overrides)
            })
            .collect()
    }

    /// Managed-table options matching this configuration.
    #[must_use]
    pub fn managed_options<R>(&self) -> ManagedOptions<R> {
        let mut options = ManagedOptions::new()
            .page_size(self.page_size)
            .debounce(Duration::from_millis(self.search_debounce_ms))
            .locale(self.stats_locale)
            .sorting(self.sorting)
            .selection(self.selection);
        let filterable = self
            .columns
            .iter()
            .any(|c| c.overrides.filterable == Some(true));
        if !self.filters.is_empty() || filterable {
            options = options.filters(self.filters.clone());
        }
        if let Some(empty) = &self.empty_state {
            options = options.empty_state(empty.clone());
        }
        if let Some(visible) = &self.visible_columns {
            options = options.visible_columns(visible.iter().cloned());
        }
        options
    }
}

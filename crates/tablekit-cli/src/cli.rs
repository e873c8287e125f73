//! Command-line interface for `tablekit`.
//!
//! # Examples
//!
//! ```bash
//! # Render a JSON array of objects as a text grid
//! tablekit --data words.json --format text
//!
//! # Configured columns, sorted by hits descending, English stats
//! tablekit --data words.json --config table.toml --sort hits:desc --locale en
//!
//! # Only Ukrainian and Polish rows, second page, as HTML
//! tablekit --data words.json --filter lang=uk --filter lang=pl --page 2
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tablekit::managed::Locale;
use tablekit::state::SortDirection;
use tracing::Level;

/// Render a JSON dataset through a managed table.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tablekit",
    author,
    version,
    about = "Render a JSON dataset through a managed table",
    long_about = "Loads a JSON array of objects, applies search, filters, sorting and \
                  pagination the way an interactive table would, and prints the result."
)]
pub struct Cli {
    /// JSON file holding an array of row objects
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// Table configuration (.json, .toml, .yaml or .yml)
    ///
    /// Without one, every key of the first row becomes a column
    #[arg(long, short = 'c', env = "TABLEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Global search query
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort column, optionally suffixed with :asc or :desc
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortSpec>,

    /// Value filter as column=value; repeat to allow more values
    #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
    pub filters: Vec<FilterSpec>,

    /// 1-based page to show
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Rows per page (overrides the configuration)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Stats language (overrides the configuration)
    #[arg(long, value_enum)]
    pub locale: Option<LocaleArg>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Width of the text grid
    #[arg(long, short = 'w', default_value_t = 100)]
    pub width: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// How the result is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width grid followed by the stats line
    #[default]
    Text,
    /// Toolbar, table and pager markup
    Html,
}

/// Stats language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocaleArg {
    /// Ukrainian
    Uk,
    /// English
    En,
}

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::Uk => Self::Uk,
            LocaleArg::En => Self::En,
        }
    }
}

/// A parsed `--sort` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// A parsed `--filter` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: String,
    pub value: String,
}

fn parse_sort(s: &str) -> Result<SortSpec, String> {
    let (column, direction) = match s.rsplit_once(':') {
        Some((column, "asc")) => (column, SortDirection::Asc),
        Some((column, "desc")) => (column, SortDirection::Desc),
        Some((_, other)) => return Err(format!("unknown sort direction '{other}'")),
        None => (s, SortDirection::Asc),
    };
    if column.is_empty() {
        return Err("sort column is empty".to_string());
    }
    Ok(SortSpec {
        column: column.to_string(),
        direction,
    })
}

fn parse_filter(s: &str) -> Result<FilterSpec, String> {
    match s.split_once('=') {
        Some((column, value)) if !column.is_empty() => Ok(FilterSpec {
            column: column.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected column=value, got '{s}'")),
    }
}

impl Cli {
    /// Parse CLI arguments from the environment.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse from an iterator (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    #[allow(dead_code)]
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Log level for the verbosity count.
    #[must_use]
    pub const fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

//! Column definitions and the column type registry.
//!
//! A column's markup comes only from its *type*: each named type is a preset
//! of layout weight, alignment, sort/search behaviour and a [`CellRenderer`].
//! [`ColumnOverrides`] can adjust layout and behaviour but has no render
//! field at all; call sites that need different markup register a new named
//! type on a [`ColumnTypeRegistry`], which keeps every piece of cell markup
//! in one auditable place.
//!
//! # Example
//!
//! ```rust
//! use tablekit::column::{col, ColumnOverrides, ColumnType};
//!
//! let id = col("id", "ID", ColumnType::IdText, ColumnOverrides::default());
//! let word = col(
//!     "word",
//!     "Word",
//!     ColumnType::Name,
//!     ColumnOverrides { filterable: Some(true), ..Default::default() },
//! );
//!
//! assert!(id.sortable);
//! assert!(word.filterable);
//! assert_eq!(word.render_weight, 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::markup::{Element, Node};
use crate::value::{is_blank, value_number, value_text, Record};

/// Horizontal alignment of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

impl Alignment {
    /// CSS class used on header and body cells.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Left => "align-left",
            Self::Center => "align-center",
            Self::Right => "align-right",
        }
    }
}

/// Comparator family used when sorting by a column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortType {
    /// Case-insensitive natural collation.
    #[default]
    String,
    /// Numeric.
    Number,
    /// `true` sorts after `false`.
    Boolean,
    /// `DD.MM.YY`, `DD.MM.YYYY` and ISO dates.
    Date,
    /// First run of digits in an identifier.
    IdNumber,
    /// Same key as `IdNumber`, for text-prefixed identifiers.
    IdText,
    /// Two row fields joined with a space.
    Product {
        /// Leading field.
        primary: String,
        /// Trailing field.
        secondary: String,
    },
    /// Never sorted.
    None,
}

impl SortType {
    /// The default composite product key: `name` then `code`.
    #[must_use]
    pub fn product() -> Self {
        Self::Product {
            primary: "name".to_string(),
            secondary: "code".to_string(),
        }
    }
}

/// Custom cell renderer registered under a type name.
pub type RenderFn = Rc<dyn Fn(Option<&Value>, &dyn Record) -> Vec<Node>>;

/// How a column type turns a value into cell content.
#[derive(Clone)]
pub enum CellRenderer {
    /// Escaped text.
    Text,
    /// Text wrapped in `<strong>`.
    Strong,
    /// Multi-line prose; newlines become `<br>`.
    Prose,
    /// Monospace `<code>`.
    Code,
    /// Monospace identifier.
    Identifier,
    /// Number with at most two decimals.
    Number,
    /// Counter pill; zero gets a muted class.
    Counter,
    /// Date text as stored.
    Date,
    /// Yes/no badge from a boolean-ish value.
    BoolBadge,
    /// Status badge; the value becomes part of the class.
    StatusBadge,
    /// Thumbnail image from a URL.
    Thumbnail,
    /// Editable text input.
    Input,
    /// Chip list from an array or comma-separated text.
    Chips,
    /// Product name with its secondary code.
    Product {
        /// Field holding the product name.
        primary: String,
        /// Field holding the product code.
        secondary: String,
    },
    /// Nothing; the cell is reserved for caller-attached buttons.
    Action,
    /// A renderer registered by name on a [`ColumnTypeRegistry`].
    Custom(RenderFn),
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product { primary, secondary } => f
                .debug_struct("Product")
                .field("primary", primary)
                .field("secondary", secondary)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

impl CellRenderer {
    fn name(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Strong => "Strong",
            Self::Prose => "Prose",
            Self::Code => "Code",
            Self::Identifier => "Identifier",
            Self::Number => "Number",
            Self::Counter => "Counter",
            Self::Date => "Date",
            Self::BoolBadge => "BoolBadge",
            Self::StatusBadge => "StatusBadge",
            Self::Thumbnail => "Thumbnail",
            Self::Input => "Input",
            Self::Chips => "Chips",
            Self::Product { .. } => "Product",
            Self::Action => "Action",
            Self::Custom(_) => "Custom",
        }
    }

    /// Renders the content of one cell.
    ///
    /// Missing values render as an empty cell for every built-in renderer.
    pub fn render(&self, column: &str, value: Option<&Value>, row: &dyn Record) -> Vec<Node> {
        if let Self::Custom(f) = self {
            return f(value, row);
        }
        if let Self::Product { primary, secondary } = self {
            return render_product(row, primary, secondary);
        }
        if matches!(self, Self::Action) || is_blank(value) {
            return Vec::new();
        }
        let Some(value) = value else {
            return Vec::new();
        };
        let text = value_text(value);

        let node = match self {
            Self::Text | Self::Date => return vec![Node::Text(text)],
            Self::Strong => Element::new("strong").text(text),
            Self::Prose => {
                let mut el = Element::new("div").class("cell-prose");
                for (i, line) in text.lines().enumerate() {
                    if i > 0 {
                        el = el.child(Element::new("br"));
                    }
                    el = el.text(line);
                }
                el
            }
            Self::Code => Element::new("code").text(text),
            Self::Identifier => Element::new("code").class("cell-id").text(text),
            Self::Number => return vec![Node::Text(format_number(value))],
            Self::Counter => {
                let zero = value_number(value) == Some(0.0);
                Element::new("span")
                    .class("counter")
                    .class(if zero { "counter-zero" } else { "counter-some" })
                    .text(format_number(value))
            }
            Self::BoolBadge => {
                if truthy(value) {
                    Element::new("span").class("badge").class("badge-yes").text("✓")
                } else {
                    Element::new("span").class("badge").class("badge-no").text("✗")
                }
            }
            Self::StatusBadge => Element::new("span")
                .class("badge")
                .class(format!("status-{}", slug(&text)))
                .text(text),
            Self::Thumbnail => Element::new("img")
                .class("thumb")
                .attr("src", text)
                .attr("loading", "lazy")
                .attr("alt", column),
            Self::Input => Element::new("input")
                .class("cell-input")
                .attr("data-field", column)
                .attr("value", text),
            Self::Chips => {
                let chips: Vec<String> = match value {
                    Value::Array(items) => items
                        .iter()
                        .map(value_text)
                        .filter(|s| !s.is_empty())
                        .collect(),
                    _ => text
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                };
                Element::new("span").class("chips").children(
                    chips
                        .into_iter()
                        .map(|c| Element::new("span").class("chip").text(c)),
                )
            }
            Self::Product { .. } | Self::Action | Self::Custom(_) => return Vec::new(),
        };
        vec![Node::Element(node)]
    }
}

fn render_product(row: &dyn Record, primary: &str, secondary: &str) -> Vec<Node> {
    let name = row.field(primary).map(value_text).unwrap_or_default();
    let code = row.field(secondary).map(value_text).unwrap_or_default();
    if name.is_empty() && code.is_empty() {
        return Vec::new();
    }
    let mut el = Element::new("div").class("product");
    if !name.is_empty() {
        el = el.child(Element::new("span").class("product-name").text(name));
    }
    if !code.is_empty() {
        el = el.child(Element::new("span").class("product-code").text(code));
    }
    vec![Node::Element(el)]
}

/// Boolean reading of a cell value: `true`, non-zero numbers and the usual
/// affirmative strings.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "так" | "+"
        ),
        _ => false,
    }
}

fn format_number(value: &Value) -> String {
    match value_number(value) {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{n:.0}"),
        Some(n) => {
            let s = format!("{n:.2}");
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        None => value_text(value),
    }
}

fn slug(text: &str) -> String {
    let mut out = String::new();
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// A named column type: layout, behaviour and markup defaults.
#[derive(Debug, Clone)]
pub struct ColumnTypePreset {
    /// Relative width in the row layout.
    pub render_weight: u16,
    /// Cell alignment.
    pub alignment: Alignment,
    /// Whether the header toggles sorting.
    pub sortable: bool,
    /// Whether the managed-table search looks at this column.
    pub searchable: bool,
    /// Comparator family.
    pub sort_type: SortType,
    /// Cell markup.
    pub renderer: CellRenderer,
}

impl ColumnTypePreset {
    fn new(
        render_weight: u16,
        alignment: Alignment,
        sort_type: SortType,
        searchable: bool,
        renderer: CellRenderer,
    ) -> Self {
        Self {
            render_weight,
            alignment,
            sortable: sort_type != SortType::None,
            searchable,
            sort_type,
            renderer,
        }
    }
}

/// The sixteen built-in column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    /// Plain text.
    Text,
    /// Prominent name.
    Name,
    /// Long prose.
    Description,
    /// Short code.
    Code,
    /// Text-prefixed identifier such as `ban-000123`.
    IdText,
    /// Numeric identifier.
    IdNumber,
    /// Number.
    Number,
    /// Counter pill.
    Counter,
    /// Date.
    Date,
    /// Boolean as a badge.
    Boolean,
    /// Status badge.
    Status,
    /// Thumbnail.
    Image,
    /// Editable input.
    Input,
    /// Chip list.
    Chips,
    /// Product name and code.
    Product,
    /// Reserved for caller-attached buttons.
    Action,
}

impl ColumnType {
    /// Every built-in type.
    pub const ALL: [Self; 16] = [
        Self::Text,
        Self::Name,
        Self::Description,
        Self::Code,
        Self::IdText,
        Self::IdNumber,
        Self::Number,
        Self::Counter,
        Self::Date,
        Self::Boolean,
        Self::Status,
        Self::Image,
        Self::Input,
        Self::Chips,
        Self::Product,
        Self::Action,
    ];

    /// The type's registry name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Name => "name",
            Self::Description => "description",
            Self::Code => "code",
            Self::IdText => "id-text",
            Self::IdNumber => "id-number",
            Self::Number => "number",
            Self::Counter => "counter",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Status => "status",
            Self::Image => "image",
            Self::Input => "input",
            Self::Chips => "chips",
            Self::Product => "product",
            Self::Action => "action",
        }
    }

    /// The type's preset.
    #[must_use]
    pub fn preset(self) -> ColumnTypePreset {
        use Alignment::{Center, Left, Right};
        use CellRenderer as R;

        match self {
            Self::Text => ColumnTypePreset::new(2, Left, SortType::String, true, R::Text),
            Self::Name => ColumnTypePreset::new(3, Left, SortType::String, true, R::Strong),
            Self::Description => ColumnTypePreset::new(4, Left, SortType::String, true, R::Prose),
            Self::Code => ColumnTypePreset::new(1, Left, SortType::String, true, R::Code),
            Self::IdText => ColumnTypePreset::new(1, Left, SortType::IdText, true, R::Identifier),
            Self::IdNumber => {
                ColumnTypePreset::new(1, Right, SortType::IdNumber, true, R::Identifier)
            }
            Self::Number => ColumnTypePreset::new(1, Right, SortType::Number, false, R::Number),
            Self::Counter => ColumnTypePreset::new(1, Center, SortType::Number, false, R::Counter),
            Self::Date => ColumnTypePreset::new(1, Center, SortType::Date, true, R::Date),
            Self::Boolean => {
                ColumnTypePreset::new(1, Center, SortType::Boolean, false, R::BoolBadge)
            }
            Self::Status => {
                ColumnTypePreset::new(1, Center, SortType::String, true, R::StatusBadge)
            }
            Self::Image => ColumnTypePreset::new(1, Center, SortType::None, false, R::Thumbnail),
            Self::Input => ColumnTypePreset::new(2, Left, SortType::String, true, R::Input),
            Self::Chips => ColumnTypePreset::new(3, Left, SortType::String, true, R::Chips),
            Self::Product => ColumnTypePreset::new(
                3,
                Left,
                SortType::product(),
                true,
                R::Product {
                    primary: "name".to_string(),
                    secondary: "code".to_string(),
                },
            ),
            Self::Action => ColumnTypePreset::new(1, Right, SortType::None, false, R::Action),
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown column type: {s}"))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column adjustments to a type preset.
///
/// There is deliberately no way to override the renderer here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ColumnOverrides {
    /// Relative width.
    pub render_weight: Option<u16>,
    /// Cell alignment.
    pub alignment: Option<Alignment>,
    /// Header toggles sorting.
    pub sortable: Option<bool>,
    /// Included in text search.
    pub searchable: Option<bool>,
    /// Gets a filter icon.
    pub filterable: Option<bool>,
    /// Whether cells carry a `title` tooltip.
    pub tooltip: Option<bool>,
    /// Comparator family.
    pub sort_type: Option<SortType>,
}

/// A table column.
#[derive(Debug, Clone)]
pub struct Column {
    /// Field read from each row; also the `data-column` attribute.
    pub id: String,
    /// Header label.
    pub label: String,
    /// Relative width.
    pub render_weight: u16,
    /// Cell alignment.
    pub alignment: Alignment,
    /// Header toggles sorting.
    pub sortable: bool,
    /// Included in text search.
    pub searchable: bool,
    /// Gets a filter icon.
    pub filterable: bool,
    /// Cells carry a `title` tooltip with the raw value.
    pub tooltip: bool,
    /// Name of the type preset this column was built from.
    pub type_name: String,
    /// Comparator family.
    pub sort_type: SortType,
    renderer: CellRenderer,
}

impl Column {
    fn from_preset(
        id: &str,
        label: &str,
        type_name: &str,
        preset: ColumnTypePreset,
        overrides: ColumnOverrides,
    ) -> Self {
        let sort_type = overrides.sort_type.unwrap_or(preset.sort_type);
        Self {
            id: id.to_string(),
            label: label.to_string(),
            render_weight: overrides.render_weight.unwrap_or(preset.render_weight).max(1),
            alignment: overrides.alignment.unwrap_or(preset.alignment),
            sortable: overrides.sortable.unwrap_or(preset.sortable) && sort_type != SortType::None,
            searchable: overrides.searchable.unwrap_or(preset.searchable),
            filterable: overrides.filterable.unwrap_or(false),
            tooltip: overrides.tooltip.unwrap_or(true),
            type_name: type_name.to_string(),
            sort_type,
            renderer: preset.renderer,
        }
    }

    /// The renderer inherited from the column type.
    #[must_use]
    pub fn renderer(&self) -> &CellRenderer {
        &self.renderer
    }

    /// The raw value this column shows for `row`.
    pub fn value<'a>(&self, row: &'a dyn Record) -> Option<&'a Value> {
        row.field(&self.id)
    }

    /// Text used for tooltips and search.
    pub fn text(&self, row: &dyn Record) -> String {
        match &self.renderer {
            CellRenderer::Product { primary, secondary } => product_key(row, primary, secondary),
            _ => self.value(row).map(value_text).unwrap_or_default(),
        }
    }

    /// Renders the cell content for `row`.
    pub fn render_cell(&self, row: &dyn Record) -> Vec<Node> {
        self.renderer.render(&self.id, self.value(row), row)
    }
}

/// Joins two row fields with a space, skipping blanks.
pub(crate) fn product_key(row: &dyn Record, primary: &str, secondary: &str) -> String {
    [primary, secondary]
        .iter()
        .filter_map(|key| row.field(key))
        .map(value_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds a column from a built-in type.
pub fn col(id: &str, label: &str, ty: ColumnType, overrides: ColumnOverrides) -> Column {
    Column::from_preset(id, label, ty.as_str(), ty.preset(), overrides)
}

/// Built-in presets plus caller-registered named types.
#[derive(Debug, Clone, Default)]
pub struct ColumnTypeRegistry {
    custom: BTreeMap<String, ColumnTypePreset>,
}

impl ColumnTypeRegistry {
    /// A registry holding only the built-in types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a named type.
    ///
    /// Built-in names can be shadowed.
    pub fn register(&mut self, name: impl Into<String>, preset: ColumnTypePreset) {
        self.custom.insert(name.into(), preset);
    }

    /// Registers a type (builder pattern).
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, preset: ColumnTypePreset) -> Self {
        self.register(name, preset);
        self
    }

    /// Returns whether `name` resolves without falling back to `text`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name) || name.parse::<ColumnType>().is_ok()
    }

    /// Resolves a type name; unknown names fall back to `text`.
    #[must_use]
    pub fn preset(&self, name: &str) -> ColumnTypePreset {
        if let Some(preset) = self.custom.get(name) {
            return preset.clone();
        }
        name.parse::<ColumnType>()
            .unwrap_or(ColumnType::Text)
            .preset()
    }

    /// Every resolvable type name, built-ins first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = ColumnType::ALL
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        for name in self.custom.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Builds a column from a type name.
    #[must_use]
    pub fn col(&self, id: &str, label: &str, type_name: &str, overrides: ColumnOverrides) -> Column {
        let resolved = if self.contains(type_name) {
            type_name
        } else {
            ColumnType::Text.as_str()
        };
        Column::from_preset(id, label, resolved, self.preset(type_name), overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn html(nodes: &[Node]) -> String {
        Element::new("td")
            .children(nodes.iter().filter_map(|n| n.as_element().cloned()))
            .to_html()
    }

    #[test]
    fn test_all_sixteen_types_resolve() {
        let registry = ColumnTypeRegistry::new();
        assert_eq!(ColumnType::ALL.len(), 16);
        for ty in ColumnType::ALL {
            assert!(registry.contains(ty.as_str()));
            assert_eq!(ty.as_str().parse::<ColumnType>(), Ok(ty));
        }
    }

    #[test]
    fn test_unknown_type_falls_back_to_text() {
        let registry = ColumnTypeRegistry::new();
        let column = registry.col("x", "X", "sparkline", ColumnOverrides::default());
        assert_eq!(column.type_name, "text");
        assert_eq!(column.render_weight, 2);
        assert!(matches!(column.renderer(), CellRenderer::Text));
    }

    #[test]
    fn test_overrides_apply() {
        let column = col(
            "qty",
            "Qty",
            ColumnType::Number,
            ColumnOverrides {
                render_weight: Some(5),
                alignment: Some(Alignment::Left),
                searchable: Some(true),
                tooltip: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(column.render_weight, 5);
        assert_eq!(column.alignment, Alignment::Left);
        assert!(column.searchable);
        assert!(!column.tooltip);
        assert!(column.sortable);
        assert_eq!(column.sort_type, SortType::Number);
    }

    #[test]
    fn test_unsortable_types_stay_unsortable() {
        let image = col(
            "photo",
            "Photo",
            ColumnType::Image,
            ColumnOverrides {
                sortable: Some(true),
                ..Default::default()
            },
        );
        assert!(!image.sortable);
        let action = col("actions", "", ColumnType::Action, ColumnOverrides::default());
        assert!(!action.sortable);
        assert!(action.render_cell(&json!({"actions": "x"})).is_empty());
    }

    #[test]
    fn test_custom_type_registration() {
        let mut registry = ColumnTypeRegistry::new();
        registry.register(
            "banned-word",
            ColumnTypePreset {
                render_weight: 2,
                alignment: Alignment::Left,
                sortable: true,
                searchable: true,
                sort_type: SortType::String,
                renderer: CellRenderer::Custom(Rc::new(|value, _row| {
                    let text = value.map(value_text).unwrap_or_default();
                    vec![Node::Element(Element::new("mark").text(text))]
                })),
            },
        );
        let column = registry.col("word", "Word", "banned-word", ColumnOverrides::default());
        assert_eq!(column.type_name, "banned-word");
        let nodes = column.render_cell(&json!({"word": "spam"}));
        assert_eq!(html(&nodes), "<td><mark>spam</mark></td>");
        assert!(registry.names().contains(&"banned-word".to_string()));
    }

    #[test]
    fn test_missing_value_renders_empty() {
        for ty in ColumnType::ALL {
            let column = col("missing", "M", ty, ColumnOverrides::default());
            assert!(column.render_cell(&json!({})).is_empty(), "{ty} should render empty");
        }
    }

    #[test]
    fn test_renderers() {
        let row = json!({
            "flag": true,
            "count": 0,
            "price": 12.5,
            "status": "In review",
            "tags": ["a", "b"],
            "csv": "x, y",
            "name": "Soap",
            "code": "SKU-1",
            "notes": "one\ntwo"
        });

        let flag = col("flag", "F", ColumnType::Boolean, ColumnOverrides::default());
        assert!(html(&flag.render_cell(&row)).contains("badge-yes"));

        let count = col("count", "C", ColumnType::Counter, ColumnOverrides::default());
        assert!(html(&count.render_cell(&row)).contains("counter-zero"));

        let price = col("price", "P", ColumnType::Number, ColumnOverrides::default());
        assert!(matches!(&price.render_cell(&row)[..], [Node::Text(t)] if t == "12.5"));

        let status = col("status", "S", ColumnType::Status, ColumnOverrides::default());
        assert!(html(&status.render_cell(&row)).contains("status-in-review"));

        let tags = col("tags", "T", ColumnType::Chips, ColumnOverrides::default());
        assert_eq!(html(&tags.render_cell(&row)).matches("class=\"chip\"").count(), 2);
        let csv = col("csv", "T", ColumnType::Chips, ColumnOverrides::default());
        assert_eq!(html(&csv.render_cell(&row)).matches("class=\"chip\"").count(), 2);

        let product = col("name", "Product", ColumnType::Product, ColumnOverrides::default());
        let rendered = html(&product.render_cell(&row));
        assert!(rendered.contains("product-name") && rendered.contains("SKU-1"));
        assert_eq!(product.text(&row), "Soap SKU-1");

        let notes = col("notes", "N", ColumnType::Description, ColumnOverrides::default());
        assert!(html(&notes.render_cell(&row)).contains("one<br>two"));
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("Так")));
        assert!(!truthy(&json!("no")));
        assert!(!truthy(&json!(null)));
    }

    #[test]
    fn test_overrides_deserialize() {
        let overrides: ColumnOverrides =
            serde_json::from_value(json!({"sort_type": "id-number", "filterable": true})).unwrap();
        assert_eq!(overrides.sort_type, Some(SortType::IdNumber));
        assert_eq!(overrides.filterable, Some(true));
    }
}

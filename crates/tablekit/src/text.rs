//! Plain-text view of a rendered table.
//!
//! Reads the markup a [`TableCore`](crate::core::TableCore) produced and lays
//! it out as a fixed-width grid. Column widths follow the header cells'
//! `data-weight`; hidden columns are skipped.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::core::HIDDEN_CLASS;
use crate::markup::{Container, Element};

const SEPARATOR: &str = " │ ";
const RULE_JOINT: &str = "─┼─";

/// Truncates `s` to `width` display columns, ending in `…` when cut.
#[must_use]
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for grapheme in s.graphemes(true) {
        let w = grapheme.width();
        if used + w > width - 1 {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    out
}

/// Truncates, then pads with spaces to exactly `width` display columns.
#[must_use]
pub fn fit(s: &str, width: usize) -> String {
    let mut out = truncate(s, width);
    let pad = width.saturating_sub(out.width());
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

/// Splits `total` into parts proportional to `weights`, each at least 1.
#[must_use]
pub fn distribute(total: usize, weights: &[usize]) -> Vec<usize> {
    let sum: usize = weights.iter().sum::<usize>().max(1);
    let mut widths: Vec<usize> = weights
        .iter()
        .map(|w| (total * w / sum).max(1))
        .collect();
    let used: usize = widths.iter().sum();
    let len = widths.len();
    for i in 0..total.saturating_sub(used) {
        widths[i % len] += 1;
    }
    widths
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visible<'a>(parent: &'a Element, class: &'a str) -> impl Iterator<Item = &'a Element> {
    parent
        .element_children()
        .filter(move |e| e.has_class(class) && !e.has_class(HIDDEN_CLASS))
}

fn header_text(cell: &Element) -> String {
    let label = cell
        .find(&|e| e.has_class("header-label"))
        .map_or_else(|| cell.text_content(), Element::text_content);
    let marker = cell
        .find(&|e| e.has_class("sort-marker"))
        .map(Element::text_content)
        .unwrap_or_default();
    collapse(&format!("{label} {marker}"))
}

/// Renders the table in `container` as text no wider than `width`.
///
/// Returns an empty string when nothing was rendered yet.
#[must_use]
pub fn render_text(container: &Container, width: usize) -> String {
    let root = container.borrow();
    let Some(header) = root.element_children().find(|e| e.has_class("table-header")) else {
        return String::new();
    };
    let cells: Vec<&Element> = visible(header, "header-cell").collect();
    if cells.is_empty() {
        return String::new();
    }

    let weights: Vec<usize> = cells
        .iter()
        .map(|c| {
            c.get_attr("data-weight")
                .and_then(|w| w.parse().ok())
                .unwrap_or(1)
        })
        .collect();
    let gaps = SEPARATOR.width() * (cells.len() - 1);
    let widths = distribute(width.saturating_sub(gaps).max(cells.len()), &weights);

    let line = |texts: Vec<String>| {
        texts
            .iter()
            .zip(&widths)
            .map(|(text, w)| fit(text, *w))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
            .trim_end()
            .to_string()
    };

    let mut lines = vec![
        line(cells.iter().map(|c| header_text(c)).collect()),
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join(RULE_JOINT),
    ];
    for row in root.element_children().filter(|e| e.has_class("table-row")) {
        lines.push(line(
            visible(row, "cell")
                .map(|cell| collapse(&cell.text_content()))
                .collect(),
        ));
    }
    if let Some(empty) = root.element_children().find(|e| e.has_class("table-empty")) {
        lines.push(collapse(&empty.text_content()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{col, ColumnOverrides, ColumnType};
    use crate::core::{EmptyState, TableCore, TableOptions};
    use crate::state::TableState;
    use serde_json::json;
    use std::rc::Rc;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("hello", 0), "");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn test_fit_pads_by_display_width() {
        assert_eq!(fit("日本", 6), "日本  ");
        assert_eq!(fit("abc", 3), "abc");
    }

    #[test]
    fn test_distribute() {
        assert_eq!(distribute(10, &[1, 1]), vec![5, 5]);
        assert_eq!(distribute(10, &[3, 1]), vec![8, 2]);
        assert_eq!(distribute(7, &[1, 1, 1]).iter().sum::<usize>(), 7);
        assert_eq!(distribute(2, &[1, 100]), vec![1, 1]);
    }

    #[test]
    fn test_render_text() {
        let columns = vec![
            col("word", "Word", ColumnType::Text, ColumnOverrides::default()),
            col("lang", "Lang", ColumnType::Text, ColumnOverrides::default()),
        ];
        let mut state = TableState::new();
        state.set_data(vec![Rc::new(json!({"id": 1, "word": "spam", "lang": "en"}))]);
        let mut core =
            TableCore::new(Container::new("t"), columns, TableOptions::new()).unwrap();
        core.render(&mut state, None);

        let text = render_text(core.container(), 23);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Word       │ Lang");
        assert_eq!(lines[1], "───────────┼───────────");
        assert_eq!(lines[2], "spam       │ en");
    }

    #[test]
    fn test_render_text_empty_state() {
        let columns = vec![col("word", "Word", ColumnType::Text, ColumnOverrides::default())];
        let mut state: TableState<serde_json::Value> = TableState::new();
        let options = TableOptions::new().empty_state(EmptyState::new("Nothing here"));
        let mut core = TableCore::new(Container::new("t"), columns, options).unwrap();
        core.render(&mut state, None);
        assert!(render_text(core.container(), 20).ends_with("Nothing here"));
        assert_eq!(render_text(&Container::new("blank"), 20), "");
    }
}

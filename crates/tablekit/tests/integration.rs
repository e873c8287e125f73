//! Integration tests for the table engine.
//!
//! Test categories:
//! - Registry tests: column types and custom presets
//! - Core tests: containers, rendering, row clicks
//! - Plugin tests: sorting, filters and checkboxes on a bare core
//! - Managed tests: the full pipeline, search debounce, stats
//! - Charm tests: declarative pagination

#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tablekit::column::{
    Alignment, CellRenderer, ColumnOverrides, ColumnType, ColumnTypePreset, ColumnTypeRegistry,
    SortType, col,
};
use tablekit::core::{Outcome, TableCore, TableOptions};
use tablekit::event::{Rect, Size, TableEvent};
use tablekit::managed::{ManagedOptions, ManagedTable};
use tablekit::markup::{Container, Document, Element};
use tablekit::plugins::{
    BatchActionBar, CheckboxesPlugin, FilterColumnConfig, FilterConfig, FiltersPlugin,
    SortingPlugin,
};
use tablekit::state::{Selection, SortDirection, TableState};
use tablekit::value::RowId;

fn words() -> Vec<Rc<Value>> {
    vec![
        Rc::new(json!({"id": "ban-2", "word": "eggs", "lang": "en", "added": "05.03.2026"})),
        Rc::new(json!({"id": "ban-10", "word": "сало", "lang": "uk", "added": "20.01.26"})),
        Rc::new(json!({"id": "ban-1", "word": "spam", "lang": "en", "added": "2025-12-31"})),
    ]
}

fn word_columns() -> Vec<tablekit::column::Column> {
    vec![
        col("id", "ID", ColumnType::IdText, ColumnOverrides::default()),
        col("word", "Word", ColumnType::Name, ColumnOverrides::default()),
        col(
            "lang",
            "Lang",
            ColumnType::Code,
            ColumnOverrides {
                filterable: Some(true),
                ..ColumnOverrides::default()
            },
        ),
        col("added", "Added", ColumnType::Date, ColumnOverrides::default()),
    ]
}

fn ids(names: &[&str]) -> Vec<RowId> {
    names.iter().map(|n| RowId::from(*n)).collect()
}

fn click_header(core: &TableCore<Value>, column: &str) -> TableEvent {
    TableEvent::click(&core.header_cell(column).unwrap())
}

// ============================================================================
// Registry Tests
// ============================================================================

mod registry_tests {
    use super::*;

    #[test]
    fn test_custom_type_resolves_through_registry() {
        let registry = ColumnTypeRegistry::new().with_type(
            "money",
            ColumnTypePreset {
                render_weight: 2,
                alignment: Alignment::Right,
                sortable: true,
                searchable: false,
                sort_type: SortType::Number,
                renderer: CellRenderer::Number,
            },
        );
        let column = registry.col("price", "Price", "money", ColumnOverrides::default());
        assert_eq!(column.type_name, "money");
        assert_eq!(column.alignment, Alignment::Right);
        assert_eq!(column.sort_type, SortType::Number);
        assert!(!column.searchable);
    }

    #[test]
    fn test_overrides_beat_preset() {
        let column = col(
            "word",
            "Word",
            ColumnType::Name,
            ColumnOverrides {
                sortable: Some(false),
                tooltip: Some(false),
                ..ColumnOverrides::default()
            },
        );
        assert!(!column.sortable);
        assert!(!column.tooltip);
        assert_eq!(column.render_weight, 3);
    }
}

// ============================================================================
// Core Tests
// ============================================================================

mod core_tests {
    use super::*;

    #[test]
    fn test_in_document_resolves_by_id() {
        let mut doc = Document::new();
        doc.mount("words");
        let core = TableCore::<Value>::in_document(&doc, "words", word_columns(), TableOptions::new());
        assert!(core.is_ok());

        let missing =
            TableCore::<Value>::in_document(&doc, "nope", word_columns(), TableOptions::new());
        assert!(matches!(missing, Err(tablekit::Error::ContainerNotFound(_))));
    }

    #[test]
    fn test_row_click_reaches_callback() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicked);
        let options = TableOptions::new().on_row_click(move |id: &RowId, row: &Rc<Value>| {
            sink.borrow_mut().push((id.clone(), row["word"].clone()));
        });
        let mut state = TableState::new();
        state.set_data(words());
        let mut core = TableCore::new(Container::new("t"), word_columns(), options).unwrap();
        core.render(&mut state, None);

        let row = core.row_element(&RowId::from("ban-1")).unwrap();
        let outcome = core.dispatch(&mut state, &TableEvent::click(&row));
        assert_eq!(outcome, Outcome::RowClicked(RowId::from("ban-1")));
        assert_eq!(clicked.borrow()[0].1, json!("spam"));

        let gone = Element::new("div")
            .attr("data-action", "row")
            .attr("data-row-id", "ban-99");
        assert_eq!(core.dispatch(&mut state, &TableEvent::click(&gone)), Outcome::Ignored);
    }

    #[test]
    fn test_row_markup_snapshot() {
        let columns = vec![col("lang", "Lang", ColumnType::Code, ColumnOverrides::default())];
        let mut state = TableState::new();
        state.set_data(vec![Rc::new(json!({"id": "ban-1", "lang": "en"}))]);
        let mut core = TableCore::new(Container::new("t"), columns, TableOptions::new()).unwrap();
        core.render(&mut state, None);

        let html = core.row_element(&RowId::from("ban-1")).unwrap().to_html();
        insta::assert_snapshot!(html, @r#"<div class="table-row" data-action="row" data-row-id="ban-1"><div class="cell align-left" data-column="lang" style="flex: 1" title="en"><code>en</code></div><div class="row-actions"></div></div>"#);
    }
}

// ============================================================================
// Sorting Tests
// ============================================================================

mod sorting_tests {
    use super::*;

    fn sorted_core() -> (TableCore<Value>, TableState<Value>) {
        let mut state = TableState::new();
        state.set_data(words());
        let mut core =
            TableCore::new(Container::new("t"), word_columns(), TableOptions::new()).unwrap();
        core.use_plugin(&mut state, Box::new(SortingPlugin::new()));
        core.render(&mut state, None);
        (core, state)
    }

    #[test]
    fn test_three_clicks_restore_original_order() {
        let (mut core, mut state) = sorted_core();
        let original = state.filtered_data().to_vec();

        for expected in [SortDirection::Asc, SortDirection::Desc, SortDirection::None] {
            let event = click_header(&core, "word");
            assert_eq!(core.dispatch(&mut state, &event), Outcome::Sorted);
            assert_eq!(state.sort().direction, expected);
        }
        assert_eq!(state.filtered_data().len(), original.len());
        assert!(state
            .filtered_data()
            .iter()
            .zip(&original)
            .all(|(a, b)| Rc::ptr_eq(a, b)));
    }

    #[test]
    fn test_id_text_sorts_naturally() {
        let (mut core, mut state) = sorted_core();
        let event = click_header(&core, "id");
        core.dispatch(&mut state, &event);
        assert_eq!(core.rendered_ids(), ids(&["ban-1", "ban-2", "ban-10"]));

        let event = click_header(&core, "id");
        core.dispatch(&mut state, &event);
        assert_eq!(core.rendered_ids(), ids(&["ban-10", "ban-2", "ban-1"]));
        let header = core.header_cell("id").unwrap();
        assert!(header.has_class("sort-desc"));
    }

    #[test]
    fn test_mixed_date_formats_sort_chronologically() {
        let (mut core, mut state) = sorted_core();
        let event = click_header(&core, "added");
        core.dispatch(&mut state, &event);
        assert_eq!(core.rendered_ids(), ids(&["ban-1", "ban-10", "ban-2"]));
    }
}

// ============================================================================
// Filter Tests
// ============================================================================

mod filter_tests {
    use super::*;

    fn filtered_core() -> (TableCore<Value>, TableState<Value>) {
        let mut state = TableState::new();
        state.set_data(words());
        let mut core =
            TableCore::new(Container::new("t"), word_columns(), TableOptions::new()).unwrap();
        let mut config = FilterConfig::new();
        config.insert("word".into(), FilterColumnConfig::search());
        core.use_plugin(&mut state, Box::new(FiltersPlugin::new(config)));
        core.use_plugin(&mut state, Box::new(CheckboxesPlugin::new()));
        core.render(&mut state, None);
        (core, state)
    }

    fn open_panel(core: &mut TableCore<Value>, state: &mut TableState<Value>, column: &str) {
        let icon = core
            .header_cell(column)
            .and_then(|cell| cell.find(&|e| e.has_class("filter-icon")).cloned())
            .unwrap();
        let event = TableEvent::click_at(&icon, Rect::new(100, 50, 16, 16), Size::new(1280, 800));
        assert_eq!(core.dispatch(state, &event), Outcome::Handled);
    }

    fn panel_option(core: &TableCore<Value>, value: &str) -> Element {
        core.container()
            .borrow()
            .find(&|e| e.has_class("filter-option") && e.get_attr("data-value") == Some(value))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_values_filter_from_panel() {
        let (mut core, mut state) = filtered_core();
        open_panel(&mut core, &mut state, "lang");
        assert!(core.container().to_html().contains("filter-panel"));

        let option = panel_option(&core, "uk");
        let outcome = core.dispatch(&mut state, &TableEvent::click(&option));
        assert_eq!(outcome, Outcome::Filtered);
        assert_eq!(core.rendered_ids(), ids(&["ban-10"]));
        // The panel stays open across row updates.
        assert!(core.container().to_html().contains("filter-panel"));

        assert_eq!(core.dispatch(&mut state, &TableEvent::outside()), Outcome::Handled);
        assert!(!core.container().to_html().contains("filter-panel"));
    }

    #[test]
    fn test_other_table_clicks_close_panel() {
        let (mut core, mut state) = filtered_core();
        open_panel(&mut core, &mut state, "lang");
        let sort = Element::new("div")
            .attr("data-action", "sort")
            .attr("data-column", "word");
        core.dispatch(&mut state, &TableEvent::click(&sort));
        assert!(!core.container().to_html().contains("filter-panel"));

        open_panel(&mut core, &mut state, "lang");
        let checkbox = Element::new("input")
            .attr("data-action", "select-row")
            .attr("data-row-id", "ban-1");
        core.dispatch(&mut state, &TableEvent::click(&checkbox));
        assert!(!core.container().to_html().contains("filter-panel"));
        assert!(state.is_selected(&RowId::from("ban-1")));

        // Panel controls keep it open.
        open_panel(&mut core, &mut state, "lang");
        let option = panel_option(&core, "uk");
        core.dispatch(&mut state, &TableEvent::click(&option));
        assert!(core.container().to_html().contains("filter-panel"));
    }

    #[test]
    fn test_search_filter_from_input() {
        let (mut core, mut state) = filtered_core();
        let input = Element::new("input")
            .attr("data-action", "filter-search")
            .attr("data-column", "word");
        let outcome = core.dispatch(&mut state, &TableEvent::input(&input, "SP"));
        assert_eq!(outcome, Outcome::Filtered);
        assert_eq!(core.rendered_ids(), ids(&["ban-1"]));
        assert!(state.filtered_data().len() <= state.data().len());
    }

    #[test]
    fn test_selection_survives_filter() {
        let (mut core, mut state) = filtered_core();
        state.select_row(RowId::from("ban-10"));

        open_panel(&mut core, &mut state, "lang");
        let option = panel_option(&core, "en");
        core.dispatch(&mut state, &TableEvent::click(&option));
        assert!(!core.rendered_ids().contains(&RowId::from("ban-10")));
        assert!(state.is_selected(&RowId::from("ban-10")));

        let clear = Element::new("button")
            .attr("data-action", "filter-clear")
            .attr("data-column", "lang");
        core.dispatch(&mut state, &TableEvent::click(&clear));
        assert_eq!(core.rendered_ids().len(), 3);
        assert!(state.is_selected(&RowId::from("ban-10")));
        let row = core.row_element(&RowId::from("ban-10")).unwrap();
        assert!(row.has_class("selected"));
    }

    #[test]
    fn test_panel_flips_near_bottom() {
        let (mut core, mut state) = filtered_core();
        let icon = core
            .header_cell("lang")
            .and_then(|cell| cell.find(&|e| e.has_class("filter-icon")).cloned())
            .unwrap();
        let event = TableEvent::click_at(&icon, Rect::new(1270, 700, 16, 16), Size::new(1280, 800));
        core.dispatch(&mut state, &event);
        let root = core.container().borrow();
        let panel = root.find(&|e| e.has_class("filter-panel")).unwrap();
        assert!(panel.has_class("flip-up"));
        assert_eq!(panel.get_attr("style"), Some("left: 1040px; top: 416px"));
    }
}

// ============================================================================
// Checkbox Tests
// ============================================================================

mod checkbox_tests {
    use super::*;

    #[derive(Default)]
    struct Bar {
        counts: Vec<usize>,
    }

    impl BatchActionBar for Bar {
        fn selection_changed(&mut self, selection: &Selection) {
            self.counts.push(selection.len());
        }
    }

    fn ten_rows() -> Vec<Rc<Value>> {
        (1..=10)
            .map(|i| Rc::new(json!({"id": format!("ban-{i}"), "word": format!("w{i}")})))
            .collect()
    }

    fn select_all(table: &ManagedTable<Value>) -> Element {
        table
            .core()
            .container()
            .borrow()
            .find(&|e| e.has_class("select-all"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_select_all_is_page_scoped() {
        let bar = Rc::new(RefCell::new(Bar::default()));
        let options = ManagedOptions::new().page_size(5).batch_bar(bar.clone());
        let mut table = ManagedTable::new(Container::new("t"), word_columns(), options).unwrap();
        table.set_data(ten_rows());

        let outcome = table.handle(&TableEvent::click(&select_all(&table)));
        assert_eq!(outcome, Outcome::Selected);
        assert_eq!(table.state().selection().len(), 5);
        assert_eq!(select_all(&table).get_attr("data-state"), Some("checked"));
        assert_eq!(bar.borrow().counts, vec![5]);

        table.set_page(2);
        assert_eq!(select_all(&table).get_attr("data-state"), Some("unchecked"));
        table.handle(&TableEvent::click(&select_all(&table)));
        assert_eq!(table.state().selection().len(), 10);

        table.handle(&TableEvent::click(&select_all(&table)));
        assert_eq!(table.state().selection().len(), 5);
    }

    #[test]
    fn test_row_checkbox_sets_indeterminate_header() {
        let options = ManagedOptions::new().page_size(5).selection(true);
        let mut table = ManagedTable::new(Container::new("t"), word_columns(), options).unwrap();
        table.set_data(ten_rows());

        let checkbox = Element::new("input")
            .attr("data-action", "select-row")
            .attr("data-row-id", "ban-3");
        assert_eq!(table.handle(&TableEvent::click(&checkbox)), Outcome::Selected);
        assert_eq!(select_all(&table).get_attr("data-state"), Some("indeterminate"));

        let offscreen = Element::new("input")
            .attr("data-action", "select-row")
            .attr("data-row-id", "ban-9");
        assert_eq!(table.handle(&TableEvent::click(&offscreen)), Outcome::Ignored);
    }
}

// ============================================================================
// Managed Table Tests
// ============================================================================

mod managed_tests {
    use super::*;

    fn managed(options: ManagedOptions<Value>) -> ManagedTable<Value> {
        let mut table = ManagedTable::new(Container::new("words"), word_columns(), options).unwrap();
        table.set_data(words());
        table
    }

    #[test]
    fn test_three_rows_render_with_stats() {
        let table = managed(ManagedOptions::new());
        assert_eq!(table.core().rendered_ids().len(), 3);
        assert_eq!(table.stats_text(), "Показано 3 з 3");
    }

    #[test]
    fn test_sort_then_search_keeps_order() {
        let mut table = managed(ManagedOptions::new());
        let event = click_header(table.core(), "id");
        assert_eq!(table.handle(&event), Outcome::Sorted);
        table.set_search_query("en");
        assert_eq!(table.core().rendered_ids(), ids(&["ban-1", "ban-2"]));
        assert_eq!(table.stats_text(), "Показано 2 з 3");
    }

    #[test]
    fn test_pre_filter_scopes_stats_total() {
        let show_uk = Rc::new(std::cell::Cell::new(false));
        let scope = Rc::clone(&show_uk);
        let mut table = managed(ManagedOptions::new().pre_filter(move |rows: &[Rc<Value>]| {
            let lang = if scope.get() { "uk" } else { "en" };
            rows.iter().filter(|r| r["lang"] == lang).cloned().collect()
        }));
        assert_eq!(table.core().rendered_ids(), ids(&["ban-2", "ban-1"]));
        assert_eq!(table.stats_text(), "Показано 2 з 2");

        table.set_search_query("spam");
        assert_eq!(table.stats_text(), "Показано 1 з 2");

        show_uk.set(true);
        table.set_search_query("");
        assert_eq!(table.core().rendered_ids(), ids(&["ban-10"]));
        assert_eq!(table.stats_text(), "Показано 1 з 1");
        assert_eq!(table.state().data().len(), 3);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut config = FilterConfig::new();
        config.insert("lang".into(), FilterColumnConfig::values());
        let mut table = managed(ManagedOptions::new().filters(config).page_size(1));
        table.set_page(3);
        assert_eq!(table.state().page(), 3);

        let option = Element::new("label")
            .attr("data-action", "filter-value")
            .attr("data-column", "lang")
            .attr("data-value", "en");
        assert_eq!(table.handle(&TableEvent::click(&option)), Outcome::Filtered);
        assert_eq!(table.state().page(), 1);
        assert_eq!(table.stats().shown, 2);
        assert_eq!(table.core().rendered_ids(), ids(&["ban-2"]));
    }

    #[test]
    fn test_column_selector_toggles_visibility() {
        let mut table = managed(ManagedOptions::new());
        let toggle = Element::new("label")
            .attr("data-action", "toggle-column")
            .attr("data-column", "lang");
        assert_eq!(table.handle(&TableEvent::click(&toggle)), Outcome::Handled);
        assert!(!table.state().is_column_visible("lang"));
        let header = table.core().header_cell("lang").unwrap();
        assert!(header.has_class("column-hidden"));
        assert!(table
        .toolbar()
        .to_html()
        .contains(r#"data-column="lang"><input type="checkbox">"#));
    }

    #[test]
    fn test_debounced_search_cmd() {
        let mut table = managed(ManagedOptions::new());
        table.activate();
        let cmd = table.on_search_input("сало").unwrap();
        assert_eq!(cmd.delay().as_millis(), 200);
        assert!(table.update(&cmd.execute()));
        assert_eq!(table.core().rendered_ids(), ids(&["ban-10"]));
    }

    #[test]
    fn test_in_document_mounts_chrome() {
        let mut doc = Document::new();
        doc.mount("words");
        let mut table =
            ManagedTable::in_document(&mut doc, "words", word_columns(), ManagedOptions::new())
                .unwrap();
        table.set_data(words());
        assert!(doc.get("words-toolbar").unwrap().to_html().contains("table-stats"));
        assert!(doc.get("words-pager").is_some());
        assert!(ManagedTable::<Value>::in_document(
            &mut doc,
            "missing",
            word_columns(),
            ManagedOptions::new()
        )
        .is_err());
    }
}

// ============================================================================
// Charm Tests
// ============================================================================

mod charm_tests {
    use super::*;
    use tablekit::charm::{CHARM_HIDDEN, RowsChanged, discover};
    use tablekit::message::Message;

    #[test]
    fn test_discover_only_marked_containers() {
        let mut doc = Document::new();
        doc.insert(
            Element::new("ul")
                .attr("id", "log")
                .attr("data-charm", "pagination")
                .attr("data-page-size", "3")
                .children((0..7).map(|i| Element::new("li").text(i.to_string()))),
        );
        doc.mount("plain");

        let mut charms = discover(&doc);
        assert_eq!(charms.len(), 1);
        let charm = &mut charms[0];
        assert_eq!(charm.total_pages(), 3);

        charm.container().borrow_mut().children.insert(0, Element::new("li").into());
        assert!(charm.update(&Message::new(RowsChanged::new("log"))));
        assert_eq!(charm.total_pages(), 3);

        let hidden = charm
            .container()
            .borrow()
            .find_all(&|e| e.tag == "li" && e.has_class(CHARM_HIDDEN))
            .len();
        assert_eq!(hidden, 5);
    }
}

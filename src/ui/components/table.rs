use std::collections::BTreeSet;

use dioxus::prelude::*;

use crate::domain::entities::records::{Column, ListRow};
use crate::ui::format::{cell_alignment, format_cell};

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(String, &'static str)>,
}

impl TableRow {
    pub fn from_row<R: ListRow>(row: &R) -> Self {
        Self {
            id: row.row_id(),
            cells: row
                .cells()
                .iter()
                .map(|cell| (format_cell(cell), cell_alignment(cell)))
                .collect(),
        }
    }
}

pub fn table_container_style() -> &'static str {
    "flex: 1 1 auto; min-height: 0; overflow: auto; border: 1px solid #ddd; border-radius: 6px;"
}

pub fn table_header_cell_style() -> &'static str {
    "position: sticky; top: 0; z-index: 1; background: #f5f5f5; border: 1px solid #bbb; padding: 6px; text-align: left; white-space: nowrap;"
}

/// Header glyph and `aria-checked` value for the select-all control.
pub fn select_all_state(all_selected: bool, some_selected: bool) -> (&'static str, &'static str) {
    if all_selected {
        ("☑", "true")
    } else if some_selected {
        ("⊟", "mixed")
    } else {
        ("☐", "false")
    }
}

fn sort_marker(column: &Column, sort_by: &str, sort_desc: bool) -> &'static str {
    if column.key != sort_by {
        ""
    } else if sort_desc {
        " ▼"
    } else {
        " ▲"
    }
}

fn header_cursor(column: &Column) -> &'static str {
    if column.sortable {
        "pointer"
    } else {
        "default"
    }
}

#[component]
pub fn DataTable(
    columns: Vec<Column>,
    rows: Vec<TableRow>,
    sort_by: String,
    sort_desc: bool,
    selectable: bool,
    selected: BTreeSet<String>,
    all_selected: bool,
    some_selected: bool,
    on_sort: EventHandler<String>,
    on_toggle_row: EventHandler<String>,
    on_toggle_all: EventHandler<()>,
    on_open: EventHandler<String>,
) -> Element {
    let (select_all_glyph, select_all_checked) = select_all_state(all_selected, some_selected);
    let select_all_title = if all_selected {
        "Deselect all on this page"
    } else {
        "Select all on this page"
    };

    rsx! {
        div {
            style: "{table_container_style()}",
            table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                thead {
                    tr {
                        if selectable {
                            th { style: "{table_header_cell_style()} width: 32px; text-align: center;",
                                span {
                                    "role": "checkbox",
                                    "aria-checked": "{select_all_checked}",
                                    title: "{select_all_title}",
                                    style: "cursor: pointer; font-size: 16px; user-select: none;",
                                    onclick: move |event| {
                                        event.stop_propagation();
                                        on_toggle_all.call(());
                                    },
                                    "{select_all_glyph}"
                                }
                            }
                        }
                        for column in columns.iter().copied() {
                            th {
                                key: "{column.key}",
                                style: "{table_header_cell_style()} cursor: {header_cursor(&column)};",
                                onclick: move |_| {
                                    if column.sortable {
                                        on_sort.call(column.key.to_string());
                                    }
                                },
                                "{column.label}{sort_marker(&column, &sort_by, sort_desc)}"
                            }
                        }
                    }
                }
                tbody {
                    for row in rows.iter().cloned() {
                        {
                            let is_selected = selected.contains(&row.id);
                            let row_style = if is_selected {
                                "background: #eef4ff; cursor: pointer;"
                            } else {
                                "cursor: pointer;"
                            };
                            let open_id = row.id.clone();
                            let toggle_id = row.id.clone();
                            rsx! {
                                tr {
                                    key: "{row.id}",
                                    style: "{row_style}",
                                    onclick: move |_| on_open.call(open_id.clone()),
                                    if selectable {
                                        td { style: "border: 1px solid #ddd; padding: 4px; text-align: center;",
                                            onclick: move |event| event.stop_propagation(),
                                            input {
                                                r#type: "checkbox",
                                                checked: is_selected,
                                                onclick: move |event| {
                                                    event.stop_propagation();
                                                    on_toggle_row.call(toggle_id.clone());
                                                }
                                            }
                                        }
                                    }
                                    for (value, alignment) in row.cells.iter().cloned() {
                                        td { style: "border: 1px solid #ddd; padding: 4px 6px; text-align: {alignment};",
                                            "{value}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

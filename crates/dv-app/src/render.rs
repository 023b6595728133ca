//! Terminal rendering of facets and grid pages

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use dv_core::{Bounds, ColumnFacet, Facets, GridRow, GridView, GroupKey, Pagination};

/// Print one line per column describing its facet
pub fn print_facets(facets: &Facets) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Column", "Kind", "Facet"]);

    for (column, facet) in facets {
        let (kind, summary) = describe_facet(facet);
        table.add_row(vec![Cell::new(column), Cell::new(kind), Cell::new(summary)]);
    }

    println!("{table}");
}

fn describe_facet(facet: &ColumnFacet) -> (&'static str, String) {
    match facet {
        ColumnFacet::Text { non_null } => ("text", format!("{non_null} values")),
        ColumnFacet::Categorical { options, null_count } => {
            let mut listed: Vec<String> = options
                .iter()
                .map(|option| format!("{} ({})", option.value, option.count))
                .collect();
            if *null_count > 0 {
                listed.push(format!("(empty) ({null_count})"));
            }
            ("categorical", listed.join(", "))
        }
        ColumnFacet::NumericRange { bounds } => ("numeric range", describe_bounds(bounds)),
        ColumnFacet::DateRange { bounds } => ("date range", describe_bounds(bounds)),
    }
}

fn describe_bounds<T: std::fmt::Display + Copy>(bounds: &Bounds<T>) -> String {
    match bounds {
        Bounds::Bounded { min, max } => format!("{min} to {max}"),
        Bounds::Unbounded => "no values".to_string(),
    }
}

/// Print the current page of the grid, with group header lines
pub fn print_grid(view: &GridView<'_>, pagination: Pagination) {
    let page = view.page(pagination);
    let mut current_group: Option<&GroupKey> = None;
    let mut table = new_grid_table(view);

    for row in page {
        if row.group.as_ref() != current_group {
            if current_group.is_some() {
                println!("{table}");
                table = new_grid_table(view);
            }
            current_group = row.group.as_ref();
            if let Some(key) = current_group {
                let size = view
                    .groups
                    .iter()
                    .find(|group| &group.key == key)
                    .map_or(0, |group| group.rows);
                println!("{key} ({size} rows)");
            }
        }
        table.add_row(row_cells(view, row));
    }

    if !page.is_empty() {
        println!("{table}");
    }

    println!(
        "{}",
        page_label(pagination, view.page_count(pagination.page_size), view.len(), view.total_records)
    );
}

fn page_label(pagination: Pagination, page_count: usize, matching: usize, total: usize) -> String {
    format!(
        "Page {} of {} | {} matching of {} records",
        pagination.page_index.saturating_add(1),
        page_count.max(1),
        matching,
        total
    )
}

fn new_grid_table(view: &GridView<'_>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(view.columns.iter().map(|column| column.header()));
    table
}

fn row_cells(view: &GridView<'_>, row: &GridRow<'_>) -> Vec<Cell> {
    view.columns
        .iter()
        .map(|column| Cell::new(row.value(&column.id)))
        .collect()
}

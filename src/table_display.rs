use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use report_viewer::data::data_view::{DataView, SortDirection, ViewSnapshot, ViewState};
use report_viewer::data::datatable::DataValue;
use report_viewer::data::report_loader::{format_file_size, SIZE_COLUMN};

/// How cells of the rendered view should be formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    FileList,
    DataRows,
}

pub fn display_view(title: &str, view: &DataView, kind: ViewKind) {
    let snapshot = view.get_view();
    let state = view.view_state();
    println!("{}", title.bold());

    if snapshot.is_empty() {
        if snapshot.total_raw == 0 {
            println!("{}", empty_message(kind).yellow());
        } else {
            println!(
                "{}",
                "No data found. Try adjusting your filters to see more results.".yellow()
            );
        }
        println!("{}", summary_line(&snapshot, view).dim());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = snapshot
        .columns
        .iter()
        .map(|c| Cell::new(header_label(&c.key, state)).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(headers);

    for row in &snapshot.page_rows {
        let cells: Vec<String> = snapshot
            .columns
            .iter()
            .map(|c| match (kind, c.key.as_str(), row.get(&c.key)) {
                (ViewKind::FileList, SIZE_COLUMN, Some(DataValue::Integer(bytes))) => {
                    format_file_size((*bytes).max(0) as u64)
                }
                (ViewKind::FileList, "extension", Some(value)) => value.to_string().to_uppercase(),
                _ => row.text(&c.key),
            })
            .collect();
        table.add_row(cells);
    }

    println!("{table}");
    println!("{}", summary_line(&snapshot, view).green());
}

fn empty_message(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::FileList => "No files found in this report.",
        ViewKind::DataRows => "This file has no rows.",
    }
}

/// Column header with a sort arrow on the active sort column
fn header_label(key: &str, state: &ViewState) -> String {
    match (&state.sort_column, state.sort_direction) {
        (Some(column), SortDirection::Ascending) if column == key => format!("{} ▲", key),
        (Some(column), SortDirection::Descending) if column == key => format!("{} ▼", key),
        _ => key.to_string(),
    }
}

/// "Showing 51 to 100 of 240 results (filtered from 1000 total) | Page 2 of 5"
pub fn summary_line(snapshot: &ViewSnapshot, view: &DataView) -> String {
    let mut line = format!(
        "Showing {} to {} of {} results",
        snapshot.first_row_number, snapshot.last_row_number, snapshot.total_filtered
    );
    if snapshot.is_filtered() {
        line.push_str(&format!(" (filtered from {} total)", snapshot.total_raw));
    }
    line.push_str(&format!(
        " | Page {} of {} | {} rows per page",
        snapshot.current_page,
        snapshot.total_pages,
        view.view_state().page_size
    ));

    let active = view.active_filter_count();
    if active > 0 {
        line.push_str(&format!(" | {} active filters", active));
    }
    line
}

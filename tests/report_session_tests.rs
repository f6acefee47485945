use report_viewer::config::Config;
use report_viewer::data::data_exporter::DataExporter;
use report_viewer::data::datatable::{ColumnKind, DataValue};
use report_viewer::data::file_parser::parse_file;
use report_viewer::data::report_loader::{
    file_listing_dataset, list_report_files, resolve_report_path, NAME_COLUMN, SIZE_COLUMN,
};
use report_viewer::error::LoadError;
use report_viewer::{ReportSession, ViewOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn allowed() -> Vec<String> {
    vec!["csv".to_string(), "txt".to_string()]
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// base/finance/q1 with two CSVs, a text file and some noise
fn report_fixture() -> TempDir {
    let base = TempDir::new().unwrap();
    let report = base.path().join("finance").join("q1");
    fs::create_dir_all(report.join("archive")).unwrap();

    let mut sales = String::from("region,amount,closed\n");
    for i in 0..120 {
        let region = ["North", "South", "East"][i % 3];
        sales.push_str(&format!("{},{},2024-01-{:02}\n", region, i * 10, i % 28 + 1));
    }
    write(&report, "sales.csv", &sales);
    write(&report, "a_small.csv", "name,note\nwidget,\"says \"\"hi\"\"\"\n");
    write(&report, "notes.txt", "id|comment\n1|first\n2|second\n");
    write(&report, "logo.png", "not a report");
    base
}

#[test]
fn test_browse_report_and_export_filtered_rows() {
    let base = report_fixture();
    let report_dir = resolve_report_path(base.path(), "/finance/q1").unwrap();

    let files = list_report_files(&report_dir, &allowed()).unwrap();
    let mut session = ReportSession::new(ViewOptions::default());
    session.open_report(file_listing_dataset("/finance/q1", &files));

    let listing = session.file_list().get_view();
    assert_eq!(listing.total_raw, 3);
    assert_eq!(
        listing
            .page_rows
            .iter()
            .map(|r| r.text(NAME_COLUMN))
            .collect::<Vec<_>>(),
        vec!["a_small.csv", "notes.txt", "sales.csv"]
    );

    session.file_list_mut().set_sort(SIZE_COLUMN).unwrap();
    session.file_list_mut().set_sort(SIZE_COLUMN).unwrap();
    let largest = session.file_list().get_view().page_rows[0].text(NAME_COLUMN);
    assert_eq!(largest, "sales.csv");

    session.open_file(parse_file(&report_dir.join(&largest)).unwrap());
    let rows = session.data_rows_mut();
    assert_eq!(rows.source().get_column("amount").unwrap().kind, Some(ColumnKind::Number));
    assert_eq!(rows.source().get_column("closed").unwrap().kind, Some(ColumnKind::Date));

    rows.set_filter("region", "north").unwrap();
    rows.set_sort("amount").unwrap();
    rows.set_sort("amount").unwrap();
    assert_eq!(rows.total_pages(), 1);

    let out = base.path().join("exports").join("sales_filtered.csv");
    let written = DataExporter::export_to_file(&rows.get_export_set(), &out).unwrap();
    assert_eq!(written, 40);

    let exported = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines.len(), 41);
    assert_eq!(lines[0], r#""region","amount","closed""#);
    assert!(lines[1].starts_with(r#""North","1170","#));
    assert!(!exported.ends_with('\n'));

    // The listing kept its own sort while the data view was used
    assert_eq!(
        session.file_list().view_state().sort_column.as_deref(),
        Some(SIZE_COLUMN)
    );
}

#[test]
fn test_quoted_fields_survive_parse_and_export() {
    let base = report_fixture();
    let report_dir = base.path().join("finance").join("q1");

    let dataset = parse_file(&report_dir.join("a_small.csv")).unwrap();
    assert_eq!(
        dataset.get_value(0, "note"),
        Some(&DataValue::String(r#"says "hi""#.to_string()))
    );

    let mut session = ReportSession::default();
    session.open_file(dataset);
    let encoded = DataExporter::encode_export_set(&session.data_rows().get_export_set()).unwrap();
    assert_eq!(encoded, "\"name\",\"note\"\n\"widget\",\"says \"\"hi\"\"\"");
}

#[test]
fn test_text_report_uses_detected_delimiter() {
    let base = report_fixture();
    let dataset = parse_file(&base.path().join("finance/q1/notes.txt")).unwrap();

    assert_eq!(dataset.column_keys(), vec!["id", "comment"]);
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.get_value(1, "comment"), Some(&DataValue::from("second")));
}

#[test]
fn test_report_paths_cannot_escape_base() {
    let base = report_fixture();

    assert!(matches!(
        resolve_report_path(base.path(), "/finance/../../etc"),
        Err(LoadError::OutsideBase(_))
    ));
    assert_eq!(
        resolve_report_path(base.path(), "finance/./q1/../q1").unwrap(),
        base.path().join("finance").join("q1")
    );
    assert!(matches!(
        list_report_files(&base.path().join("missing"), &allowed()),
        Err(LoadError::NotADirectory(_))
    ));
}

#[test]
fn test_unsupported_file_is_rejected() {
    let base = report_fixture();
    let result = parse_file(&base.path().join("finance/q1/logo.png"));
    assert!(matches!(result, Err(LoadError::UnsupportedFormat(ext)) if ext == "png"));
}

#[test]
fn test_default_listing_only_shows_openable_files() {
    let base = report_fixture();
    let report_dir = base.path().join("finance").join("q1");
    write(&report_dir, "budget.xlsx", "spreadsheet");
    write(&report_dir, "legacy.XLS", "spreadsheet");

    let defaults = Config::default().reports.allowed_extensions;
    let files = list_report_files(&report_dir, &defaults).unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a_small.csv", "notes.txt", "sales.csv"]);
    for file in &files {
        assert!(parse_file(&report_dir.join(&file.name)).is_ok(), "{}", file.name);
    }
}

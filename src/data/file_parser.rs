//! Report file parsing: CSV and delimited text into a [`Dataset`].
//!
//! Parsing happens before anything reaches a view; a file that cannot be
//! read surfaces as a [`LoadError`] and never as a partially loaded view.

use crate::data::datatable::{ColumnDescriptor, DataRow, DataValue, Dataset};
use crate::data::datavalue_compare::parse_datetime;
use crate::error::LoadError;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Column used when a text file has no recognisable delimiter
pub const CONTENT_COLUMN: &str = "Content";

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

// Plain decimals only; "54401E143" style codes stay text
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

/// Tab, pipe, semicolon, then runs of two or more spaces
static TEXT_DELIMITERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\t").unwrap(),
        Regex::new(r"\|").unwrap(),
        Regex::new(r";").unwrap(),
        Regex::new(r" {2,}").unwrap(),
    ]
});

/// Parse a report file, choosing the reader from its extension
pub fn parse_file(path: &Path) -> Result<Dataset, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    info!("Parsing {} as {}", path.display(), extension);

    let mut dataset = match extension.as_str() {
        "csv" => parse_csv(path, &name)?,
        "txt" => parse_text(path, &name)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    dataset.infer_column_kinds();

    debug!(
        "Parsed {}: {} rows, {} columns",
        name,
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

fn parse_csv(path: &Path, name: &str) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| LoadError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| LoadError::csv(path, e))?
        .clone();

    let mut dataset = Dataset::new(name)
        .with_columns(headers.iter().map(ColumnDescriptor::new));

    for result in reader.records() {
        let record = result.map_err(|e| LoadError::csv(path, e))?;
        // Short records leave trailing cells absent; extra fields are dropped
        let row: DataRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| (header, parse_value(field)))
            .collect();
        dataset.add_row(row);
    }

    Ok(dataset)
}

fn parse_text(path: &Path, name: &str) -> Result<Dataset, LoadError> {
    let contents = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let mut lines = contents.lines();

    let Some(first_line) = lines.next() else {
        return Ok(Dataset::new(name).with_columns([ColumnDescriptor::new(CONTENT_COLUMN)]));
    };

    let Some(delimiter) = detect_delimiter(first_line) else {
        let rows = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| DataRow::new().with(CONTENT_COLUMN, line));
        return Ok(Dataset::new(name)
            .with_columns([ColumnDescriptor::new(CONTENT_COLUMN)])
            .with_rows(rows));
    };

    let headers: Vec<String> = delimiter.split(first_line).map(str::to_string).collect();
    let rows = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            headers
                .iter()
                .zip(delimiter.split(line))
                .map(|(header, field)| (header.clone(), parse_value(field)))
                .collect::<DataRow>()
        });

    Ok(Dataset::new(name)
        .with_columns(headers.iter().map(ColumnDescriptor::new))
        .with_rows(rows))
}

fn detect_delimiter(line: &str) -> Option<&'static Regex> {
    TEXT_DELIMITERS
        .iter()
        .find(|delimiter| delimiter.split(line).count() > 1)
}

/// Type a raw field: integers, plain decimals, booleans and dates are
/// recognised, everything else stays text. Blank fields become empty text.
pub fn parse_value(raw: &str) -> DataValue {
    let value = raw.trim();
    if value.is_empty() {
        return DataValue::String(String::new());
    }

    if INTEGER.is_match(value) {
        if let Ok(i) = value.parse::<i64>() {
            return DataValue::Integer(i);
        }
    }

    if DECIMAL.is_match(value) {
        if let Ok(f) = value.parse::<f64>() {
            return DataValue::Float(f);
        }
    }

    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        return DataValue::Boolean(value.eq_ignore_ascii_case("true"));
    }

    if parse_datetime(value).is_some() {
        return DataValue::DateTime(value.to_string());
    }

    DataValue::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::ColumnKind;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value(" 42 "), DataValue::Integer(42));
        assert_eq!(parse_value("-3.5"), DataValue::Float(-3.5));
        assert_eq!(parse_value("TRUE"), DataValue::Boolean(true));
        assert_eq!(parse_value("54401E143"), DataValue::String("54401E143".into()));
        assert_eq!(
            parse_value("2024-02-29"),
            DataValue::DateTime("2024-02-29".into())
        );
        assert_eq!(parse_value("   "), DataValue::String(String::new()));
        // Too large for i64 stays text
        assert_eq!(
            parse_value("99999999999999999999"),
            DataValue::String("99999999999999999999".into())
        );
    }

    #[test]
    fn test_parse_csv_keeps_header_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "sales.CSV",
            "region,amount,when\nnorth,10,2024-01-02\nsouth,2.5\n",
        );

        let dataset = parse_file(&path).unwrap();

        assert_eq!(dataset.name, "sales.CSV");
        assert_eq!(dataset.column_keys(), vec!["region", "amount", "when"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get_value(1, "amount"), Some(&DataValue::Float(2.5)));
        assert_eq!(dataset.get_value(1, "when"), None);
        assert_eq!(
            dataset.get_column("amount").and_then(|c| c.kind),
            Some(ColumnKind::Number)
        );
    }

    #[test]
    fn test_parse_pipe_delimited_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "log.txt", "id|status\n1| ok \n\n2|failed\n");

        let dataset = parse_file(&path).unwrap();

        assert_eq!(dataset.column_keys(), vec!["id", "status"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get_value(0, "status"), Some(&DataValue::from("ok")));
    }

    #[test]
    fn test_parse_plain_text_as_content_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "first line\n\nsecond line\n");

        let dataset = parse_file(&path).unwrap();

        assert_eq!(dataset.column_keys(), vec![CONTENT_COLUMN]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_empty_text_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.txt", "");

        let dataset = parse_file(&path).unwrap();
        assert_eq!(dataset.column_keys(), vec![CONTENT_COLUMN]);
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "book.xlsx", "binary");

        assert!(matches!(
            parse_file(&path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }
}

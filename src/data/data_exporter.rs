use crate::data::data_view::ExportSet;
use crate::data::datatable::{ColumnDescriptor, DataRow};
use anyhow::{anyhow, Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs;
use std::path::Path;
use tracing::info;

/// Encodes rows as comma-separated text.
///
/// Every field, header included, is wrapped in double quotes with inner
/// quotes doubled. Records are separated by `\n` with no trailing newline.
/// Null and absent values become `""`.
pub struct DataExporter;

impl DataExporter {
    /// Encode rows in the given column order
    pub fn encode(rows: &[DataRow], columns: &[ColumnDescriptor]) -> Result<String> {
        let bytes = Self::encode_bytes(rows, columns)?;
        // Every input is a Rust string, so the output is valid UTF-8
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn encode_bytes(rows: &[DataRow], columns: &[ColumnDescriptor]) -> Result<Vec<u8>> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(columns.iter().map(|c| c.key.as_str()))?;
        for row in rows {
            writer.write_record(columns.iter().map(|c| row.text(&c.key)))?;
        }

        let mut bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Could not flush CSV writer: {}", e.error()))?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        Ok(bytes)
    }

    pub fn encode_export_set(export: &ExportSet) -> Result<String> {
        Self::encode(&export.rows, &export.columns)
    }

    /// Write an export set to `path`, returning the number of data rows written
    pub fn export_to_file(export: &ExportSet, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }

        let bytes = Self::encode_bytes(&export.rows, &export.columns)?;
        fs::write(path, bytes).with_context(|| format!("Could not write {}", path.display()))?;

        info!(
            "Exported {} rows to CSV file: {}",
            export.rows.len(),
            path.display()
        );
        Ok(export.rows.len())
    }

    /// `report.csv` becomes `report_filtered.csv`
    pub fn default_file_name(source_name: &str) -> String {
        let stem = Path::new(source_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("export");
        format!("{}_filtered.csv", stem)
    }
}

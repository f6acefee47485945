use crate::data::datatable::{ColumnDescriptor, ColumnKind, DataRow, DataValue, Dataset};
use crate::error::LoadError;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub const NAME_COLUMN: &str = "name";
pub const SIZE_COLUMN: &str = "size";
pub const LAST_MODIFIED_COLUMN: &str = "lastModified";
pub const EXTENSION_COLUMN: &str = "extension";

/// Metadata for one file inside a report directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub last_modified: NaiveDateTime,
    pub extension: String,
}

impl FileInfo {
    pub fn to_row(&self) -> DataRow {
        DataRow::new()
            .with(NAME_COLUMN, self.name.as_str())
            .with(SIZE_COLUMN, self.size)
            .with(
                LAST_MODIFIED_COLUMN,
                DataValue::DateTime(self.last_modified.format("%Y-%m-%dT%H:%M:%S").to_string()),
            )
            .with(EXTENSION_COLUMN, self.extension.as_str())
    }
}

/// Resolve `report` (e.g. `/finance/q1`) below `base`. Lexical only: the
/// result never climbs above `base`, whether or not it exists.
pub fn resolve_report_path(base: &Path, report: &str) -> Result<PathBuf, LoadError> {
    let mut resolved = base.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(report.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                resolved.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                warn!("Rejected report path outside base: {}", report);
                return Err(LoadError::OutsideBase(PathBuf::from(report)));
            }
        }
    }

    Ok(resolved)
}

/// Regular files in `dir` whose extension is allowed, sorted by name
pub fn list_report_files(
    dir: &Path,
    allowed_extensions: &[String],
) -> Result<Vec<FileInfo>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;
    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io(dir, e))?;
        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| LoadError::io(&path, e))?;
        if !metadata.is_file() {
            continue;
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            continue;
        }

        let modified = metadata.modified().map_err(|e| LoadError::io(&path, e))?;
        files.push(FileInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            last_modified: DateTime::<Local>::from(modified).naive_local(),
            extension,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Found {} report files in {}", files.len(), dir.display());
    Ok(files)
}

/// The dataset behind the file-list view
pub fn file_listing_dataset(name: impl Into<String>, files: &[FileInfo]) -> Dataset {
    Dataset::new(name)
        .with_columns([
            ColumnDescriptor::new(NAME_COLUMN).with_kind(ColumnKind::Text),
            ColumnDescriptor::new(SIZE_COLUMN).with_kind(ColumnKind::Number),
            ColumnDescriptor::new(LAST_MODIFIED_COLUMN).with_kind(ColumnKind::Date),
            ColumnDescriptor::new(EXTENSION_COLUMN).with_kind(ColumnKind::Text),
        ])
        .with_rows(files.iter().map(FileInfo::to_row))
}

/// Human readable size, e.g. `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 10.0).round() / 10.0;
    format!("{} {}", rounded, UNITS[unit])
}

//! Report/file selection driving the two views of a session.
//!
//! A session has one view for the file listing of the selected report and
//! one for the rows of the selected file. They are separate [`DataView`]
//! values, so filtering or paging one never touches the other.

use crate::data::data_view::{DataView, ViewOptions};
use crate::data::datatable::Dataset;
use std::sync::Arc;
use tracing::info;

pub struct ReportSession {
    file_list: DataView,
    data_rows: DataView,
    report: Option<String>,
    file: Option<String>,
}

impl ReportSession {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            file_list: DataView::empty(options),
            data_rows: DataView::empty(options),
            report: None,
            file: None,
        }
    }

    /// Select a report: load its listing and clear any open file
    pub fn open_report(&mut self, listing: Dataset) {
        info!("Opening report '{}'", listing.name);
        self.report = Some(listing.name.clone());
        self.file_list.load(Arc::new(listing));
        self.close_file();
    }

    /// Select a file inside the current report. The file-list view keeps
    /// its filters, sort and page.
    pub fn open_file(&mut self, rows: Dataset) {
        info!("Opening file '{}'", rows.name);
        self.file = Some(rows.name.clone());
        self.data_rows.load(Arc::new(rows));
    }

    pub fn close_file(&mut self) {
        self.file = None;
        self.data_rows.clear();
    }

    /// Navigate away from the report entirely
    pub fn close_report(&mut self) {
        self.report = None;
        self.file_list.clear();
        self.close_file();
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn file_list(&self) -> &DataView {
        &self.file_list
    }

    pub fn file_list_mut(&mut self) -> &mut DataView {
        &mut self.file_list
    }

    pub fn data_rows(&self) -> &DataView {
        &self.data_rows
    }

    pub fn data_rows_mut(&mut self) -> &mut DataView {
        &mut self.data_rows
    }
}

impl Default for ReportSession {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::{ColumnDescriptor, DataRow};

    fn dataset(name: &str, rows: usize) -> Dataset {
        Dataset::new(name)
            .with_columns([ColumnDescriptor::new("name")])
            .with_rows((0..rows).map(|i| DataRow::new().with("name", format!("{}-{}", name, i))))
    }

    #[test]
    fn test_opening_file_keeps_file_list_state() {
        let mut session = ReportSession::default();
        session.open_report(dataset("report", 120));
        session.file_list_mut().set_filter("name", "report").unwrap();
        session.file_list_mut().go_to_page(2);
        let before = session.file_list().view_state().clone();

        session.open_file(dataset("a.csv", 10));
        session.data_rows_mut().set_sort("name").unwrap();
        session.open_file(dataset("b.csv", 10));

        assert_eq!(session.file_list().view_state(), &before);
        assert_eq!(session.data_rows().view_state().sort_column, None);
        assert_eq!(session.file(), Some("b.csv"));
    }

    #[test]
    fn test_opening_report_clears_data_rows() {
        let mut session = ReportSession::default();
        session.open_report(dataset("first", 3));
        session.open_file(dataset("a.csv", 10));
        session.data_rows_mut().set_filter("name", "a").unwrap();

        session.open_report(dataset("second", 3));

        assert_eq!(session.file(), None);
        assert_eq!(session.data_rows().get_view().total_raw, 0);
        assert!(session.data_rows().view_state().filters.is_empty());
        assert_eq!(session.report(), Some("second"));
    }

    #[test]
    fn test_close_report_clears_everything() {
        let mut session = ReportSession::default();
        session.open_report(dataset("first", 3));
        session.open_file(dataset("a.csv", 2));

        session.close_report();

        assert_eq!(session.report(), None);
        assert_eq!(session.file_list().get_view().total_raw, 0);
        assert_eq!(session.data_rows().get_view().total_raw, 0);
    }
}

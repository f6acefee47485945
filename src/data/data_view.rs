use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::data::column_filter::build_predicate;
use crate::data::datatable::{ColumnDescriptor, DataRow, Dataset};
use crate::data::datavalue_compare::{compare_optional_values, resolve_sort_kind};
use crate::error::ViewError;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Rows per page, or every filtered row on a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    Rows(NonZeroUsize),
    All,
}

impl PageSize {
    pub fn rows(count: usize) -> Result<Self, ViewError> {
        NonZeroUsize::new(count)
            .map(PageSize::Rows)
            .ok_or_else(|| ViewError::InvalidPageSize(count.to_string()))
    }

    /// `None` for [`PageSize::All`]
    pub fn limit(&self) -> Option<usize> {
        match self {
            PageSize::Rows(n) => Some(n.get()),
            PageSize::All => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Rows(NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN))
    }
}

impl FromStr for PageSize {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        s.parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .map(PageSize::Rows)
            .ok_or_else(|| ViewError::InvalidPageSize(s.to_string()))
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Rows(n) => write!(f, "{}", n),
            PageSize::All => write!(f, "ALL"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Filter, sort and page configuration of one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filters: BTreeMap<String, String>,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub page_size: PageSize,
    /// 1-indexed
    pub current_page: usize,
}

impl ViewState {
    fn new(page_size: PageSize) -> Self {
        Self {
            filters: BTreeMap::new(),
            sort_column: None,
            sort_direction: SortDirection::Ascending,
            page_size,
            current_page: 1,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Page size restored by every load
    pub default_page_size: PageSize,
    /// Reject filter/sort requests naming columns the dataset lacks
    pub strict_columns: bool,
}

/// What a renderer needs to draw the current page
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub columns: Vec<ColumnDescriptor>,
    pub page_rows: Vec<DataRow>,
    pub total_filtered: usize,
    pub total_raw: usize,
    pub current_page: usize,
    pub total_pages: usize,
    /// 1-based position of the first row on the page, 0 when the page is empty
    pub first_row_number: usize,
    pub last_row_number: usize,
}

impl ViewSnapshot {
    pub fn is_empty(&self) -> bool {
        self.page_rows.is_empty()
    }

    pub fn is_filtered(&self) -> bool {
        self.total_filtered != self.total_raw
    }
}

/// Filtered and sorted rows without pagination, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSet {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<DataRow>,
}

/// A filtered, sorted, paginated view over one dataset.
///
/// The view owns its [`ViewState`]; two views never share one. The filtered
/// row set is always rebuilt from the dataset rather than patched, so the
/// result of any sequence of operations only depends on the dataset and the
/// final state.
#[derive(Debug, Clone)]
pub struct DataView {
    /// The underlying immutable data source
    source: Arc<Dataset>,

    options: ViewOptions,
    state: ViewState,

    /// Indices into `source.rows` surviving the filters, in display order
    visible_rows: Vec<usize>,
}

impl DataView {
    /// Create a view over a dataset with default options
    pub fn new(source: Arc<Dataset>) -> Self {
        Self::with_options(source, ViewOptions::default())
    }

    pub fn with_options(source: Arc<Dataset>, options: ViewOptions) -> Self {
        let mut view = Self {
            source,
            options,
            state: ViewState::new(options.default_page_size),
            visible_rows: Vec::new(),
        };
        view.recompute();
        view
    }

    /// A view with nothing loaded yet
    pub fn empty(options: ViewOptions) -> Self {
        Self::with_options(Arc::new(Dataset::default()), options)
    }

    /// Replace the dataset and reset every piece of view state
    pub fn load(&mut self, source: Arc<Dataset>) {
        debug!(
            "Loading dataset '{}' ({} rows, {} columns)",
            source.name,
            source.row_count(),
            source.column_count()
        );
        self.source = source;
        self.reset();
    }

    /// Drop the dataset, leaving an empty view
    pub fn clear(&mut self) {
        self.load(Arc::new(Dataset::default()));
    }

    /// Back to default filters, sort and page without changing the dataset
    pub fn reset(&mut self) {
        self.state = ViewState::new(self.options.default_page_size);
        self.recompute();
    }

    /// Set or clear (empty/whitespace text) one column's filter. Returns to page 1.
    pub fn set_filter(&mut self, column: &str, text: &str) -> Result<(), ViewError> {
        self.check_column("set_filter", column)?;

        if text.trim().is_empty() {
            self.state.filters.remove(column);
        } else {
            self.state
                .filters
                .insert(column.to_string(), text.to_string());
        }
        self.state.current_page = 1;
        self.recompute();

        debug!(
            "Filter {}='{}': {} of {} rows",
            column,
            text,
            self.visible_rows.len(),
            self.source.row_count()
        );
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.current_page = 1;
        self.recompute();
    }

    /// Sort by `column`, toggling direction when it is already the sort
    /// column. Keeps the current page.
    pub fn set_sort(&mut self, column: &str) -> Result<(), ViewError> {
        self.check_column("set_sort", column)?;

        if self.state.sort_column.as_deref() == Some(column) {
            self.state.sort_direction = self.state.sort_direction.toggle();
        } else {
            self.state.sort_column = Some(column.to_string());
            self.state.sort_direction = SortDirection::Ascending;
        }
        self.recompute();

        debug!("Sort by {} {:?}", column, self.state.sort_direction);
        Ok(())
    }

    /// Change the page size. Returns to page 1.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.state.page_size = page_size;
        self.state.current_page = 1;
        self.clamp_current_page();
    }

    /// Move to page `page`, clamped into `1..=total_pages`
    pub fn go_to_page(&mut self, page: i64) {
        let last = self.total_pages() as i64;
        self.state.current_page = page.clamp(1, last) as usize;
        trace!("Page {} of {}", self.state.current_page, last);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.state.current_page as i64 + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.state.current_page as i64 - 1);
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.total_pages() as i64);
    }

    /// The current page plus counts
    pub fn get_view(&self) -> ViewSnapshot {
        let total_filtered = self.visible_rows.len();
        let (start, end) = self.page_bounds();

        let page_rows: Vec<DataRow> = self.visible_rows[start..end]
            .iter()
            .map(|&idx| self.source.rows[idx].clone())
            .collect();

        let (first_row_number, last_row_number) = if page_rows.is_empty() {
            (0, 0)
        } else {
            (start + 1, end)
        };

        ViewSnapshot {
            columns: self.source.columns.clone(),
            page_rows,
            total_filtered,
            total_raw: self.source.row_count(),
            current_page: self.state.current_page,
            total_pages: self.total_pages(),
            first_row_number,
            last_row_number,
        }
    }

    /// Every filtered row in sorted order, for export
    pub fn get_export_set(&self) -> ExportSet {
        ExportSet {
            columns: self.source.columns.clone(),
            rows: self
                .visible_rows
                .iter()
                .map(|&idx| self.source.rows[idx].clone())
                .collect(),
        }
    }

    pub fn total_pages(&self) -> usize {
        match self.state.page_size.limit() {
            Some(limit) if !self.visible_rows.is_empty() => self.visible_rows.len().div_ceil(limit),
            _ => 1,
        }
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    pub fn source(&self) -> &Dataset {
        &self.source
    }

    pub fn filtered_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// Filters that constrain rows: non-blank and naming a loaded column
    pub fn active_filter_count(&self) -> usize {
        self.active_filters().count()
    }

    fn active_filters(&self) -> impl Iterator<Item = (&String, &String)> {
        self.state
            .filters
            .iter()
            .filter(|(column, text)| self.source.has_column(column) && !text.trim().is_empty())
    }

    fn check_column(&self, operation: &'static str, column: &str) -> Result<(), ViewError> {
        if self.options.strict_columns && !self.source.has_column(column) {
            return Err(ViewError::UnknownColumn {
                operation,
                column: column.to_string(),
            });
        }
        Ok(())
    }

    /// Rebuild the filtered set from the dataset, sort it, then clamp the page
    fn recompute(&mut self) {
        // Filters on columns the dataset lacks are kept in state but inert
        let predicate = build_predicate(self.active_filters());

        self.visible_rows = if predicate.is_empty() {
            (0..self.source.row_count()).collect()
        } else {
            self.source
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| predicate.matches(row))
                .map(|(idx, _)| idx)
                .collect()
        };

        self.sort_visible_rows();
        self.clamp_current_page();
    }

    /// Stable sort, so ties keep their filtered order in both directions
    fn sort_visible_rows(&mut self) {
        let Some(column) = self.state.sort_column.as_deref() else {
            return;
        };
        let ascending = self.state.sort_direction == SortDirection::Ascending;
        let rows = &self.source.rows;

        // One ordering for the whole column, so the comparator is total
        let kind = self
            .source
            .get_column(column)
            .and_then(|c| c.kind)
            .unwrap_or_else(|| {
                resolve_sort_kind(
                    self.visible_rows
                        .iter()
                        .filter_map(|&idx| rows[idx].get(column)),
                )
            });
        trace!("Sorting {} as {:?}", column, kind);

        self.visible_rows.sort_by(|&a, &b| {
            let cmp =
                compare_optional_values(rows[a].get(column), rows[b].get(column), Some(kind));
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });
    }

    fn clamp_current_page(&mut self) {
        self.state.current_page = self.state.current_page.clamp(1, self.total_pages());
    }

    fn page_bounds(&self) -> (usize, usize) {
        let len = self.visible_rows.len();
        match self.state.page_size.limit() {
            Some(limit) => {
                let start = ((self.state.current_page - 1) * limit).min(len);
                (start, (start + limit).min(len))
            }
            None => (0, len),
        }
    }
}

pub mod config;
pub mod data;
pub mod error;
pub mod session;
pub mod utils;

pub use data::data_exporter::DataExporter;
pub use data::data_view::{
    DataView, ExportSet, PageSize, SortDirection, ViewOptions, ViewSnapshot, ViewState,
};
pub use data::datatable::{ColumnDescriptor, ColumnKind, DataRow, DataValue, Dataset};
pub use error::{LoadError, ViewError};
pub use session::ReportSession;

//! Data layer: the value model, the view engine and its collaborators
//!
//! Loaders turn report directories and files into [`datatable::Dataset`]s;
//! a [`data_view::DataView`] derives filtered, sorted pages from one; the
//! exporter encodes a view's export set.

// Core data modules
pub mod column_filter;
pub mod data_view;
pub mod datatable;
pub mod datavalue_compare;

// Export
pub mod data_exporter;

// Loaders
pub mod file_parser;
pub mod report_loader;

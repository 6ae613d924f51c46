//! Excel import/export façade
//!
//! This module connects the sheet model to real workbooks:
//! - Export: records → `SheetModel` → xlsx via rust_xlsxwriter
//! - Import: xlsx/xls/ods via calamine → `RawSheet` → records

pub mod asynchronous;
mod exporter;
mod importer;
mod options;
mod reader;
mod writer;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
pub use options::{ColumnWidth, ExportOptions, ImportOptions, SpreadsheetFormat};
pub use writer::display_width;

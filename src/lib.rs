//! Tabula - typed records ↔ spreadsheets, with formula columns
//!
//! This library maps collections of records (or dynamic key/value rows) to
//! Excel worksheets and back, and compiles a small expression language into
//! A1-style Excel formulas.
//!
//! # Features
//!
//! - Static schemas: declared titles, explicit and implicit column order, inheritance
//! - Per-type import coercion (bilingual booleans, `2024年3月` dates, enums, URLs)
//! - Formula columns compiled per row (`A2*B2`, `EDATE(...)`, `SUM(A1:B2)`)
//! - xlsx export, xlsx/xls/ods import, multi-sheet workbooks
//! - Async and streaming import with cooperative cancellation
//!
//! # Example
//!
//! ```no_run
//! use tabula::excel::{ExcelExporter, ExportOptions};
//! use tabula::formula::ast::{col, lambda};
//! use tabula::model::FormulaColumn;
//! # fn records() -> Vec<MyRecord> { Vec::new() }
//! # #[derive(Default)] struct MyRecord;
//! # impl tabula::SheetRecord for MyRecord {
//! #     fn schema() -> &'static tabula::schema::SheetSchema { unimplemented!() }
//! #     fn field_value(&self, _: &str) -> tabula::CellValue { tabula::CellValue::Empty }
//! #     fn set_field(&mut self, _: &str, _: tabula::CellValue) -> tabula::TabulaResult<()> { Ok(()) }
//! # }
//!
//! let options = ExportOptions::new()
//!     .formula_column(FormulaColumn::new("Total", lambda("c", col("Price") * col("Qty"))));
//! let bytes = ExcelExporter::new(options).export_bytes(&records())?;
//! std::fs::write("out.xlsx", bytes)?;
//! # Ok::<(), tabula::TabulaError>(())
//! ```

pub mod address;
pub mod cancel;
pub mod cli;
pub mod coercion;
pub mod config;
pub mod error;
pub mod excel;
pub mod formula;
pub mod model;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use error::{ConversionError, TabulaError, TabulaResult};
pub use schema::{FromCellValue, SheetRecord};
pub use types::{CellValue, FieldKind, FieldType, RawCell};

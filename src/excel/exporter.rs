//! Excel exporter: records → workbook bytes or file

use super::options::ExportOptions;
use super::writer;
use crate::cancel::CancellationToken;
use crate::error::TabulaResult;
use crate::model::{DataTable, DynamicRow, SheetModel};
use crate::schema::SheetRecord;
use std::path::Path;
use tracing::info;

/// Excel exporter
///
/// Holds the export options; every call builds a fresh sheet model.
#[derive(Debug, Clone, Default)]
pub struct ExcelExporter {
    options: ExportOptions,
    cancel: Option<CancellationToken>,
}

impl ExcelExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Check `token` between rows; a cancelled export fails with `Cancelled`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Sheet model for `records` without writing anything.
    pub fn model<T: SheetRecord>(&self, records: &[T]) -> TabulaResult<SheetModel> {
        self.options
            .model_builder(self.cancel.as_ref())
            .build_records(records)
    }

    /// Sheet model for records that may contain gaps; `None` entries are skipped.
    pub fn model_sparse<T: SheetRecord>(&self, records: &[Option<T>]) -> TabulaResult<SheetModel> {
        self.options
            .model_builder(self.cancel.as_ref())
            .build(records.iter().map(Option::as_ref))
    }

    pub fn export_bytes<T: SheetRecord>(&self, records: &[T]) -> TabulaResult<Vec<u8>> {
        let model = self.model(records)?;
        writer::to_bytes(std::slice::from_ref(&model), &self.options)
    }

    pub fn export_file<T: SheetRecord>(&self, records: &[T], path: &Path) -> TabulaResult<()> {
        let model = self.model(records)?;
        writer::to_file(std::slice::from_ref(&model), &self.options, path)?;
        info!(path = %path.display(), rows = model.row_count(), "exported workbook");
        Ok(())
    }

    /// Export key/value rows; `title` names the sheet unless options override it.
    pub fn export_dynamic(&self, title: &str, rows: &[DynamicRow]) -> TabulaResult<Vec<u8>> {
        let model = self
            .options
            .model_builder(self.cancel.as_ref())
            .build_dynamic(title, rows)?;
        writer::to_bytes(std::slice::from_ref(&model), &self.options)
    }

    pub fn export_table(&self, table: &DataTable) -> TabulaResult<Vec<u8>> {
        let model = self
            .options
            .model_builder(self.cancel.as_ref())
            .build_table(table)?;
        writer::to_bytes(std::slice::from_ref(&model), &self.options)
    }

    /// Write several prepared sheets into one workbook. Titles must be unique.
    pub fn export_workbook(&self, sheets: &[SheetModel]) -> TabulaResult<Vec<u8>> {
        writer::to_bytes(sheets, &self.options)
    }

    pub fn export_workbook_file(&self, sheets: &[SheetModel], path: &Path) -> TabulaResult<()> {
        writer::to_file(sheets, &self.options, path)?;
        info!(path = %path.display(), sheets = sheets.len(), "exported workbook");
        Ok(())
    }
}

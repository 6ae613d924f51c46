//! Excel importer: workbook bytes or file → records

use super::options::ImportOptions;
use super::reader::WorkbookReader;
use crate::cancel::CancellationToken;
use crate::error::{TabulaError, TabulaResult};
use crate::model::{DynamicRow, RawSheet};
use crate::schema::SheetRecord;
use std::path::Path;
use tracing::warn;

/// Excel importer
///
/// `import_*` are lenient: bytes or files that cannot be opened yield an
/// empty result (the cause is logged). `try_import_*` return the
/// `InvalidWorkbook` / `Io` error instead. Both report a missing sheet as
/// `SheetNotFound` and conversion failures as `Conversion`.
#[derive(Debug, Clone, Default)]
pub struct ExcelImporter {
    options: ImportOptions,
    cancel: Option<CancellationToken>,
}

impl ExcelImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn import_bytes<T: SheetRecord>(&self, bytes: &[u8]) -> TabulaResult<Vec<T>> {
        lenient(self.try_import_bytes(bytes))
    }

    pub fn import_file<T: SheetRecord>(&self, path: &Path) -> TabulaResult<Vec<T>> {
        lenient(self.try_import_file(path))
    }

    pub fn try_import_bytes<T: SheetRecord>(&self, bytes: &[u8]) -> TabulaResult<Vec<T>> {
        let sheet = self.read_bytes(bytes)?;
        self.parse(&sheet)
    }

    pub fn try_import_file<T: SheetRecord>(&self, path: &Path) -> TabulaResult<Vec<T>> {
        let sheet = self.read_file(path)?;
        self.parse(&sheet)
    }

    /// Rows as raw values keyed by header text.
    pub fn import_dynamic(&self, bytes: &[u8]) -> TabulaResult<Vec<DynamicRow>> {
        let sheet = self.read_bytes(bytes)?;
        self.options
            .model_parser(self.cancel.as_ref())
            .parse_dynamic(&sheet)
    }

    pub fn import_dynamic_file(&self, path: &Path) -> TabulaResult<Vec<DynamicRow>> {
        let sheet = self.read_file(path)?;
        self.options
            .model_parser(self.cancel.as_ref())
            .parse_dynamic(&sheet)
    }

    /// Names of all sheets in the workbook, in workbook order.
    pub fn sheet_names(bytes: &[u8]) -> TabulaResult<Vec<String>> {
        Ok(WorkbookReader::from_bytes(bytes.to_vec())?.sheet_names())
    }

    pub fn sheet_names_in_file(path: &Path) -> TabulaResult<Vec<String>> {
        Ok(WorkbookReader::open(path)?.sheet_names())
    }

    /// Read the configured sheet without parsing it.
    pub fn read_bytes(&self, bytes: &[u8]) -> TabulaResult<RawSheet> {
        WorkbookReader::from_bytes(bytes.to_vec())?.read_sheet(self.options.sheet_name.as_deref())
    }

    pub fn read_file(&self, path: &Path) -> TabulaResult<RawSheet> {
        WorkbookReader::open(path)?.read_sheet(self.options.sheet_name.as_deref())
    }

    pub(crate) fn parse<T: SheetRecord>(&self, sheet: &RawSheet) -> TabulaResult<Vec<T>> {
        self.options
            .model_parser(self.cancel.as_ref())
            .parse(sheet)
    }
}

fn lenient<T>(result: TabulaResult<Vec<T>>) -> TabulaResult<Vec<T>> {
    match result {
        Err(TabulaError::InvalidWorkbook(cause)) => {
            warn!(%cause, "unreadable workbook, importing nothing");
            Ok(Vec::new())
        }
        Err(TabulaError::Io(cause)) => {
            warn!(%cause, "unreadable workbook file, importing nothing");
            Ok(Vec::new())
        }
        other => other,
    }
}

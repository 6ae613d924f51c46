//! Workbook bytes/files → RawSheet through calamine

use crate::error::{TabulaError, TabulaResult};
use crate::model::RawSheet;
use crate::types::RawCell;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// An opened workbook of any format calamine recognises (xlsx, xlsm, xlsb, xls, ods).
pub(crate) struct WorkbookReader<RS: Read + Seek> {
    sheets: Sheets<RS>,
}

impl WorkbookReader<Cursor<Vec<u8>>> {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> TabulaResult<Self> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| TabulaError::InvalidWorkbook(e.to_string()))?;
        Ok(Self { sheets })
    }
}

impl WorkbookReader<std::io::BufReader<std::fs::File>> {
    pub(crate) fn open(path: &Path) -> TabulaResult<Self> {
        if !path.exists() {
            return Err(TabulaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let sheets = open_workbook_auto(path).map_err(|e| {
            TabulaError::InvalidWorkbook(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self { sheets })
    }
}

impl<RS: Read + Seek> WorkbookReader<RS> {
    pub(crate) fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Read the named sheet, or the first one when `name` is `None`.
    pub(crate) fn read_sheet(&mut self, name: Option<&str>) -> TabulaResult<RawSheet> {
        let available = self.sheet_names();
        let sheet = match name {
            Some(wanted) => available
                .iter()
                .find(|s| s.as_str() == wanted)
                .cloned()
                .ok_or_else(|| TabulaError::SheetNotFound {
                    sheet: wanted.to_string(),
                    available: available.join(", "),
                })?,
            None => match available.first() {
                Some(first) => first.clone(),
                None => return Ok(RawSheet::new(String::new(), Vec::new())),
            },
        };

        let range = self
            .sheets
            .worksheet_range(&sheet)
            .map_err(|e| TabulaError::InvalidWorkbook(format!("sheet '{}': {}", sheet, e)))?;

        let rows = range_to_rows(&range);
        debug!(sheet = %sheet, rows = rows.len(), "read worksheet");
        Ok(RawSheet::new(sheet, rows))
    }
}

/// Grid anchored at A1 so column positions match the physical sheet even when
/// leading rows or columns are empty.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<RawCell>> {
    let Some((last_row, last_col)) = range.end() else {
        return Vec::new();
    };
    (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).map(to_raw).unwrap_or_default())
                .collect()
        })
        .collect()
}

fn to_raw(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Blank,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Error(e.to_string()),
    }
}

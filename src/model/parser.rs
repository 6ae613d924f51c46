use super::{ColumnRemap, DynamicRow, RawSheet};
use crate::cancel::CancellationToken;
use crate::coercion::{cell_to_value, Coerced};
use crate::error::{TabulaError, TabulaResult};
use crate::schema::{MemberMapping, SheetRecord};
use crate::types::{CellValue, RawCell};
use tracing::debug;

/// Turns a `RawSheet` back into records.
///
/// The first row after `skip_rows` is the header row. Each declared column
/// binds to the physical column whose header text equals the column title
/// (after remapping). Unmatched physical columns are ignored; declared
/// columns without a physical match keep their default value.
///
/// A data row whose first cell is blank is dropped, wherever it appears.
#[derive(Default, Clone, Copy)]
pub struct ModelParser<'a> {
    skip_rows: usize,
    remap: Option<&'a ColumnRemap>,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> ModelParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leading banner rows above the header row.
    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn remap(mut self, remap: &'a ColumnRemap) -> Self {
        self.remap = Some(remap);
        self
    }

    pub fn cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Parse every data row of `sheet` into a `T`.
    pub fn parse<T: SheetRecord>(&self, sheet: &RawSheet) -> TabulaResult<Vec<T>> {
        let mut records = Vec::new();
        self.parse_each(sheet, |record: T| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    /// Parse rows one at a time, handing each record to `sink` in sheet order.
    ///
    /// Returns the number of records produced. An error from `sink` stops
    /// parsing and is returned as is.
    pub fn parse_each<T, F>(&self, sheet: &RawSheet, mut sink: F) -> TabulaResult<usize>
    where
        T: SheetRecord,
        F: FnMut(T) -> TabulaResult<()>,
    {
        let Some(header) = sheet.rows.get(self.skip_rows) else {
            debug!(sheet = %sheet.name, "no header row, nothing to import");
            return Ok(0);
        };

        let bindings = self.bind_columns(T::schema().discover_columns(), header);
        debug!(
            sheet = %sheet.name,
            bound = bindings.len(),
            "importing sheet"
        );

        let mut count = 0;
        for row in self.data_rows(sheet) {
            self.check_cancelled()?;

            let mut record = T::default();
            for (member, position) in &bindings {
                let raw = row.get(*position).unwrap_or(&RawCell::Blank);
                let coerced = cell_to_value(raw, &member.field.field_type)
                    .map_err(|e| e.in_column(member.title.clone()))?;
                if let Coerced::Value(value) = coerced {
                    record
                        .set_field(&member.field.name, value)
                        .map_err(|e| match e {
                            TabulaError::Conversion(c) if c.column.is_none() => {
                                TabulaError::Conversion(c.in_column(member.title.clone()))
                            }
                            other => other,
                        })?;
                }
            }

            sink(record)?;
            count += 1;
        }

        Ok(count)
    }

    /// Parse rows without a record type: raw values keyed by header text.
    ///
    /// Columns with a blank header are dropped.
    pub fn parse_dynamic(&self, sheet: &RawSheet) -> TabulaResult<Vec<DynamicRow>> {
        let Some(header) = sheet.rows.get(self.skip_rows) else {
            return Ok(Vec::new());
        };

        let keys: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_blank())
            .map(|(i, cell)| (i, cell.text().trim().to_string()))
            .collect();

        let mut rows = Vec::new();
        for row in self.data_rows(sheet) {
            self.check_cancelled()?;
            let values = keys
                .iter()
                .map(|(i, key)| (key.clone(), raw_to_value(row.get(*i))))
                .collect();
            rows.push(values);
        }
        Ok(rows)
    }

    fn check_cancelled(&self) -> TabulaResult<()> {
        match self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    fn data_rows<'s>(&self, sheet: &'s RawSheet) -> impl Iterator<Item = &'s Vec<RawCell>> {
        sheet
            .rows
            .iter()
            .skip(self.skip_rows + 1)
            .filter(|row| row.first().is_some_and(|cell| !cell.is_blank()))
    }

    fn bind_columns(
        &self,
        members: Vec<MemberMapping>,
        header: &[RawCell],
    ) -> Vec<(MemberMapping, usize)> {
        let headers: Vec<String> = header.iter().map(|c| c.text()).collect();
        members
            .into_iter()
            .filter_map(|member| {
                let wanted = match self.remap {
                    Some(remap) => remap(&member.title, &member.field.field_type.kind),
                    None => member.title.clone(),
                };
                match headers.iter().position(|h| *h == wanted) {
                    Some(position) => Some((member, position)),
                    None => {
                        debug!(column = %wanted, "declared column not present in sheet");
                        None
                    }
                }
            })
            .collect()
    }
}

fn raw_to_value(raw: Option<&RawCell>) -> CellValue {
    match raw {
        None | Some(RawCell::Blank) => CellValue::Empty,
        Some(RawCell::Number(n)) => CellValue::Float(*n),
        Some(RawCell::Text(s)) => CellValue::Text(s.clone()),
        Some(RawCell::Bool(b)) => CellValue::Bool(*b),
        Some(RawCell::Error(e)) => CellValue::Text(e.clone()),
    }
}

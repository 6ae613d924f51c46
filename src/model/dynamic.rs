//! Sheets without a declared record type: key/value rows and data tables

use super::{merge_columns, ExcelColumn, ModelBuilder, SheetModel};
use crate::error::{TabulaError, TabulaResult};
use crate::schema::{DEFAULT_SHEET_TITLE, IMPLICIT_ORDER_BASE};
use crate::types::{CellValue, FieldKind};
use indexmap::IndexMap;

/// A record whose fields are only known at runtime.
pub type DynamicRow = IndexMap<String, CellValue>;

/// A typed column of a `DataTable`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub kind: FieldKind,
}

/// In-memory tabular data source: named, typed columns and positional rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>, kind: FieldKind) {
        self.columns.push(DataColumn {
            name: name.into(),
            kind,
        });
    }

    /// Append a row; it must have one value per column.
    pub fn add_row(&mut self, values: Vec<CellValue>) -> TabulaResult<()> {
        if values.len() != self.columns.len() {
            return Err(TabulaError::Export(format!(
                "row has {} values but table '{}' has {} columns",
                values.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(values);
        Ok(())
    }
}

impl<'a> ModelBuilder<'a> {
    fn dynamic_title(&self, fallback: &str) -> String {
        self.sheet_title
            .filter(|t| !t.is_empty())
            .or(Some(fallback).filter(|t| !t.is_empty()))
            .or(self.default_sheet_title.filter(|t| !t.is_empty()))
            .unwrap_or(DEFAULT_SHEET_TITLE)
            .to_string()
    }

    fn plain_columns<'c, I>(&self, columns: I) -> Vec<ExcelColumn>
    where
        I: IntoIterator<Item = (&'c str, FieldKind)>,
    {
        columns
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                let header = self.header_for(name, &kind);
                ExcelColumn::field(
                    IMPLICIT_ORDER_BASE + i as i32,
                    name.to_string(),
                    header,
                    name.to_string(),
                    kind,
                )
            })
            .collect()
    }

    /// Build a sheet from key/value rows.
    ///
    /// Columns appear in first-seen key order; a column's kind comes from its
    /// first non-empty value. Missing keys export as blank cells.
    pub fn build_dynamic(&self, title: &str, rows: &[DynamicRow]) -> TabulaResult<SheetModel> {
        let mut kinds: IndexMap<&str, Option<FieldKind>> = IndexMap::new();
        for row in rows {
            for (key, value) in row {
                let slot = kinds.entry(key.as_str()).or_insert(None);
                if slot.is_none() && !value.is_empty() {
                    *slot = Some(value.infer_kind());
                }
            }
        }

        let base = self.plain_columns(
            kinds
                .into_iter()
                .map(|(name, kind)| (name, kind.unwrap_or(FieldKind::Text))),
        );
        let mut model = SheetModel {
            title: self.dynamic_title(title),
            columns: merge_columns(base, self.formula_columns)?,
            rows: Vec::with_capacity(rows.len()),
        };
        let titles = model.column_titles();

        for row in rows {
            let values = model.columns.iter().map(|c| match &c.field {
                Some(field) => row.get(field).cloned().unwrap_or_default(),
                None => CellValue::Empty,
            });
            let built = self.make_row(&model.columns, &titles, model.rows.len(), values)?;
            model.rows.push(built);
        }

        Ok(model)
    }

    /// Build a sheet from a `DataTable`.
    pub fn build_table(&self, table: &DataTable) -> TabulaResult<SheetModel> {
        let base = self.plain_columns(
            table
                .columns
                .iter()
                .map(|c| (c.name.as_str(), c.kind.clone())),
        );
        let mut model = SheetModel {
            title: self.dynamic_title(&table.name),
            columns: merge_columns(base, self.formula_columns)?,
            rows: Vec::with_capacity(table.rows.len()),
        };
        let titles = model.column_titles();
        let positions: IndexMap<&str, usize> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.as_str(), i))
            .collect();

        for row in &table.rows {
            let values = model.columns.iter().map(|c| {
                c.field
                    .as_deref()
                    .and_then(|f| positions.get(f))
                    .and_then(|&i| row.get(i))
                    .cloned()
                    .unwrap_or_default()
            });
            let built = self.make_row(&model.columns, &titles, model.rows.len(), values)?;
            model.rows.push(built);
        }

        Ok(model)
    }
}

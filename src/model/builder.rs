use super::{merge_columns, ColumnRemap, ExcelColumn, FormulaColumn, SheetCell, SheetModel, SheetRow};
use crate::cancel::CancellationToken;
use crate::coercion::value_to_cell_text;
use crate::error::TabulaResult;
use crate::formula::{FormulaCache, FormulaCompiler};
use crate::schema::SheetRecord;
use crate::types::CellValue;
use tracing::debug;

/// Turns records into a `SheetModel`.
///
/// Rows are produced sequentially so row N of the input is sheet row N+1
/// (row 0 holds the headers).
#[derive(Default, Clone, Copy)]
pub struct ModelBuilder<'a> {
    pub(super) formula_columns: &'a [FormulaColumn],
    pub(super) remap: Option<&'a ColumnRemap>,
    pub(super) cache: Option<&'a FormulaCache>,
    pub(super) cancel: Option<&'a CancellationToken>,
    pub(super) sheet_title: Option<&'a str>,
    pub(super) default_sheet_title: Option<&'a str>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formula_columns(mut self, columns: &'a [FormulaColumn]) -> Self {
        self.formula_columns = columns;
        self
    }

    pub fn remap(mut self, remap: &'a ColumnRemap) -> Self {
        self.remap = Some(remap);
        self
    }

    pub fn cache(mut self, cache: &'a FormulaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sheet title that wins over any title declared by the schema.
    pub fn sheet_title(mut self, title: &'a str) -> Self {
        self.sheet_title = Some(title);
        self
    }

    /// Sheet title used when the schema chain declares none.
    pub fn default_sheet_title(mut self, title: &'a str) -> Self {
        self.default_sheet_title = Some(title);
        self
    }

    /// Build a sheet from typed records; `None` entries are skipped.
    pub fn build<'r, T, I>(&self, records: I) -> TabulaResult<SheetModel>
    where
        T: SheetRecord + 'r,
        I: IntoIterator<Item = Option<&'r T>>,
    {
        let schema = T::schema();
        let title = match self.sheet_title.filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => schema.resolve_sheet_title(self.default_sheet_title),
        };

        let base: Vec<ExcelColumn> = schema
            .discover_columns()
            .into_iter()
            .map(|m| {
                let header = self.header_for(&m.title, &m.field.field_type.kind);
                ExcelColumn::field(m.order, m.title, header, m.field.name, m.field.field_type.kind)
            })
            .collect();
        let columns = merge_columns(base, self.formula_columns)?;

        debug!(
            sheet = %title,
            record_type = %schema.type_name,
            columns = columns.len(),
            "building sheet model"
        );

        let mut model = SheetModel {
            title,
            columns,
            rows: Vec::new(),
        };
        let titles = model.column_titles();

        for record in records.into_iter().flatten() {
            let values = model.columns.iter().map(|c| match &c.field {
                Some(field) => record.field_value(field),
                None => CellValue::Empty,
            });
            let row = self.make_row(&model.columns, &titles, model.rows.len(), values)?;
            model.rows.push(row);
        }

        Ok(model)
    }

    /// Build a sheet from records held by value.
    pub fn build_records<T: SheetRecord>(&self, records: &[T]) -> TabulaResult<SheetModel> {
        self.build(records.iter().map(Some))
    }

    pub(super) fn header_for(&self, title: &str, kind: &crate::types::FieldKind) -> String {
        match self.remap {
            Some(remap) => remap(title, kind),
            None => title.to_string(),
        }
    }

    /// One output row. `values` yields the field value for every column in
    /// order (ignored for formula columns).
    pub(super) fn make_row<I>(
        &self,
        columns: &[ExcelColumn],
        titles: &[String],
        data_index: usize,
        values: I,
    ) -> TabulaResult<SheetRow>
    where
        I: Iterator<Item = CellValue>,
    {
        if let Some(token) = self.cancel {
            token.check()?;
        }

        let row_index = (data_index + 1) as u32;
        let mut row = SheetRow::with_capacity(columns.len());

        for (column, value) in columns.iter().zip(values) {
            let cell = match &column.formula {
                Some(expr) => {
                    let text = match self.cache {
                        Some(cache) => cache.get_or_compile(expr, titles, row_index)?.to_string(),
                        None => FormulaCompiler::new(titles, row_index).compile(expr)?,
                    };
                    SheetCell::Formula(text)
                }
                None => SheetCell::Value(value_to_cell_text(&value)),
            };
            row.insert(column.title.clone(), cell);
        }

        Ok(row)
    }
}

//! Codec-agnostic sheet model
//!
//! Export: records → `SheetModel` (ordered columns + rows keyed by column
//! title). Import: `RawSheet` (cells as read from a workbook) → records.

mod builder;
mod dynamic;
mod parser;

pub use builder::ModelBuilder;
pub use dynamic::{DataColumn, DataTable, DynamicRow};
pub use parser::ModelParser;

use crate::error::{TabulaError, TabulaResult};
use crate::formula::Expr;
use crate::types::{FieldKind, RawCell};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Rewrites a declared column title into the header text used in the workbook.
///
/// Called with the declared title and the field's kind; applied on export to
/// the written header and on import to the header being looked for.
pub type ColumnRemap = Arc<dyn Fn(&str, &FieldKind) -> String + Send + Sync>;

//==============================================================================
// Styles
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
    Justify,
    Fill,
}

/// Presentation applied when a column is rendered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnStyle {
    pub font_name: Option<String>,
    /// Font height in points
    pub font_size: Option<f64>,
    /// RGB colour, e.g. `0xFF0000`
    pub font_color: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub strikeout: bool,
    pub underline: bool,
    pub align: HorizontalAlign,
}

impl ColumnStyle {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }
}

//==============================================================================
// Columns
//==============================================================================

/// One output column.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcelColumn {
    pub order: i32,
    /// Declared title; unique within the sheet and the key used in rows
    pub title: String,
    /// Header text written to the workbook (the title after remapping)
    pub header: String,
    pub source_type: FieldKind,
    /// Record field backing the column; `None` for formula columns
    pub field: Option<String>,
    pub formula: Option<Expr>,
    /// Declared result type, only set for formula columns
    pub result_type: Option<FieldKind>,
    pub header_style: Option<ColumnStyle>,
    pub cell_style: Option<ColumnStyle>,
}

impl ExcelColumn {
    pub fn field(order: i32, title: String, header: String, field: String, kind: FieldKind) -> Self {
        Self {
            order,
            title,
            header,
            source_type: kind,
            field: Some(field),
            formula: None,
            result_type: None,
            header_style: None,
            cell_style: None,
        }
    }

    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }
}

/// A declared computed column.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaColumn {
    pub title: String,
    /// Lambda over the row accessor, see `formula::ast`
    pub formula: Expr,
    /// Insert directly after the column with this title; append when `None`
    pub after_column_title: Option<String>,
    pub result_type: FieldKind,
    pub header_style: Option<ColumnStyle>,
    pub cell_style: Option<ColumnStyle>,
}

impl FormulaColumn {
    pub fn new(title: impl Into<String>, formula: Expr) -> Self {
        Self {
            title: title.into(),
            formula,
            after_column_title: None,
            result_type: FieldKind::Float,
            header_style: None,
            cell_style: None,
        }
    }

    pub fn after(mut self, column_title: impl Into<String>) -> Self {
        self.after_column_title = Some(column_title.into());
        self
    }

    pub fn result_type(mut self, kind: FieldKind) -> Self {
        self.result_type = kind;
        self
    }

    pub fn cell_style(mut self, style: ColumnStyle) -> Self {
        self.cell_style = Some(style);
        self
    }

    pub fn header_style(mut self, style: ColumnStyle) -> Self {
        self.header_style = Some(style);
        self
    }

    fn to_column(&self, order: i32) -> ExcelColumn {
        ExcelColumn {
            order,
            title: self.title.clone(),
            header: self.title.clone(),
            source_type: FieldKind::Formula,
            field: None,
            formula: Some(self.formula.clone()),
            result_type: Some(self.result_type.clone()),
            header_style: self.header_style.clone(),
            cell_style: self.cell_style.clone(),
        }
    }
}

//==============================================================================
// Sheet model
//==============================================================================

/// Content of one exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    /// Literal text
    Value(String),
    /// Formula text without the leading `=`
    Formula(String),
}

impl SheetCell {
    pub fn text(&self) -> &str {
        match self {
            SheetCell::Value(s) | SheetCell::Formula(s) => s,
        }
    }
}

pub type SheetRow = IndexMap<String, SheetCell>;

/// One exportable sheet: title, ordered columns, ordered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetModel {
    pub title: String,
    pub columns: Vec<ExcelColumn>,
    pub rows: Vec<SheetRow>,
}

impl SheetModel {
    pub fn column_titles(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.title.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of row `index` in column order.
    pub fn ordered_row(&self, index: usize) -> Vec<Option<&SheetCell>> {
        match self.rows.get(index) {
            Some(row) => self.columns.iter().map(|c| row.get(&c.title)).collect(),
            None => Vec::new(),
        }
    }
}

/// Cells of one worksheet as read back from a workbook, row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Splice formula columns into the ordered base columns.
///
/// Anchored formula columns go directly after their anchor (which may be an
/// earlier formula column); unanchored ones, and ones whose anchor does not
/// exist, are appended in declaration order.
pub(crate) fn merge_columns(
    mut columns: Vec<ExcelColumn>,
    formulas: &[FormulaColumn],
) -> TabulaResult<Vec<ExcelColumn>> {
    let mut titles: HashSet<&str> = HashSet::new();
    let mut anchors: HashSet<&str> = HashSet::new();

    for (idx, formula) in formulas.iter().enumerate() {
        if formula.title.trim().is_empty() {
            return Err(TabulaError::EmptyFormulaTitle(idx));
        }
        if !titles.insert(formula.title.as_str()) {
            return Err(TabulaError::DuplicateColumnTitle(formula.title.clone()));
        }
        if let Some(anchor) = formula.after_column_title.as_deref().filter(|a| !a.is_empty()) {
            if !anchors.insert(anchor) {
                return Err(TabulaError::DuplicateFormulaAnchor(anchor.to_string()));
            }
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for column in &columns {
        if !seen.insert(column.title.as_str()) || titles.contains(column.title.as_str()) {
            return Err(TabulaError::DuplicateColumnTitle(column.title.clone()));
        }
    }

    let mut deferred: Vec<&FormulaColumn> = Vec::new();
    for formula in formulas {
        let anchor = formula.after_column_title.as_deref().filter(|a| !a.is_empty());
        let position = anchor.and_then(|a| columns.iter().position(|c| c.title == a));
        match position {
            Some(pos) => {
                let order = columns[pos].order;
                columns.insert(pos + 1, formula.to_column(order));
            }
            None => {
                if let Some(a) = anchor {
                    debug!(column = %formula.title, anchor = %a, "formula anchor not found, appending");
                }
                deferred.push(formula);
            }
        }
    }

    for formula in deferred {
        let order = columns.last().map(|c| c.order.saturating_add(1)).unwrap_or(0);
        columns.push(formula.to_column(order));
    }

    Ok(columns)
}

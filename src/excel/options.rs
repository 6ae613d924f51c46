//! Export and import options

use crate::cancel::CancellationToken;
use crate::formula::FormulaCache;
use crate::model::{ColumnRemap, FormulaColumn, ModelBuilder, ModelParser};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Workbook variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    /// Zipped OOXML workbook
    #[default]
    Xlsx,
    /// Legacy binary workbook (read-only)
    Xls,
}

impl SpreadsheetFormat {
    /// Guess the format from a file extension, defaulting to xlsx.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xls") => SpreadsheetFormat::Xls,
            _ => SpreadsheetFormat::Xlsx,
        }
    }
}

/// Column width policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    /// Every column gets this width (in character units)
    Fixed(f64),
    /// Measure header and cell text, then clamp into `[min, max]`
    Auto { min: f64, max: f64 },
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Auto { min: 8.0, max: 60.0 }
    }
}

/// Options for turning records into a workbook.
#[derive(Clone, Default)]
pub struct ExportOptions {
    pub format: SpreadsheetFormat,
    /// Overrides any sheet title declared by the record schema
    pub sheet_title: Option<String>,
    /// Used when neither an override nor a schema title exists
    pub default_sheet_title: Option<String>,
    pub remap: Option<ColumnRemap>,
    pub formula_columns: Vec<FormulaColumn>,
    /// `None` leaves column widths at the workbook default
    pub width: Option<ColumnWidth>,
    pub formula_cache: Option<Arc<FormulaCache>>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: SpreadsheetFormat) -> Self {
        self.format = format;
        self
    }

    pub fn sheet_title(mut self, title: impl Into<String>) -> Self {
        self.sheet_title = Some(title.into());
        self
    }

    pub fn default_sheet_title(mut self, title: impl Into<String>) -> Self {
        self.default_sheet_title = Some(title.into());
        self
    }

    pub fn remap<F>(mut self, remap: F) -> Self
    where
        F: Fn(&str, &crate::types::FieldKind) -> String + Send + Sync + 'static,
    {
        self.remap = Some(Arc::new(remap));
        self
    }

    pub fn formula_column(mut self, column: FormulaColumn) -> Self {
        self.formula_columns.push(column);
        self
    }

    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn formula_cache(mut self, cache: Arc<FormulaCache>) -> Self {
        self.formula_cache = Some(cache);
        self
    }

    pub(crate) fn model_builder<'a>(
        &'a self,
        cancel: Option<&'a CancellationToken>,
    ) -> ModelBuilder<'a> {
        let mut builder = ModelBuilder::new().formula_columns(&self.formula_columns);
        if let Some(remap) = &self.remap {
            builder = builder.remap(remap);
        }
        if let Some(cache) = &self.formula_cache {
            builder = builder.cache(cache);
        }
        if let Some(title) = &self.sheet_title {
            builder = builder.sheet_title(title);
        }
        if let Some(title) = &self.default_sheet_title {
            builder = builder.default_sheet_title(title);
        }
        if let Some(token) = cancel {
            builder = builder.cancellation(token);
        }
        builder
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("format", &self.format)
            .field("sheet_title", &self.sheet_title)
            .field("default_sheet_title", &self.default_sheet_title)
            .field("remap", &self.remap.is_some())
            .field("formula_columns", &self.formula_columns.len())
            .field("width", &self.width)
            .finish()
    }
}

/// Options for reading records back from a workbook.
#[derive(Clone, Default)]
pub struct ImportOptions {
    /// Sheet to read; the first sheet when `None`
    pub sheet_name: Option<String>,
    /// Banner rows above the header row
    pub skip_rows: usize,
    pub remap: Option<ColumnRemap>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn remap<F>(mut self, remap: F) -> Self
    where
        F: Fn(&str, &crate::types::FieldKind) -> String + Send + Sync + 'static,
    {
        self.remap = Some(Arc::new(remap));
        self
    }

    pub(crate) fn model_parser<'a>(
        &'a self,
        cancel: Option<&'a CancellationToken>,
    ) -> ModelParser<'a> {
        let mut parser = ModelParser::new().skip_rows(self.skip_rows);
        if let Some(remap) = &self.remap {
            parser = parser.remap(remap);
        }
        if let Some(token) = cancel {
            parser = parser.cancellation(token);
        }
        parser
    }
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("sheet_name", &self.sheet_name)
            .field("skip_rows", &self.skip_rows)
            .field("remap", &self.remap.is_some())
            .finish()
    }
}

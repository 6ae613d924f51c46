use thiserror::Error;

pub type TabulaResult<T> = Result<T, TabulaError>;

#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("Sheet '{sheet}' not found. Available sheets: {available}")]
    SheetNotFound { sheet: String, available: String },

    #[error("Duplicate column title '{0}'")]
    DuplicateColumnTitle(String),

    #[error("More than one formula column is anchored after column '{0}'")]
    DuplicateFormulaAnchor(String),

    #[error("Formula column at position {0} has an empty title")]
    EmptyFormulaTitle(usize),

    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl TabulaError {
    /// Caller misconfiguration or a workbook that cannot be used at all.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            TabulaError::InvalidWorkbook(_)
                | TabulaError::SheetNotFound { .. }
                | TabulaError::DuplicateColumnTitle(_)
                | TabulaError::DuplicateFormulaAnchor(_)
                | TabulaError::EmptyFormulaTitle(_)
                | TabulaError::UnsupportedFormat(_)
                | TabulaError::Export(_)
                | TabulaError::InvalidExpression(_)
        )
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, TabulaError::Conversion(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TabulaError::Cancelled)
    }
}

/// A single cell that could not be converted into its target field type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot convert '{text}' to {target}{}: {reason}", column_suffix(.column))]
pub struct ConversionError {
    pub column: Option<String>,
    pub text: String,
    pub target: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(text: impl Into<String>, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: None,
            text: text.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Attach the header of the column the cell was read from.
    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

fn column_suffix(column: &Option<String>) -> String {
    match column {
        Some(c) => format!(" in column '{}'", c),
        None => String::new(),
    }
}

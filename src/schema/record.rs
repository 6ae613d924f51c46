use crate::error::{ConversionError, TabulaResult};
use crate::types::{float_to_int, CellValue};
use chrono::{NaiveDate, NaiveDateTime};
use url::Url;

use super::SheetSchema;

/// A record type that maps to one sheet row.
///
/// Implementations declare their schema once and expose field access by
/// name; the builder and parser never inspect the type any other way.
///
/// ```
/// use std::sync::OnceLock;
/// use tabula::schema::{ColumnTitle, FromCellValue, SheetRecord, SheetSchema};
/// use tabula::types::{CellValue, FieldKind, FieldType};
/// use tabula::TabulaResult;
///
/// #[derive(Default)]
/// struct City {
///     name: String,
///     population: Option<i64>,
/// }
///
/// impl SheetRecord for City {
///     fn schema() -> &'static SheetSchema {
///         static SCHEMA: OnceLock<SheetSchema> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             SheetSchema::builder("City")
///                 .column("name", FieldType::required(FieldKind::Text), ColumnTitle::new("Name"))
///                 .column("population", FieldType::optional(FieldKind::Integer), ColumnTitle::new("Population"))
///                 .build()
///         })
///     }
///
///     fn field_value(&self, field: &str) -> CellValue {
///         match field {
///             "name" => self.name.clone().into(),
///             "population" => self.population.into(),
///             _ => CellValue::Empty,
///         }
///     }
///
///     fn set_field(&mut self, field: &str, value: CellValue) -> TabulaResult<()> {
///         match field {
///             "name" => self.name = FromCellValue::from_cell(value)?,
///             "population" => self.population = FromCellValue::from_cell(value)?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait SheetRecord: Default {
    fn schema() -> &'static SheetSchema;

    /// Current value of the named field.
    fn field_value(&self, field: &str) -> CellValue;

    /// Store an already-coerced value into the named field.
    fn set_field(&mut self, field: &str, value: CellValue) -> TabulaResult<()>;
}

/// Extraction of a Rust field value from a coerced `CellValue`.
pub trait FromCellValue: Sized {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError>;
}

fn mismatch(value: &CellValue, target: &str) -> ConversionError {
    ConversionError::new(
        format!("{:?}", value),
        target,
        format!("unexpected {} value", value.type_name()),
    )
}

impl<T: FromCellValue> FromCellValue for Option<T> {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(None),
            other => T::from_cell(other).map(Some),
        }
    }
}

impl FromCellValue for String {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(String::new()),
            CellValue::Text(s) => Ok(s),
            CellValue::Url(u) => Ok(u.to_string()),
            other => Ok(crate::coercion::value_to_cell_text(&other)),
        }
    }
}

impl FromCellValue for i64 {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(0),
            CellValue::Int(i) => Ok(i),
            CellValue::Float(f) if f.fract() == 0.0 => {
                float_to_int(f).ok_or_else(|| mismatch(&CellValue::Float(f), "integer"))
            }
            other => Err(mismatch(&other, "integer")),
        }
    }
}

impl FromCellValue for i32 {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        let wide = i64::from_cell(value)?;
        i32::try_from(wide)
            .map_err(|e| ConversionError::new(wide.to_string(), "i32", e.to_string()))
    }
}

impl FromCellValue for f64 {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(0.0),
            CellValue::Float(f) => Ok(f),
            CellValue::Int(i) => Ok(i as f64),
            other => Err(mismatch(&other, "float")),
        }
    }
}

impl FromCellValue for bool {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(false),
            CellValue::Bool(b) => Ok(b),
            other => Err(mismatch(&other, "boolean")),
        }
    }
}

impl FromCellValue for NaiveDateTime {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(NaiveDateTime::default()),
            CellValue::Date(d) => Ok(d),
            other => Err(mismatch(&other, "date")),
        }
    }
}

impl FromCellValue for NaiveDate {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        NaiveDateTime::from_cell(value).map(|d| d.date())
    }
}

impl FromCellValue for Url {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Url(u) => Ok(u),
            CellValue::Text(s) => {
                Url::parse(&s).map_err(|e| ConversionError::new(s, "url", e.to_string()))
            }
            other => Err(mismatch(&other, "url")),
        }
    }
}

//! Conversion between raw spreadsheet cells and typed field values
//!
//! Export renders every value as culture-invariant text (`Empty` becomes
//! `""`). Import dispatches on the field kind; leniency differs per kind:
//!
//! | kind            | blank                  | unparseable                    |
//! |-----------------|------------------------|--------------------------------|
//! | boolean         | field left untouched   | error                          |
//! | date            | null / untouched       | null if optional, else error   |
//! | enum            | null if optional, else zero member | zero member        |
//! | url             | null                   | error                          |
//! | text / numbers  | null if optional, else default | null if optional, else error |

pub mod dates;

use crate::error::ConversionError;
use crate::types::{float_to_int, format_number, CellValue, FieldKind, FieldType, RawCell};
use chrono::Timelike;
use url::Url;

pub use dates::{datetime_to_serial, parse_date_text, serial_to_datetime};

const TRUTHY: &[&str] = &["1", "是", "yes", "true"];
const FALSY: &[&str] = &["0", "否", "no", "false"];

/// Outcome of coercing one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Store this value into the field
    Value(CellValue),
    /// Leave the field at whatever value it already has
    Untouched,
}

impl Coerced {
    pub fn into_value(self) -> Option<CellValue> {
        match self {
            Coerced::Value(v) => Some(v),
            Coerced::Untouched => None,
        }
    }
}

/// Render a value as the text written into an exported cell.
pub fn value_to_cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => format_number(*f),
        CellValue::Text(s) => s.clone(),
        CellValue::Date(d) => {
            if d.time() == chrono::NaiveTime::MIN {
                d.format("%Y-%m-%d").to_string()
            } else if d.nanosecond() == 0 {
                d.format("%Y-%m-%d %H:%M:%S").to_string()
            } else {
                d.format("%Y-%m-%d %H:%M:%S%.f").to_string()
            }
        }
        CellValue::Url(u) => u.as_str().to_string(),
    }
}

/// Convert a raw cell into a value for a field of type `target`.
pub fn cell_to_value(raw: &RawCell, target: &FieldType) -> Result<Coerced, ConversionError> {
    match &target.kind {
        FieldKind::Boolean => to_bool(raw),
        FieldKind::Date => to_date(raw, target),
        FieldKind::Enum(names) => Ok(to_enum(raw, names, target.nullable)),
        FieldKind::Url => to_url(raw),
        FieldKind::Formula => Ok(Coerced::Untouched),
        FieldKind::Text | FieldKind::Integer | FieldKind::Float => to_primitive(raw, target),
    }
}

/// Interpret text as a boolean: strict `true`/`false` first, then the
/// case-insensitive bilingual literal sets.
pub fn parse_bool_text(text: &str) -> Option<bool> {
    let text = text.trim();
    if let Ok(b) = text.parse::<bool>() {
        return Some(b);
    }
    let lower = text.to_lowercase();
    if TRUTHY.contains(&lower.as_str()) {
        Some(true)
    } else if FALSY.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn to_bool(raw: &RawCell) -> Result<Coerced, ConversionError> {
    if raw.is_blank() {
        return Ok(Coerced::Untouched);
    }
    if let RawCell::Bool(b) = raw {
        return Ok(Coerced::Value(CellValue::Bool(*b)));
    }
    let text = raw.text();
    parse_bool_text(&text)
        .map(|b| Coerced::Value(CellValue::Bool(b)))
        .ok_or_else(|| ConversionError::new(text, "boolean", "not a recognised boolean literal"))
}

fn to_date(raw: &RawCell, target: &FieldType) -> Result<Coerced, ConversionError> {
    if raw.is_blank() {
        return Ok(if target.nullable {
            Coerced::Value(CellValue::Empty)
        } else {
            Coerced::Untouched
        });
    }

    let parsed = match raw {
        RawCell::Number(serial) => serial_to_datetime(*serial),
        other => parse_date_text(&other.text()),
    };

    match parsed {
        Some(d) => Ok(Coerced::Value(CellValue::Date(d))),
        None if target.nullable => Ok(Coerced::Value(CellValue::Empty)),
        None => Err(ConversionError::new(raw.text(), "date", "unrecognised date")),
    }
}

/// Case-sensitive name match, falling back to the zero-valued (first) member.
fn to_enum(raw: &RawCell, names: &[String], nullable: bool) -> Coerced {
    if raw.is_blank() && nullable {
        return Coerced::Value(CellValue::Empty);
    }
    let text = raw.text();
    let text = text.trim();
    let member = names
        .iter()
        .find(|name| name.as_str() == text)
        .or_else(|| names.first());
    match member {
        Some(name) => Coerced::Value(CellValue::Text(name.clone())),
        None => Coerced::Value(CellValue::Empty),
    }
}

fn to_url(raw: &RawCell) -> Result<Coerced, ConversionError> {
    if raw.is_blank() {
        return Ok(Coerced::Value(CellValue::Empty));
    }
    let text = raw.text();
    Url::parse(text.trim())
        .map(|u| Coerced::Value(CellValue::Url(u)))
        .map_err(|e| ConversionError::new(text, "url", e.to_string()))
}

fn to_primitive(raw: &RawCell, target: &FieldType) -> Result<Coerced, ConversionError> {
    let blank = match target.kind {
        FieldKind::Text => match raw {
            RawCell::Blank => true,
            RawCell::Text(s) => s.is_empty(),
            _ => false,
        },
        _ => raw.is_blank(),
    };
    if blank {
        return Ok(Coerced::Value(if target.nullable {
            CellValue::Empty
        } else {
            default_value(&target.kind)
        }));
    }

    let converted = match target.kind {
        FieldKind::Integer => to_integer(raw),
        FieldKind::Float => to_float(raw),
        _ => Ok(CellValue::Text(raw.text())),
    };

    match converted {
        Ok(v) => Ok(Coerced::Value(v)),
        Err(_) if target.nullable => Ok(Coerced::Value(CellValue::Empty)),
        Err(e) => Err(e),
    }
}

fn default_value(kind: &FieldKind) -> CellValue {
    match kind {
        FieldKind::Integer => CellValue::Int(0),
        FieldKind::Float => CellValue::Float(0.0),
        FieldKind::Text => CellValue::Text(String::new()),
        _ => CellValue::Empty,
    }
}

fn to_integer(raw: &RawCell) -> Result<CellValue, ConversionError> {
    match raw {
        RawCell::Number(n) => float_to_int(n.round_ties_even())
            .map(CellValue::Int)
            .ok_or_else(|| ConversionError::new(format_number(*n), "integer", "out of range")),
        RawCell::Bool(b) => Ok(CellValue::Int(i64::from(*b))),
        other => {
            let text = other.text();
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .map(CellValue::Int)
                .or_else(|e| match trimmed.parse::<f64>() {
                    Ok(f) if f.is_finite() && f.fract() == 0.0 => float_to_int(f)
                        .map(CellValue::Int)
                        .ok_or_else(|| ConversionError::new(text.clone(), "integer", "out of range")),
                    _ => Err(ConversionError::new(text.clone(), "integer", e.to_string())),
                })
        }
    }
}

fn to_float(raw: &RawCell) -> Result<CellValue, ConversionError> {
    match raw {
        RawCell::Number(n) => Ok(CellValue::Float(*n)),
        RawCell::Bool(b) => Ok(CellValue::Float(if *b { 1.0 } else { 0.0 })),
        other => {
            let text = other.text();
            text.trim()
                .parse::<f64>()
                .map(CellValue::Float)
                .map_err(|e| ConversionError::new(text.clone(), "float", e.to_string()))
        }
    }
}

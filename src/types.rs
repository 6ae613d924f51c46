use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

//==============================================================================
// Cell values
//==============================================================================

/// A field value travelling between records and sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value (null / blank)
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDateTime),
    Url(Url),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            CellValue::Url(u) => Some(u),
            _ => None,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "Empty",
            CellValue::Bool(_) => "Boolean",
            CellValue::Int(_) => "Integer",
            CellValue::Float(_) => "Float",
            CellValue::Text(_) => "Text",
            CellValue::Date(_) => "Date",
            CellValue::Url(_) => "Url",
        }
    }

    /// Best semantic tag for a value whose declaring field is unknown (dynamic rows).
    pub fn infer_kind(&self) -> FieldKind {
        match self {
            CellValue::Empty | CellValue::Text(_) => FieldKind::Text,
            CellValue::Bool(_) => FieldKind::Boolean,
            CellValue::Int(_) => FieldKind::Integer,
            CellValue::Float(_) => FieldKind::Float,
            CellValue::Date(_) => FieldKind::Date,
            CellValue::Url(_) => FieldKind::Url,
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Date(v)
    }
}

impl From<Url> for CellValue {
    fn from(v: Url) -> Self {
        CellValue::Url(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl Serialize for CellValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d %H:%M:%S").to_string()),
            CellValue::Url(u) => serializer.serialize_str(u.as_str()),
        }
    }
}

//==============================================================================
// Raw cells (what the codec hands back)
//==============================================================================

/// A physical cell as read from a workbook, before coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawCell {
    #[default]
    Blank,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Cell error such as `#DIV/0!`
    Error(String),
}

impl RawCell {
    /// Blank cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Blank => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Culture-invariant text of the raw cell.
    pub fn text(&self) -> String {
        match self {
            RawCell::Blank => String::new(),
            RawCell::Number(n) => format_number(*n),
            RawCell::Text(s) => s.clone(),
            RawCell::Bool(b) => b.to_string(),
            RawCell::Error(e) => e.clone(),
        }
    }
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Integral float to `i64`; `None` when it falls outside the `i64` range.
pub(crate) fn float_to_int(n: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    (n.is_finite() && (-LIMIT..LIMIT).contains(&n)).then(|| n as i64)
}

//==============================================================================
// Field types
//==============================================================================

/// Semantic type tag of a record field or column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Url,
    /// Enumeration; the first name is the zero-valued member
    Enum(Vec<String>),
    /// Computed column whose cells hold formulas
    Formula,
}

impl FieldKind {
    pub fn enumeration<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::Enum(names.into_iter().map(Into::into).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Url => "url",
            FieldKind::Enum(_) => "enum",
            FieldKind::Formula => "formula",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A field kind plus nullability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldType {
    pub fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "optional {}", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

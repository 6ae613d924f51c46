//! Record types shared by the integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::OnceLock;
use tabula::schema::{ColumnTitle, DisplayName, SheetSchema};
use tabula::{CellValue, ConversionError, FieldKind, FieldType, FromCellValue, SheetRecord, TabulaResult};
use url::Url;

// ═══════════════════════════════════════════════════════════════════════════
// Person: one field of every supported kind
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Junior,
    Senior,
    Lead,
}

impl Level {
    pub const NAMES: [&'static str; 3] = ["Junior", "Senior", "Lead"];

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

impl FromCellValue for Level {
    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value.as_str() {
            Some("Senior") => Ok(Level::Senior),
            Some("Lead") => Ok(Level::Lead),
            _ => Ok(Level::Junior),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub name: String,
    pub age: Option<i64>,
    pub score: f64,
    pub active: bool,
    pub birthday: Option<NaiveDateTime>,
    pub joined: NaiveDateTime,
    pub level: Level,
    pub homepage: Option<Url>,
    /// Not exported
    pub secret: String,
}

impl SheetRecord for Person {
    fn schema() -> &'static SheetSchema {
        static SCHEMA: OnceLock<SheetSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SheetSchema::builder("Person")
                .sheet_title("People")
                .column("name", FieldType::required(FieldKind::Text), ColumnTitle::new("Name").order(1))
                .column("age", FieldType::optional(FieldKind::Integer), ColumnTitle::new("Age").order(2))
                .column("score", FieldType::required(FieldKind::Float), ColumnTitle::new("Score"))
                .column("active", FieldType::required(FieldKind::Boolean), ColumnTitle::new("Active"))
                .column("birthday", FieldType::optional(FieldKind::Date), ColumnTitle::new("Birthday"))
                .column("joined", FieldType::required(FieldKind::Date), ColumnTitle::new("Joined"))
                .column(
                    "level",
                    FieldType::required(FieldKind::enumeration(Level::NAMES)),
                    ColumnTitle::new("Level"),
                )
                .display("homepage", FieldType::optional(FieldKind::Url), DisplayName::new("Homepage"))
                .field("secret", FieldType::required(FieldKind::Text))
                .build()
        })
    }

    fn field_value(&self, field: &str) -> CellValue {
        match field {
            "name" => self.name.clone().into(),
            "age" => self.age.into(),
            "score" => self.score.into(),
            "active" => self.active.into(),
            "birthday" => self.birthday.into(),
            "joined" => self.joined.into(),
            "level" => self.level.name().into(),
            "homepage" => self.homepage.clone().into(),
            "secret" => self.secret.clone().into(),
            _ => CellValue::Empty,
        }
    }

    fn set_field(&mut self, field: &str, value: CellValue) -> TabulaResult<()> {
        match field {
            "name" => self.name = FromCellValue::from_cell(value)?,
            "age" => self.age = FromCellValue::from_cell(value)?,
            "score" => self.score = FromCellValue::from_cell(value)?,
            "active" => self.active = FromCellValue::from_cell(value)?,
            "birthday" => self.birthday = FromCellValue::from_cell(value)?,
            "joined" => self.joined = FromCellValue::from_cell(value)?,
            "level" => self.level = FromCellValue::from_cell(value)?,
            "homepage" => self.homepage = FromCellValue::from_cell(value)?,
            "secret" => self.secret = FromCellValue::from_cell(value)?,
            _ => {}
        }
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn people() -> Vec<Person> {
    vec![
        Person {
            name: "Ann".to_string(),
            age: Some(31),
            score: 9.5,
            active: true,
            birthday: Some(date(1993, 5, 17)),
            joined: NaiveDate::from_ymd_opt(2020, 1, 2)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            level: Level::Senior,
            homepage: Some(Url::parse("https://example.com/ann").unwrap()),
            secret: String::new(),
        },
        Person {
            name: "Bo".to_string(),
            age: None,
            score: -2.25,
            active: false,
            birthday: None,
            joined: date(2021, 11, 30),
            level: Level::Lead,
            homepage: None,
            secret: String::new(),
        },
        Person {
            name: "陈静".to_string(),
            age: Some(0),
            score: 0.0,
            active: true,
            birthday: Some(date(2001, 12, 1)),
            joined: date(2019, 7, 4),
            level: Level::Junior,
            homepage: None,
            secret: String::new(),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// Inheritance: Employee extends Staff and shadows `code`
// ═══════════════════════════════════════════════════════════════════════════

pub fn staff_schema() -> &'static SheetSchema {
    static SCHEMA: OnceLock<SheetSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        SheetSchema::builder("Staff")
            .sheet_title("Staff")
            .column("code", FieldType::required(FieldKind::Text), ColumnTitle::new("Staff Code"))
            .column("name", FieldType::required(FieldKind::Text), ColumnTitle::new("Name"))
            .build()
    })
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Employee {
    pub code: String,
    pub name: String,
    pub salary: f64,
}

impl SheetRecord for Employee {
    fn schema() -> &'static SheetSchema {
        static SCHEMA: OnceLock<SheetSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SheetSchema::builder("Employee")
                .extends(staff_schema())
                .column("code", FieldType::required(FieldKind::Text), ColumnTitle::new("Employee No"))
                .column("salary", FieldType::required(FieldKind::Float), ColumnTitle::new("Salary"))
                .build()
        })
    }

    fn field_value(&self, field: &str) -> CellValue {
        match field {
            "code" => self.code.clone().into(),
            "name" => self.name.clone().into(),
            "salary" => self.salary.into(),
            _ => CellValue::Empty,
        }
    }

    fn set_field(&mut self, field: &str, value: CellValue) -> TabulaResult<()> {
        match field {
            "code" => self.code = FromCellValue::from_cell(value)?,
            "name" => self.name = FromCellValue::from_cell(value)?,
            "salary" => self.salary = FromCellValue::from_cell(value)?,
            _ => {}
        }
        Ok(())
    }
}

/// Manager extends Employee and declares its own sheet title.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manager {
    pub code: String,
    pub name: String,
    pub salary: f64,
    pub reports: i64,
}

impl SheetRecord for Manager {
    fn schema() -> &'static SheetSchema {
        static SCHEMA: OnceLock<SheetSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SheetSchema::builder("Manager")
                .extends(Employee::schema())
                .sheet_title("Managers")
                .column("reports", FieldType::required(FieldKind::Integer), ColumnTitle::new("Reports").order(1))
                .build()
        })
    }

    fn field_value(&self, field: &str) -> CellValue {
        match field {
            "code" => self.code.clone().into(),
            "name" => self.name.clone().into(),
            "salary" => self.salary.into(),
            "reports" => self.reports.into(),
            _ => CellValue::Empty,
        }
    }

    fn set_field(&mut self, field: &str, value: CellValue) -> TabulaResult<()> {
        match field {
            "code" => self.code = FromCellValue::from_cell(value)?,
            "name" => self.name = FromCellValue::from_cell(value)?,
            "salary" => self.salary = FromCellValue::from_cell(value)?,
            "reports" => self.reports = FromCellValue::from_cell(value)?,
            _ => {}
        }
        Ok(())
    }
}

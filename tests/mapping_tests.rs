//! Schema discovery, inheritance and the per-type leniency boundary

mod common;

use common::{Employee, Manager, Person};
use pretty_assertions::assert_eq;
use tabula::coercion::{cell_to_value, value_to_cell_text, Coerced};
use tabula::model::{ModelBuilder, ModelParser, RawSheet};
use tabula::schema::DEFAULT_SHEET_TITLE;
use tabula::{CellValue, FieldKind, FieldType, RawCell, SheetRecord};

fn text(s: &str) -> RawCell {
    RawCell::Text(s.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════
// Schema discovery
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_explicit_orders_sort_before_declaration_order() {
    let titles: Vec<String> = Person::schema()
        .discover_columns()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Name", "Age", "Score", "Active", "Birthday", "Joined", "Level", "Homepage"]
    );
}

#[test]
fn test_untitled_fields_are_not_exported() {
    let model = ModelBuilder::new().build_records(&common::people()).unwrap();
    assert!(model.columns.iter().all(|c| c.field.as_deref() != Some("secret")));
}

#[test]
fn test_shadowed_member_uses_derived_title() {
    let model = ModelBuilder::new()
        .build_records(&[Employee::default()])
        .unwrap();
    assert_eq!(model.column_titles(), vec!["Employee No", "Name", "Salary"]);
    // no own sheet title, so the base class title applies
    assert_eq!(model.title, "Staff");
}

#[test]
fn test_most_derived_sheet_title_wins() {
    let model = ModelBuilder::new()
        .build_records(&[Manager::default()])
        .unwrap();
    assert_eq!(model.title, "Managers");
    assert_eq!(
        model.column_titles(),
        vec!["Reports", "Employee No", "Name", "Salary"]
    );
}

#[test]
fn test_default_sheet_title_chain() {
    use tabula::schema::SheetSchema;
    let bare = SheetSchema::builder("Bare").build();
    assert_eq!(bare.resolve_sheet_title(None), DEFAULT_SHEET_TITLE);
    assert_eq!(bare.resolve_sheet_title(Some("Fallback")), "Fallback");
    assert_eq!(Employee::schema().resolve_sheet_title(Some("Fallback")), "Staff");
}

#[test]
fn test_shadowed_member_imports_under_derived_title() {
    let sheet = RawSheet::new(
        "Staff",
        vec![
            vec![text("Staff Code"), text("Employee No"), text("Name")],
            vec![text("S-1"), text("E-9"), text("Ann")],
        ],
    );
    let rows: Vec<Employee> = ModelParser::new().parse(&sheet).unwrap();
    assert_eq!(rows[0].code, "E-9");
}

// ═══════════════════════════════════════════════════════════════════════════
// Leniency boundary
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unparseable_enum_defaults_to_zero_member() {
    let ty = FieldType::required(FieldKind::enumeration(["Low", "High"]));
    let out = cell_to_value(&text("Medium"), &ty).unwrap();
    assert_eq!(out, Coerced::Value(CellValue::Text("Low".to_string())));
}

#[test]
fn test_unparseable_nullable_date_is_null() {
    let ty = FieldType::optional(FieldKind::Date);
    let out = cell_to_value(&text("someday"), &ty).unwrap();
    assert_eq!(out, Coerced::Value(CellValue::Empty));
}

#[test]
fn test_unparseable_required_number_is_error() {
    let ty = FieldType::required(FieldKind::Integer);
    let err = cell_to_value(&text("twelve"), &ty).unwrap_err();
    assert_eq!(err.text, "twelve");
}

#[test]
fn test_unparseable_nullable_number_is_null() {
    let ty = FieldType::optional(FieldKind::Float);
    let out = cell_to_value(&text("n/a"), &ty).unwrap();
    assert_eq!(out, Coerced::Value(CellValue::Empty));
}

#[test]
fn test_blank_boolean_leaves_field_untouched() {
    let ty = FieldType::required(FieldKind::Boolean);
    assert_eq!(cell_to_value(&text("   "), &ty).unwrap(), Coerced::Untouched);
    assert_eq!(cell_to_value(&RawCell::Blank, &ty).unwrap(), Coerced::Untouched);
}

#[test]
fn test_bilingual_booleans() {
    let ty = FieldType::required(FieldKind::Boolean);
    for (input, expected) in [("是", true), ("YES", true), ("1", true), ("否", false), ("No", false), ("0", false)] {
        assert_eq!(
            cell_to_value(&text(input), &ty).unwrap(),
            Coerced::Value(CellValue::Bool(expected)),
            "{}",
            input
        );
    }
    assert!(cell_to_value(&text("maybe"), &ty).is_err());
}

#[test]
fn test_malformed_url_is_error_and_blank_url_is_null() {
    let ty = FieldType::optional(FieldKind::Url);
    assert!(cell_to_value(&text("not a url"), &ty).is_err());
    assert_eq!(
        cell_to_value(&RawCell::Blank, &ty).unwrap(),
        Coerced::Value(CellValue::Empty)
    );
}

#[test]
fn test_export_null_and_empty_are_indistinguishable() {
    assert_eq!(value_to_cell_text(&CellValue::Empty), "");
    assert_eq!(value_to_cell_text(&CellValue::Text(String::new())), "");
}

//! Expression-to-formula compiler through the public API

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tabula::excel::{ExcelExporter, ExportOptions};
use tabula::formula::ast::{array, call, col, col_at, lambda, lit, matrix, now};
use tabula::formula::{compile_formula, Expr, FormulaCache, FunctionCategory};
use tabula::model::{DataTable, FormulaColumn, SheetCell};
use tabula::FieldKind;

fn columns() -> Vec<String> {
    ["One", "Two", "Three"].iter().map(|s| s.to_string()).collect()
}

fn compile(body: Expr) -> String {
    compile_formula(&lambda("c", body), &columns(), 3).unwrap()
}

// =========================================================================
// Literal cases
// =========================================================================

#[test]
fn test_literal_cases() {
    assert_eq!(compile(col("One")), "A4");
    assert_eq!(compile(col_at("One", 1)), "A1");
    assert_eq!(compile(col("One") + col("Two")), "A4+B4");
    assert_eq!(compile(col("One").eq(lit(1))), "A4=1");
    assert_eq!(compile(lit(1) - lit(2)), "-1");
    assert_eq!(compile(matrix("One", 1, "Two", 2)), "A1:B2");
    assert_eq!(compile(call(FunctionCategory::Math, "Abs", [col("One")])), "ABS(A4)");
    assert_eq!(compile(now().year()), "YEAR(NOW())");
}

#[test]
fn test_unresolved_column_never_throws() {
    let out = compile(col("Missing") * lit(2));
    assert!(out.contains("ERROR key:Missing"), "{}", out);
}

#[test]
fn test_variadic_sum_over_range() {
    let out = compile(call(
        FunctionCategory::All,
        "Sum",
        [array([matrix("One", 2, "One", 10), col("Three")])],
    ));
    assert_eq!(out, "SUM(A2:A10,C4)");
}

#[test]
fn test_non_lambda_root_is_rejected() {
    assert!(compile_formula(&col("One"), &columns(), 0).is_err());
}

// =========================================================================
// Caching
// =========================================================================

#[test]
fn test_cache_is_not_observable() {
    let cache = FormulaCache::with_capacity(2);
    let expr = lambda("c", col("One") + col("Three"));
    let cols = columns();

    for row in 0..10u32 {
        let cached = cache.get_or_compile(&expr, &cols, row).unwrap();
        let direct = compile_formula(&expr, &cols, row).unwrap();
        assert_eq!(&*cached, direct.as_str());
        assert!(cache.len() <= 2);
    }

    let again = cache.get_or_compile(&expr, &cols, 9).unwrap();
    assert_eq!(&*again, "A10+C10");
    assert!(cache.hits() >= 1);
}

#[test]
fn test_shared_cache_across_exports() {
    let cache = Arc::new(FormulaCache::new());
    let mut table = DataTable::new("T");
    table.add_column("A", FieldKind::Float);
    table.add_column("B", FieldKind::Float);
    table.add_row(vec![1.0.into(), 2.0.into()]).unwrap();
    table.add_row(vec![3.0.into(), 4.0.into()]).unwrap();

    let options = ExportOptions::new()
        .formula_column(FormulaColumn::new("Sum", lambda("c", col("A") + col("B"))))
        .formula_cache(cache.clone());

    let exporter = ExcelExporter::new(options);
    exporter.export_table(&table).unwrap();
    assert_eq!(cache.misses(), 2);
    exporter.export_table(&table).unwrap();
    assert_eq!(cache.hits(), 2);

    cache.clear();
    assert!(cache.is_empty());

    let model = tabula::model::ModelBuilder::new()
        .formula_columns(&exporter.options().formula_columns)
        .cache(&cache)
        .build_table(&table)
        .unwrap();
    assert_eq!(model.rows[1]["Sum"], SheetCell::Formula("A3+B3".to_string()));
}

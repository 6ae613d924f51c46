//! Formula columns: expression trees compiled to Excel A1 formulas

pub mod ast;
mod cache;
mod compiler;

pub use ast::{BinaryOp, Expr, FunctionCategory, UnaryOp};
pub use cache::{FormulaCache, DEFAULT_CACHE_CAPACITY};
pub use compiler::FormulaCompiler;

use crate::error::TabulaResult;

/// Compile `expr` for the sheet row `row_index` (0-based, header = 0).
pub fn compile_formula(expr: &Expr, columns: &[String], row_index: u32) -> TabulaResult<String> {
    FormulaCompiler::new(columns, row_index).compile(expr)
}

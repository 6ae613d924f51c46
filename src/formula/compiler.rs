//! Expression tree → A1 formula text
//!
//! Unsupported constructs never fail compilation: they are rendered as a
//! readable diagnostic inside the formula so the broken cell shows up in the
//! workbook. Only a root that is not a single-parameter lambda is an error.

use super::ast::{BinaryOp, Expr, UnaryOp};
use crate::address::{CellRef, RangeRef};
use crate::error::{TabulaError, TabulaResult};
use crate::types::{format_number, CellValue};
use chrono::{Datelike, NaiveTime, Timelike};

/// Compiles formulas for one row of one sheet.
pub struct FormulaCompiler<'a> {
    /// Column titles in output order; index = column position
    columns: &'a [String],
    /// Zero-based sheet row the formula is written to (header is row 0)
    row_index: u32,
}

impl<'a> FormulaCompiler<'a> {
    pub fn new(columns: &'a [String], row_index: u32) -> Self {
        Self { columns, row_index }
    }

    /// Compile a lambda into formula text without the leading `=`.
    ///
    /// Example:
    /// - Input: `(c) => c["Revenue"] - c["Cost"]`, columns `[Revenue, Cost]`, row 3
    /// - Output: `A4-B4`
    pub fn compile(&self, root: &Expr) -> TabulaResult<String> {
        match root {
            Expr::Lambda { params, body } if params.len() == 1 => Ok(self.emit(body)),
            Expr::Lambda { params, .. } => Err(TabulaError::InvalidExpression(format!(
                "formula lambda must take exactly one parameter, found {}",
                params.len()
            ))),
            other => Err(TabulaError::InvalidExpression(format!(
                "formula root must be a lambda, found {}",
                other
            ))),
        }
    }

    fn emit(&self, expr: &Expr) -> String {
        match expr {
            Expr::Column { name, row } => match self.column_index(name) {
                Some(column) => {
                    CellRef::new(column, row.unwrap_or(self.row_index + 1)).to_string()
                }
                None => missing_key(name),
            },
            Expr::Matrix {
                start_column,
                start_row,
                end_column,
                end_row,
            } => match (self.column_index(start_column), self.column_index(end_column)) {
                (Some(start), Some(end)) => RangeRef::new(
                    CellRef::new(start, *start_row),
                    CellRef::new(end, *end_row),
                )
                .to_string(),
                (None, _) => missing_key(start_column),
                (_, None) => missing_key(end_column),
            },
            Expr::Binary { op, left, right } => self.emit_binary(*op, left, right),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Negate => {
                    let inner = self.emit(operand);
                    if binary_precedence(operand).is_some_and(|p| p < NEGATION) {
                        format!("-({})", inner)
                    } else {
                        format!("-{}", inner)
                    }
                }
                other => format!("unsupported unary: {:?}", other),
            },
            Expr::Call {
                category,
                name,
                args,
            } => {
                if category.is_whitelisted() {
                    format!("{}({})", name.to_uppercase(), self.emit_list(args))
                } else {
                    format!("unsupported call: {}", expr)
                }
            }
            Expr::AddMonths { target, months } => {
                format!("EDATE({},{})", self.emit(target), self.emit(months))
            }
            Expr::Member { target, name } => match (name.as_str(), target) {
                ("Now", _) => "NOW()".to_string(),
                ("Year", Some(t)) => format!("YEAR({})", self.emit(t)),
                ("Month", Some(t)) => format!("MONTH({})", self.emit(t)),
                ("Day", Some(t)) => format!("DAY({})", self.emit(t)),
                _ => format!("unsupported member access: {}", name),
            },
            Expr::Constant(value) => render_constant(value),
            Expr::Convert(inner) => self.emit(inner),
            Expr::Array(items) => self.emit_list(items),
            Expr::Lambda { .. } => format!("unsupported nested lambda: {}", expr),
        }
    }

    fn emit_binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> String {
        if let Some(folded) = fold_constants(op, left, right) {
            return render_constant(&folded);
        }

        // Excel's AND is a function, not an infix operator.
        if op == BinaryOp::And {
            return format!("AND({},{})", self.emit(left), self.emit(right));
        }

        let Some((symbol, precedence)) = binary_symbol(op) else {
            return format!(
                "{}[unsupported binary symbol: {:?}]{}",
                self.emit(left),
                op,
                self.emit(right)
            );
        };

        let lhs = self.emit(left);
        let rhs = self.emit(right);
        let lhs = match binary_precedence(left) {
            Some(p) if p < precedence => format!("({})", lhs),
            _ => lhs,
        };
        // Left-associative: an equal-precedence right operand needs parentheses.
        let rhs = match binary_precedence(right) {
            Some(p) if p <= precedence => format!("({})", rhs),
            _ => rhs,
        };
        format!("{}{}{}", lhs, symbol, rhs)
    }

    fn emit_list(&self, items: &[Expr]) -> String {
        items
            .iter()
            .map(|item| self.emit(item))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

const COMPARISON: u8 = 1;
const CONCAT: u8 = 2;
const ADDITIVE: u8 = 3;
const MULTIPLICATIVE: u8 = 4;
const NEGATION: u8 = 5;

/// Formula symbol and Excel precedence for infix operators.
fn binary_symbol(op: BinaryOp) -> Option<(&'static str, u8)> {
    let entry = match op {
        BinaryOp::Add => ("+", ADDITIVE),
        BinaryOp::Subtract => ("-", ADDITIVE),
        BinaryOp::Multiply => ("*", MULTIPLICATIVE),
        BinaryOp::Divide => ("/", MULTIPLICATIVE),
        BinaryOp::Equal => ("=", COMPARISON),
        BinaryOp::NotEqual => ("<>", COMPARISON),
        BinaryOp::GreaterThan => (">", COMPARISON),
        BinaryOp::LessThan => ("<", COMPARISON),
        BinaryOp::GreaterThanOrEqual => (">=", COMPARISON),
        BinaryOp::LessThanOrEqual => ("<=", COMPARISON),
        BinaryOp::Concat => ("&", CONCAT),
        _ => return None,
    };
    Some(entry)
}

/// Precedence of the infix operator `expr` renders as, if any.
fn binary_precedence(expr: &Expr) -> Option<u8> {
    match expr {
        Expr::Binary { op, left, right } if fold_constants(*op, left, right).is_none() => {
            binary_symbol(*op).map(|(_, p)| p)
        }
        Expr::Convert(inner) => binary_precedence(inner),
        _ => None,
    }
}

fn numeric_constant(expr: &Expr) -> Option<&CellValue> {
    match expr {
        Expr::Constant(v @ (CellValue::Int(_) | CellValue::Float(_))) => Some(v),
        Expr::Convert(inner) => numeric_constant(inner),
        _ => None,
    }
}

/// Fold arithmetic between two numeric constants (`1 - 2` → `-1`).
fn fold_constants(op: BinaryOp, left: &Expr, right: &Expr) -> Option<CellValue> {
    let (l, r) = (numeric_constant(left)?, numeric_constant(right)?);

    if let (CellValue::Int(a), CellValue::Int(b)) = (l, r) {
        let folded = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Subtract => a.checked_sub(*b),
            BinaryOp::Multiply => a.checked_mul(*b),
            _ => None,
        };
        if let Some(v) = folded {
            return Some(CellValue::Int(v));
        }
    }

    let (a, b) = (l.as_f64()?, r.as_f64()?);
    let folded = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide if b != 0.0 => a / b,
        _ => return None,
    };
    folded.is_finite().then_some(CellValue::Float(folded))
}

fn missing_key(name: &str) -> String {
    format!("ERROR key:{}", name)
}

fn render_constant(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Bool(b) => b.to_string().to_uppercase(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => format_number(*f),
        CellValue::Text(s) => quote(s),
        CellValue::Url(u) => quote(u.as_str()),
        CellValue::Date(d) => {
            let date = format!("DATE({},{},{})", d.year(), d.month(), d.day());
            if d.time() == NaiveTime::MIN {
                date
            } else {
                format!("{}+TIME({},{},{})", date, d.hour(), d.minute(), d.second())
            }
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

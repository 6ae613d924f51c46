//! Expression tree for formula columns
//!
//! Formulas are written with a small builder DSL instead of a parser:
//!
//! ```
//! use tabula::formula::ast::{col, lambda, lit};
//!
//! let profit = lambda("c", col("Revenue") - col("Cost"));
//! let flagged = lambda("c", col("Score").ge(lit(90)));
//! # let _ = (profit, flagged);
//! ```

use crate::types::{format_number, CellValue};
use std::fmt;
use std::ops;

/// Binary operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    /// Logical AND
    And,
    /// String concatenation
    Concat,
    Or,
    Modulo,
    Power,
    Coalesce,
}

impl BinaryOp {
    /// Source-level spelling, used for `Display`.
    pub fn source_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Concat => "++",
            BinaryOp::Or => "||",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
            BinaryOp::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
    Plus,
}

/// Family a static function call belongs to.
///
/// Every category except `Other` is rendered as an Excel function call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionCategory {
    Math,
    Statistics,
    Condition,
    Reference,
    DateTime,
    Text,
    /// Umbrella category covering all of the above
    All,
    /// Anything not on the whitelist; rendered as a diagnostic
    Other(String),
}

impl FunctionCategory {
    pub fn is_whitelisted(&self) -> bool {
        !matches!(self, FunctionCategory::Other(_))
    }

    fn source_name(&self) -> &str {
        match self {
            FunctionCategory::Math => "Math",
            FunctionCategory::Statistics => "Statistics",
            FunctionCategory::Condition => "Condition",
            FunctionCategory::Reference => "Reference",
            FunctionCategory::DateTime => "DateTime",
            FunctionCategory::Text => "Text",
            FunctionCategory::All => "All",
            FunctionCategory::Other(name) => name,
        }
    }
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Root: a lambda over the row accessor parameter(s)
    Lambda { params: Vec<String>, body: Box<Expr> },
    /// `c["name"]` or `c["name", row]`
    Column { name: String, row: Option<u32> },
    /// `c.Matrix("a", 1, "b", 2)`
    Matrix {
        start_column: String,
        start_row: u32,
        end_column: String,
        end_row: u32,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Static function call such as `Math.Abs(x)`
    Call {
        category: FunctionCategory,
        name: String,
        args: Vec<Expr>,
    },
    /// `date.AddMonths(n)`
    AddMonths { target: Box<Expr>, months: Box<Expr> },
    /// Property access; `target` is `None` for static members like `DateTime.Now`
    Member {
        target: Option<Box<Expr>>,
        name: String,
    },
    Constant(CellValue),
    /// Implicit widening conversion; transparent when compiled
    Convert(Box<Expr>),
    /// Variadic argument list
    Array(Vec<Expr>),
}

//==============================================================================
// Builder DSL
//==============================================================================

/// Wrap `body` in a lambda over one parameter.
pub fn lambda(param: impl Into<String>, body: Expr) -> Expr {
    Expr::Lambda {
        params: vec![param.into()],
        body: Box::new(body),
    }
}

/// Column value on the current row.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column {
        name: name.into(),
        row: None,
    }
}

/// Column value on a fixed (1-based) row.
pub fn col_at(name: impl Into<String>, row: u32) -> Expr {
    Expr::Column {
        name: name.into(),
        row: Some(row),
    }
}

/// Rectangular range between two column/row pairs.
pub fn matrix(
    start_column: impl Into<String>,
    start_row: u32,
    end_column: impl Into<String>,
    end_row: u32,
) -> Expr {
    Expr::Matrix {
        start_column: start_column.into(),
        start_row,
        end_column: end_column.into(),
        end_row,
    }
}

pub fn lit(value: impl Into<CellValue>) -> Expr {
    Expr::Constant(value.into())
}

pub fn call<I>(category: FunctionCategory, name: impl Into<String>, args: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    Expr::Call {
        category,
        name: name.into(),
        args: args.into_iter().collect(),
    }
}

pub fn array<I: IntoIterator<Item = Expr>>(items: I) -> Expr {
    Expr::Array(items.into_iter().collect())
}

/// `DateTime.Now`
pub fn now() -> Expr {
    Expr::Member {
        target: None,
        name: "Now".to_string(),
    }
}

impl Expr {
    fn binary(self, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }

    pub fn eq(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Equal, rhs)
    }

    pub fn ne(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::NotEqual, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::GreaterThan, rhs)
    }

    pub fn lt(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::LessThan, rhs)
    }

    pub fn ge(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::GreaterThanOrEqual, rhs)
    }

    pub fn le(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::LessThanOrEqual, rhs)
    }

    pub fn and(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn concat(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Concat, rhs)
    }

    pub fn not(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }

    pub fn member(self, name: impl Into<String>) -> Expr {
        Expr::Member {
            target: Some(Box::new(self)),
            name: name.into(),
        }
    }

    pub fn year(self) -> Expr {
        self.member("Year")
    }

    pub fn month(self) -> Expr {
        self.member("Month")
    }

    pub fn day(self) -> Expr {
        self.member("Day")
    }

    pub fn add_months(self, months: Expr) -> Expr {
        Expr::AddMonths {
            target: Box::new(self),
            months: Box::new(months),
        }
    }

    /// Mark an implicit numeric widening.
    pub fn widen(self) -> Expr {
        Expr::Convert(Box::new(self))
    }
}

macro_rules! impl_arith {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                self.binary($op, rhs)
            }
        }
    };
}

impl_arith!(Add, add, BinaryOp::Add);
impl_arith!(Sub, sub, BinaryOp::Subtract);
impl_arith!(Mul, mul, BinaryOp::Multiply);
impl_arith!(Div, div, BinaryOp::Divide);
impl_arith!(Rem, rem, BinaryOp::Modulo);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Negate,
            operand: Box::new(self),
        }
    }
}

//==============================================================================
// Source rendering
//==============================================================================

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lambda { params, body } => write!(f, "({}) => {}", params.join(", "), body),
            Expr::Column { name, row: None } => write!(f, "c[{:?}]", name),
            Expr::Column {
                name,
                row: Some(row),
            } => write!(f, "c[{:?}, {}]", name, row),
            Expr::Matrix {
                start_column,
                start_row,
                end_column,
                end_row,
            } => write!(
                f,
                "c.Matrix({:?}, {}, {:?}, {})",
                start_column, start_row, end_column, end_row
            ),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.source_symbol(), right)
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Negate => write!(f, "-({})", operand),
                UnaryOp::Not => write!(f, "!({})", operand),
                UnaryOp::Plus => write!(f, "+({})", operand),
            },
            Expr::Call {
                category,
                name,
                args,
            } => {
                write!(f, "{}.{}(", category.source_name(), name)?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::AddMonths { target, months } => write!(f, "{}.AddMonths({})", target, months),
            Expr::Member { target: None, name } => write!(f, "DateTime.{}", name),
            Expr::Member {
                target: Some(target),
                name,
            } => write!(f, "{}.{}", target, name),
            Expr::Constant(value) => match value {
                CellValue::Empty => f.write_str("null"),
                CellValue::Text(s) => write!(f, "{:?}", s),
                CellValue::Float(n) => write!(f, "{}f", format_number(*n)),
                CellValue::Date(d) => write!(f, "#{}#", d.format("%Y-%m-%dT%H:%M:%S")),
                CellValue::Url(u) => write!(f, "<{}>", u),
                CellValue::Bool(b) => write!(f, "{}", b),
                CellValue::Int(i) => write!(f, "{}", i),
            },
            Expr::Convert(inner) => write!(f, "(widen){}", inner),
            Expr::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
        }
    }
}

//! Expression tree.
//!
//! The node set is closed: references, literals, comparisons, boolean
//! combinators, arithmetic, conditionals, and two builtins.

use std::collections::BTreeSet;
use std::fmt;

use formlogic_foundation::Value;

/// Comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// The JsonLogic operator name.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    /// Sum of all operands.
    Add,
    /// Difference, or negation with one operand.
    Sub,
    /// Product of all operands.
    Mul,
    /// Quotient.
    Div,
    /// Remainder.
    Mod,
}

impl ArithOp {
    /// The JsonLogic operator name.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

/// A compiled expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Constant value.
    Literal(Value),
    /// Array whose items are expressions.
    Array(Vec<Expr>),
    /// Variable reference, optionally with a dotted path into its value.
    Var {
        /// Variable key or `key.path.into.value`.
        path: String,
        /// Used when the reference resolves to empty.
        default: Option<Box<Expr>>,
    },
    /// Binary comparison.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// True if every operand is `true`.
    And(Vec<Expr>),
    /// True if any operand is `true`.
    Or(Vec<Expr>),
    /// True if the operand is `false`.
    Not(Box<Expr>),
    /// Numeric operation.
    Arith {
        /// Operator.
        op: ArithOp,
        /// Operands, at least one.
        operands: Vec<Expr>,
    },
    /// First branch whose condition is `true`, else `otherwise`.
    If {
        /// `(condition, result)` pairs in order.
        branches: Vec<(Expr, Expr)>,
        /// Result when no condition holds.
        otherwise: Option<Box<Expr>>,
    },
    /// Substring or array membership.
    In {
        /// Value looked for.
        needle: Box<Expr>,
        /// String or array searched.
        haystack: Box<Expr>,
    },
    /// Converts an ISO 8601 string to a date.
    Date(Box<Expr>),
}

impl Expr {
    /// Creates a variable reference.
    #[must_use]
    pub fn var(path: impl Into<String>) -> Self {
        Self::Var {
            path: path.into(),
            default: None,
        }
    }

    /// Creates a literal.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a comparison.
    #[must_use]
    pub fn compare(op: CompareOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Returns every variable path referenced, sorted.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Literal(_) => {}
            Self::Var { path, default } => {
                out.insert(path.clone());
                if let Some(default) = default {
                    default.collect_variables(out);
                }
            }
            Self::Array(items) | Self::And(items) | Self::Or(items) => {
                for item in items {
                    item.collect_variables(out);
                }
            }
            Self::Arith { operands, .. } => {
                for item in operands {
                    item.collect_variables(out);
                }
            }
            Self::Compare { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Self::In { needle, haystack } => {
                needle.collect_variables(out);
                haystack.collect_variables(out);
            }
            Self::Not(inner) | Self::Date(inner) => inner.collect_variables(out),
            Self::If {
                branches,
                otherwise,
            } => {
                for (cond, then) in branches {
                    cond.collect_variables(out);
                    then.collect_variables(out);
                }
                if let Some(otherwise) = otherwise {
                    otherwise.collect_variables(out);
                }
            }
        }
    }
}

// Prefix rendering, used in logs and diagnostics.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, head: &str, items: &[Expr]) -> fmt::Result {
            write!(f, "({head}")?;
            for item in items {
                write!(f, " {item}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::Literal(Value::String(s)) => write!(f, "{s:?}"),
            Self::Literal(v) => write!(f, "{v}"),
            Self::Array(items) => list(f, "array", items),
            Self::Var { path, default: None } => write!(f, "{path}"),
            Self::Var {
                path,
                default: Some(d),
            } => write!(f, "(var {path} {d})"),
            Self::Compare { op, lhs, rhs } => write!(f, "({} {lhs} {rhs})", op.symbol()),
            Self::And(items) => list(f, "and", items),
            Self::Or(items) => list(f, "or", items),
            Self::Not(inner) => write!(f, "(not {inner})"),
            Self::Arith { op, operands } => list(f, op.symbol(), operands),
            Self::If {
                branches,
                otherwise,
            } => {
                write!(f, "(if")?;
                for (cond, then) in branches {
                    write!(f, " {cond} {then}")?;
                }
                if let Some(otherwise) = otherwise {
                    write!(f, " {otherwise}")?;
                }
                write!(f, ")")
            }
            Self::In { needle, haystack } => write!(f, "(in {needle} {haystack})"),
            Self::Date(inner) => write!(f, "(date {inner})"),
        }
    }
}

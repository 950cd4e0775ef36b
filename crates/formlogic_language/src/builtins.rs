//! Operator semantics on values.
//!
//! Every function here is total. Operands of the wrong type never raise:
//! comparisons answer `false` and arithmetic answers `Null`.

use std::cmp::Ordering;

use chrono::NaiveDate;
use formlogic_foundation::Value;
use formlogic_foundation::types::parse_date;

use crate::ast::{ArithOp, CompareOp};

// =============================================================================
// Comparison
// =============================================================================

/// Applies a comparison operator.
///
/// `==` and `!=` against `Null` compare emptiness: `Null`, `""`, and empty
/// collections all equal `Null`, and any other value differs from it.
/// Ordering operators never hold when either side is `Null`. Operands of
/// unrelated types make every operator `false`.
#[must_use]
pub fn compare(op: CompareOp, lhs: &Value, rhs: &Value) -> bool {
    match op {
        CompareOp::Eq | CompareOp::Ne => {
            let equal = match (lhs, rhs) {
                (Value::Null, _) | (_, Value::Null) => Some(lhs.is_empty() == rhs.is_empty()),
                _ => loose_eq(lhs, rhs),
            };
            match (op, equal) {
                (CompareOp::Eq, Some(eq)) => eq,
                (CompareOp::Ne, Some(eq)) => !eq,
                _ => false,
            }
        }
        CompareOp::Lt => order(lhs, rhs) == Some(Ordering::Less),
        CompareOp::Le => matches!(order(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => order(lhs, rhs) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            order(lhs, rhs),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Equality of two non-null values, or `None` if their types are unrelated.
#[allow(clippy::float_cmp)]
fn loose_eq(lhs: &Value, rhs: &Value) -> Option<bool> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Some(a == b),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::String(a), Value::String(b)) => Some(a == b),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            Some(lhs == rhs)
        }
        _ => match (as_date(lhs), as_date(rhs)) {
            (Some(a), Some(b)) if lhs.as_date().is_some() || rhs.as_date().is_some() => {
                Some(a == b)
            }
            _ => None,
        },
    }
}

/// Ordering of two values, or `None` if they are not ordered.
fn order(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ if lhs.as_date().is_some() || rhs.as_date().is_some() => {
            Some(as_date(lhs)?.cmp(&as_date(rhs)?))
        }
        _ => None,
    }
}

/// A date, or a string holding one. Strings only count next to a real date.
fn as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

/// Applies an arithmetic operator to already evaluated operands.
///
/// Any non-number operand, a zero divisor, or a wrong operand count gives
/// `Null`. A single operand to `-` negates it.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn arith(op: ArithOp, operands: &[Value]) -> Value {
    let Some(numbers) = operands
        .iter()
        .map(Value::as_number)
        .collect::<Option<Vec<f64>>>()
    else {
        return Value::Null;
    };

    let result: Option<f64> = match (op, numbers.as_slice()) {
        (_, []) => None,
        (ArithOp::Add, ns) => Some(ns.iter().sum()),
        (ArithOp::Mul, ns) => Some(ns.iter().product()),
        (ArithOp::Sub, [n]) => Some(-n),
        (ArithOp::Sub, [a, b]) => Some(a - b),
        (ArithOp::Div | ArithOp::Mod, [_, b]) if *b == 0.0 => None,
        (ArithOp::Div, [a, b]) => Some(a / b),
        (ArithOp::Mod, [a, b]) => Some(a % b),
        _ => None,
    };
    result.map_or(Value::Null, Value::Number)
}

// =============================================================================
// Builtins
// =============================================================================

/// Substring test for strings, membership test for arrays.
#[must_use]
pub fn contains(needle: &Value, haystack: &Value) -> bool {
    match (needle, haystack) {
        (Value::String(n), Value::String(h)) => h.contains(n.as_ref()),
        (_, Value::Array(items)) => items
            .iter()
            .any(|item| compare(CompareOp::Eq, needle, item)),
        _ => false,
    }
}

/// Converts a value to a date, or `Null` if it is not one.
#[must_use]
pub fn to_date(value: &Value) -> Value {
    match value {
        Value::Date(_) => value.clone(),
        Value::String(s) => parse_date(s).map_or(Value::Null, Value::Date),
        _ => Value::Null,
    }
}

//! JsonLogic to expression tree.
//!
//! A JSON object with exactly one key whose name is an operator is an
//! operation; its argument is an array of operands or a single operand.
//! Scalars are literals, arrays are arrays of expressions, and any other
//! object is literal data.

use formlogic_foundation::{Error, Result, Value};
use serde_json::Value as Json;

use crate::ast::{ArithOp, CompareOp, Expr};

/// Compiles a JsonLogic document.
///
/// # Errors
/// Returns `InvalidExpression` for an unknown operator, a wrong operand
/// count, or a malformed `var`.
pub fn compile(source: &Json) -> Result<Expr> {
    match source {
        Json::Array(items) => items.iter().map(compile).collect::<Result<_>>().map(Expr::Array),
        Json::Object(entries) => match entries.iter().next() {
            Some((op, args)) if entries.len() == 1 => compile_operation(op, args),
            _ => Ok(Expr::Literal(Value::from(source))),
        },
        other => Ok(Expr::Literal(Value::from(other))),
    }
}

/// Parses and compiles a JsonLogic document from text.
///
/// # Errors
/// Returns `Serialization` for malformed JSON, or any error of [`compile`].
pub fn compile_str(source: &str) -> Result<Expr> {
    let json: Json = serde_json::from_str(source)?;
    compile(&json)
}

fn compile_operation(op: &str, args: &Json) -> Result<Expr> {
    let operands: Vec<&Json> = match args {
        Json::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    match op {
        "var" => compile_var(&operands),
        "==" | "===" => binary(op, CompareOp::Eq, &operands),
        "!=" | "!==" => binary(op, CompareOp::Ne, &operands),
        ">" => binary(op, CompareOp::Gt, &operands),
        ">=" => binary(op, CompareOp::Ge, &operands),
        "<" => between(op, CompareOp::Lt, &operands),
        "<=" => between(op, CompareOp::Le, &operands),
        "and" => Ok(Expr::And(at_least(op, 1, &operands)?)),
        "or" => Ok(Expr::Or(at_least(op, 1, &operands)?)),
        "!" | "not" => {
            let [inner] = exactly::<1>(op, &operands)?;
            Ok(Expr::Not(Box::new(inner)))
        }
        "+" => arith(op, ArithOp::Add, 1, usize::MAX, &operands),
        "*" => arith(op, ArithOp::Mul, 1, usize::MAX, &operands),
        "-" => arith(op, ArithOp::Sub, 1, 2, &operands),
        "/" => arith(op, ArithOp::Div, 2, 2, &operands),
        "%" => arith(op, ArithOp::Mod, 2, 2, &operands),
        "if" | "?:" => compile_if(op, &operands),
        "in" => {
            let [needle, haystack] = exactly::<2>(op, &operands)?;
            Ok(Expr::In {
                needle: Box::new(needle),
                haystack: Box::new(haystack),
            })
        }
        "date" => {
            let [inner] = exactly::<1>(op, &operands)?;
            Ok(Expr::Date(Box::new(inner)))
        }
        _ => Err(Error::invalid_expression(format!("unknown operator `{op}`"))),
    }
}

fn compile_var(operands: &[&Json]) -> Result<Expr> {
    let path = match operands.first() {
        Some(Json::String(s)) if !s.is_empty() => s.clone(),
        Some(Json::Number(n)) => n.to_string(),
        _ => {
            return Err(Error::invalid_expression(
                "`var` needs a non-empty variable path",
            ));
        }
    };
    let default = match operands {
        [_] => None,
        [_, default] => Some(Box::new(compile(default)?)),
        _ => return Err(arity("var", "1 or 2", operands.len())),
    };
    Ok(Expr::Var { path, default })
}

fn compile_if(op: &str, operands: &[&Json]) -> Result<Expr> {
    let mut compiled = at_least(op, 1, operands)?;
    let otherwise = if compiled.len() % 2 == 1 {
        compiled.pop().map(Box::new)
    } else {
        None
    };

    let mut branches = Vec::with_capacity(compiled.len() / 2);
    let mut items = compiled.into_iter();
    while let (Some(cond), Some(then)) = (items.next(), items.next()) {
        branches.push((cond, then));
    }
    Ok(Expr::If {
        branches,
        otherwise,
    })
}

fn binary(op: &str, cmp: CompareOp, operands: &[&Json]) -> Result<Expr> {
    let [lhs, rhs] = exactly::<2>(op, operands)?;
    Ok(Expr::compare(cmp, lhs, rhs))
}

// `{"<": [a, b, c]}` reads as `a < b < c`.
fn between(op: &str, cmp: CompareOp, operands: &[&Json]) -> Result<Expr> {
    if operands.len() != 3 {
        return binary(op, cmp, operands);
    }
    let [low, mid, high] = exactly::<3>(op, operands)?;
    Ok(Expr::And(vec![
        Expr::compare(cmp, low, mid.clone()),
        Expr::compare(cmp, mid, high),
    ]))
}

fn arith(op: &str, arith: ArithOp, min: usize, max: usize, operands: &[&Json]) -> Result<Expr> {
    if operands.len() > max {
        return Err(arity(op, &format!("at most {max}"), operands.len()));
    }
    Ok(Expr::Arith {
        op: arith,
        operands: at_least(op, min, operands)?,
    })
}

fn at_least(op: &str, min: usize, operands: &[&Json]) -> Result<Vec<Expr>> {
    if operands.len() < min {
        return Err(arity(op, &format!("at least {min}"), operands.len()));
    }
    operands.iter().map(|json| compile(json)).collect()
}

fn exactly<const N: usize>(op: &str, operands: &[&Json]) -> Result<[Expr; N]> {
    let compiled = operands
        .iter()
        .map(|json| compile(json))
        .collect::<Result<Vec<_>>>()?;
    compiled
        .try_into()
        .map_err(|v: Vec<Expr>| arity(op, &N.to_string(), v.len()))
}

fn arity(op: &str, expected: &str, got: usize) -> Error {
    Error::invalid_expression(format!(
        "`{op}` takes {expected} operand(s), got {got}"
    ))
}

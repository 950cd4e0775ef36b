//! Expression evaluation.
//!
//! Evaluation is pure and total: it never fails and never writes. Every
//! variable the expression actually consults is recorded as a [`Read`] so
//! the caller can tell whether a result was computed from stale input.

use std::collections::{BTreeMap, HashMap};

use formlogic_foundation::Value;

use crate::ast::Expr;
use crate::builtins;

// =============================================================================
// Variable Lookup
// =============================================================================

/// Source of variable values for an evaluation.
pub trait VariableLookup {
    /// Returns the value of `key`, or `None` if no such variable exists.
    fn lookup(&self, key: &str) -> Option<&Value>;
}

impl VariableLookup for BTreeMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl<S: std::hash::BuildHasher> VariableLookup for HashMap<String, Value, S> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl<L: VariableLookup + ?Sized> VariableLookup for &L {
    fn lookup(&self, key: &str) -> Option<&Value> {
        (**self).lookup(key)
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// One variable consulted during evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Read {
    /// The variable key (for dotted paths, the variable holding the value).
    pub key: String,
    /// The whole value of that variable at the time of the read.
    pub value: Value,
}

/// Evaluates expressions against a lookup, recording reads.
pub struct Evaluator<'a, L: ?Sized> {
    vars: &'a L,
    reads: Vec<Read>,
}

impl<'a, L: VariableLookup + ?Sized> Evaluator<'a, L> {
    /// Creates an evaluator reading from `vars`.
    #[must_use]
    pub fn new(vars: &'a L) -> Self {
        Self {
            vars,
            reads: Vec::new(),
        }
    }

    /// Evaluates an expression to a value.
    pub fn eval(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(value) => value.clone(),
            Expr::Array(items) => Value::Array(items.iter().map(|e| self.eval(e)).collect()),
            Expr::Var { path, default } => {
                let value = self.resolve(path);
                match default {
                    Some(default) if value.is_null() => self.eval(default),
                    _ => value,
                }
            }
            Expr::Compare { op, lhs, rhs } => {
                let lhs = self.eval(lhs);
                let rhs = self.eval(rhs);
                Value::Bool(builtins::compare(*op, &lhs, &rhs))
            }
            Expr::And(items) => Value::Bool(items.iter().all(|e| self.condition(e))),
            Expr::Or(items) => Value::Bool(items.iter().any(|e| self.condition(e))),
            Expr::Not(inner) => match self.eval(inner) {
                Value::Bool(b) => Value::Bool(!b),
                _ => Value::Bool(false),
            },
            Expr::Arith { op, operands } => {
                let values: Vec<Value> = operands.iter().map(|e| self.eval(e)).collect();
                builtins::arith(*op, &values)
            }
            Expr::If {
                branches,
                otherwise,
            } => {
                for (cond, then) in branches {
                    if self.condition(cond) {
                        return self.eval(then);
                    }
                }
                otherwise.as_ref().map_or(Value::Null, |e| self.eval(e))
            }
            Expr::In { needle, haystack } => {
                let needle = self.eval(needle);
                let haystack = self.eval(haystack);
                Value::Bool(builtins::contains(&needle, &haystack))
            }
            Expr::Date(inner) => builtins::to_date(&self.eval(inner)),
        }
    }

    /// Evaluates an expression as a condition. Only `true` holds.
    pub fn condition(&mut self, expr: &Expr) -> bool {
        matches!(self.eval(expr), Value::Bool(true))
    }

    /// Returns the reads recorded so far.
    #[must_use]
    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    /// Consumes the evaluator, returning its reads.
    #[must_use]
    pub fn into_reads(self) -> Vec<Read> {
        self.reads
    }

    // A dotted path resolves against the longest prefix that names a
    // variable; a key containing dots wins over descending into a value.
    fn resolve(&mut self, path: &str) -> Value {
        let vars = self.vars;
        let mut split = Some(path.len());
        while let Some(end) = split {
            let (key, rest) = path.split_at(end);
            if let Some(root) = vars.lookup(key) {
                self.record(key, root);
                let rest = rest.strip_prefix('.').unwrap_or(rest);
                return descend(root, rest).cloned().unwrap_or(Value::Null);
            }
            split = key.rfind('.');
        }
        self.record(path, &Value::Null);
        Value::Null
    }

    fn record(&mut self, key: &str, value: &Value) {
        if !self.reads.iter().any(|r| r.key == key) {
            self.reads.push(Read {
                key: key.to_string(),
                value: value.clone(),
            });
        }
    }
}

fn descend<'v>(root: &'v Value, rest: &str) -> Option<&'v Value> {
    if rest.is_empty() {
        return Some(root);
    }
    rest.split('.')
        .try_fold(root, |value, segment| value.child(segment))
}

/// Evaluates an expression without keeping reads.
#[must_use]
pub fn evaluate<L: VariableLookup + ?Sized>(expr: &Expr, vars: &L) -> Value {
    Evaluator::new(vars).eval(expr)
}

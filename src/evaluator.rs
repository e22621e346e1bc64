use crate::ast::{ArithOp, CompareOp, Expr};
use crate::error::{CelError, Span};
use crate::value::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Caller-supplied identifier bindings, read-only during evaluation.
///
/// Backed by a sorted map so the snapshot embedded in undefined-identifier
/// messages is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compact JSON rendering of the whole context, e.g. `{"b":2}`.
    pub fn snapshot(&self) -> String {
        let mut out = String::from("{");
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('"');
            out.push_str(name);
            out.push_str("\":");
            out.push_str(&value.to_json());
        }
        out.push('}');
        out
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(values: HashMap<String, Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Bottom-up tree walk over the CST. Holds only a borrow of the optional
/// context; neither the context nor the tree is ever mutated.
pub struct Evaluator<'a> {
    context: Option<&'a Context>,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: Option<&'a Context>) -> Self {
        Self { context }
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, CelError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Identifier { name, span } => self.lookup_identifier(name, span),
            Expr::Reserved { span, .. } => Err(CelError::reserved_identifier(span.clone())),
            Expr::Comparison {
                left,
                operator,
                right,
                span,
            } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_comparison(operator, left_val, right_val, span)
            }
            Expr::Additive {
                left,
                operator,
                right,
                span,
            } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_additive(operator, left_val, right_val, span)
            }
            Expr::Grouping { expr, .. } => self.evaluate(expr),
            Expr::List { elements, .. } => {
                let mut list_values = Vec::new();
                for element in elements {
                    list_values.push(self.evaluate(element)?);
                }
                Ok(Value::List(list_values))
            }
            Expr::Map { entries, .. } => {
                let mut map_values = HashMap::new();
                for (key, value_expr) in entries {
                    let value = self.evaluate(value_expr)?;
                    // Duplicate keys: last write wins
                    map_values.insert(key.clone(), value);
                }
                Ok(Value::Map(map_values))
            }
            Expr::Member { object, name, span } => {
                let object_val = self.evaluate(object)?;
                match object_val {
                    Value::Map(map) => map_lookup(&map, name, span),
                    other => Err(CelError::type_mismatch(
                        span.clone(),
                        format!("Dot access not supported for {}", other.type_name()),
                    )),
                }
            }
            Expr::Index {
                object,
                index,
                span,
            } => {
                let object_val = self.evaluate(object)?;
                let index_val = self.evaluate(index)?;
                match object_val {
                    Value::Map(map) => match index_val {
                        Value::String(key) => map_lookup(&map, &key, span),
                        Value::Int(n) => map_lookup(&map, &n.to_string(), span),
                        Value::Uint(n) => map_lookup(&map, &n.to_string(), span),
                        other => Err(CelError::index_type_mismatch(
                            span.clone(),
                            format!(
                                "Map key must be a string or integer, found {}",
                                other.type_name()
                            ),
                        )),
                    },
                    Value::List(list) => {
                        let index = match index_val {
                            Value::Int(n) => n,
                            Value::Uint(n) => i64::try_from(n).unwrap_or(i64::MAX),
                            other => {
                                return Err(CelError::index_type_mismatch(
                                    span.clone(),
                                    format!(
                                        "List index must be an integer, found {}",
                                        other.type_name()
                                    ),
                                ))
                            }
                        };
                        if index < 0 || index as usize >= list.len() {
                            return Err(CelError::index_out_of_range(
                                span.clone(),
                                index,
                                list.len(),
                            ));
                        }
                        Ok(list[index as usize].clone())
                    }
                    other => Err(CelError::type_mismatch(
                        span.clone(),
                        format!("Cannot index into {}", other.type_name()),
                    )),
                }
            }
        }
    }

    fn lookup_identifier(&self, name: &str, span: &Span) -> Result<Value, CelError> {
        match self.context {
            None => Err(CelError::undefined_identifier(
                span.clone(),
                format!("Identifier \"{}\" not found, no context passed", name),
            )),
            Some(context) => context.get(name).cloned().ok_or_else(|| {
                CelError::undefined_identifier(
                    span.clone(),
                    format!(
                        "Identifier \"{}\" not found in context: {}",
                        name,
                        context.snapshot()
                    ),
                )
            }),
        }
    }

    fn evaluate_comparison(
        &self,
        operator: &CompareOp,
        left: Value,
        right: Value,
        span: &Span,
    ) -> Result<Value, CelError> {
        match operator {
            CompareOp::Equal => Ok(Value::Bool(is_equal(&left, &right))),
            CompareOp::NotEqual => Ok(Value::Bool(!is_equal(&left, &right))),
            CompareOp::In => self.evaluate_membership(left, right, span),
            _ => {
                let ordering = numeric_ordering(&left, &right).ok_or_else(|| {
                    CelError::type_mismatch(
                        span.clone(),
                        format!(
                            "Cannot compare {} and {}",
                            left.type_name(),
                            right.type_name()
                        ),
                    )
                })?;

                let result = match operator {
                    CompareOp::Less => ordering == Ordering::Less,
                    CompareOp::LessEqual => ordering != Ordering::Greater,
                    CompareOp::Greater => ordering == Ordering::Greater,
                    CompareOp::GreaterEqual => ordering != Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(Value::Bool(result))
            }
        }
    }

    fn evaluate_additive(
        &self,
        operator: &ArithOp,
        left: Value,
        right: Value,
        span: &Span,
    ) -> Result<Value, CelError> {
        let (l, r) = match (as_numeric(&left), as_numeric(&right)) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                let verb = match operator {
                    ArithOp::Add => "add",
                    ArithOp::Subtract => "subtract",
                };
                return Err(CelError::type_mismatch(
                    span.clone(),
                    format!(
                        "Cannot {} {} and {}",
                        verb,
                        left.type_name(),
                        right.type_name()
                    ),
                ));
            }
        };

        let result = match operator {
            ArithOp::Add => l + r,
            ArithOp::Subtract => l - r,
        };

        // Unsigned operands stay unsigned when the result allows it;
        // everything else narrows to a signed integer.
        if matches!(left, Value::Uint(_)) && matches!(right, Value::Uint(_)) {
            if let Ok(n) = u64::try_from(result) {
                return Ok(Value::Uint(n));
            }
        }
        if let Ok(n) = i64::try_from(result) {
            Ok(Value::Int(n))
        } else if let Ok(n) = u64::try_from(result) {
            Ok(Value::Uint(n))
        } else {
            Err(CelError::type_mismatch(
                span.clone(),
                "Arithmetic overflow".to_string(),
            ))
        }
    }

    fn evaluate_membership(
        &self,
        left: Value,
        right: Value,
        span: &Span,
    ) -> Result<Value, CelError> {
        match right {
            Value::List(list) => {
                if !matches!(left, Value::String(_) | Value::Int(_) | Value::Uint(_)) {
                    return Err(CelError::type_mismatch_with_help(
                        span.clone(),
                        format!(
                            "List membership requires a string or integer, found {}",
                            left.type_name()
                        ),
                        "Use 'in' with a string or integer candidate. Example: 2 in [1, 2, 3]"
                            .to_string(),
                    ));
                }
                Ok(Value::Bool(list.iter().any(|item| is_equal(&left, item))))
            }
            Value::Map(map) => match left {
                Value::String(key) => Ok(Value::Bool(map.contains_key(&key))),
                Value::Int(n) => Ok(Value::Bool(map.contains_key(&n.to_string()))),
                Value::Uint(n) => Ok(Value::Bool(map.contains_key(&n.to_string()))),
                other => Err(CelError::type_mismatch_with_help(
                    span.clone(),
                    format!(
                        "Map membership requires a string or integer key, found {}",
                        other.type_name()
                    ),
                    "Use 'in' with maps like: \"key\" in {\"key\": 1}".to_string(),
                )),
            },
            other => Err(CelError::type_mismatch_with_help(
                span.clone(),
                format!("'in' operator not supported for {}", other.type_name()),
                "The 'in' operator tests list elements and map keys. Examples: 2 in [1, 2], \"k\" in {\"k\": 1}".to_string(),
            )),
        }
    }
}

/// Shared by dot and bracket access so an absent key produces the identical
/// message for both syntaxes.
fn map_lookup(map: &HashMap<String, Value>, key: &str, span: &Span) -> Result<Value, CelError> {
    map.get(key)
        .cloned()
        .ok_or_else(|| CelError::key_not_found(span.clone(), key))
}

fn as_numeric(value: &Value) -> Option<i128> {
    match value {
        Value::Int(n) => Some(*n as i128),
        Value::Uint(n) => Some(*n as i128),
        _ => None,
    }
}

fn numeric_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (as_numeric(left), as_numeric(right)) {
        (Some(l), Some(r)) => Some(l.cmp(&r)),
        _ => None,
    }
}

/// Structural equality: numbers by value irrespective of the signed/unsigned
/// tag, lists element-wise in order, maps as unordered key/value sets.
fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len() && l.iter().zip(r.iter()).all(|(a, b)| is_equal(a, b))
        }
        (Value::Map(l), Value::Map(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(k, v)| r.get(k).is_some_and(|rv| is_equal(v, rv)))
        }
        _ => match (as_numeric(left), as_numeric(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

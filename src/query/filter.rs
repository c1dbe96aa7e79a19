//! Condition evaluation against a single document.

use std::cmp::Ordering;

use serde_json::Value;

use super::Operator;

/// Resolve a dot-separated path; `null` resolves to absent
pub(super) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

pub(super) fn evaluate(operator: &Operator, field: Option<&Value>) -> bool {
    let Some(field) = field else {
        return matches!(operator, Operator::Exists(false));
    };

    match operator {
        Operator::Eq(expected) => values_equal(field, expected),
        Operator::Ne(expected) => !values_equal(field, expected),
        Operator::In(set) => set.iter().any(|v| values_equal(field, v)),
        Operator::NotIn(set) => !set.iter().any(|v| values_equal(field, v)),
        Operator::Gt(bound) => compare_scalars(field, bound) == Some(Ordering::Greater),
        Operator::Gte(bound) => matches!(
            compare_scalars(field, bound),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt(bound) => compare_scalars(field, bound) == Some(Ordering::Less),
        Operator::Lte(bound) => matches!(
            compare_scalars(field, bound),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Exists(present) => *present,
    }
}

/// JSON equality with numbers compared by value (`30 == 30.0`)
pub(super) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Natural ordering between two values of the same scalar type
///
/// `None` for mixed types, arrays, objects and nulls.
pub(super) fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

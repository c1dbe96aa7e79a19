//! Query Engine
//!
//! Queries run in-process over decoded documents after a scan of the kind's
//! key range; there are no indexes.
//!
//! - [`Query`]: ANDed field conditions, evaluated by [`Query::matches`]
//! - [`comparator`]: ordering of documents by one field, for `order_by`
//!
//! ## Field semantics
//! - Paths are dot-separated (`"owner.name"`) and walk nested objects.
//! - JSON `null` counts as absent: it is what `Option::None` serializes to.
//! - An absent field fails every operator except `Exists(false)`.

mod filter;
mod sort;

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

pub use sort::{comparator, Direction};

/// A comparison applied to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Eq(Value),
    Ne(Value),
    /// Field equals one of the values
    In(Vec<Value>),
    /// Field is present and equals none of the values
    NotIn(Vec<Value>),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    /// `true`: field present; `false`: field absent
    Exists(bool),
}

/// One field path plus the operator it must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub operator: Operator,
}

/// Conjunction of conditions; the empty query matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary condition
    pub fn condition(mut self, path: impl Into<String>, operator: Operator) -> Self {
        self.conditions.push(Condition {
            path: path.into(),
            operator,
        });
        self
    }

    pub fn eq(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(path, Operator::Eq(value.into()))
    }

    pub fn ne(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(path, Operator::Ne(value.into()))
    }

    pub fn is_in<I, V>(self, path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.condition(path, Operator::In(values))
    }

    pub fn not_in<I, V>(self, path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.condition(path, Operator::NotIn(values))
    }

    pub fn gt(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(path, Operator::Gt(value.into()))
    }

    pub fn gte(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(path, Operator::Gte(value.into()))
    }

    pub fn lt(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(path, Operator::Lt(value.into()))
    }

    pub fn lte(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(path, Operator::Lte(value.into()))
    }

    pub fn exists(self, path: impl Into<String>, present: bool) -> Self {
        self.condition(path, Operator::Exists(present))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True if `document` satisfies every condition
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|c| filter::evaluate(&c.operator, filter::lookup(document, &c.path)))
    }

    /// Parse the JSON query form used by tooling
    ///
    /// ```text
    /// {"age": {"gte": 30}, "name": "bob", "role": {"in": ["admin", "owner"]}}
    /// ```
    ///
    /// A bare value means equality. An object is an operator object only if
    /// every key is an operator name (`eq ne in nin gt gte lt lte exists`);
    /// otherwise it is matched for equality as-is.
    pub fn from_json(value: &Value) -> StoreResult<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| StoreError::InvalidQuery("query must be a JSON object".to_string()))?;

        let mut query = Query::new();
        for (path, clause) in fields {
            match clause {
                Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| is_operator(k)) => {
                    for (op, operand) in ops {
                        query = query.condition(path.clone(), parse_operator(path, op, operand)?);
                    }
                }
                other => query = query.eq(path.clone(), other.clone()),
            }
        }
        Ok(query)
    }

    /// Parse the JSON query form from text
    pub fn parse(text: &str) -> StoreResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| StoreError::InvalidQuery(format!("not valid JSON: {}", e)))?;
        Self::from_json(&value)
    }

    /// Inverse of [`Query::from_json`] for queries without duplicate fields
    pub fn to_json(&self) -> Value {
        let mut fields = Map::new();
        for c in &self.conditions {
            let (name, operand) = match &c.operator {
                Operator::Eq(v) => ("eq", v.clone()),
                Operator::Ne(v) => ("ne", v.clone()),
                Operator::In(vs) => ("in", Value::Array(vs.clone())),
                Operator::NotIn(vs) => ("nin", Value::Array(vs.clone())),
                Operator::Gt(v) => ("gt", v.clone()),
                Operator::Gte(v) => ("gte", v.clone()),
                Operator::Lt(v) => ("lt", v.clone()),
                Operator::Lte(v) => ("lte", v.clone()),
                Operator::Exists(b) => ("exists", Value::Bool(*b)),
            };
            let entry = fields
                .entry(c.path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(ops) = entry {
                ops.insert(name.to_string(), operand);
            }
        }
        Value::Object(fields)
    }
}

const OPERATORS: [&str; 9] = ["eq", "ne", "in", "nin", "gt", "gte", "lt", "lte", "exists"];

fn is_operator(name: &str) -> bool {
    OPERATORS.contains(&name)
}

fn parse_operator(path: &str, op: &str, operand: &Value) -> StoreResult<Operator> {
    let set = || -> StoreResult<Vec<Value>> {
        operand.as_array().cloned().ok_or_else(|| {
            StoreError::InvalidQuery(format!("'{}' on '{}' expects an array", op, path))
        })
    };

    Ok(match op {
        "eq" => Operator::Eq(operand.clone()),
        "ne" => Operator::Ne(operand.clone()),
        "in" => Operator::In(set()?),
        "nin" => Operator::NotIn(set()?),
        "gt" => Operator::Gt(operand.clone()),
        "gte" => Operator::Gte(operand.clone()),
        "lt" => Operator::Lt(operand.clone()),
        "lte" => Operator::Lte(operand.clone()),
        "exists" => Operator::Exists(operand.as_bool().ok_or_else(|| {
            StoreError::InvalidQuery(format!("'exists' on '{}' expects a boolean", path))
        })?),
        _ => return Err(StoreError::InvalidQuery(format!("unknown operator '{}'", op))),
    })
}

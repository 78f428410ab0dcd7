//! Condition building for JSON columns
//!
//! Flattens a nested condition tree over a JSON column into a list of leaf
//! comparisons, one per scalar or operator entry:
//!
//! ```text
//! {"meta": {"tags": {"0": "red"}, "age": {"$gt": 18}}}
//!   -> json_extract(`meta`, '$.age') > 18
//!   -> json_extract(`meta`, '$.tags[0]') = 'red'
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{QueryGeneratorError, Result};
use crate::generator::QueryGenerator;
use crate::sql::expression::{CastExpression, Expression};
use crate::sql::json::{ColumnRef, JsonPath, is_cast_type, split_cast};
use crate::sql::operator::Operator;
use crate::types::SqlValue;

/// Cast used when comparing against dates
pub const TEMPORAL_CAST: &str = "datetime";

/// Cast used when comparing against the NULL marker
pub const CHARACTER_CAST: &str = "char";

/// A node of a nested JSON condition tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// Compare the current path for equality with a value
    Leaf(SqlValue),
    /// Compare the current path with an explicit operator
    Operator(Operator, SqlValue),
    /// Property names (descend) and `$`-operator keys (compare here)
    Nested(IndexMap<String, ConditionNode>),
}

impl ConditionNode {
    pub fn leaf(value: impl Into<SqlValue>) -> Self {
        ConditionNode::Leaf(value.into())
    }

    pub fn op(operator: Operator, value: impl Into<SqlValue>) -> Self {
        ConditionNode::Operator(operator, value.into())
    }

    pub fn nested<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ConditionNode)>,
        K: Into<String>,
    {
        ConditionNode::Nested(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parse a `column -> condition` map from JSON, keeping key order
    pub fn from_json(json: &str) -> Result<IndexMap<String, ConditionNode>> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNode {
    Nested(IndexMap<String, ConditionNode>),
    Leaf(SqlValue),
}

impl<'de> Deserialize<'de> for ConditionNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawNode::deserialize(deserializer)? {
            RawNode::Nested(entries) => ConditionNode::Nested(entries),
            RawNode::Leaf(value) => ConditionNode::Leaf(value),
        })
    }
}

impl Serialize for ConditionNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ConditionNode::Leaf(value) => value.serialize(serializer),
            ConditionNode::Operator(op, value) => {
                let mut entry = IndexMap::new();
                entry.insert(op.key(), value);
                entry.serialize(serializer)
            }
            ConditionNode::Nested(entries) => entries.serialize(serializer),
        }
    }
}

/// Flatten `node`, rooted at `path` below `column`, into leaf comparisons
///
/// Clauses come out in pre-order: a node's own operator entries first, then
/// its properties in encounter order. Join them with ` AND `.
pub fn flatten_conditions<G>(
    generator: &G,
    column: &str,
    path: &[String],
    node: &ConditionNode,
) -> Result<Vec<String>>
where
    G: QueryGenerator + ?Sized,
{
    let mut clauses = Vec::new();
    traverse(generator, column, path, node, &mut clauses)?;
    Ok(clauses)
}

fn traverse<G>(
    generator: &G,
    column: &str,
    path: &[String],
    node: &ConditionNode,
    clauses: &mut Vec<String>,
) -> Result<()>
where
    G: QueryGenerator + ?Sized,
{
    // Work on a copy; the caller's path keeps its cast suffix.
    let mut keys = path.to_vec();
    let mut cast = None;
    if let Some(last) = path.last() {
        let (name, annotation) = split_cast(last);
        if let Some(annotation) = annotation {
            if !is_cast_type(annotation) {
                tracing::warn!(column, key = %last, "rejecting cast annotation");
                return Err(QueryGeneratorError::invalid_condition(format!(
                    "invalid cast type '{}'",
                    annotation
                )));
            }
            cast = Some(annotation);
            if let Some(slot) = keys.last_mut() {
                *slot = name.to_string();
            }
        }
    }

    let extraction =
        generator.json_path_extraction(ColumnRef::Identifier(column), &JsonPath::from_keys(&keys));

    match node {
        ConditionNode::Nested(entries) => {
            for (key, child) in entries {
                if let Some(op) = Operator::from_key(key) {
                    let value = operand(op, child)?;
                    clauses.push(compare(generator, &extraction, cast, op, value)?);
                }
            }
            for (key, child) in entries {
                if Operator::from_key(key).is_none() {
                    let mut child_path = keys.clone();
                    child_path.push(key.clone());
                    traverse(generator, column, &child_path, child, clauses)?;
                }
            }
        }
        ConditionNode::Leaf(value) => {
            clauses.push(compare(generator, &extraction, cast, Operator::Eq, value)?);
        }
        ConditionNode::Operator(op, value) => {
            clauses.push(compare(generator, &extraction, cast, *op, value)?);
        }
    }

    Ok(())
}

fn operand(op: Operator, node: &ConditionNode) -> Result<&SqlValue> {
    match node {
        ConditionNode::Leaf(value) => Ok(value),
        _ => Err(QueryGeneratorError::invalid_condition(format!(
            "{} expects a value operand",
            op.key()
        ))),
    }
}

fn compare<G>(
    generator: &G,
    extraction: &str,
    explicit_cast: Option<&str>,
    op: Operator,
    value: &SqlValue,
) -> Result<String>
where
    G: QueryGenerator + ?Sized,
{
    let key = match explicit_cast.or_else(|| infer_cast(value)) {
        Some(target) => generator.render_expression(&Expression::Cast(CastExpression::new(
            Expression::Extraction(extraction.to_string()),
            target,
        )))?,
        None => extraction.to_string(),
    };
    generator.where_item(&key, op, value)
}

/// Cast implied by a comparison value's shape
///
/// Lists infer from their first element.
pub fn infer_cast(value: &SqlValue) -> Option<&'static str> {
    match value {
        SqlValue::List(items) => items.first().and_then(infer_cast),
        v if v.is_temporal() => Some(TEMPORAL_CAST),
        SqlValue::Null => Some(CHARACTER_CAST),
        _ => None,
    }
}

/// Render `<key> <operator> <value>`
///
/// NULL is written as the bare `NULL` token and list operators get a
/// parenthesised operand list.
pub fn build_where_item<G>(generator: &G, key: &str, op: Operator, value: &SqlValue) -> Result<String>
where
    G: QueryGenerator + ?Sized,
{
    let rhs = match value {
        SqlValue::List(items) if op.takes_list() => {
            if items.is_empty() {
                "(NULL)".to_string()
            } else {
                let rendered: Vec<String> = items.iter().map(|v| generator.escape(v)).collect();
                format!("({})", rendered.join(", "))
            }
        }
        _ if op.takes_list() => {
            return Err(QueryGeneratorError::invalid_condition(format!(
                "{} requires a list value",
                op.key()
            )));
        }
        SqlValue::List(_) => {
            return Err(QueryGeneratorError::invalid_condition(format!(
                "{} does not accept a list value",
                op.key()
            )));
        }
        SqlValue::Null => "NULL".to_string(),
        other => generator.escape(other),
    };

    Ok(format!("{} {} {}", key, generator.operator_sql(op), rhs))
}

//! Renderable SQL expression nodes
//!
//! The dialect-neutral rendering lives here; a generator's
//! `render_expression` decides which node kinds it handles itself and hands
//! the rest to [`render_generic`].

use indexmap::IndexMap;

use crate::error::{QueryGeneratorError, Result};
use crate::generator::QueryGenerator;
use crate::sql::condition::ConditionNode;
use crate::sql::json::{ColumnRef, JsonPath, PathSegment, classify_json_statement, is_cast_type};
use crate::types::SqlValue;

/// An expression that can appear in a generated statement
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Json(JsonExpression),
    Cast(CastExpression),
    /// Already-rendered JSON extraction SQL
    Extraction(String),
    /// Raw SQL, emitted verbatim
    Literal(String),
    /// Column reference, possibly dotted (`table.column`)
    Identifier(String),
    Value(SqlValue),
    Function(FunctionCall),
}

impl Expression {
    pub fn json_path(path: impl Into<String>) -> Self {
        Expression::Json(JsonExpression::Path {
            path: path.into(),
            value: None,
        })
    }

    pub fn json_path_eq(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Expression::Json(JsonExpression::Path {
            path: path.into(),
            value: Some(value.into()),
        })
    }

    pub fn json_conditions(conditions: IndexMap<String, ConditionNode>) -> Self {
        Expression::Json(JsonExpression::Conditions(conditions))
    }

    pub fn cast(inner: Expression, target: impl Into<String>) -> Self {
        Expression::Cast(CastExpression::new(inner, target))
    }

    pub fn function<I>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = Expression>,
    {
        Expression::Function(FunctionCall {
            name: name.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn literal(sql: impl Into<String>) -> Self {
        Expression::Literal(sql.into())
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn value(value: impl Into<SqlValue>) -> Self {
        Expression::Value(value.into())
    }

    /// True when the node yields raw JSON extraction output
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            Expression::Extraction(_) | Expression::Json(JsonExpression::Path { value: None, .. })
        )
    }
}

/// A JSON-column expression
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExpression {
    /// `column -> condition tree` entries, rendered as an AND of comparisons
    Conditions(IndexMap<String, ConditionNode>),
    /// A dotted accessor (`meta.tags[0]`) or a literal JSON function call,
    /// optionally compared for equality
    Path {
        path: String,
        value: Option<SqlValue>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub inner: Box<Expression>,
    pub target: String,
}

impl CastExpression {
    pub fn new(inner: Expression, target: impl Into<String>) -> Self {
        Self {
            inner: Box::new(inner),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

/// Dialect-neutral rendering
///
/// Nested nodes go back through `generator.render_expression` so dialect
/// overrides apply at every depth.
pub fn render_generic<G>(generator: &G, expression: &Expression) -> Result<String>
where
    G: QueryGenerator + ?Sized,
{
    match expression {
        Expression::Json(json) => generator.render_json(json),
        Expression::Cast(cast) => {
            if !is_cast_type(&cast.target) {
                return Err(QueryGeneratorError::invalid_condition(format!(
                    "invalid cast type '{}'",
                    cast.target
                )));
            }
            Ok(format!(
                "CAST({} AS {})",
                generator.render_expression(&cast.inner)?,
                cast.target.to_uppercase()
            ))
        }
        Expression::Extraction(sql) | Expression::Literal(sql) => Ok(sql.clone()),
        Expression::Identifier(name) => Ok(name
            .split('.')
            .map(|part| generator.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")),
        Expression::Value(value) => Ok(generator.escape(value)),
        Expression::Function(call) => {
            let args = call
                .args
                .iter()
                .map(|arg| generator.render_expression(arg))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{}({})", call.name, args.join(", ")))
        }
    }
}

/// Render a JSON expression
pub fn render_json<G>(generator: &G, json: &JsonExpression) -> Result<String>
where
    G: QueryGenerator + ?Sized,
{
    match json {
        JsonExpression::Conditions(conditions) => {
            let mut clauses = Vec::new();
            for (column, node) in conditions {
                clauses.extend(generator.flatten_conditions(column, &[], node)?);
            }
            if clauses.is_empty() {
                return Err(QueryGeneratorError::invalid_condition(
                    "JSON condition requires at least one clause",
                ));
            }
            Ok(clauses.join(" AND "))
        }
        JsonExpression::Path { path, value } => {
            let mut sql = if classify_json_statement(path)? {
                path.clone()
            } else {
                let (head, rest) = JsonPath::parse(path).split_first().ok_or_else(|| {
                    QueryGeneratorError::invalid_condition("JSON path requires a column")
                })?;
                let column = match head {
                    PathSegment::Key(key) => key,
                    PathSegment::Index(index) => index.to_string(),
                };
                generator.json_path_extraction(ColumnRef::Identifier(&column), &rest)
            };

            if let Some(value) = value {
                sql.push_str(" = ");
                sql.push_str(&generator.escape(value));
            }
            Ok(sql)
        }
    }
}

//! SQL building blocks for the MySQL generator
//!
//! Quoting and escaping, JSON path handling, condition flattening,
//! expression rendering and DDL assembly.

pub mod condition;
pub mod ddl;
pub mod expression;
pub mod json;
pub mod operator;
pub mod sanitize;

pub use condition::{ConditionNode, build_where_item, flatten_conditions, infer_cast};
pub use ddl::{AttributeContext, DdlGenerator, foreign_key_name};
pub use expression::{CastExpression, Expression, FunctionCall, JsonExpression};
pub use json::{ColumnRef, JsonPath, PathSegment, classify_json_statement, split_cast};
pub use operator::Operator;
pub use sanitize::{escape_string, escape_value, is_identifier_quoted, quote_identifier, quote_table};

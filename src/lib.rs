//! # mysql-query-generator
//!
//! SQL text synthesis for MySQL, with first-class support for JSON columns.
//!
//! The crate turns structured descriptions into MySQL statements without
//! talking to a database:
//!
//! - **JSON conditions**: nested condition trees over JSON columns are
//!   flattened into `json_extract(...)` comparisons with automatic casts
//! - **JSON paths**: dotted accessors (`meta.tags[0]`) become escaped
//!   `$`-rooted path literals; raw JSON function calls are validated and
//!   passed through
//! - **DDL**: `CREATE TABLE`, `ALTER TABLE ... ADD/CHANGE/DROP` and friends,
//!   with inline foreign keys hoisted into table-level constraints
//!
//! ## Quick Start
//!
//! ```rust
//! use mysql_query_generator::{
//!     AttributeDescriptor, ConditionNode, DataType, Expression, GeneratorConfig,
//!     MySqlQueryGenerator, QueryGenerator, Reference, TableDescriptor,
//! };
//!
//! let generator = MySqlQueryGenerator::new(
//!     GeneratorConfig::builder().charset("utf8mb4").build(),
//! );
//!
//! // WHERE fragment for a JSON column
//! let conditions = ConditionNode::from_json(r#"{"meta": {"age": {"$gte": 18}}}"#)?;
//! let sql = generator.render_expression(&Expression::json_conditions(conditions))?;
//! assert_eq!(sql, "json_extract(`meta`, '$.age') >= 18");
//!
//! // CREATE TABLE with a hoisted foreign key
//! let table = TableDescriptor::new("posts")
//!     .attribute(AttributeDescriptor::new("id", DataType::integer()).primary_key())
//!     .attribute(
//!         AttributeDescriptor::new("author_id", DataType::integer())
//!             .references(Reference::new("users")),
//!     );
//! let ddl = generator.create_table(&table)?;
//! assert!(ddl.contains("FOREIGN KEY (`author_id`) REFERENCES `users` (`id`)"));
//! # Ok::<(), mysql_query_generator::QueryGeneratorError>(())
//! ```
//!
//! ## Configuration
//!
//! Statement defaults come from [`GeneratorConfig`]:
//!
//! ```rust
//! use chrono::FixedOffset;
//! use mysql_query_generator::GeneratorConfig;
//!
//! let config = GeneratorConfig::builder()
//!     .engine("InnoDB")
//!     .charset("utf8mb4")
//!     .collate("utf8mb4_unicode_ci")
//!     .timezone(FixedOffset::east_opt(3600).unwrap())
//!     .build();
//! ```
//!
//! ## Dialects
//!
//! [`QueryGenerator`] carries the whole contract. A dialect supplies quoting,
//! escaping and DDL assembly, and may override `render_expression` to take
//! over individual expression kinds.

pub mod config;
pub mod error;
pub mod generator;
pub mod mysql;
pub mod schema;
pub mod sql;
pub mod types;

// Re-export main types for convenience
pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use error::{QueryGeneratorError, Result};
pub use generator::QueryGenerator;
pub use mysql::MySqlQueryGenerator;
pub use schema::{
    AttributeDescriptor, Placement, Reference, ReferentialAction, TableDescriptor, TableOptions,
    UniqueKey,
};
pub use types::{DataType, SqlValue};

// Re-export SQL utilities for advanced users
pub use sql::condition::ConditionNode;
pub use sql::ddl::AttributeContext;
pub use sql::expression::{CastExpression, Expression, FunctionCall, JsonExpression};
pub use sql::json::{JsonPath, classify_json_statement};
pub use sql::operator::Operator;
pub use sql::sanitize::{escape_string, quote_identifier, quote_table};

//! MySQL query generator
//!
//! Overrides cast rendering so JSON extractions compare correctly and maps
//! the regular-expression operators to MySQL keywords. DDL is delegated to
//! [`DdlGenerator`].

use indexmap::IndexMap;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::generator::QueryGenerator;
use crate::schema::{AttributeDescriptor, TableOptions};
use crate::sql::ddl::{AttributeContext, DdlGenerator};
use crate::sql::expression::{CastExpression, Expression};
use crate::sql::operator::Operator;
use crate::sql::sanitize;
use crate::types::SqlValue;

const TEMPORAL_TARGETS: [&str; 4] = ["datetime", "date", "time", "timestamp"];
const CHARACTER_TARGETS: [&str; 3] = ["char", "varchar", "text"];

/// Query generator for the MySQL dialect
#[derive(Debug, Clone, Default)]
pub struct MySqlQueryGenerator {
    config: GeneratorConfig,
}

impl MySqlQueryGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn ddl(&self) -> DdlGenerator<'_> {
        DdlGenerator::new(&self.config)
    }

    /// MySQL-specific cast handling
    ///
    /// - temporal targets unquote a JSON extraction before casting, and
    ///   `timestamp` becomes `datetime`
    /// - character targets over a JSON extraction compare the JSON type name
    ///   instead of casting
    /// - other character casts use `CHAR`
    ///
    /// The input node is never modified; rewritten casts are built fresh.
    fn render_cast(&self, cast: &CastExpression) -> Result<String> {
        let target = cast.target.to_lowercase();

        if TEMPORAL_TARGETS.contains(&target.as_str()) {
            let target = if target == "timestamp" {
                "datetime"
            } else {
                target.as_str()
            };
            let inner = if cast.inner.is_extraction() {
                Expression::function("json_unquote", [(*cast.inner).clone()])
            } else {
                (*cast.inner).clone()
            };
            return self.render_generic(&Expression::cast(inner, target));
        }

        if CHARACTER_TARGETS.contains(&target.as_str()) {
            if cast.inner.is_extraction() {
                let inner = self.render_expression(&cast.inner)?;
                return Ok(format!("json_type({})", inner));
            }
            return self.render_generic(&Expression::Cast(CastExpression {
                inner: cast.inner.clone(),
                target: "char".to_string(),
            }));
        }

        self.render_generic(&Expression::Cast(cast.clone()))
    }
}

impl QueryGenerator for MySqlQueryGenerator {
    fn dialect(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        sanitize::quote_identifier(identifier)
    }

    fn quote_table(&self, table: &str) -> String {
        sanitize::quote_table(table)
    }

    fn escape(&self, value: &SqlValue) -> String {
        sanitize::escape_value(value, &self.config.timezone)
    }

    fn operator_sql(&self, op: Operator) -> &'static str {
        match op {
            Operator::Regexp => "REGEXP",
            Operator::NotRegexp => "NOT REGEXP",
            other => other.base_sql(),
        }
    }

    fn render_expression(&self, expression: &Expression) -> Result<String> {
        match expression {
            Expression::Json(json) => self.render_json(json),
            Expression::Cast(cast) => self.render_cast(cast),
            other => self.render_generic(other),
        }
    }

    fn attribute_to_sql(
        &self,
        attribute: &AttributeDescriptor,
        context: &AttributeContext<'_>,
    ) -> String {
        self.ddl().attribute_to_sql(attribute, context)
    }

    fn create_table_query(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
        options: &TableOptions,
    ) -> Result<String> {
        self.ddl().create_table_query(table, attributes, options)
    }

    fn add_column(&self, table: &str, attribute: &AttributeDescriptor) -> String {
        self.ddl().add_column(table, attribute)
    }

    fn remove_column(&self, table: &str, column: &str) -> String {
        self.ddl().remove_column(table, column)
    }

    fn change_column_query(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
    ) -> Result<String> {
        self.ddl().change_column_query(table, attributes)
    }

    fn rename_column_query(
        &self,
        table: &str,
        before: &str,
        attributes: &IndexMap<String, String>,
    ) -> String {
        self.ddl().rename_column_query(table, before, attributes)
    }

    fn drop_foreign_key(&self, table: &str, foreign_key: &str) -> String {
        self.ddl().drop_foreign_key(table, foreign_key)
    }

    fn create_database(
        &self,
        database: &str,
        charset: Option<&str>,
        collate: Option<&str>,
    ) -> String {
        self.ddl().create_database(database, charset, collate)
    }

    fn drop_database(&self, database: &str) -> String {
        self.ddl().drop_database(database)
    }

    fn drop_table(&self, table: &str) -> String {
        self.ddl().drop_table(table)
    }

    fn truncate_table(&self, table: &str) -> String {
        self.ddl().truncate_table(table)
    }

    fn version_query(&self) -> String {
        self.ddl().version_query()
    }
}

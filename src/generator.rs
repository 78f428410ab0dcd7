//! The query generator contract
//!
//! A dialect implements the primitives (quoting, escaping, DDL assembly) and
//! inherits condition flattening and expression rendering from the provided
//! methods. Overriding `render_expression` lets a dialect take over
//! individual expression kinds while falling back to `render_generic` for the
//! rest.

use indexmap::IndexMap;

use crate::error::Result;
use crate::schema::{AttributeDescriptor, TableDescriptor, TableOptions};
use crate::sql::condition::{self, ConditionNode};
use crate::sql::ddl::AttributeContext;
use crate::sql::expression::{self, Expression, JsonExpression};
use crate::sql::json::{ColumnRef, JsonPath};
use crate::sql::operator::Operator;
use crate::types::SqlValue;

pub trait QueryGenerator: Send + Sync {
    /// Short dialect name, used in log output
    fn dialect(&self) -> &'static str;

    fn quote_identifier(&self, identifier: &str) -> String;

    /// Quote a possibly schema-qualified table name
    fn quote_table(&self, table: &str) -> String;

    /// Render a value as an escaped SQL literal
    fn escape(&self, value: &SqlValue) -> String;

    fn operator_sql(&self, op: Operator) -> &'static str {
        op.base_sql()
    }

    fn json_extract_function(&self) -> &'static str {
        "json_extract"
    }

    /// `json_extract(<column>, '<path>')`
    fn json_path_extraction(&self, column: ColumnRef<'_>, path: &JsonPath) -> String {
        let column = match column {
            ColumnRef::Identifier(name) => self.quote_identifier(name),
            ColumnRef::Expression(sql) => sql.to_string(),
        };
        let literal = self.escape(&SqlValue::String(path.to_path_string()));
        format!("{}({}, {})", self.json_extract_function(), column, literal)
    }

    fn flatten_conditions(
        &self,
        column: &str,
        path: &[String],
        node: &ConditionNode,
    ) -> Result<Vec<String>> {
        condition::flatten_conditions(self, column, path, node)
    }

    fn where_item(&self, key: &str, op: Operator, value: &SqlValue) -> Result<String> {
        condition::build_where_item(self, key, op, value)
    }

    fn render_expression(&self, expression: &Expression) -> Result<String> {
        self.render_generic(expression)
    }

    fn render_generic(&self, expression: &Expression) -> Result<String> {
        expression::render_generic(self, expression)
    }

    fn render_json(&self, json: &JsonExpression) -> Result<String> {
        expression::render_json(self, json)
    }

    // ==================== DDL ====================

    fn attribute_to_sql(
        &self,
        attribute: &AttributeDescriptor,
        context: &AttributeContext<'_>,
    ) -> String;

    /// Render every attribute, keyed by column name
    fn attributes_to_sql<'a, I>(
        &self,
        attributes: I,
        context: &AttributeContext<'_>,
    ) -> IndexMap<String, String>
    where
        I: IntoIterator<Item = &'a AttributeDescriptor>,
        Self: Sized,
    {
        render_attributes(self, attributes, context)
    }

    fn create_table_query(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
        options: &TableOptions,
    ) -> Result<String>;

    fn create_table(&self, table: &TableDescriptor) -> Result<String> {
        let rendered = render_attributes(
            self,
            table.attributes.values(),
            &AttributeContext::CreateTable,
        );
        self.create_table_query(&table.name, &rendered, &table.options)
    }

    fn add_column(&self, table: &str, attribute: &AttributeDescriptor) -> String;

    fn remove_column(&self, table: &str, column: &str) -> String;

    fn change_column_query(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
    ) -> Result<String>;

    fn change_column(&self, table: &str, attributes: &[AttributeDescriptor]) -> Result<String> {
        let rendered = render_attributes(self, attributes, &AttributeContext::ChangeColumn);
        self.change_column_query(table, &rendered)
    }

    fn rename_column_query(
        &self,
        table: &str,
        before: &str,
        attributes: &IndexMap<String, String>,
    ) -> String;

    /// Rename `before` to `attribute.name`, restating its definition
    fn rename_column(&self, table: &str, before: &str, attribute: &AttributeDescriptor) -> String {
        let mut rendered = IndexMap::new();
        rendered.insert(
            attribute.name.clone(),
            self.attribute_to_sql(attribute, &AttributeContext::ChangeColumn),
        );
        self.rename_column_query(table, before, &rendered)
    }

    fn drop_foreign_key(&self, table: &str, foreign_key: &str) -> String;

    fn create_database(
        &self,
        database: &str,
        charset: Option<&str>,
        collate: Option<&str>,
    ) -> String;

    fn drop_database(&self, database: &str) -> String;

    fn drop_table(&self, table: &str) -> String;

    fn truncate_table(&self, table: &str) -> String;

    fn version_query(&self) -> String;
}

fn render_attributes<'a, G, I>(
    generator: &G,
    attributes: I,
    context: &AttributeContext<'_>,
) -> IndexMap<String, String>
where
    G: QueryGenerator + ?Sized,
    I: IntoIterator<Item = &'a AttributeDescriptor>,
{
    let rendered: IndexMap<String, String> = attributes
        .into_iter()
        .map(|attribute| {
            (
                attribute.name.clone(),
                generator.attribute_to_sql(attribute, context),
            )
        })
        .collect();

    tracing::debug!(
        dialect = generator.dialect(),
        ?context,
        attributes = rendered.len(),
        "rendered attribute definitions"
    );
    rendered
}

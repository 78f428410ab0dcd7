//! DDL generation for MySQL tables
//!
//! Column definitions are rendered to text first and assembled into
//! statements second. Foreign keys found in a rendered definition are
//! hoisted into table-level `FOREIGN KEY` or `ADD CONSTRAINT` clauses.

use indexmap::IndexMap;

use crate::config::GeneratorConfig;
use crate::error::{QueryGeneratorError, Result};
use crate::schema::{AttributeDescriptor, Placement, TableOptions};
use crate::sql::sanitize::{escape_string, escape_value, quote_identifier, quote_table};

const REFERENCES_MARKER: &str = "REFERENCES";
const PRIMARY_KEY_MARKER: &str = "PRIMARY KEY";

/// Where a column definition is going to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeContext<'a> {
    CreateTable,
    ChangeColumn,
    /// `ALTER TABLE ... ADD`; references become a named constraint
    AddColumn { table: &'a str },
}

/// Name of the constraint created for a column's foreign key
pub fn foreign_key_name(table: &str, column: &str) -> String {
    format!("{}_{}_foreign_idx", table, column)
}

/// DDL generator for MySQL
pub struct DdlGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> DdlGenerator<'a> {
    /// Create a new DDL generator with the given configuration
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Render one column definition (everything after the column name)
    ///
    /// Clause order: type, NOT NULL, auto_increment, DEFAULT, UNIQUE,
    /// PRIMARY KEY, COMMENT, FIRST/AFTER, REFERENCES.
    pub fn attribute_to_sql(
        &self,
        attribute: &AttributeDescriptor,
        context: &AttributeContext<'_>,
    ) -> String {
        let mut sql = attribute.data_type.to_sql();

        if !attribute.nullable {
            sql.push_str(" NOT NULL");
        }

        if attribute.auto_increment {
            sql.push_str(" auto_increment");
        }

        if let Some(default) = &attribute.default_value {
            if attribute.data_type.accepts_default() {
                sql.push_str(" DEFAULT ");
                sql.push_str(&escape_value(default, &self.config.timezone));
            }
        }

        if attribute.unique {
            sql.push_str(" UNIQUE");
        }

        if attribute.primary_key {
            sql.push_str(" PRIMARY KEY");
        }

        if let Some(comment) = &attribute.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&escape_string(comment));
        }

        // Column placement only means something when altering a table
        if *context != AttributeContext::CreateTable {
            match &attribute.placement {
                Some(Placement::First) => sql.push_str(" FIRST"),
                Some(Placement::After(column)) => {
                    sql.push_str(" AFTER ");
                    sql.push_str(&quote_identifier(column));
                }
                None => {}
            }
        }

        if let Some(reference) = &attribute.references {
            if let AttributeContext::AddColumn { table } = context {
                let column = quote_identifier(&attribute.name);
                sql.push_str(&format!(
                    ", ADD CONSTRAINT {} FOREIGN KEY ({})",
                    quote_identifier(&foreign_key_name(table, &attribute.name)),
                    column
                ));
            }

            sql.push_str(&format!(
                " REFERENCES {} ({})",
                quote_table(&reference.table),
                quote_identifier(reference.target_key())
            ));

            if let Some(action) = &reference.on_delete {
                sql.push_str(" ON DELETE ");
                sql.push_str(action.as_sql());
            }
            if let Some(action) = &reference.on_update {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
        }

        sql
    }

    /// Assemble `CREATE TABLE IF NOT EXISTS` from rendered column definitions
    ///
    /// Inline `PRIMARY KEY` markers become one composite `PRIMARY KEY (...)`
    /// clause and inline `REFERENCES` clauses become trailing `FOREIGN KEY`
    /// clauses. Table options take precedence over the configured defaults.
    pub fn create_table_query(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
        options: &TableOptions,
    ) -> Result<String> {
        let mut columns = Vec::with_capacity(attributes.len());
        let mut primary_keys = Vec::new();
        let mut foreign_keys = Vec::new();

        for (name, definition) in attributes {
            let mut body = definition.as_str();

            if let Some((column_body, clause)) = split_reference(name, definition)? {
                body = column_body;
                foreign_keys.push(format!(
                    "FOREIGN KEY ({}) {}",
                    quote_identifier(name),
                    clause
                ));
            }

            let body = match strip_primary_key(body) {
                Some(stripped) => {
                    primary_keys.push(quote_identifier(name));
                    stripped
                }
                None => body.to_string(),
            };

            columns.push(format!("{} {}", quote_identifier(name), body));
        }

        for (key_name, key) in &options.unique_keys {
            if key.single_field {
                continue;
            }
            let key_name = if key_name.is_empty() {
                format!("uniq_{}_{}", table, key.fields.join("_"))
            } else {
                key_name.clone()
            };
            let fields: Vec<String> = key.fields.iter().map(|f| quote_identifier(f)).collect();
            columns.push(format!(
                "UNIQUE {} ({})",
                quote_identifier(&key_name),
                fields.join(", ")
            ));
        }

        if !primary_keys.is_empty() {
            columns.push(format!("PRIMARY KEY ({})", primary_keys.join(", ")));
        }

        let foreign_key_count = foreign_keys.len();
        columns.extend(foreign_keys);

        let engine = options.engine.as_deref().unwrap_or(&self.config.engine);
        let charset = options.charset.as_deref().or(self.config.charset.as_deref());
        let collate = options.collate.as_deref().or(self.config.collate.as_deref());
        let row_format = options
            .row_format
            .as_deref()
            .or(self.config.row_format.as_deref());

        let mut fragments = vec![
            "CREATE TABLE IF NOT EXISTS".to_string(),
            quote_table(table),
            format!("({})", columns.join(", ")),
            format!("ENGINE={}", engine),
        ];
        if let Some(comment) = &options.comment {
            fragments.push(format!("COMMENT {}", escape_string(comment)));
        }
        if let Some(charset) = charset {
            fragments.push(format!("DEFAULT CHARSET={}", charset));
        }
        if let Some(collate) = collate {
            fragments.push(format!("COLLATE {}", collate));
        }
        if let Some(start) = options.initial_auto_increment {
            fragments.push(format!("AUTO_INCREMENT={}", start));
        }
        if let Some(row_format) = row_format {
            fragments.push(format!("ROW_FORMAT={}", row_format));
        }

        tracing::debug!(
            table,
            columns = attributes.len(),
            primary_keys = primary_keys.len(),
            foreign_keys = foreign_key_count,
            "generated CREATE TABLE"
        );

        Ok(finish_statement(fragments))
    }

    /// `ALTER TABLE ... ADD` for a single column
    pub fn add_column(&self, table: &str, attribute: &AttributeDescriptor) -> String {
        let definition = self.attribute_to_sql(attribute, &AttributeContext::AddColumn { table });
        tracing::debug!(table, column = %attribute.name, "generated ADD column");
        finish_statement(vec![
            "ALTER TABLE".to_string(),
            quote_table(table),
            "ADD".to_string(),
            quote_identifier(&attribute.name),
            definition,
        ])
    }

    pub fn remove_column(&self, table: &str, column: &str) -> String {
        tracing::debug!(table, column, "generated DROP column");
        finish_statement(vec![
            "ALTER TABLE".to_string(),
            quote_table(table),
            "DROP".to_string(),
            quote_identifier(column),
        ])
    }

    /// `ALTER TABLE ... CHANGE` from rendered column definitions
    ///
    /// Plain definitions are grouped under one `CHANGE` clause; definitions
    /// with a `REFERENCES` clause become `ADD CONSTRAINT ... FOREIGN KEY`
    /// clauses instead.
    pub fn change_column_query(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
    ) -> Result<String> {
        let mut changes = Vec::new();
        let mut constraints = Vec::new();

        for (name, definition) in attributes {
            let column = quote_identifier(name);
            if let Some((_, clause)) = split_reference(name, definition)? {
                constraints.push(format!(
                    "ADD CONSTRAINT {} FOREIGN KEY ({}) {}",
                    quote_identifier(&foreign_key_name(table, name)),
                    column,
                    clause
                ));
            } else {
                changes.push(format!("{} {} {}", column, column, definition));
            }
        }

        tracing::debug!(
            table,
            changed = changes.len(),
            constraints = constraints.len(),
            "generated CHANGE column"
        );

        let mut clauses = Vec::with_capacity(constraints.len() + 1);
        if !changes.is_empty() {
            clauses.push(format!("CHANGE {}", changes.join(", ")));
        }
        clauses.extend(constraints);

        let mut fragments = vec!["ALTER TABLE".to_string(), quote_table(table)];
        if !clauses.is_empty() {
            fragments.push(clauses.join(", "));
        }
        Ok(finish_statement(fragments))
    }

    /// `ALTER TABLE ... CHANGE <before> <after> <definition>`
    pub fn rename_column_query(
        &self,
        table: &str,
        before: &str,
        attributes: &IndexMap<String, String>,
    ) -> String {
        let renames: Vec<String> = attributes
            .iter()
            .map(|(name, definition)| {
                format!(
                    "{} {} {}",
                    quote_identifier(before),
                    quote_identifier(name),
                    definition
                )
            })
            .collect();

        tracing::debug!(table, before, "generated RENAME column");
        finish_statement(vec![
            "ALTER TABLE".to_string(),
            quote_table(table),
            "CHANGE".to_string(),
            renames.join(", "),
        ])
    }

    pub fn drop_foreign_key(&self, table: &str, foreign_key: &str) -> String {
        finish_statement(vec![
            "ALTER TABLE".to_string(),
            quote_table(table),
            "DROP FOREIGN KEY".to_string(),
            quote_identifier(foreign_key),
        ])
    }

    /// `CREATE DATABASE IF NOT EXISTS`, falling back to the configured
    /// charset and collation
    pub fn create_database(
        &self,
        database: &str,
        charset: Option<&str>,
        collate: Option<&str>,
    ) -> String {
        let mut fragments = vec![
            "CREATE DATABASE IF NOT EXISTS".to_string(),
            quote_identifier(database),
        ];
        if let Some(charset) = charset.or(self.config.charset.as_deref()) {
            fragments.push(format!("DEFAULT CHARACTER SET {}", escape_string(charset)));
        }
        if let Some(collate) = collate.or(self.config.collate.as_deref()) {
            fragments.push(format!("DEFAULT COLLATE {}", escape_string(collate)));
        }
        tracing::debug!(database, "generated CREATE DATABASE");
        finish_statement(fragments)
    }

    pub fn drop_database(&self, database: &str) -> String {
        format!("DROP DATABASE IF EXISTS {};", quote_identifier(database))
    }

    pub fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", quote_table(table))
    }

    pub fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE {}", quote_table(table))
    }

    pub fn version_query(&self) -> String {
        "SELECT VERSION() as `version`".to_string()
    }
}

/// Split a rendered definition into its column body and `REFERENCES` clause
///
/// Only a keyword outside quoted literals counts, so comments and defaults
/// that mention `REFERENCES` stay part of the column body. A clause with no
/// body in front of it is rejected.
fn split_reference<'d>(
    attribute: &str,
    definition: &'d str,
) -> Result<Option<(&'d str, &'d str)>> {
    let Some(pos) = find_keyword(definition, REFERENCES_MARKER) else {
        return Ok(None);
    };
    match definition[..pos].strip_suffix(' ') {
        Some(body) if !body.trim().is_empty() => Ok(Some((body, &definition[pos..]))),
        _ => Err(reject_reference(attribute, definition)),
    }
}

fn reject_reference(attribute: &str, definition: &str) -> QueryGeneratorError {
    tracing::warn!(attribute, definition, "rejecting malformed reference definition");
    QueryGeneratorError::invalid_reference_attribute(attribute, definition)
}

/// Remove an unquoted `PRIMARY KEY` marker; `None` when there is none
fn strip_primary_key(body: &str) -> Option<String> {
    let pos = find_keyword(body, PRIMARY_KEY_MARKER)?;
    let head = body[..pos].strip_suffix(' ').unwrap_or(&body[..pos]);
    let tail = &body[pos + PRIMARY_KEY_MARKER.len()..];
    Some(format!("{}{}", head, tail).trim().to_string())
}

/// Byte offset of the first word-bounded `keyword` outside quoted literals
/// and quoted identifiers
fn find_keyword(definition: &str, keyword: &str) -> Option<usize> {
    let bytes = definition.as_bytes();
    let needle = keyword.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' && q != b'`' {
                    i += 2;
                    continue;
                }
                if b == q {
                    // doubled delimiter stays inside the literal
                    if bytes.get(i + 1) == Some(&q) {
                        i += 2;
                        continue;
                    }
                    quote = None;
                }
            }
            None if matches!(b, b'\'' | b'"' | b'`') => quote = Some(b),
            None => {
                if bytes[i..].starts_with(needle) && is_word_bounded(bytes, i, needle.len()) {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

fn is_word_bounded(bytes: &[u8], start: usize, len: usize) -> bool {
    let is_word = |b: &u8| b.is_ascii_alphanumeric() || *b == b'_';
    let before = start == 0 || !is_word(&bytes[start - 1]);
    let after = bytes.get(start + len).is_none_or(|b| !is_word(b));
    before && after
}

fn finish_statement(fragments: Vec<String>) -> String {
    format!("{};", fragments.join(" "))
}

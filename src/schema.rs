//! Schema descriptors
//!
//! Includes AttributeDescriptor, Reference, TableDescriptor and TableOptions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DataType, SqlValue};

/// Action taken on referencing rows when the referenced row changes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

/// Foreign key target of a column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    /// Referenced table
    pub table: String,
    /// Referenced column; `id` when not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, rename = "onDelete", skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, rename = "onUpdate", skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl Reference {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: None,
            on_delete: None,
            on_update: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Referenced column name, falling back to `id`
    pub fn target_key(&self) -> &str {
        self.key.as_deref().unwrap_or("id")
    }
}

/// Where an added or changed column is placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    First,
    After(String),
}

fn default_nullable() -> bool {
    true
}

/// Column descriptor for DDL generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeDescriptor {
    /// Column name
    pub name: String,

    /// Column type
    #[serde(flatten)]
    pub data_type: DataType,

    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    #[serde(default, rename = "autoIncrement")]
    pub auto_increment: bool,

    /// Single-column UNIQUE constraint rendered inline
    #[serde(default)]
    pub unique: bool,

    #[serde(default, rename = "primaryKey")]
    pub primary_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<SqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Reference>,
}

impl AttributeDescriptor {
    /// Create a new nullable attribute with a name and type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            auto_increment: false,
            unique: false,
            primary_key: false,
            placement: None,
            default_value: None,
            comment: None,
            references: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn first(mut self) -> Self {
        self.placement = Some(Placement::First);
        self
    }

    pub fn after(mut self, column: impl Into<String>) -> Self {
        self.placement = Some(Placement::After(column.into()));
        self
    }

    pub fn default(mut self, value: impl Into<SqlValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn references(mut self, reference: Reference) -> Self {
        self.references = Some(reference);
        self
    }
}

/// Named UNIQUE constraint spanning one or more columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniqueKey {
    pub fields: Vec<String>,
    /// The constraint comes from a column's own `unique` flag and is
    /// already rendered inline
    #[serde(default, rename = "singleField")]
    pub single_field: bool,
}

impl UniqueKey {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            single_field: false,
        }
    }

    pub fn single_field(mut self) -> Self {
        self.single_field = true;
        self
    }
}

/// Trailing CREATE TABLE options; unset fields fall back to the
/// generator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,
    #[serde(default, rename = "rowFormat", skip_serializing_if = "Option::is_none")]
    pub row_format: Option<String>,
    #[serde(
        default,
        rename = "initialAutoIncrement",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_auto_increment: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Unique key groups by constraint name; an empty name is derived from
    /// the table and field names
    #[serde(default, rename = "uniqueKeys", skip_serializing_if = "IndexMap::is_empty")]
    pub unique_keys: IndexMap<String, UniqueKey>,
}

/// Table descriptor consumed by `create_table`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDescriptor {
    pub name: String,
    /// Attributes in declaration order, keyed by column name
    pub attributes: IndexMap<String, AttributeDescriptor>,
    #[serde(default)]
    pub options: TableOptions,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            options: TableOptions::default(),
        }
    }

    /// Load a descriptor from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append an attribute, keyed by its name
    pub fn attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.options.engine = Some(engine.into());
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.options.charset = Some(charset.into());
        self
    }

    pub fn collate(mut self, collate: impl Into<String>) -> Self {
        self.options.collate = Some(collate.into());
        self
    }

    pub fn row_format(mut self, row_format: impl Into<String>) -> Self {
        self.options.row_format = Some(row_format.into());
        self
    }

    pub fn initial_auto_increment(mut self, value: u64) -> Self {
        self.options.initial_auto_increment = Some(value);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.options.comment = Some(comment.into());
        self
    }

    pub fn unique_key(mut self, name: impl Into<String>, key: UniqueKey) -> Self {
        self.options.unique_keys.insert(name.into(), key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // AttributeDescriptor Tests
    // =========================================================================

    #[test]
    fn test_attribute_descriptor_new() {
        let attr = AttributeDescriptor::new("name", DataType::string(255));
        assert_eq!(attr.name, "name");
        assert!(attr.nullable);
        assert!(!attr.unique);
        assert!(!attr.primary_key);
        assert!(attr.references.is_none());
    }

    #[test]
    fn test_attribute_descriptor_chained_builders() {
        let attr = AttributeDescriptor::new("owner_id", DataType::integer())
            .not_null()
            .unique()
            .after("id")
            .references(Reference::new("users").on_delete(ReferentialAction::Cascade));

        assert!(!attr.nullable);
        assert!(attr.unique);
        assert_eq!(attr.placement, Some(Placement::After("id".to_string())));
        assert_eq!(attr.references.unwrap().target_key(), "id");
    }

    #[test]
    fn test_attribute_descriptor_deserialization() {
        let json = r#"{
            "name": "user_id",
            "type": "integer",
            "unsigned": true,
            "nullable": false,
            "references": {"table": "users", "key": "uid", "onDelete": "SET_NULL"}
        }"#;
        let attr: AttributeDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(attr.data_type, DataType::Integer { unsigned: true });
        assert!(!attr.nullable);
        let reference = attr.references.unwrap();
        assert_eq!(reference.target_key(), "uid");
        assert_eq!(reference.on_delete, Some(ReferentialAction::SetNull));
    }

    #[test]
    fn test_placement_deserialization() {
        let first: Placement = serde_json::from_str(r#""first""#).unwrap();
        assert_eq!(first, Placement::First);

        let after: Placement = serde_json::from_str(r#"{"after":"id"}"#).unwrap();
        assert_eq!(after, Placement::After("id".to_string()));
    }

    // =========================================================================
    // Reference Tests
    // =========================================================================

    #[test]
    fn test_referential_action_sql() {
        assert_eq!(ReferentialAction::Cascade.as_sql(), "CASCADE");
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::NoAction.as_sql(), "NO ACTION");
    }

    #[test]
    fn test_reference_explicit_key() {
        assert_eq!(Reference::new("t").key("code").target_key(), "code");
    }

    // =========================================================================
    // TableDescriptor Tests
    // =========================================================================

    #[test]
    fn test_table_descriptor_preserves_declaration_order() {
        let table = TableDescriptor::new("orders")
            .attribute(AttributeDescriptor::new("zeta", DataType::integer()))
            .attribute(AttributeDescriptor::new("alpha", DataType::integer()));

        let names: Vec<&str> = table.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_table_descriptor_from_json() {
        let json = r#"{
            "name": "tags",
            "attributes": {
                "id": {"name": "id", "type": "integer", "primaryKey": true},
                "label": {"name": "label", "type": "string", "length": 40}
            },
            "options": {
                "charset": "utf8mb4",
                "uniqueKeys": {"label_unique": {"fields": ["label"], "singleField": true}}
            }
        }"#;
        let table = TableDescriptor::from_json(json).unwrap();

        assert_eq!(table.attributes.len(), 2);
        assert!(table.attributes["id"].primary_key);
        assert_eq!(table.options.charset.as_deref(), Some("utf8mb4"));
        assert!(table.options.unique_keys["label_unique"].single_field);
    }

    #[test]
    fn test_table_descriptor_from_invalid_json() {
        assert!(TableDescriptor::from_json("{not json").is_err());
    }
}

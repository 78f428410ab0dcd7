//! End-to-end tests for the MySQL query generator
//!
//! These exercise the public API only; no database is required.

use chrono::NaiveDate;
use indexmap::IndexMap;
use mysql_query_generator::sql::json::ColumnRef;
use mysql_query_generator::{
    AttributeDescriptor, ConditionNode, DataType, Expression, GeneratorConfig, JsonPath,
    MySqlQueryGenerator, QueryGenerator, QueryGeneratorError, Reference, ReferentialAction,
    SqlValue, TableDescriptor, UniqueKey, classify_json_statement,
};

fn generator() -> MySqlQueryGenerator {
    MySqlQueryGenerator::default()
}

// ==================== Classifier ====================

#[test]
fn test_classifier_cases() {
    assert!(classify_json_statement("json_extract(a,b)").unwrap());
    assert!(!classify_json_statement("data.a.b").unwrap());
    assert!(matches!(
        classify_json_statement("json_extract(a,b);DROP TABLE x"),
        Err(QueryGeneratorError::MalformedJsonStatement(_))
    ));
    assert!(classify_json_statement("json_extract(a,b))").is_err());
}

// ==================== JSON Paths ====================

#[test]
fn test_path_encoding_with_index() {
    let path = JsonPath::from_keys(["a", "0", "b"]);
    let sql = generator().json_path_extraction(ColumnRef::Identifier("col"), &path);
    assert_eq!(sql, "json_extract(`col`, '$.a[0].b')");
}

#[test]
fn test_path_expression_from_accessor() {
    let sql = generator()
        .render_expression(&Expression::json_path("col.a[0].b"))
        .unwrap();
    assert_eq!(sql, "json_extract(`col`, '$.a[0].b')");
}

#[test]
fn test_extraction_over_raw_sql_column() {
    let sql = generator().json_path_extraction(
        ColumnRef::Expression("`t`.`payload`"),
        &JsonPath::from_keys(["id"]),
    );
    assert_eq!(sql, "json_extract(`t`.`payload`, '$.id')");
}

// ==================== Conditions ====================

#[test]
fn test_condition_tree_flattens_deterministically() {
    let json = r#"{
        "attrs": {
            "status": "active",
            "score": {"$gt": 5, "$lte": 10},
            "labels": {"0": {"$in": ["a", "b"]}},
            "owner": {"name::char": {"$like": "J%"}}
        }
    }"#;
    let conditions = ConditionNode::from_json(json).unwrap();
    let expression = Expression::json_conditions(conditions);

    let first = generator().render_expression(&expression).unwrap();
    let second = generator().render_expression(&expression).unwrap();
    assert_eq!(first, second);

    let clauses: Vec<&str> = first.split(" AND ").collect();
    assert_eq!(
        clauses,
        vec![
            "json_extract(`attrs`, '$.status') = 'active'",
            "json_extract(`attrs`, '$.score') > 5",
            "json_extract(`attrs`, '$.score') <= 10",
            "json_extract(`attrs`, '$.labels[0]') IN ('a', 'b')",
            "json_type(json_extract(`attrs`, '$.owner.name')) LIKE 'J%'",
        ]
    );
}

#[test]
fn test_null_leaf_compares_with_bare_null() {
    let mut conditions = IndexMap::new();
    conditions.insert(
        "attrs".to_string(),
        ConditionNode::nested([("archived_at", ConditionNode::Leaf(SqlValue::Null))]),
    );

    let sql = generator()
        .render_expression(&Expression::json_conditions(conditions))
        .unwrap();
    assert!(sql.ends_with("= NULL"));
    assert!(!sql.contains("'NULL'"));
}

#[test]
fn test_date_condition_is_cast() {
    let mut conditions = IndexMap::new();
    conditions.insert(
        "attrs".to_string(),
        ConditionNode::nested([(
            "joined",
            ConditionNode::nested([(
                "$gte",
                ConditionNode::leaf(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()),
            )]),
        )]),
    );

    let sql = generator()
        .render_expression(&Expression::json_conditions(conditions))
        .unwrap();
    assert_eq!(
        sql,
        "CAST(json_unquote(json_extract(`attrs`, '$.joined')) AS DATETIME) >= '2023-06-01'"
    );
}

#[test]
fn test_condition_with_nested_operator_operand_is_rejected() {
    let conditions =
        ConditionNode::from_json(r#"{"attrs": {"a": {"$eq": {"b": 1}}}}"#).unwrap();
    let result = generator().render_expression(&Expression::json_conditions(conditions));
    assert!(matches!(result, Err(QueryGeneratorError::InvalidCondition(_))));
}

#[test]
fn test_cast_annotation_cannot_inject_sql() {
    let conditions =
        ConditionNode::from_json(r#"{"meta": {"a::char) OR 1=1 OR (1": 1}}"#).unwrap();
    let result = generator().render_expression(&Expression::json_conditions(conditions));
    assert!(matches!(result, Err(QueryGeneratorError::InvalidCondition(_))));
}

#[test]
fn test_cast_annotation_with_two_word_type() {
    let conditions =
        ConditionNode::from_json(r#"{"meta": {"rank::signed integer": {"$gt": 3}}}"#).unwrap();
    let sql = generator()
        .render_expression(&Expression::json_conditions(conditions))
        .unwrap();
    assert_eq!(sql, "CAST(json_extract(`meta`, '$.rank') AS SIGNED INTEGER) > 3");
}

#[test]
fn test_large_unsigned_literal_is_not_rounded() {
    let conditions =
        ConditionNode::from_json(r#"{"meta": {"id": 18446744073709551615}}"#).unwrap();
    let sql = generator()
        .render_expression(&Expression::json_conditions(conditions))
        .unwrap();
    assert_eq!(sql, "json_extract(`meta`, '$.id') = 18446744073709551615");
}

// ==================== DDL ====================

#[test]
fn test_create_table_hoists_reference_and_primary_key() {
    let mut rendered = IndexMap::new();
    rendered.insert(
        "a".to_string(),
        "INT PRIMARY KEY REFERENCES `parent` (`id`)".to_string(),
    );

    let sql = generator()
        .create_table_query("child", &rendered, &Default::default())
        .unwrap();

    assert!(sql.contains("(`a` INT, "));
    assert!(sql.contains("PRIMARY KEY (`a`)"));
    assert!(sql.contains("FOREIGN KEY (`a`) REFERENCES `parent` (`id`)"));
    assert!(sql.ends_with(";"));
}

#[test]
fn test_create_table_from_descriptor() {
    let table = TableDescriptor::new("orders")
        .attribute(
            AttributeDescriptor::new("id", DataType::BigInt { unsigned: true })
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .attribute(
            AttributeDescriptor::new("customer_id", DataType::integer())
                .not_null()
                .references(Reference::new("customers").on_delete(ReferentialAction::Cascade)),
        )
        .attribute(AttributeDescriptor::new("total", DataType::decimal(12, 2)).default(0))
        .unique_key("", UniqueKey::new(["customer_id", "total"]))
        .initial_auto_increment(100);

    let sql = generator().create_table(&table).unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `orders` (\
         `id` BIGINT UNSIGNED NOT NULL auto_increment, \
         `customer_id` INTEGER NOT NULL, \
         `total` DECIMAL(12,2) DEFAULT 0, \
         UNIQUE `uniq_orders_customer_id_total` (`customer_id`, `total`), \
         PRIMARY KEY (`id`), \
         FOREIGN KEY (`customer_id`) REFERENCES `customers` (`id`) ON DELETE CASCADE\
         ) ENGINE=InnoDB AUTO_INCREMENT=100;"
    );
}

#[test]
fn test_create_table_from_json_descriptor() {
    let json = r#"{
        "name": "tags",
        "attributes": {
            "id": {"name": "id", "type": "integer", "primaryKey": true, "nullable": false},
            "label": {"name": "label", "type": "string", "length": 64}
        },
        "options": {"engine": "MyISAM"}
    }"#;
    let table = TableDescriptor::from_json(json).unwrap();
    let sql = generator().create_table(&table).unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `tags` (`id` INTEGER NOT NULL, `label` VARCHAR(64), \
         PRIMARY KEY (`id`)) ENGINE=MyISAM;"
    );
}

#[test]
fn test_change_column_mixed_plain_and_reference() {
    let attributes = vec![
        AttributeDescriptor::new("title", DataType::string(120)).not_null(),
        AttributeDescriptor::new("author_id", DataType::integer())
            .references(Reference::new("users")),
    ];

    let sql = generator().change_column("posts", &attributes).unwrap();

    assert_eq!(
        sql,
        "ALTER TABLE `posts` CHANGE `title` `title` VARCHAR(120) NOT NULL, \
         ADD CONSTRAINT `posts_author_id_foreign_idx` FOREIGN KEY (`author_id`) \
         REFERENCES `users` (`id`);"
    );
}

#[test]
fn test_comment_mentioning_primary_key_is_not_hoisted() {
    let table = TableDescriptor::new("t")
        .attribute(AttributeDescriptor::new("id", DataType::integer()).primary_key())
        .attribute(
            AttributeDescriptor::new("legacy", DataType::integer()).comment("old PRIMARY KEY"),
        );

    let sql = generator().create_table(&table).unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `t` (`id` INTEGER, \
         `legacy` INTEGER COMMENT 'old PRIMARY KEY', \
         PRIMARY KEY (`id`)) ENGINE=InnoDB;"
    );
}

#[test]
fn test_comment_mentioning_references_is_not_hoisted() {
    let table = TableDescriptor::new("t")
        .attribute(
            AttributeDescriptor::new("note", DataType::string(40)).comment("see REFERENCES doc"),
        )
        .attribute(AttributeDescriptor::new("flag", DataType::integer()).comment("REFERENCES"));

    let sql = generator().create_table(&table).unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `t` (\
         `note` VARCHAR(40) COMMENT 'see REFERENCES doc', \
         `flag` INTEGER COMMENT 'REFERENCES'\
         ) ENGINE=InnoDB;"
    );
    assert!(!sql.contains("FOREIGN KEY"));
}

#[test]
fn test_real_reference_is_hoisted_past_quoted_keywords() {
    let table = TableDescriptor::new("posts").attribute(
        AttributeDescriptor::new("author_id", DataType::integer())
            .comment("PRIMARY KEY of REFERENCES")
            .references(Reference::new("users")),
    );

    let sql = generator().create_table(&table).unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `posts` (\
         `author_id` INTEGER COMMENT 'PRIMARY KEY of REFERENCES', \
         FOREIGN KEY (`author_id`) REFERENCES `users` (`id`)\
         ) ENGINE=InnoDB;"
    );
}

#[test]
fn test_change_column_with_quoted_references_stays_a_change() {
    let attributes = vec![
        AttributeDescriptor::new("note", DataType::string(40)).default("REFERENCES x"),
        AttributeDescriptor::new("label", DataType::string(20)).comment("REFERENCES"),
    ];

    let sql = generator().change_column("t", &attributes).unwrap();

    assert_eq!(
        sql,
        "ALTER TABLE `t` CHANGE `note` `note` VARCHAR(40) DEFAULT 'REFERENCES x', \
         `label` `label` VARCHAR(20) COMMENT 'REFERENCES';"
    );
}

#[test]
fn test_malformed_reference_definition_is_rejected() {
    let mut rendered = IndexMap::new();
    rendered.insert("a".to_string(), "REFERENCES `parent` (`id`)".to_string());

    let create = generator().create_table_query("t", &rendered, &Default::default());
    let change = generator().change_column_query("t", &rendered);

    assert!(matches!(
        create,
        Err(QueryGeneratorError::InvalidReferenceAttribute { .. })
    ));
    assert!(matches!(
        change,
        Err(QueryGeneratorError::InvalidReferenceAttribute { .. })
    ));
}

#[test]
fn test_column_lifecycle_statements() {
    let generator = MySqlQueryGenerator::new(
        GeneratorConfig::builder()
            .charset("utf8mb4")
            .collate("utf8mb4_bin")
            .build(),
    );
    let nickname = AttributeDescriptor::new("nickname", DataType::string(40)).after("name");

    assert_eq!(
        generator.add_column("users", &nickname),
        "ALTER TABLE `users` ADD `nickname` VARCHAR(40) AFTER `name`;"
    );
    assert_eq!(
        generator.rename_column(
            "users",
            "nick",
            &AttributeDescriptor::new("nickname", DataType::string(40))
        ),
        "ALTER TABLE `users` CHANGE `nick` `nickname` VARCHAR(40);"
    );
    assert_eq!(
        generator.remove_column("users", "nickname"),
        "ALTER TABLE `users` DROP `nickname`;"
    );
    assert_eq!(
        generator.create_database("app", None, None),
        "CREATE DATABASE IF NOT EXISTS `app` DEFAULT CHARACTER SET 'utf8mb4' \
         DEFAULT COLLATE 'utf8mb4_bin';"
    );
}

#[test]
fn test_attributes_to_sql_keeps_order() {
    let attributes = [
        AttributeDescriptor::new("b", DataType::Boolean),
        AttributeDescriptor::new("a", DataType::Json),
    ];
    let rendered = generator().attributes_to_sql(
        &attributes,
        &mysql_query_generator::AttributeContext::CreateTable,
    );

    let keys: Vec<&str> = rendered.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["b", "a"]);
    assert_eq!(rendered["b"], "TINYINT(1)");
    assert_eq!(rendered["a"], "JSON");
}

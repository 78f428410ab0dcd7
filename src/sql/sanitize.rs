//! SQL Quoting and Escaping Utilities
//!
//! MySQL identifier quoting and literal escaping. Every identifier and
//! value the generator embeds goes through one of these functions.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::types::SqlValue;

const TICK: char = '`';

/// Quote a MySQL identifier with backticks
///
/// Already-quoted input is returned unchanged and the wildcard `*` is never
/// quoted, so the function is safe to apply twice.
///
/// # Example
/// ```
/// use mysql_query_generator::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("user_id"), "`user_id`");
/// assert_eq!(quote_identifier("`user_id`"), "`user_id`");
/// assert_eq!(quote_identifier("*"), "*");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    if identifier == "*" || is_identifier_quoted(identifier) {
        return identifier.to_string();
    }
    // Escape embedded backticks by doubling them
    let escaped = identifier.replace(TICK, "``");
    format!("`{}`", escaped)
}

/// Quote a table name, splitting an optional `schema.table` prefix
///
/// # Example
/// ```
/// use mysql_query_generator::sql::quote_table;
///
/// assert_eq!(quote_table("users"), "`users`");
/// assert_eq!(quote_table("app.users"), "`app`.`users`");
/// ```
pub fn quote_table(table: &str) -> String {
    if is_identifier_quoted(table) {
        return table.to_string();
    }
    match table.split_once('.') {
        Some((schema, name)) if !schema.is_empty() && !name.is_empty() => {
            format!("{}.{}", quote_identifier(schema), quote_identifier(name))
        }
        _ => quote_identifier(table),
    }
}

/// Whether the text is already a backtick-quoted identifier (or a dotted
/// chain of them such as `` `t`.`c` ``)
pub fn is_identifier_quoted(identifier: &str) -> bool {
    identifier.len() >= 2 && identifier.starts_with(TICK) && identifier.ends_with(TICK)
}

/// Escape a string as a single-quoted MySQL literal
///
/// Uses backslash escapes for the characters MySQL treats specially inside
/// string literals.
pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for c in value.chars() {
        match c {
            '\0' => escaped.push_str("\\0"),
            '\x08' => escaped.push_str("\\b"),
            '\t' => escaped.push_str("\\t"),
            '\x1a' => escaped.push_str("\\Z"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped.push('\'');
    escaped
}

/// Render a value as a MySQL literal
///
/// Date-times are shifted into `timezone` before formatting.
pub fn escape_value(value: &SqlValue, timezone: &FixedOffset) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Float(f) if f.is_finite() => f.to_string(),
        SqlValue::Float(_) => "NULL".to_string(),
        SqlValue::Decimal(d) => d.to_string(),
        SqlValue::String(s) => escape_string(s),
        SqlValue::Date(date) => escape_date(date),
        SqlValue::DateTime(dt) => escape_date_time(dt, timezone),
        SqlValue::Json(json) => escape_string(&json.to_string()),
        SqlValue::List(items) => items
            .iter()
            .map(|item| escape_value(item, timezone))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn escape_date(date: &NaiveDate) -> String {
    format!("'{}'", date.format("%Y-%m-%d"))
}

fn escape_date_time(dt: &DateTime<Utc>, timezone: &FixedOffset) -> String {
    let local = dt.with_timezone(timezone);
    format!("'{}'", local.format("%Y-%m-%d %H:%M:%S%.3f"))
}

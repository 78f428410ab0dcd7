//! JSON statement classification and JSON path encoding
//!
//! A JSON accessor handed to the generator is either a MySQL JSON function
//! call (`json_extract(data, '$.a')`), used verbatim, or a property path
//! (`data.a[0].b`), which is encoded into a `$`-rooted JSON path literal.
//! The classifier decides between the two and rejects function calls that
//! smuggle in a statement terminator or unbalanced parentheses.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{QueryGeneratorError, Result};

/// `json`, `json_extract`, `json_unquote_x` ... followed by a complete
/// parenthesised argument list
static JSON_FUNCTION_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*json(?:_[a-z]+){0,2})\([^)]*\)").expect("function head pattern")
});

/// A quoted run, a word/whitespace run, or a single punctuation character
static GENERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*('(?:[^']|'')*'|"(?:[^"]|"")*"|`(?:[^`]|``)*`|[\w\s]+|[().,;+-])"#)
        .expect("generic token pattern")
});

/// `char`, `signed integer`, `decimal(10, 2)`
static CAST_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(?: [A-Za-z][A-Za-z0-9_]*)?(?:\(\d+(?:, ?\d+)?\))?$")
        .expect("cast type pattern")
});

static PLAIN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("plain key pattern"));

/// Decide whether `statement` is a JSON function call
///
/// Returns `Ok(true)` for a well-formed JSON function call, `Ok(false)` for
/// anything that should be treated as a property path, and
/// `MalformedJsonStatement` when a JSON function appears together with a
/// `;` or unbalanced parentheses.
///
/// Scanning stops at the first character neither pattern recognises; the
/// rest of the input is not examined.
///
/// # Example
/// ```
/// use mysql_query_generator::sql::json::classify_json_statement;
///
/// assert!(classify_json_statement("json_extract(data, '$.a')").unwrap());
/// assert!(!classify_json_statement("data.a.b").unwrap());
/// assert!(classify_json_statement("json_extract(a,b);DROP TABLE x").is_err());
/// ```
pub fn classify_json_statement(statement: &str) -> Result<bool> {
    let mut cursor = 0;
    let mut opening = 0usize;
    let mut closing = 0usize;
    let mut has_json_function = false;
    let mut has_terminator = false;

    while cursor < statement.len() {
        let rest = &statement[cursor..];

        if let Some(caps) = JSON_FUNCTION_HEAD.captures(rest) {
            // Stop at the opening parenthesis so the argument list is
            // tokenized on the following iterations.
            cursor += caps[1].len();
            has_json_function = true;
            continue;
        }

        if let Some(caps) = GENERIC_TOKEN.captures(rest) {
            match &caps[1] {
                "(" => opening += 1,
                ")" => closing += 1,
                ";" => {
                    has_terminator = true;
                    break;
                }
                _ => {}
            }
            cursor += caps[0].len();
            continue;
        }

        break;
    }

    let invalid = has_terminator || opening != closing;
    tracing::trace!(
        statement,
        has_json_function,
        invalid,
        "classified json statement"
    );

    if has_json_function && invalid {
        tracing::warn!(statement, "rejecting malformed json statement");
        return Err(QueryGeneratorError::malformed_json_statement(statement));
    }

    Ok(has_json_function)
}

/// Split a trailing `::type` cast annotation off a property name
///
/// # Example
/// ```
/// use mysql_query_generator::sql::json::split_cast;
///
/// assert_eq!(split_cast("born::datetime"), ("born", Some("datetime")));
/// assert_eq!(split_cast("name"), ("name", None));
/// ```
pub fn split_cast(key: &str) -> (&str, Option<&str>) {
    match key.split_once("::") {
        Some((name, cast)) if !cast.is_empty() => (name, Some(cast)),
        _ => (key, None),
    }
}

/// Whether `target` is a type name that may follow `AS` in a `CAST`
///
/// Accepts one or two words with an optional length or precision/scale.
///
/// # Example
/// ```
/// use mysql_query_generator::sql::json::is_cast_type;
///
/// assert!(is_cast_type("decimal(10,2)"));
/// assert!(is_cast_type("signed integer"));
/// assert!(!is_cast_type("char) OR 1=1 OR (1"));
/// ```
pub fn is_cast_type(target: &str) -> bool {
    CAST_TYPE.is_match(target)
}

/// One component of a JSON path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

impl PathSegment {
    /// Digit-only keys become array indexes
    pub fn from_key(key: &str) -> Self {
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = key.parse() {
                return PathSegment::Index(index);
            }
        }
        PathSegment::Key(key.to_string())
    }
}

/// An ordered JSON path below a column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Build a path from property names, turning digit-only names into
    /// array indexes
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: keys
                .into_iter()
                .map(|k| PathSegment::from_key(k.as_ref()))
                .collect(),
        }
    }

    /// Parse a property accessor such as `a.b[0]` or `a["x.y"].c`
    pub fn parse(accessor: &str) -> Self {
        Self::from_keys(split_accessor(accessor))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Remove and return the first segment; used to peel the column name
    /// off a dotted accessor
    pub fn split_first(mut self) -> Option<(PathSegment, JsonPath)> {
        if self.segments.is_empty() {
            return None;
        }
        let head = self.segments.remove(0);
        Some((head, self))
    }

    /// Render the unescaped MySQL JSON path text, e.g. `$.a[0].b`
    pub fn to_path_string(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.segments {
            match segment {
                PathSegment::Index(index) => {
                    path.push('[');
                    path.push_str(&index.to_string());
                    path.push(']');
                }
                PathSegment::Key(key) if PLAIN_KEY.is_match(key) => {
                    path.push('.');
                    path.push_str(key);
                }
                PathSegment::Key(key) => {
                    path.push_str(".\"");
                    path.push_str(&key.replace('\\', "\\\\").replace('"', "\\\""));
                    path.push('"');
                }
            }
        }
        path
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}

/// The column operand of a JSON extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    /// A bare column name, quoted before use
    Identifier(&'a str),
    /// Already-quoted or composite SQL, used verbatim
    Expression(&'a str),
}

/// Split `a.b[0]["c.d"]` into `a`, `b`, `0`, `c.d`
fn split_accessor(accessor: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = accessor.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    keys.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    keys.push(std::mem::take(&mut current));
                }
                let quote = match chars.peek() {
                    Some(&q @ ('"' | '\'')) => {
                        chars.next();
                        Some(q)
                    }
                    _ => None,
                };
                let mut key = String::new();
                while let Some(inner) = chars.next() {
                    match (quote, inner) {
                        (Some(_), '\\') => key.push(chars.next().unwrap_or('\\')),
                        (Some(q), ch) if ch == q => {
                            // closing quote; skip up to the bracket
                            for rest in chars.by_ref() {
                                if rest == ']' {
                                    break;
                                }
                            }
                            break;
                        }
                        (None, ']') => break,
                        (_, ch) => key.push(ch),
                    }
                }
                keys.push(key);
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        keys.push(current);
    }
    keys
}

//! Comparison operators usable inside condition trees
//!
//! Operators are written as `$`-prefixed keys in a condition map
//! (`{"age": {"$gte": 18}}`). The SQL text for each operator comes from the
//! generator so a dialect can override individual entries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Is,
    Not,
    Like,
    NotLike,
    In,
    NotIn,
    Regexp,
    NotRegexp,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Is,
        Operator::Not,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::Regexp,
        Operator::NotRegexp,
    ];

    /// Condition-map key for this operator, e.g. `$gte`
    pub fn key(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::Is => "$is",
            Operator::Not => "$not",
            Operator::Like => "$like",
            Operator::NotLike => "$notLike",
            Operator::In => "$in",
            Operator::NotIn => "$notIn",
            Operator::Regexp => "$regexp",
            Operator::NotRegexp => "$notRegexp",
        }
    }

    /// Look up an operator by its condition-map key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }

    /// Dialect-neutral SQL text
    pub fn base_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Is => "IS",
            Operator::Not => "IS NOT",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Regexp => "~",
            Operator::NotRegexp => "!~",
        }
    }

    /// Operators whose right-hand side is a parenthesised list
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

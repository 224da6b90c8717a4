//! Comparison operators for parameter predicates

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical comparison operator.
///
/// Parsed from symbols (`">="`) or word forms (`"greaterEqual"`,
/// `"greater_than_or_equal"`), ignoring case, underscores, hyphens and
/// whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComparisonOperator {
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `=` / `==`
    Equal,
    /// `!=`
    NotEqual,
    /// Substring match
    Contains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
}

/// An operator string outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown comparison operator '{0}'")]
pub struct ParseOperatorError(pub String);

impl ComparisonOperator {
    /// Every operator, in declaration order.
    pub const ALL: [ComparisonOperator; 9] = [
        ComparisonOperator::GreaterThan,
        ComparisonOperator::LessThan,
        ComparisonOperator::GreaterOrEqual,
        ComparisonOperator::LessOrEqual,
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::Contains,
        ComparisonOperator::StartsWith,
        ComparisonOperator::EndsWith,
    ];

    /// Canonical spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::StartsWith => "startswith",
            ComparisonOperator::EndsWith => "endswith",
        }
    }

    /// Substring-style operators that always compare as text.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            ComparisonOperator::Contains
                | ComparisonOperator::StartsWith
                | ComparisonOperator::EndsWith
        )
    }

    /// Whether `actual` compared to `expected` yielding `ordering` satisfies
    /// the operator. Textual operators never match an ordering.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::GreaterOrEqual => ordering != Ordering::Less,
            ComparisonOperator::LessOrEqual => ordering != Ordering::Greater,
            ComparisonOperator::Equal => ordering == Ordering::Equal,
            ComparisonOperator::NotEqual => ordering != Ordering::Equal,
            ComparisonOperator::Contains
            | ComparisonOperator::StartsWith
            | ComparisonOperator::EndsWith => false,
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        let op = match key.as_str() {
            ">" | "gt" | "greater" | "greaterthan" => ComparisonOperator::GreaterThan,
            "<" | "lt" | "less" | "lessthan" => ComparisonOperator::LessThan,
            ">=" | "=>" | "ge" | "gte" | "greaterequal" | "greaterorequal" | "greaterthanorequal"
            | "greaterthanorequalto" => ComparisonOperator::GreaterOrEqual,
            "<=" | "=<" | "le" | "lte" | "lessequal" | "lessorequal" | "lessthanorequal"
            | "lessthanorequalto" => ComparisonOperator::LessOrEqual,
            "=" | "==" | "eq" | "equal" | "equals" | "equalto" | "is" => ComparisonOperator::Equal,
            "!=" | "<>" | "ne" | "neq" | "notequal" | "notequals" | "notequalto" | "isnot" => {
                ComparisonOperator::NotEqual
            }
            "contains" | "includes" => ComparisonOperator::Contains,
            "startswith" | "beginswith" => ComparisonOperator::StartsWith,
            "endswith" => ComparisonOperator::EndsWith,
            _ => return Err(ParseOperatorError(s.to_string())),
        };
        Ok(op)
    }
}

impl TryFrom<String> for ComparisonOperator {
    type Error = ParseOperatorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ComparisonOperator> for String {
    fn from(op: ComparisonOperator) -> Self {
        op.symbol().to_string()
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//! Evaluating canonical predicates against host parameter values.
//!
//! Comparison mode is picked from the declared value type when there is one,
//! otherwise from the comparison value and the parameter's storage type:
//! numbers compare numerically (within [`NUMERIC_TOLERANCE`]), booleans by
//! equality, everything else as case-insensitive text. Textual operators
//! always compare as text. A parameter with no value only satisfies `!=`.

use std::cmp::Ordering;
use std::fmt;

use hostbridge_core::Payload;
use serde::Serialize;

use crate::operator::ComparisonOperator;
use crate::spec::ValueType;

/// Absolute tolerance for numeric equality.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

/// A parameter value read from a host element.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Text parameter
    Text(String),
    /// Floating-point parameter
    Number(f64),
    /// Integer parameter
    Integer(i64),
    /// Yes/no parameter
    Boolean(bool),
    /// Reference to another element
    ElementId(i64),
    /// Parameter exists but has no value
    Empty,
}

impl ParameterValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Integer(n) | ParameterValue::ElementId(n) => Some(*n as f64),
            ParameterValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParameterValue::Text(s) => s.trim().parse().ok(),
            ParameterValue::Empty => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(b) => Some(*b),
            ParameterValue::Integer(n) => Some(*n != 0),
            ParameterValue::Text(s) => parse_bool(s),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            ParameterValue::Number(_) | ParameterValue::Integer(_) | ParameterValue::ElementId(_)
        )
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(s) => f.write_str(s),
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Integer(n) | ParameterValue::ElementId(n) => write!(f, "{}", n),
            ParameterValue::Boolean(b) => write!(f, "{}", b),
            ParameterValue::Empty => Ok(()),
        }
    }
}

/// A validated parameter predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPredicate {
    /// Parameter name, trimmed
    pub name: String,
    /// Canonical operator
    pub operator: ComparisonOperator,
    /// Non-null comparison value
    pub value: Payload,
    /// Declared value type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Numeric,
    Boolean,
    Text,
}

impl CanonicalPredicate {
    /// Whether `actual` satisfies this predicate.
    pub fn evaluate(&self, actual: &ParameterValue) -> bool {
        if *actual == ParameterValue::Empty {
            return self.operator == ComparisonOperator::NotEqual;
        }

        if self.operator.is_textual() {
            let haystack = actual.to_string().to_lowercase();
            let needle = payload_text(&self.value).to_lowercase();
            return match self.operator {
                ComparisonOperator::Contains => haystack.contains(&needle),
                ComparisonOperator::StartsWith => haystack.starts_with(&needle),
                _ => haystack.ends_with(&needle),
            };
        }

        let ordering = match self.mode(actual) {
            Mode::Numeric => match (actual.as_number(), payload_number(&self.value)) {
                (Some(a), Some(b)) if (a - b).abs() <= NUMERIC_TOLERANCE => Some(Ordering::Equal),
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
            Mode::Boolean => match (actual.as_bool(), payload_bool(&self.value)) {
                (Some(a), Some(b)) if matches!(
                    self.operator,
                    ComparisonOperator::Equal | ComparisonOperator::NotEqual
                ) => Some(a.cmp(&b)),
                _ => None,
            },
            Mode::Text => Some(
                actual
                    .to_string()
                    .to_lowercase()
                    .cmp(&payload_text(&self.value).to_lowercase()),
            ),
        };

        match ordering {
            Some(ordering) => self.operator.accepts(ordering),
            // Incomparable values are unequal and unordered.
            None => self.operator == ComparisonOperator::NotEqual,
        }
    }

    fn mode(&self, actual: &ParameterValue) -> Mode {
        match self.value_type {
            Some(t) if t.is_numeric() => Mode::Numeric,
            Some(ValueType::Boolean) => Mode::Boolean,
            Some(_) => Mode::Text,
            None => match &self.value {
                Payload::Number(_) => Mode::Numeric,
                Payload::Bool(_) => Mode::Boolean,
                Payload::String(s) if actual.is_numeric() && s.trim().parse::<f64>().is_ok() => {
                    Mode::Numeric
                }
                _ => Mode::Text,
            },
        }
    }
}

pub(crate) fn payload_number(value: &Payload) -> Option<f64> {
    match value {
        Payload::Number(n) => n.as_f64(),
        Payload::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn payload_bool(value: &Payload) -> Option<bool> {
    match value {
        Payload::Bool(b) => Some(*b),
        Payload::String(s) => parse_bool(s),
        Payload::Number(n) => n.as_i64().and_then(|n| match n {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }),
        _ => None,
    }
}

fn payload_text(value: &Payload) -> String {
    match value {
        Payload::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pred(operator: ComparisonOperator, value: Payload) -> CanonicalPredicate {
        CanonicalPredicate {
            name: "p".to_string(),
            operator,
            value,
            value_type: None,
        }
    }

    #[test]
    fn test_numeric_comparisons() {
        let gt = pred(ComparisonOperator::GreaterThan, json!(500));
        assert!(gt.evaluate(&ParameterValue::Number(500.5)));
        assert!(!gt.evaluate(&ParameterValue::Number(500.0)));
        assert!(gt.evaluate(&ParameterValue::Integer(501)));

        let eq = pred(ComparisonOperator::Equal, json!(0.3));
        assert!(eq.evaluate(&ParameterValue::Number(0.1 + 0.2)));
    }

    #[test]
    fn test_numeric_string_against_numeric_parameter() {
        let le = pred(ComparisonOperator::LessOrEqual, json!("3000"));
        assert!(le.evaluate(&ParameterValue::Number(2999.0)));
        assert!(!le.evaluate(&ParameterValue::Number(3001.0)));
    }

    #[test]
    fn test_declared_type_forces_numeric() {
        let mut p = pred(ComparisonOperator::LessThan, json!("10"));
        p.value_type = Some(ValueType::Number);
        // As text "9" > "10"; numerically 9 < 10.
        assert!(p.evaluate(&ParameterValue::Text("9".to_string())));
    }

    #[test]
    fn test_text_operators_ignore_case() {
        let contains = pred(ComparisonOperator::Contains, json!("EXT"));
        assert!(contains.evaluate(&ParameterValue::Text("Basic Wall - Exterior".to_string())));
        let starts = pred(ComparisonOperator::StartsWith, json!("basic"));
        assert!(starts.evaluate(&ParameterValue::Text("Basic Wall".to_string())));
        let ends = pred(ComparisonOperator::EndsWith, json!("wall"));
        assert!(!ends.evaluate(&ParameterValue::Text("Wall Sweep".to_string())));
        let eq = pred(ComparisonOperator::Equal, json!("level 1"));
        assert!(eq.evaluate(&ParameterValue::Text("Level 1".to_string())));
    }

    #[test]
    fn test_boolean_equality_only() {
        let eq = pred(ComparisonOperator::Equal, json!(true));
        assert!(eq.evaluate(&ParameterValue::Boolean(true)));
        assert!(eq.evaluate(&ParameterValue::Integer(1)));
        let gt = pred(ComparisonOperator::GreaterThan, json!(false));
        assert!(!gt.evaluate(&ParameterValue::Boolean(true)));
    }

    #[test]
    fn test_empty_only_matches_not_equal() {
        assert!(pred(ComparisonOperator::NotEqual, json!(1)).evaluate(&ParameterValue::Empty));
        assert!(!pred(ComparisonOperator::Equal, json!(1)).evaluate(&ParameterValue::Empty));
        assert!(!pred(ComparisonOperator::Contains, json!("")).evaluate(&ParameterValue::Empty));
    }

    #[test]
    fn test_incomparable_values() {
        let gt = pred(ComparisonOperator::GreaterThan, json!(5));
        assert!(!gt.evaluate(&ParameterValue::Text("tall".to_string())));
        let ne = pred(ComparisonOperator::NotEqual, json!(5));
        assert!(ne.evaluate(&ParameterValue::Text("tall".to_string())));
    }
}

//! Filter validation
//!
//! Rule groups, in precedence order; the first failing group is reported:
//!
//! 1. at least one of include-types / include-instances
//! 2. at least one selection criterion
//! 3. every parameter filter well-formed (all malformed ones reported)
//! 4. parameter filters require a category
//! 5. type-only selection excludes family/type id and active-view filtering
//! 6. bounding box corners given together, min ≤ max componentwise
//! 7. bounding box coordinates finite
//! 8. `maxElements` positive
//!
//! Validation is a pure function of the specification.

use hostbridge_core::{BoundingBox, Payload, Point3};
use serde::Serialize;

use crate::error::{FilterError, PredicateError, PredicateProblem};
use crate::operator::ComparisonOperator;
use crate::predicate::CanonicalPredicate;
use crate::spec::{FilterSpec, OutputShape, ParameterPredicate, ValueType};

/// Which kinds of elements a validated filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementScope {
    /// Element types only
    Types,
    /// Placed instances only
    Instances,
    /// Both
    All,
}

/// A filter that passed validation, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedFilter {
    /// Category, trimmed
    pub category: Option<String>,
    /// Element type name, trimmed
    pub element_type: Option<String>,
    /// Positive family/type id
    pub family_symbol_id: Option<i64>,
    /// Element kinds selected
    pub scope: ElementScope,
    /// Only elements visible in the active view
    pub visible_in_current_view: bool,
    /// Spatial filter
    pub bounding_box: Option<BoundingBox>,
    /// Result cap
    pub max_elements: usize,
    /// Canonical parameter predicates
    pub predicates: Vec<CanonicalPredicate>,
    /// Free-text query
    pub query: Option<String>,
    /// Output shape
    pub output: OutputShape,
}

/// Validate `spec`.
pub fn validate(spec: &FilterSpec) -> Result<(), FilterError> {
    canonicalize(spec).map(|_| ())
}

/// Validate `spec` and produce its canonical form.
pub fn canonicalize(spec: &FilterSpec) -> Result<ValidatedFilter, FilterError> {
    // Rule 1
    let scope = match (spec.include_types, spec.include_instances) {
        (false, false) => return Err(FilterError::NothingIncluded),
        (true, false) => ElementScope::Types,
        (false, true) => ElementScope::Instances,
        (true, true) => ElementScope::All,
    };

    // Rule 2
    let category = non_blank(&spec.filter_category);
    let element_type = non_blank(&spec.filter_element_type);
    let family_symbol_id = spec.filter_family_symbol_id.filter(|id| *id > 0);
    if category.is_none()
        && element_type.is_none()
        && family_symbol_id.is_none()
        && spec.parameter_filters.is_empty()
    {
        return Err(FilterError::NoCondition);
    }

    // Rule 3
    let predicates = canonical_predicates(&spec.parameter_filters)?;

    // Rule 4
    if !predicates.is_empty() && category.is_none() {
        return Err(FilterError::PredicatesWithoutCategory {
            count: predicates.len(),
        });
    }

    // Rule 5
    if scope == ElementScope::Types {
        let mut conflicts = Vec::new();
        if family_symbol_id.is_some() {
            conflicts.push("family/type id");
        }
        if spec.filter_visible_in_current_view {
            conflicts.push("visible-in-active-view");
        }
        if !conflicts.is_empty() {
            return Err(FilterError::TypeOnlyConflict { conflicts });
        }
    }

    // Rules 6 and 7
    let bounding_box = match (spec.bounding_box_min, spec.bounding_box_max) {
        (None, None) => None,
        (Some(_), None) => return Err(FilterError::IncompleteBoundingBox { missing: "max" }),
        (None, Some(_)) => return Err(FilterError::IncompleteBoundingBox { missing: "min" }),
        (Some(min), Some(max)) => Some(bounding_box(min, max)?),
    };

    // Rule 8
    if spec.max_elements <= 0 {
        return Err(FilterError::InvalidMaxElements(spec.max_elements));
    }

    Ok(ValidatedFilter {
        category: category.map(str::to_string),
        element_type: element_type.map(str::to_string),
        family_symbol_id,
        scope,
        visible_in_current_view: spec.filter_visible_in_current_view,
        bounding_box,
        max_elements: spec.max_elements as usize,
        predicates,
        query: non_blank(&spec.query).map(str::to_string),
        output: spec.output.clone(),
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn canonical_predicates(raw: &[ParameterPredicate]) -> Result<Vec<CanonicalPredicate>, FilterError> {
    let mut canonical = Vec::with_capacity(raw.len());
    let mut errors = Vec::new();

    for (i, predicate) in raw.iter().enumerate() {
        match canonical_predicate(predicate) {
            Ok(p) => canonical.push(p),
            Err(problems) => errors.push(PredicateError {
                index: i + 1,
                problems,
            }),
        }
    }

    if errors.is_empty() {
        Ok(canonical)
    } else {
        Err(FilterError::InvalidPredicates(errors))
    }
}

fn canonical_predicate(raw: &ParameterPredicate) -> Result<CanonicalPredicate, Vec<PredicateProblem>> {
    let mut problems = Vec::new();

    let name = raw.name.trim();
    if name.is_empty() {
        problems.push(PredicateProblem::MissingName);
    }

    let operator = raw.operator.trim();
    let parsed = if operator.is_empty() {
        problems.push(PredicateProblem::MissingOperator);
        None
    } else {
        match operator.parse::<ComparisonOperator>() {
            Ok(op) => Some(op),
            Err(e) => {
                problems.push(PredicateProblem::UnknownOperator(e.0));
                None
            }
        }
    };

    let value = match &raw.value {
        None | Some(Payload::Null) => {
            problems.push(PredicateProblem::MissingValue);
            None
        }
        Some(value) => {
            if let Some(expected) = raw.value_type {
                if !value_fits(value, expected) {
                    problems.push(PredicateProblem::ValueTypeMismatch {
                        expected: expected.as_str(),
                        value: value.to_string(),
                    });
                }
            }
            Some(value.clone())
        }
    };

    match (parsed, value) {
        (Some(operator), Some(value)) if problems.is_empty() => Ok(CanonicalPredicate {
            name: name.to_string(),
            operator,
            value,
            value_type: raw.value_type,
        }),
        _ => Err(problems),
    }
}

fn value_fits(value: &Payload, expected: ValueType) -> bool {
    match expected {
        ValueType::String => true,
        ValueType::Number => crate::predicate::payload_number(value).is_some(),
        ValueType::Integer | ValueType::ElementId => crate::predicate::payload_number(value)
            .map(|n| n.fract() == 0.0)
            .unwrap_or(false),
        ValueType::Boolean => crate::predicate::payload_bool(value).is_some(),
    }
}

fn bounding_box(min: Point3, max: Point3) -> Result<BoundingBox, FilterError> {
    let axes = [("x", min.x, max.x), ("y", min.y, max.y), ("z", min.z, max.z)];
    for (axis, lo, hi) in axes {
        if lo > hi {
            return Err(FilterError::InvertedBoundingBox {
                axis,
                min: lo,
                max: hi,
            });
        }
    }
    if !min.is_finite() {
        return Err(FilterError::NonFiniteBoundingBox { corner: "min" });
    }
    if !max.is_finite() {
        return Err(FilterError::NonFiniteBoundingBox { corner: "max" });
    }
    Ok(BoundingBox::new(min, max)?)
}

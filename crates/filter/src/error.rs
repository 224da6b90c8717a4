//! Validation errors
//!
//! Each [`FilterError`] variant corresponds to one rule group, checked in
//! precedence order. Predicate problems are accumulated: one
//! [`PredicateError`] per malformed predicate, each listing everything wrong
//! with it.

use std::fmt;

use hostbridge_core::GeometryError;
use thiserror::Error;

/// Why a filter specification was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Neither types nor instances were requested.
    #[error("filter must include types or instances")]
    NothingIncluded,

    /// No category, type name, family/type id or parameter filter.
    #[error("filter must specify at least one filter condition")]
    NoCondition,

    /// One or more parameter filters are malformed.
    #[error("invalid parameter filters: {}", join(.0))]
    InvalidPredicates(Vec<PredicateError>),

    /// Parameter filters were given without a category to scope them.
    #[error("parameter filters require a category: filterCategory is missing ({count} parameter filter(s) given)")]
    PredicatesWithoutCategory {
        /// Number of parameter filters given
        count: usize,
    },

    /// Type-only selection combined with instance-only filters.
    #[error("type-only filters (includeTypes without includeInstances) cannot use {}", .conflicts.join(" or "))]
    TypeOnlyConflict {
        /// Names of the conflicting filters
        conflicts: Vec<&'static str>,
    },

    /// Only one bounding box corner was given.
    #[error("bounding box requires both min and max corners: {missing} is missing")]
    IncompleteBoundingBox {
        /// Which corner is missing
        missing: &'static str,
    },

    /// A bounding box corner is greater than the other on some axis.
    #[error("bounding box min must be ≤ max on the {axis} axis ({min} > {max})")]
    InvertedBoundingBox {
        /// Offending axis
        axis: &'static str,
        /// Min corner coordinate
        min: f64,
        /// Max corner coordinate
        max: f64,
    },

    /// A bounding box coordinate is NaN or infinite.
    #[error("bounding box {corner} has a non-finite coordinate")]
    NonFiniteBoundingBox {
        /// Which corner
        corner: &'static str,
    },

    /// `maxElements` is zero or negative.
    #[error("maxElements must be positive, got {0}")]
    InvalidMaxElements(i64),

    /// Geometry conversion failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Problems with a single parameter filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter filter #{index}: {}", join(.problems))]
pub struct PredicateError {
    /// 1-based position in `parameterFilters`
    pub index: usize,
    /// Everything wrong with it, in field order
    pub problems: Vec<PredicateProblem>,
}

/// One thing wrong with a parameter filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateProblem {
    /// Empty or blank parameter name
    #[error("parameter name is required")]
    MissingName,

    /// Empty or blank operator
    #[error("operator is required")]
    MissingOperator,

    /// Operator outside the fixed set
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Missing or null comparison value
    #[error("value is required")]
    MissingValue,

    /// Value cannot be read as the declared type
    #[error("value {value} is not a valid {expected}")]
    ValueTypeMismatch {
        /// Declared value type
        expected: &'static str,
        /// The offending value, as JSON
        value: String,
    },
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

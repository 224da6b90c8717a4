//! Element filter specifications for hostbridge
//!
//! A [`FilterSpec`] is a declarative selection query (category, type,
//! family, spatial bounds, parameter predicates, inclusion flags, output
//! shape) decoded straight from a request. It is checked by a pure validator
//! before anything is scheduled on the host thread, and converted to a
//! [`ValidatedFilter`] whose predicates are canonical and evaluable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod operator;
pub mod predicate;
pub mod spec;
pub mod validate;

pub use error::{FilterError, PredicateError, PredicateProblem};
pub use operator::{ComparisonOperator, ParseOperatorError};
pub use predicate::{CanonicalPredicate, ParameterValue, NUMERIC_TOLERANCE};
pub use spec::{
    FilterSpec, OutputFormat, OutputShape, ParameterPredicate, ValueType, DEFAULT_MAX_ELEMENTS,
};
pub use validate::{validate, ElementScope, ValidatedFilter};

//! The filter specification as decoded from a request.
//!
//! Fields may hold inconsistent values; nothing is checked until
//! [`FilterSpec::validate`] or [`FilterSpec::into_validated`] runs.

use hostbridge_core::{Payload, Point3};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::validate::{self, ValidatedFilter};

/// Default for `maxElements`.
pub const DEFAULT_MAX_ELEMENTS: i64 = 50;

fn default_true() -> bool {
    true
}

fn default_max_elements() -> i64 {
    DEFAULT_MAX_ELEMENTS
}

/// A declarative, multi-criterion selection query over host elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Category name, e.g. `"OST_Walls"`
    #[serde(default)]
    pub filter_category: Option<String>,
    /// Element type name
    #[serde(default)]
    pub filter_element_type: Option<String>,
    /// Family/type id; only positive ids select anything
    #[serde(default)]
    pub filter_family_symbol_id: Option<i64>,
    /// Select element types
    #[serde(default)]
    pub include_types: bool,
    /// Select element instances
    #[serde(default = "default_true")]
    pub include_instances: bool,
    /// Only elements visible in the active view
    #[serde(default)]
    pub filter_visible_in_current_view: bool,
    /// Spatial filter min corner (mm)
    #[serde(default)]
    pub bounding_box_min: Option<Point3>,
    /// Spatial filter max corner (mm)
    #[serde(default)]
    pub bounding_box_max: Option<Point3>,
    /// Upper bound on returned elements
    #[serde(default = "default_max_elements")]
    pub max_elements: i64,
    /// Parameter predicates, all of which must hold
    #[serde(default)]
    pub parameter_filters: Vec<ParameterPredicate>,
    /// Free-text description of the query, passed through
    #[serde(default)]
    pub query: Option<String>,
    /// Requested output shape
    #[serde(default)]
    pub output: OutputShape,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            filter_category: None,
            filter_element_type: None,
            filter_family_symbol_id: None,
            include_types: false,
            include_instances: true,
            filter_visible_in_current_view: false,
            bounding_box_min: None,
            bounding_box_max: None,
            max_elements: DEFAULT_MAX_ELEMENTS,
            parameter_filters: Vec::new(),
            query: None,
            output: OutputShape::default(),
        }
    }
}

impl FilterSpec {
    /// An empty specification with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.filter_category = Some(category.into());
        self
    }

    /// Set the element type name.
    pub fn with_element_type(mut self, name: impl Into<String>) -> Self {
        self.filter_element_type = Some(name.into());
        self
    }

    /// Set the family/type id.
    pub fn with_family_symbol_id(mut self, id: i64) -> Self {
        self.filter_family_symbol_id = Some(id);
        self
    }

    /// Set which kinds of elements to include.
    pub fn including(mut self, types: bool, instances: bool) -> Self {
        self.include_types = types;
        self.include_instances = instances;
        self
    }

    /// Restrict to the active view.
    pub fn visible_in_current_view(mut self, visible: bool) -> Self {
        self.filter_visible_in_current_view = visible;
        self
    }

    /// Set both bounding box corners.
    pub fn with_bounding_box(mut self, min: Point3, max: Point3) -> Self {
        self.bounding_box_min = Some(min);
        self.bounding_box_max = Some(max);
        self
    }

    /// Set the result cap.
    pub fn with_max_elements(mut self, max: i64) -> Self {
        self.max_elements = max;
        self
    }

    /// Add a parameter predicate.
    pub fn with_parameter(mut self, predicate: ParameterPredicate) -> Self {
        self.parameter_filters.push(predicate);
        self
    }

    /// Check the specification. Pure; safe to call concurrently.
    pub fn validate(&self) -> Result<(), FilterError> {
        validate::validate(self)
    }

    /// Check the specification and convert it to canonical form.
    pub fn into_validated(self) -> Result<ValidatedFilter, FilterError> {
        validate::canonicalize(&self)
    }
}

/// Declared type of a predicate's comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// Text
    String,
    /// Floating-point number
    Number,
    /// Whole number
    Integer,
    /// `true` / `false`
    Boolean,
    /// Host element id
    ElementId,
}

impl ValueType {
    /// Name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::ElementId => "elementId",
        }
    }

    /// Whether values of this type compare numerically.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Number | ValueType::Integer | ValueType::ElementId)
    }
}

/// A single parameter comparison, as decoded. The operator is kept raw
/// until validation canonicalizes it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterPredicate {
    /// Parameter name
    #[serde(default)]
    pub name: String,
    /// Operator as written by the caller
    #[serde(default)]
    pub operator: String,
    /// Comparison value; `null` counts as missing
    #[serde(default)]
    pub value: Option<Payload>,
    /// Declared type of `value`
    #[serde(default)]
    pub value_type: Option<ValueType>,
}

impl ParameterPredicate {
    /// A predicate with no declared value type.
    pub fn new(name: impl Into<String>, operator: impl Into<String>, value: impl Into<Payload>) -> Self {
        ParameterPredicate {
            name: name.into(),
            operator: operator.into(),
            value: Some(value.into()),
            value_type: None,
        }
    }

    /// Declare the value type.
    pub fn typed(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }
}

/// Level of detail in query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Counts and a short description per element
    #[default]
    Summary,
    /// Every requested field per element
    Detailed,
    /// Element ids only
    Ids,
}

/// Requested shape of the query result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputShape {
    /// Detail level
    #[serde(default)]
    pub format: OutputFormat,
    /// Parameter names to report per element; empty means the default set
    #[serde(default)]
    pub fields: Vec<String>,
}

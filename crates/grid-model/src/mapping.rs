use std::fmt;

use crate::param::{Param, ParamValue};

/// A polymorphic coordinate transformation attached to one spatial dimension
/// of a grid cell.
///
/// Implementations are discovered at parse time through the codec's mapping
/// registry, keyed by [`Mapping::type_name`]. The attached [`Param`] carries
/// the transformation's serialized parameters; `set_param` is called once by
/// the codec when the document provides a `param` payload, and implementations
/// may refresh their internal state from it.
pub trait Mapping: fmt::Debug {
    /// Registry key, written back as the `type` attribute on serialization.
    fn type_name(&self) -> &str;

    fn param(&self) -> &Param;

    fn set_param(&mut self, param: Param);

    /// Apply the transformation to a single coordinate.
    fn apply(&self, value: f64) -> f64;
}

/// Two mappings are semantically equal when they declare the same type and
/// carry the same parameters. This is the equality the round-trip guarantee
/// is stated in terms of; implementation-internal caches do not participate.
impl<'a> PartialEq for dyn Mapping + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.param() == other.param()
    }
}

/// The built-in affine transformation: `apply(x) = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearMapping {
    slope: f64,
    intercept: f64,
    param: Param,
}

impl LinearMapping {
    pub const TYPE_NAME: &'static str = "LinearMapping";

    #[must_use]
    pub fn new(slope: f64, intercept: f64) -> Self {
        let mut param = Param::new();
        param.set("slope", ParamValue::Float(slope));
        param.set("intercept", ParamValue::Float(intercept));
        Self {
            slope,
            intercept,
            param,
        }
    }

    #[must_use]
    pub fn slope(&self) -> f64 {
        self.slope
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Default for LinearMapping {
    /// The identity transform.
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Mapping for LinearMapping {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn param(&self) -> &Param {
        &self.param
    }

    fn set_param(&mut self, param: Param) {
        if let Some(slope) = param.get_float("slope") {
            self.slope = slope;
        }
        if let Some(intercept) = param.get_float("intercept") {
            self.intercept = intercept;
        }
        self.param = param;
    }

    fn apply(&self, value: f64) -> f64 {
        self.slope * value + self.intercept
    }
}

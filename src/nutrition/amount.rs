use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_positive, Result};

/// An absolute quantity expressed in an ingredient's basis unit
/// (grams, milliliters or pieces).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbsoluteAmount(f64);

/// A multiplier applied to a whole recipe batch (0.5 = half a portion).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServingFactor(f64);

impl AbsoluteAmount {
    /// Validated constructor: finite and strictly positive.
    pub fn new(value: f64) -> Result<Self> {
        ensure_positive("amount", value).map(Self)
    }

    /// Wraps a value without validation. Arithmetic downstream propagates whatever is passed.
    pub const fn raw(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl ServingFactor {
    pub const WHOLE: ServingFactor = ServingFactor(1.0);

    /// Validated constructor: finite and strictly positive.
    pub fn new(value: f64) -> Result<Self> {
        ensure_positive("serving factor", value).map(Self)
    }

    pub const fn raw(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl fmt::Display for AbsoluteAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ServingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "×{}", self.0)
    }
}

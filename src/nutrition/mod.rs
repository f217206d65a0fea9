pub mod amount;
pub mod composition;
pub mod normalizer;

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

pub use amount::{AbsoluteAmount, ServingFactor};
pub use composition::resolve_recipe;
pub use normalizer::normalize;

/// The five tracked dimensions. Used both for an ingredient's per-basis profile
/// and for absolute amounts produced by normalization or aggregation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub kcal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub price: f64,
}

macro_rules! for_each_field {
    ($mac:ident) => {
        $mac!(kcal);
        $mac!(protein);
        $mac!(carbs);
        $mac!(fat);
        $mac!(price);
    };
}

impl Totals {
    pub const ZERO: Totals = Totals {
        kcal: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        price: 0.0,
    };

    pub fn scaled(&self, factor: f64) -> Totals {
        let mut scaled = *self;
        macro_rules! scale {
            ($field:ident) => {
                scaled.$field *= factor;
            };
        }
        for_each_field!(scale);
        scaled
    }

    /// Field-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Totals, epsilon: f64) -> bool {
        let lhs = self;
        let mut equal = true;
        macro_rules! compare {
            ($field:ident) => {
                equal &= (lhs.$field - other.$field).abs() <= epsilon;
            };
        }
        for_each_field!(compare);
        equal
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        let lhs = self;
        macro_rules! accumulate {
            ($field:ident) => {
                lhs.$field += rhs.$field;
            };
        }
        for_each_field!(accumulate);
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(mut self, rhs: Totals) -> Totals {
        self += rhs;
        self
    }
}

impl Mul<f64> for Totals {
    type Output = Totals;

    fn mul(self, factor: f64) -> Totals {
        self.scaled(factor)
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::ZERO, Add::add)
    }
}

pub mod ratio;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ensure_positive, Result};
use crate::nutrition::Totals;

pub use ratio::{
    percent_of_goal, price_per_100_kcal, price_per_100_protein, ratio_color, ColorAnchors, Rgb,
};

pub const DEFAULT_KCAL: f64 = 2500.0;
pub const DEFAULT_PROTEIN: f64 = 160.0;
pub const DEFAULT_PRICE: f64 = 15.0;
pub const DEFAULT_CARBS: f64 = 300.0;
pub const DEFAULT_FAT: f64 = 80.0;

/// Daily targets. Every field is finite and > 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub kcal: f64,
    pub protein: f64,
    pub price: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            kcal: DEFAULT_KCAL,
            protein: DEFAULT_PROTEIN,
            price: DEFAULT_PRICE,
            carbs: DEFAULT_CARBS,
            fat: DEFAULT_FAT,
        }
    }
}

/// Percent-of-goal per dimension, each in `0..=999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub kcal: u16,
    pub protein: u16,
    pub carbs: u16,
    pub fat: u16,
    pub price: u16,
}

impl Goals {
    /// Goals as entered by the user; any field that is not a finite number > 0 is rejected.
    pub fn new(kcal: f64, protein: f64, price: f64, carbs: f64, fat: f64) -> Result<Self> {
        Ok(Self {
            kcal: ensure_positive("kcal goal", kcal)?,
            protein: ensure_positive("protein goal", protein)?,
            price: ensure_positive("price goal", price)?,
            carbs: ensure_positive("carbs goal", carbs)?,
            fat: ensure_positive("fat goal", fat)?,
        })
    }

    /// Reads goals from a stored or imported document. Each field that is missing,
    /// not a number, or not > 0 falls back to its default on its own.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Goals::default();
        let field = |name: &str, fallback: f64| {
            value
                .get(name)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(fallback)
        };
        Self {
            kcal: field("kcal", defaults.kcal),
            protein: field("protein", defaults.protein),
            price: field("price", defaults.price),
            carbs: field("carbs", defaults.carbs),
            fat: field("fat", defaults.fat),
        }
    }

    pub fn progress(&self, totals: &Totals) -> GoalProgress {
        GoalProgress {
            kcal: percent_of_goal(totals.kcal, self.kcal),
            protein: percent_of_goal(totals.protein, self.protein),
            carbs: percent_of_goal(totals.carbs, self.carbs),
            fat: percent_of_goal(totals.fat, self.fat),
            price: percent_of_goal(totals.price, self.price),
        }
    }

    /// Price per 100 kcal if the day hits its price and kcal goals exactly.
    pub fn reference_price_per_100_kcal(&self) -> f64 {
        self.price / self.kcal * 100.0
    }

    /// Price per 100 g protein if the day hits its price and protein goals exactly.
    pub fn reference_price_per_100_protein(&self) -> f64 {
        self.price / self.protein * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_rejects_non_positive() {
        assert!(Goals::new(2000.0, 150.0, 12.0, 250.0, 70.0).is_ok());
        assert!(Goals::new(0.0, 150.0, 12.0, 250.0, 70.0).is_err());
        assert!(Goals::new(2000.0, 150.0, f64::NAN, 250.0, 70.0).is_err());
    }

    #[test]
    fn test_from_value_falls_back_per_field() {
        let goals = Goals::from_value(&json!({
            "kcal": 2100,
            "protein": "lots",
            "price": -3,
            "carbs": 250.5
        }));
        assert_eq!(goals.kcal, 2100.0);
        assert_eq!(goals.protein, DEFAULT_PROTEIN);
        assert_eq!(goals.price, DEFAULT_PRICE);
        assert_eq!(goals.carbs, 250.5);
        assert_eq!(goals.fat, DEFAULT_FAT);
    }

    #[test]
    fn test_progress_and_references() {
        let goals = Goals::default();
        let totals = Totals {
            kcal: 1250.0,
            protein: 160.0,
            carbs: 0.0,
            fat: 120.0,
            price: 30.0,
        };
        let progress = goals.progress(&totals);
        assert_eq!(progress.kcal, 50);
        assert_eq!(progress.protein, 100);
        assert_eq!(progress.carbs, 0);
        assert_eq!(progress.fat, 150);
        assert_eq!(progress.price, 200);
        assert!((goals.reference_price_per_100_kcal() - 0.6).abs() < 1e-12);
        assert!((goals.reference_price_per_100_protein() - 9.375).abs() < 1e-12);
    }
}

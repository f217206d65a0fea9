use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::CatalogItem;
use crate::error::{ensure_name, ensure_non_negative, Result};
use crate::ids::IngredientId;
use crate::nutrition::Totals;

/// Reference quantity an ingredient's profile is expressed per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Basis {
    #[serde(rename = "100g")]
    #[value(name = "100g")]
    Per100Grams,
    #[serde(rename = "100ml")]
    #[value(name = "100ml")]
    Per100Milliliters,
    #[serde(rename = "piece")]
    #[value(name = "piece")]
    Piece,
}

impl Basis {
    /// Multiplier that turns an absolute amount into "number of basis units".
    pub fn factor_for(self, amount: f64) -> f64 {
        match self {
            Basis::Per100Grams | Basis::Per100Milliliters => amount / 100.0,
            Basis::Piece => amount,
        }
    }

    pub fn unit_label(self) -> &'static str {
        match self {
            Basis::Per100Grams => "g",
            Basis::Per100Milliliters => "ml",
            Basis::Piece => "pc",
        }
    }
}

impl std::fmt::Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Basis::Per100Grams => "100g",
            Basis::Per100Milliliters => "100ml",
            Basis::Piece => "piece",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(rename = "unitType")]
    pub basis: Basis,
    /// Nutrition and price for one basis unit.
    #[serde(flatten)]
    pub per_basis: Totals,
}

impl CatalogItem for Ingredient {
    type Id = IngredientId;

    fn id(&self) -> &IngredientId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Ingredient {
    /// "Name (Brand)" when a brand is set.
    pub fn display_name(&self) -> String {
        match &self.brand {
            Some(brand) => format!("{} ({})", self.name, brand),
            None => self.name.clone(),
        }
    }
}

/// Editor input for creating or updating an ingredient.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientDraft {
    pub name: String,
    pub brand: Option<String>,
    pub basis: Basis,
    pub per_basis: Totals,
}

impl IngredientDraft {
    /// Checks the draft and builds the ingredient under `id`.
    ///
    /// Names are trimmed, a blank brand becomes `None`, and every profile
    /// field has to be a finite number ≥ 0.
    pub fn into_ingredient(self, id: IngredientId) -> Result<Ingredient> {
        let name = ensure_name("name", &self.name)?;
        let brand = self
            .brand
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        let per_basis = Totals {
            kcal: ensure_non_negative("kcal", self.per_basis.kcal)?,
            protein: ensure_non_negative("protein", self.per_basis.protein)?,
            carbs: ensure_non_negative("carbs", self.per_basis.carbs)?,
            fat: ensure_non_negative("fat", self.per_basis.fat)?,
            price: ensure_non_negative("price", self.per_basis.price)?,
        };
        Ok(Ingredient {
            id,
            name,
            brand,
            basis: self.basis,
            per_basis,
        })
    }
}

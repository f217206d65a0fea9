use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::catalog::{Catalogs, Ingredient, Recipe};
use crate::ids::{EntryId, IngredientId, RecipeId};
use crate::nutrition::{normalize, resolve_recipe, AbsoluteAmount, ServingFactor, Totals};

/// Meal slot an entry is filed under. Older documents have no slot; those read as snacks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    #[default]
    Snacks,
    Dinner,
}

impl Meal {
    /// Display order within a day.
    pub const ALL: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Snacks, Meal::Dinner];

    pub fn label(self) -> &'static str {
        match self {
            Meal::Breakfast => "Breakfast",
            Meal::Lunch => "Lunch",
            Meal::Snacks => "Snacks",
            Meal::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What an entry points at. Ingredient entries carry an absolute amount,
/// recipe entries a serving factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryTarget {
    Ingredient {
        #[serde(rename = "refId")]
        ref_id: IngredientId,
        amount: AbsoluteAmount,
    },
    Recipe {
        #[serde(rename = "refId")]
        ref_id: RecipeId,
        amount: ServingFactor,
    },
}

impl EntryTarget {
    pub fn has_valid_amount(&self) -> bool {
        match self {
            EntryTarget::Ingredient { amount, .. } => amount.is_valid(),
            EntryTarget::Recipe { amount, .. } => amount.is_valid(),
        }
    }

    pub fn ref_id(&self) -> &str {
        match self {
            EntryTarget::Ingredient { ref_id, .. } => ref_id.as_str(),
            EntryTarget::Recipe { ref_id, .. } => ref_id.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(flatten)]
    pub target: EntryTarget,
    #[serde(default, deserialize_with = "meal_or_snacks")]
    pub meal: Meal,
}

fn meal_or_snacks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Meal, D::Error> {
    Option::<Meal>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Entry {
    pub fn new(target: EntryTarget, meal: Meal) -> Self {
        Self {
            id: EntryId::generate(),
            target,
            meal,
        }
    }

    /// Looks the target up in the catalogs. `None` means the reference is stale.
    pub fn resolve<'a>(&'a self, catalogs: Catalogs<'a>) -> Option<ResolvedEntry<'a>> {
        match &self.target {
            EntryTarget::Ingredient { ref_id, amount } => {
                let ingredient = catalogs.ingredients.resolve(ref_id)?;
                Some(ResolvedEntry {
                    entry: self,
                    source: EntrySource::Ingredient(ingredient),
                    totals: normalize(ingredient, *amount),
                })
            }
            EntryTarget::Recipe { ref_id, amount } => {
                let recipe = catalogs.recipes.resolve(ref_id)?;
                Some(ResolvedEntry {
                    entry: self,
                    source: EntrySource::Recipe(recipe),
                    totals: resolve_recipe(recipe, catalogs.ingredients) * amount.value(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EntrySource<'a> {
    Ingredient(&'a Ingredient),
    Recipe(&'a Recipe),
}

/// An entry whose reference resolved, together with what it contributes.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEntry<'a> {
    pub entry: &'a Entry,
    pub source: EntrySource<'a>,
    pub totals: Totals,
}

impl ResolvedEntry<'_> {
    pub fn name(&self) -> String {
        match self.source {
            EntrySource::Ingredient(ingredient) => ingredient.display_name(),
            EntrySource::Recipe(recipe) => recipe.name.clone(),
        }
    }

    /// "80 g", "2 pc", "×0.5".
    pub fn quantity_label(&self) -> String {
        match (&self.entry.target, self.source) {
            (EntryTarget::Ingredient { amount, .. }, EntrySource::Ingredient(ingredient)) => {
                format!("{} {}", amount, ingredient.basis.unit_label())
            }
            (EntryTarget::Recipe { amount, .. }, _) => amount.to_string(),
            (EntryTarget::Ingredient { amount, .. }, EntrySource::Recipe(_)) => amount.to_string(),
        }
    }
}

use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogItem, Ingredient};
use crate::error::{ensure_name, Result, TrackerError};
use crate::ids::{IngredientId, RecipeId};
use crate::nutrition::AbsoluteAmount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    #[serde(rename = "ingredientId")]
    pub ingredient_id: IngredientId,
    /// Quantity in the ingredient's basis unit.
    pub amount: AbsoluteAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(rename = "items", default)]
    pub lines: Vec<RecipeLine>,
}

impl CatalogItem for Recipe {
    type Id = RecipeId;

    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Recipe {
    pub fn uses_ingredient(&self, id: &IngredientId) -> bool {
        self.lines.iter().any(|line| &line.ingredient_id == id)
    }
}

/// Editor input for a recipe: a name and `(ingredient, amount)` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub lines: Vec<(IngredientId, f64)>,
}

impl RecipeDraft {
    /// Validates the draft against the current ingredient catalog.
    ///
    /// A saved recipe needs a name, at least one line, a positive amount on every
    /// line and only ingredients that exist right now.
    pub fn into_recipe(self, id: RecipeId, ingredients: &Catalog<Ingredient>) -> Result<Recipe> {
        let name = ensure_name("name", &self.name)?;
        if self.lines.is_empty() {
            return Err(TrackerError::validation(
                "items",
                "a recipe needs at least one ingredient",
            ));
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for (ingredient_id, amount) in self.lines {
            if !ingredients.contains(&ingredient_id) {
                return Err(TrackerError::UnknownIngredient(ingredient_id.to_string()));
            }
            lines.push(RecipeLine {
                ingredient_id,
                amount: AbsoluteAmount::new(amount)?,
            });
        }

        Ok(Recipe { id, name, lines })
    }
}

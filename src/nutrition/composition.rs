use tracing::debug;

use crate::catalog::{Catalog, Ingredient, Recipe};
use crate::nutrition::{normalize, Totals};

/// Aggregate totals for one full batch of `recipe`.
///
/// Lines whose ingredient no longer exists are skipped, so a recipe with no
/// resolvable lines comes out as zero.
pub fn resolve_recipe(recipe: &Recipe, ingredients: &Catalog<Ingredient>) -> Totals {
    let mut totals = Totals::ZERO;
    for line in &recipe.lines {
        match ingredients.resolve(&line.ingredient_id) {
            Some(ingredient) => totals += normalize(ingredient, line.amount),
            None => debug!(
                recipe = %recipe.id,
                ingredient = %line.ingredient_id,
                "skipping recipe line with stale ingredient reference"
            ),
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Basis, RecipeLine};
    use crate::ids::{IngredientId, RecipeId};
    use crate::nutrition::AbsoluteAmount;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn ingredient(id: &str, basis: Basis, kcal: f64, price: f64) -> Ingredient {
        Ingredient {
            id: IngredientId::from(id),
            name: id.to_string(),
            brand: None,
            basis,
            per_basis: Totals {
                kcal,
                protein: kcal / 20.0,
                carbs: kcal / 8.0,
                fat: kcal / 40.0,
                price,
            },
        }
    }

    fn line(id: &str, amount: f64) -> RecipeLine {
        RecipeLine {
            ingredient_id: IngredientId::from(id),
            amount: AbsoluteAmount::raw(amount),
        }
    }

    fn pantry() -> Catalog<Ingredient> {
        let mut catalog = Catalog::new();
        catalog.insert(ingredient("oats", Basis::Per100Grams, 389.0, 0.19));
        catalog.insert(ingredient("milk", Basis::Per100Milliliters, 64.0, 0.11));
        catalog.insert(ingredient("egg", Basis::Piece, 78.0, 0.3));
        catalog.insert(ingredient("honey", Basis::Per100Grams, 304.0, 1.2));
        catalog
    }

    #[test]
    fn test_empty_recipe_is_zero() {
        let recipe = Recipe {
            id: RecipeId::from("r"),
            name: "Nothing".to_string(),
            lines: vec![],
        };
        assert_eq!(resolve_recipe(&recipe, &pantry()), Totals::ZERO);
    }

    #[test]
    fn test_line_order_does_not_matter() {
        let catalog = pantry();
        let mut recipe = Recipe {
            id: RecipeId::from("r"),
            name: "Breakfast bowl".to_string(),
            lines: vec![
                line("oats", 80.0),
                line("milk", 250.0),
                line("egg", 2.0),
                line("honey", 15.0),
            ],
        };
        let reference = resolve_recipe(&recipe, &catalog);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            recipe.lines.shuffle(&mut rng);
            assert!(resolve_recipe(&recipe, &catalog).approx_eq(&reference, 1e-9));
        }
    }

    #[test]
    fn test_dangling_line_is_ignored() {
        let catalog = pantry();
        let recipe = Recipe {
            id: RecipeId::from("r"),
            name: "Porridge".to_string(),
            lines: vec![line("oats", 80.0), line("deleted", 120.0)],
        };
        let oats = catalog.resolve(&IngredientId::from("oats")).unwrap();
        assert_eq!(
            resolve_recipe(&recipe, &catalog),
            normalize(oats, AbsoluteAmount::raw(80.0))
        );
    }
}

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{Catalog, CatalogItem, Catalogs, Ingredient, Recipe};
use crate::error::{Result, TrackerError};
use crate::goals::Goals;
use crate::ids::IngredientId;
use crate::ledger::DayLedger;

/// Written into every saved or exported document. Readers never require it.
pub const SCHEMA_VERSION: u32 = 1;

/// The single persisted aggregate: both catalogs, the day ledger and the goals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    pub ingredients: Catalog<Ingredient>,
    pub recipes: Catalog<Recipe>,
    pub day_logs: DayLedger,
    pub goals: Goals,
}

#[derive(Serialize)]
struct VersionedDocument<'a> {
    version: u32,
    #[serde(flatten)]
    state: &'a StateDocument,
}

impl StateDocument {
    pub fn catalogs(&self) -> Catalogs<'_> {
        Catalogs {
            ingredients: &self.ingredients,
            recipes: &self.recipes,
        }
    }

    /// Builds a document from parsed JSON.
    ///
    /// The top level must be an object with array `ingredients`/`recipes` and object
    /// `dayLogs`/`goals`. Goal fields fall back to defaults one by one; every other
    /// section has to deserialize cleanly or the whole document is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(malformed("the document is not an object"));
        };

        let ingredients: Catalog<Ingredient> = section(&mut root, "ingredients", Value::is_array, "an array")?;
        let recipes: Catalog<Recipe> = section(&mut root, "recipes", Value::is_array, "an array")?;
        let day_logs: DayLedger = section(&mut root, "dayLogs", Value::is_object, "an object")?;
        let goals = match root.get("goals") {
            Some(goals @ Value::Object(_)) => Goals::from_value(goals),
            _ => return Err(malformed("'goals' must be an object")),
        };

        if let Some(id) = ingredients.duplicate_id() {
            return Err(malformed(format!("ingredient id '{id}' appears more than once")));
        }
        if let Some(id) = recipes.duplicate_id() {
            return Err(malformed(format!("recipe id '{id}' appears more than once")));
        }

        Ok(Self {
            ingredients,
            recipes,
            day_logs,
            goals,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| malformed(format!("not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let versioned = VersionedDocument {
            version: SCHEMA_VERSION,
            state: self,
        };
        Ok(serde_json::to_string_pretty(&versioned)?)
    }

    /// Names of recipes with at least one line pointing at `id`.
    pub fn recipes_using(&self, id: &IngredientId) -> Vec<&str> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.uses_ingredient(id))
            .map(|recipe| recipe.name())
            .collect()
    }

    /// Deletes an ingredient unless a recipe still uses it.
    ///
    /// Day ledger entries are left alone; they simply stop resolving.
    pub fn delete_ingredient(&mut self, id: &IngredientId) -> Result<Ingredient> {
        let ingredient = self
            .ingredients
            .resolve(id)
            .ok_or_else(|| TrackerError::UnknownIngredient(id.to_string()))?;
        let users = self.recipes_using(id);
        if !users.is_empty() {
            return Err(TrackerError::ReferencedByRecipe {
                name: ingredient.name.clone(),
                recipes: users.into_iter().map(str::to_string).collect(),
            });
        }
        self.ingredients
            .remove(id)
            .ok_or_else(|| TrackerError::UnknownIngredient(id.to_string()))
    }
}

fn malformed(reason: impl Into<String>) -> TrackerError {
    TrackerError::MalformedDocument(reason.into())
}

fn section<T: DeserializeOwned>(
    root: &mut Map<String, Value>,
    key: &str,
    shape: fn(&Value) -> bool,
    expected: &str,
) -> Result<T> {
    match root.remove(key) {
        Some(value) if shape(&value) => {
            serde_json::from_value(value).map_err(|e| malformed(format!("'{key}': {e}")))
        }
        _ => Err(malformed(format!("'{key}' must be {expected}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Basis, RecipeLine};
    use crate::ids::RecipeId;
    use crate::nutrition::{AbsoluteAmount, Totals};
    use serde_json::json;

    fn minimal() -> Value {
        json!({"ingredients": [], "recipes": [], "dayLogs": {}, "goals": {}})
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        for bad in [
            json!([]),
            json!("state"),
            json!({"ingredients": {}, "recipes": [], "dayLogs": {}, "goals": {}}),
            json!({"ingredients": [], "recipes": null, "dayLogs": {}, "goals": {}}),
            json!({"ingredients": [], "recipes": [], "dayLogs": [], "goals": {}}),
            json!({"ingredients": [], "recipes": [], "dayLogs": {}, "goals": 5}),
            json!({"ingredients": [], "recipes": [], "dayLogs": {}}),
        ] {
            assert!(
                matches!(StateDocument::from_value(bad.clone()), Err(TrackerError::MalformedDocument(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_minimal_document_gets_default_goals() {
        let state = StateDocument::from_value(minimal()).unwrap();
        assert_eq!(state, StateDocument::default());
    }

    #[test]
    fn test_rejects_bad_day_key_and_duplicate_ids() {
        let mut doc = minimal();
        doc["dayLogs"] = json!({"2024-6-1": []});
        assert!(StateDocument::from_value(doc).is_err());

        let mut doc = minimal();
        doc["recipes"] = json!([
            {"id": "r", "name": "A", "items": []},
            {"id": "r", "name": "B", "items": []}
        ]);
        let err = StateDocument::from_value(doc).unwrap_err();
        assert!(err.to_string().contains("'r'"));
    }

    #[test]
    fn test_version_marker_is_written_and_optional() {
        let json = StateDocument::default().to_json_pretty().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["dayLogs"].is_object());
        assert_eq!(value["goals"]["kcal"], 2500.0);
        assert!(StateDocument::from_json(&json).is_ok());
        assert!(StateDocument::from_value(minimal()).is_ok());
    }

    #[test]
    fn test_delete_ingredient_guard() {
        let mut state = StateDocument::default();
        for id in ["oats", "salt"] {
            state.ingredients.insert(Ingredient {
                id: IngredientId::from(id),
                name: id.to_string(),
                brand: None,
                basis: Basis::Per100Grams,
                per_basis: Totals::ZERO,
            });
        }
        state.recipes.insert(Recipe {
            id: RecipeId::from("porridge"),
            name: "Porridge".to_string(),
            lines: vec![RecipeLine {
                ingredient_id: IngredientId::from("oats"),
                amount: AbsoluteAmount::raw(80.0),
            }],
        });
        let before = state.clone();

        let err = state.delete_ingredient(&IngredientId::from("oats")).unwrap_err();
        assert!(matches!(
            &err,
            TrackerError::ReferencedByRecipe { recipes, .. } if recipes == &vec!["Porridge".to_string()]
        ));
        assert_eq!(state, before);

        assert!(state.delete_ingredient(&IngredientId::from("salt")).is_ok());
        assert!(matches!(
            state.delete_ingredient(&IngredientId::from("salt")),
            Err(TrackerError::UnknownIngredient(_))
        ));
    }
}

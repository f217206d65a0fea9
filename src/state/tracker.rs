use std::path::Path;
use tracing::{info, warn};

use super::document::StateDocument;
use super::storage::Storage;
use crate::calendar::{DayKey, DayNavigator};
use crate::catalog::{Ingredient, IngredientDraft, Recipe, RecipeDraft};
use crate::error::{Result, TrackerError};
use crate::goals::{ColorAnchors, Goals};
use crate::ids::{EntryId, IngredientId, RecipeId};
use crate::ledger::{Entry, EntryTarget, Meal};
use crate::report::DaySummary;

/// Owns the state document and its storage.
///
/// Loading happens once in [`Tracker::open`]; every mutating method validates its
/// input, applies the change and saves the full document before returning.
#[derive(Debug)]
pub struct Tracker<S: Storage> {
    state: StateDocument,
    storage: S,
    anchors: ColorAnchors,
}

impl<S: Storage> Tracker<S> {
    /// Loads the stored document. A document that cannot be read back is replaced
    /// by a fresh one so the tracker stays usable.
    pub fn open(storage: S, anchors: ColorAnchors) -> Result<Self> {
        let state = match storage.load() {
            Ok(None) => {
                info!("no stored state found, starting empty");
                StateDocument::default()
            }
            Ok(Some(raw)) => StateDocument::from_json(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored state is unreadable, starting from an empty document");
                StateDocument::default()
            }),
            Err(e @ TrackerError::MalformedDocument(_)) => {
                warn!(error = %e, "stored state is unreadable, starting from an empty document");
                StateDocument::default()
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            state,
            storage,
            anchors,
        })
    }

    pub fn state(&self) -> &StateDocument {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn anchors(&self) -> &ColorAnchors {
        &self.anchors
    }

    /// Saves `next` and only then makes it the current state, so a failed save
    /// leaves memory matching what is on disk.
    fn commit(&mut self, next: StateDocument) -> Result<()> {
        let raw = next.to_json_pretty()?;
        self.storage.save(&raw)?;
        self.state = next;
        Ok(())
    }

    /// Runs `change` on a copy of the state and commits the copy if it succeeds.
    fn apply<T>(&mut self, change: impl FnOnce(&mut StateDocument) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let out = change(&mut next)?;
        self.commit(next)?;
        Ok(out)
    }

    pub fn create_ingredient(&mut self, draft: IngredientDraft) -> Result<IngredientId> {
        let ingredient = draft.into_ingredient(IngredientId::generate())?;
        let id = ingredient.id.clone();
        let name = ingredient.name.clone();
        self.apply(|state| {
            state.ingredients.insert(ingredient);
            Ok(())
        })?;
        info!(ingredient = %id, %name, "ingredient created");
        Ok(id)
    }

    pub fn update_ingredient(&mut self, id: &IngredientId, draft: IngredientDraft) -> Result<()> {
        if !self.state.ingredients.contains(id) {
            return Err(TrackerError::UnknownIngredient(id.to_string()));
        }
        let ingredient = draft.into_ingredient(id.clone())?;
        self.apply(|state| {
            state.ingredients.replace(ingredient);
            Ok(())
        })?;
        info!(ingredient = %id, "ingredient updated");
        Ok(())
    }

    pub fn delete_ingredient(&mut self, id: &IngredientId) -> Result<Ingredient> {
        let removed = self.apply(|state| state.delete_ingredient(id)).map_err(|e| {
            warn!(ingredient = %id, error = %e, "ingredient deletion failed");
            e
        })?;
        info!(ingredient = %id, "ingredient deleted");
        Ok(removed)
    }

    pub fn create_recipe(&mut self, draft: RecipeDraft) -> Result<RecipeId> {
        let recipe = draft.into_recipe(RecipeId::generate(), &self.state.ingredients)?;
        let id = recipe.id.clone();
        let (name, lines) = (recipe.name.clone(), recipe.lines.len());
        self.apply(|state| {
            state.recipes.insert(recipe);
            Ok(())
        })?;
        info!(recipe = %id, %name, lines, "recipe created");
        Ok(id)
    }

    pub fn update_recipe(&mut self, id: &RecipeId, draft: RecipeDraft) -> Result<()> {
        if !self.state.recipes.contains(id) {
            return Err(TrackerError::UnknownRecipe(id.to_string()));
        }
        let recipe = draft.into_recipe(id.clone(), &self.state.ingredients)?;
        self.apply(|state| {
            state.recipes.replace(recipe);
            Ok(())
        })?;
        info!(recipe = %id, "recipe updated");
        Ok(())
    }

    /// Deleting a recipe is never blocked; logged entries for it turn stale.
    pub fn delete_recipe(&mut self, id: &RecipeId) -> Result<Recipe> {
        let removed = self.apply(|state| {
            state
                .recipes
                .remove(id)
                .ok_or_else(|| TrackerError::UnknownRecipe(id.to_string()))
        })?;
        info!(recipe = %id, "recipe deleted");
        Ok(removed)
    }

    /// Logs an entry on `day`, which may not lie after `today`. The target has to
    /// exist at the moment of logging.
    pub fn log_entry(
        &mut self,
        today: DayKey,
        day: DayKey,
        target: EntryTarget,
        meal: Meal,
    ) -> Result<EntryId> {
        if day > today {
            return Err(TrackerError::validation(
                "day",
                format!("{day} is after the current day {today}"),
            ));
        }
        match &target {
            EntryTarget::Ingredient { ref_id, .. } if !self.state.ingredients.contains(ref_id) => {
                return Err(TrackerError::UnknownIngredient(ref_id.to_string()));
            }
            EntryTarget::Recipe { ref_id, .. } if !self.state.recipes.contains(ref_id) => {
                return Err(TrackerError::UnknownRecipe(ref_id.to_string()));
            }
            _ => {}
        }
        let entry = Entry::new(target, meal);
        let id = entry.id.clone();
        self.apply(|state| state.day_logs.append(day, entry))?;
        info!(%day, entry = %id, %meal, "entry logged");
        Ok(id)
    }

    /// Returns whether an entry was removed. Nothing is saved when it was not there.
    pub fn remove_entry(&mut self, day: &DayKey, id: &EntryId) -> Result<bool> {
        if !self.state.day_logs.stored_entries(day).iter().any(|e| &e.id == id) {
            return Ok(false);
        }
        self.apply(|state| {
            state.day_logs.remove(day, id);
            Ok(())
        })?;
        info!(%day, entry = %id, "entry removed");
        Ok(true)
    }

    pub fn set_goals(&mut self, goals: Goals) -> Result<()> {
        self.apply(|state| {
            state.goals = goals;
            Ok(())
        })?;
        info!(?goals, "goals updated");
        Ok(())
    }

    /// Swaps in a whole new document once it has been saved.
    pub fn replace_state(&mut self, state: StateDocument) -> Result<()> {
        self.commit(state)
    }

    /// Reads a document from `path` and, if it validates and saves, replaces the
    /// current state. On any failure the current state is left exactly as it was.
    pub async fn import_file(&mut self, path: &Path) -> Result<()> {
        let raw = tokio::fs::read_to_string(path).await?;
        let state = match StateDocument::from_json(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import rejected");
                return Err(e);
            }
        };
        let (ingredients, recipes) = (state.ingredients.len(), state.recipes.len());
        self.replace_state(state)?;
        info!(path = %path.display(), ingredients, recipes, "document imported");
        Ok(())
    }

    pub async fn export_file(&self, path: &Path) -> Result<()> {
        let raw = self.state.to_json_pretty()?;
        tokio::fs::write(path, raw).await?;
        info!(path = %path.display(), "document exported");
        Ok(())
    }

    pub fn navigator(&self, today: DayKey) -> DayNavigator {
        DayNavigator::new(today, self.state.day_logs.earliest_logged_day())
    }

    pub fn day_summary(&self, day: DayKey) -> DaySummary {
        DaySummary::build(&self.state, day, &self.anchors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Basis;
    use crate::nutrition::{AbsoluteAmount, ServingFactor, Totals};
    use crate::state::storage::{JsonFileStorage, MemoryStorage};

    fn tracker() -> Tracker<MemoryStorage> {
        Tracker::open(MemoryStorage::new(), ColorAnchors::default()).unwrap()
    }

    fn oats() -> IngredientDraft {
        IngredientDraft {
            name: "Oats".to_string(),
            brand: None,
            basis: Basis::Per100Grams,
            per_basis: Totals {
                kcal: 389.0,
                protein: 13.0,
                carbs: 66.0,
                fat: 7.0,
                price: 0.19,
            },
        }
    }

    fn day() -> DayKey {
        "2024-06-01".parse().unwrap()
    }

    #[test]
    fn test_corrupt_storage_recovers_to_defaults() {
        let tracker =
            Tracker::open(MemoryStorage::with_contents("{not json"), ColorAnchors::default()).unwrap();
        assert_eq!(tracker.state(), &StateDocument::default());
    }

    #[test]
    fn test_non_utf8_state_file_recovers_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, [0xff, 0xfe, b'{', 0x80]).unwrap();

        let mut tracker = Tracker::open(JsonFileStorage::new(&path), ColorAnchors::default()).unwrap();
        assert_eq!(tracker.state(), &StateDocument::default());

        // Still usable: the next mutation overwrites the bad file.
        tracker.create_ingredient(oats()).unwrap();
        let reopened = Tracker::open(JsonFileStorage::new(&path), ColorAnchors::default()).unwrap();
        assert_eq!(reopened.state().ingredients.len(), 1);
    }

    #[test]
    fn test_logging_after_today_is_rejected() {
        let mut tracker = tracker();
        let id = tracker.create_ingredient(oats()).unwrap();
        let today: DayKey = "2024-06-10".parse().unwrap();
        let target = EntryTarget::Ingredient {
            ref_id: id,
            amount: AbsoluteAmount::new(80.0).unwrap(),
        };

        let future = tracker.log_entry(today, "2024-06-20".parse().unwrap(), target.clone(), Meal::Lunch);
        assert!(matches!(future, Err(TrackerError::Validation { field: "day", .. })));
        assert_eq!(tracker.state().day_logs.day_keys().count(), 0);
        assert_eq!(tracker.storage().save_count(), 1);

        tracker.log_entry(today, today, target.clone(), Meal::Lunch).unwrap();
        tracker.log_entry(today, "2024-05-01".parse().unwrap(), target, Meal::Lunch).unwrap();
        assert_eq!(tracker.state().day_logs.logged_days().count(), 2);
    }

    #[derive(Debug, Default)]
    struct BrokenDisk {
        fail: bool,
    }

    impl Storage for BrokenDisk {
        fn load(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn save(&mut self, _raw: &str) -> Result<()> {
            if self.fail {
                return Err(std::io::Error::other("disk full").into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let mut tracker = Tracker::open(BrokenDisk::default(), ColorAnchors::default()).unwrap();
        let id = tracker.create_ingredient(oats()).unwrap();
        let before = tracker.state().clone();

        tracker.storage.fail = true;
        assert!(matches!(tracker.create_ingredient(oats()), Err(TrackerError::Storage(_))));
        assert!(tracker.delete_ingredient(&id).is_err());
        assert!(tracker.set_goals(Goals::new(2000.0, 120.0, 10.0, 250.0, 70.0).unwrap()).is_err());
        assert!(tracker.replace_state(StateDocument::default()).is_err());
        assert_eq!(tracker.state(), &before);
    }

    #[test]
    fn test_every_mutation_saves_once() {
        let mut tracker = tracker();
        let id = tracker.create_ingredient(oats()).unwrap();
        assert_eq!(tracker.storage().save_count(), 1);

        let entry = tracker
            .log_entry(
                day(),
                day(),
                EntryTarget::Ingredient {
                    ref_id: id.clone(),
                    amount: AbsoluteAmount::new(80.0).unwrap(),
                },
                Meal::Breakfast,
            )
            .unwrap();
        assert_eq!(tracker.storage().save_count(), 2);

        assert!(tracker.remove_entry(&day(), &entry).unwrap());
        assert!(!tracker.remove_entry(&day(), &entry).unwrap());
        assert_eq!(tracker.storage().save_count(), 3);

        let saved = StateDocument::from_json(tracker.storage().contents().unwrap()).unwrap();
        assert_eq!(&saved, tracker.state());
    }

    #[test]
    fn test_invalid_input_mutates_nothing() {
        let mut tracker = tracker();
        let mut bad = oats();
        bad.name = " ".to_string();
        assert!(tracker.create_ingredient(bad).is_err());

        let unknown = tracker.log_entry(
            day(),
            day(),
            EntryTarget::Recipe {
                ref_id: RecipeId::from("nope"),
                amount: ServingFactor::WHOLE,
            },
            Meal::Lunch,
        );
        assert!(matches!(unknown, Err(TrackerError::UnknownRecipe(_))));

        let id = tracker.create_ingredient(oats()).unwrap();
        let zero = tracker.log_entry(
            day(),
            day(),
            EntryTarget::Ingredient {
                ref_id: id,
                amount: AbsoluteAmount::raw(0.0),
            },
            Meal::Lunch,
        );
        assert!(zero.is_err());
        assert_eq!(tracker.storage().save_count(), 1);
        assert_eq!(tracker.state().day_logs.day_keys().count(), 0);
    }

    #[test]
    fn test_update_keeps_id_and_unknown_ids_fail() {
        let mut tracker = tracker();
        let id = tracker.create_ingredient(oats()).unwrap();
        let mut renamed = oats();
        renamed.name = "Rolled oats".to_string();
        tracker.update_ingredient(&id, renamed.clone()).unwrap();
        assert_eq!(tracker.state().ingredients.resolve(&id).unwrap().name, "Rolled oats");

        assert!(matches!(
            tracker.update_ingredient(&IngredientId::from("ghost"), renamed),
            Err(TrackerError::UnknownIngredient(_))
        ));
        assert!(matches!(
            tracker.delete_recipe(&RecipeId::from("ghost")),
            Err(TrackerError::UnknownRecipe(_))
        ));
    }
}

use anyhow::{Context, Result};
use serde_json::json;

use crate::calendar::DayKey;
use crate::catalog::{IngredientDraft, RecipeDraft};
use crate::cli::{
    Command, DayCommand, GoalsCommand, IngredientCommand, IngredientFields, LogCommand,
    RecipeCommand, RecipeFields,
};
use crate::error::TrackerError;
use crate::goals::Goals;
use crate::ids::{EntryId, IngredientId, RecipeId};
use crate::ledger::EntryTarget;
use crate::nutrition::{resolve_recipe, AbsoluteAmount, ServingFactor, Totals};
use crate::state::{Storage, Tracker};

impl From<IngredientFields> for IngredientDraft {
    fn from(fields: IngredientFields) -> Self {
        IngredientDraft {
            name: fields.name,
            brand: fields.brand,
            basis: fields.basis,
            per_basis: Totals {
                kcal: fields.kcal,
                protein: fields.protein,
                carbs: fields.carbs,
                fat: fields.fat,
                price: fields.price,
            },
        }
    }
}

impl From<RecipeFields> for RecipeDraft {
    fn from(fields: RecipeFields) -> Self {
        RecipeDraft {
            name: fields.name,
            lines: fields
                .lines
                .into_iter()
                .map(|(id, amount)| (IngredientId::from(id), amount))
                .collect(),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn totals_line(totals: &Totals) -> String {
    format!(
        "{:.1} kcal, {:.1} g protein, {:.1} g carbs, {:.1} g fat, {:.2} price",
        totals.kcal, totals.protein, totals.carbs, totals.fat, totals.price
    )
}

/// Runs one command against the tracker and returns what should be printed.
///
/// # Arguments
/// * `command` - The parsed subcommand.
/// * `tracker` - The loaded tracker; mutations are saved by it.
/// * `today` - The current logging day, used when no `--date` is given.
/// * `json` - Render output as JSON instead of text.
pub async fn execute<S: Storage>(
    command: Command,
    tracker: &mut Tracker<S>,
    today: DayKey,
    json: bool,
) -> Result<String> {
    match command {
        Command::Ingredient(cmd) => ingredient(cmd, tracker, json),
        Command::Recipe(cmd) => recipe(cmd, tracker, json),
        Command::Log(cmd) => log(cmd, tracker, today, json),
        Command::Day(cmd) => day(cmd, tracker, today, json),
        Command::Goals(cmd) => goals(cmd, tracker, json),
        Command::Import { path } => {
            tracker
                .import_file(&path)
                .await
                .with_context(|| format!("Failed to import '{}'", path.display()))?;
            let state = tracker.state();
            Ok(format!(
                "Imported {} ingredients, {} recipes and {} logged days from {}",
                state.ingredients.len(),
                state.recipes.len(),
                state.day_logs.logged_days().count(),
                path.display()
            ))
        }
        Command::Export { path } => {
            tracker
                .export_file(&path)
                .await
                .with_context(|| format!("Failed to export to '{}'", path.display()))?;
            Ok(format!("Exported to {}", path.display()))
        }
    }
}

fn ingredient<S: Storage>(cmd: IngredientCommand, tracker: &mut Tracker<S>, json: bool) -> Result<String> {
    match cmd {
        IngredientCommand::Add(fields) => {
            let id = tracker.create_ingredient(fields.into())?;
            Ok(if json { to_json(&json!({ "id": id }))? } else { format!("Added ingredient {id}") })
        }
        IngredientCommand::Update { id, fields } => {
            let id = IngredientId::from(id);
            tracker.update_ingredient(&id, fields.into())?;
            Ok(format!("Updated ingredient {id}"))
        }
        IngredientCommand::List => {
            let ingredients = tracker.state().ingredients.sorted_by_name();
            if json {
                return to_json(&ingredients);
            }
            if ingredients.is_empty() {
                return Ok("No ingredients yet.".to_string());
            }
            let lines: Vec<String> = ingredients
                .iter()
                .map(|item| {
                    format!(
                        "{:<34} per {:<6} {}  [{}]",
                        item.display_name(),
                        item.basis,
                        totals_line(&item.per_basis),
                        item.id
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        IngredientCommand::Delete { id } => {
            let removed = tracker.delete_ingredient(&IngredientId::from(id))?;
            Ok(format!("Deleted ingredient {}", removed.display_name()))
        }
    }
}

fn recipe<S: Storage>(cmd: RecipeCommand, tracker: &mut Tracker<S>, json: bool) -> Result<String> {
    match cmd {
        RecipeCommand::Add(fields) => {
            let id = tracker.create_recipe(fields.into())?;
            Ok(if json { to_json(&json!({ "id": id }))? } else { format!("Added recipe {id}") })
        }
        RecipeCommand::Update { id, fields } => {
            let id = RecipeId::from(id);
            tracker.update_recipe(&id, fields.into())?;
            Ok(format!("Updated recipe {id}"))
        }
        RecipeCommand::List => {
            let state = tracker.state();
            let recipes = state.recipes.sorted_by_name();
            if json {
                return to_json(&recipes);
            }
            if recipes.is_empty() {
                return Ok("No recipes yet.".to_string());
            }
            let lines: Vec<String> = recipes
                .iter()
                .map(|recipe| {
                    format!(
                        "{:<34} {} items, {}  [{}]",
                        recipe.name,
                        recipe.lines.len(),
                        totals_line(&resolve_recipe(recipe, &state.ingredients)),
                        recipe.id
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        RecipeCommand::Show { id } => {
            let id = RecipeId::from(id);
            let state = tracker.state();
            let recipe = state
                .recipes
                .resolve(&id)
                .ok_or_else(|| TrackerError::UnknownRecipe(id.to_string()))?;
            let totals = resolve_recipe(recipe, &state.ingredients);
            if json {
                return to_json(&json!({ "recipe": recipe, "totals": totals }));
            }
            let mut lines = vec![recipe.name.clone()];
            lines.extend(recipe.lines.iter().map(|line| {
                match state.ingredients.resolve(&line.ingredient_id) {
                    Some(item) => format!(
                        "  {} {} {}",
                        line.amount,
                        item.basis.unit_label(),
                        item.display_name()
                    ),
                    None => format!("  {} of a deleted ingredient ({})", line.amount, line.ingredient_id),
                }
            }));
            lines.push(format!("Whole recipe: {}", totals_line(&totals)));
            Ok(lines.join("\n"))
        }
        RecipeCommand::Delete { id } => {
            let removed = tracker.delete_recipe(&RecipeId::from(id))?;
            Ok(format!("Deleted recipe {}", removed.name))
        }
    }
}

fn log<S: Storage>(cmd: LogCommand, tracker: &mut Tracker<S>, today: DayKey, json: bool) -> Result<String> {
    match cmd {
        LogCommand::Add {
            date,
            meal,
            ingredient,
            recipe,
            amount,
        } => {
            let target = match (ingredient, recipe) {
                (Some(id), _) => EntryTarget::Ingredient {
                    ref_id: IngredientId::from(id),
                    amount: AbsoluteAmount::new(amount)?,
                },
                (None, Some(id)) => EntryTarget::Recipe {
                    ref_id: RecipeId::from(id),
                    amount: ServingFactor::new(amount)?,
                },
                (None, None) => anyhow::bail!("either --ingredient or --recipe is required"),
            };
            let day = date.unwrap_or(today);
            let id = tracker.log_entry(today, day, target, meal)?;
            Ok(if json {
                to_json(&json!({ "id": id, "day": day, "meal": meal }))?
            } else {
                format!("Logged entry {id} for {meal} on {day}")
            })
        }
        LogCommand::Remove { date, id } => {
            let day = date.unwrap_or(today);
            let id = EntryId::from(id);
            if tracker.remove_entry(&day, &id)? {
                Ok(format!("Removed entry {id} from {day}"))
            } else {
                Ok(format!("No entry {id} on {day}"))
            }
        }
    }
}

fn day<S: Storage>(cmd: DayCommand, tracker: &mut Tracker<S>, today: DayKey, json: bool) -> Result<String> {
    match cmd {
        DayCommand::Show { date, offset } => {
            let navigator = tracker.navigator(today);
            let start = navigator.clamp(date.unwrap_or(today));
            let summary = tracker.day_summary(navigator.step(start, offset));
            if json {
                to_json(&summary)
            } else {
                Ok(summary.to_string().trim_end().to_string())
            }
        }
        DayCommand::List => {
            let days: Vec<DayKey> = tracker.state().day_logs.logged_days().collect();
            if json {
                return to_json(&days);
            }
            if days.is_empty() {
                return Ok("Nothing logged yet.".to_string());
            }
            Ok(days.iter().map(DayKey::to_string).collect::<Vec<_>>().join("\n"))
        }
    }
}

fn goals<S: Storage>(cmd: GoalsCommand, tracker: &mut Tracker<S>, json: bool) -> Result<String> {
    if let GoalsCommand::Set {
        kcal,
        protein,
        price,
        carbs,
        fat,
    } = cmd
    {
        tracker.set_goals(Goals::new(kcal, protein, price, carbs, fat)?)?;
    }
    let goals = tracker.state().goals;
    if json {
        return to_json(&goals);
    }
    Ok(format!(
        "Goals: {:.0} kcal, {:.0} g protein, {:.0} g carbs, {:.0} g fat, {:.2} price",
        goals.kcal, goals.protein, goals.carbs, goals.fat, goals.price
    ))
}

use serde::Serialize;
use std::fmt;

use crate::calendar::DayKey;
use crate::goals::{
    price_per_100_kcal, price_per_100_protein, ratio_color, ColorAnchors, GoalProgress, Goals, Rgb,
};
use crate::ids::EntryId;
use crate::ledger::{EntrySource, Meal};
use crate::nutrition::Totals;
use crate::state::StateDocument;

/// One visible entry as shown in a day view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLine {
    pub id: EntryId,
    pub kind: &'static str,
    pub name: String,
    pub quantity: String,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSummary {
    pub meal: Meal,
    pub entries: Vec<EntryLine>,
    pub totals: Totals,
}

/// Cost per unit of nutrition and the color it earns against the goal reference.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCost {
    /// `None` when there is nothing to divide by.
    pub value: Option<f64>,
    pub reference: f64,
    pub color: Rgb,
}

impl UnitCost {
    fn new(value: f64, reference: f64, anchors: &ColorAnchors) -> Self {
        Self {
            value: Some(value).filter(|v| v.is_finite()),
            reference,
            color: ratio_color(value, reference, anchors),
        }
    }
}

/// Everything a day view needs, computed from the state document on demand.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: DayKey,
    pub meals: Vec<MealSummary>,
    pub totals: Totals,
    pub goals: Goals,
    pub progress: GoalProgress,
    pub price_per_100_kcal: UnitCost,
    pub price_per_100_protein: UnitCost,
    /// Stored entries whose ingredient or recipe no longer exists.
    pub hidden_entries: usize,
}

impl DaySummary {
    pub fn build(state: &StateDocument, day: DayKey, anchors: &ColorAnchors) -> Self {
        let catalogs = state.catalogs();
        let ledger = &state.day_logs;
        let visible = ledger.entries_for(&day, catalogs);

        let meals = Meal::ALL
            .iter()
            .map(|&meal| MealSummary {
                meal,
                entries: visible
                    .iter()
                    .filter(|resolved| resolved.entry.meal == meal)
                    .map(|resolved| EntryLine {
                        id: resolved.entry.id.clone(),
                        kind: match resolved.source {
                            EntrySource::Ingredient(_) => "ingredient",
                            EntrySource::Recipe(_) => "recipe",
                        },
                        name: resolved.name(),
                        quantity: resolved.quantity_label(),
                        totals: resolved.totals,
                    })
                    .collect(),
                totals: ledger.totals_for_meal(&day, meal, catalogs),
            })
            .collect();

        let totals = ledger.totals_for(&day, catalogs);
        let goals = state.goals;
        Self {
            day,
            meals,
            totals,
            goals,
            progress: goals.progress(&totals),
            price_per_100_kcal: UnitCost::new(
                price_per_100_kcal(&totals),
                goals.reference_price_per_100_kcal(),
                anchors,
            ),
            price_per_100_protein: UnitCost::new(
                price_per_100_protein(&totals),
                goals.reference_price_per_100_protein(),
                anchors,
            ),
            hidden_entries: ledger.stored_entries(&day).len() - visible.len(),
        }
    }
}

fn format_unit_cost(cost: &UnitCost) -> String {
    match cost.value {
        Some(value) => format!("{value:.2} (goal {:.2}, {})", cost.reference, cost.color),
        None => format!("- (goal {:.2})", cost.reference),
    }
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Day {}", self.day)?;
        for meal in self.meals.iter().filter(|m| !m.entries.is_empty()) {
            writeln!(f, "\n{} ({:.0} kcal)", meal.meal, meal.totals.kcal)?;
            for line in &meal.entries {
                writeln!(
                    f,
                    "  {:<28} {:>9}  {:>7.1} kcal  {:>6.1} P  {:>6.1} C  {:>6.1} F  {:>6.2}  [{}]",
                    line.name,
                    line.quantity,
                    line.totals.kcal,
                    line.totals.protein,
                    line.totals.carbs,
                    line.totals.fat,
                    line.totals.price,
                    line.id
                )?;
            }
        }
        if self.meals.iter().all(|m| m.entries.is_empty()) {
            writeln!(f, "\nNothing logged.")?;
        }

        writeln!(f, "\nTotals vs goals")?;
        let rows = [
            ("Energy", self.totals.kcal, self.goals.kcal, self.progress.kcal, "kcal"),
            ("Protein", self.totals.protein, self.goals.protein, self.progress.protein, "g"),
            ("Carbs", self.totals.carbs, self.goals.carbs, self.progress.carbs, "g"),
            ("Fat", self.totals.fat, self.goals.fat, self.progress.fat, "g"),
            ("Price", self.totals.price, self.goals.price, self.progress.price, ""),
        ];
        for (label, value, goal, percent, unit) in rows {
            writeln!(f, "  {label:<8} {value:>8.1} / {goal:<7.1}{unit:<5} {percent:>3}%")?;
        }
        writeln!(f, "  Price per 100 kcal:      {}", format_unit_cost(&self.price_per_100_kcal))?;
        writeln!(f, "  Price per 100 g protein: {}", format_unit_cost(&self.price_per_100_protein))?;
        if self.hidden_entries > 0 {
            writeln!(
                f,
                "\n{} entr{} hidden because the food was deleted.",
                self.hidden_entries,
                if self.hidden_entries == 1 { "y" } else { "ies" }
            )?;
        }
        Ok(())
    }
}

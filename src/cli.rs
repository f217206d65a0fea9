use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::calendar::DayKey;
use crate::catalog::Basis;
use crate::ledger::Meal;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track foods, recipes and daily nutrition against goals", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use this state document instead of the configured one
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the ingredient catalog
    #[command(subcommand)]
    Ingredient(IngredientCommand),
    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),
    /// Log or remove consumed food
    #[command(subcommand)]
    Log(LogCommand),
    /// Look at logged days
    #[command(subcommand)]
    Day(DayCommand),
    /// Show or change daily goals
    #[command(subcommand)]
    Goals(GoalsCommand),
    /// Replace all data with the contents of a document
    Import { path: PathBuf },
    /// Write all data to a document
    Export { path: PathBuf },
}

#[derive(Args, Debug, Clone)]
pub struct IngredientFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub brand: Option<String>,
    /// What the numbers below are given per
    #[arg(long, value_enum)]
    pub basis: Basis,
    #[arg(long)]
    pub kcal: f64,
    #[arg(long)]
    pub protein: f64,
    #[arg(long)]
    pub carbs: f64,
    #[arg(long)]
    pub fat: f64,
    #[arg(long)]
    pub price: f64,
}

#[derive(Subcommand, Debug)]
pub enum IngredientCommand {
    Add(IngredientFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: IngredientFields,
    },
    List,
    Delete { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct RecipeFields {
    #[arg(long)]
    pub name: String,
    /// Ingredient line as INGREDIENT_ID=AMOUNT, repeatable
    #[arg(long = "line", value_parser = parse_recipe_line, required = true)]
    pub lines: Vec<(String, f64)>,
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommand {
    Add(RecipeFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: RecipeFields,
    },
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    Add {
        /// Logging day, defaults to today
        #[arg(long)]
        date: Option<DayKey>,
        #[arg(long, value_enum, default_value_t = Meal::Snacks)]
        meal: Meal,
        #[arg(long, conflicts_with = "recipe", required_unless_present = "recipe")]
        ingredient: Option<String>,
        #[arg(long)]
        recipe: Option<String>,
        /// Grams/ml/pieces for an ingredient, serving factor for a recipe
        #[arg(long)]
        amount: f64,
    },
    Remove {
        #[arg(long)]
        date: Option<DayKey>,
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DayCommand {
    Show {
        #[arg(long)]
        date: Option<DayKey>,
        /// Days to move from the date (negative = back), clamped to logged history
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },
    /// Days with at least one entry
    List,
}

#[derive(Subcommand, Debug)]
pub enum GoalsCommand {
    Show,
    Set {
        #[arg(long)]
        kcal: f64,
        #[arg(long)]
        protein: f64,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        carbs: f64,
        #[arg(long)]
        fat: f64,
    },
}

fn parse_recipe_line(raw: &str) -> Result<(String, f64), String> {
    let (id, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{raw}' should look like INGREDIENT_ID=AMOUNT"))?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad amount in '{raw}': {e}"))?;
    Ok((id.trim().to_string(), amount))
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

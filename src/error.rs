use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(
        "Ingredient '{name}' is used by recipe(s) {}; remove it from those recipes before deleting it",
        .recipes.join(", ")
    )]
    ReferencedByRecipe { name: String, recipes: Vec<String> },

    #[error("Ingredient not found: {0}")]
    UnknownIngredient(String),

    #[error("Recipe not found: {0}")]
    UnknownRecipe(String),

    #[error("Malformed state document: {0}")]
    MalformedDocument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        TrackerError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn ensure_name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(TrackerError::validation(field, format!("{value} is not a number")));
    }
    if value < 0.0 {
        return Err(TrackerError::validation(field, format!("{value} is negative")));
    }
    Ok(value)
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(TrackerError::validation(field, format!("{value} is not a number")));
    }
    if value <= 0.0 {
        return Err(TrackerError::validation(field, format!("{value} must be greater than zero")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_name_trims() {
        assert_eq!(ensure_name("name", "  Oats ").unwrap(), "Oats");
        assert!(matches!(
            ensure_name("name", "   "),
            Err(TrackerError::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn test_number_guards() {
        assert!(ensure_non_negative("kcal", 0.0).is_ok());
        assert!(ensure_non_negative("kcal", -0.1).is_err());
        assert!(ensure_non_negative("kcal", f64::NAN).is_err());
        assert!(ensure_positive("amount", 0.0).is_err());
        assert!(ensure_positive("amount", f64::INFINITY).is_err());
        assert_eq!(ensure_positive("amount", 0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_referenced_by_recipe_message_names_recipes() {
        let err = TrackerError::ReferencedByRecipe {
            name: "Oats".to_string(),
            recipes: vec!["Porridge".to_string(), "Granola".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("'Oats'"));
        assert!(message.contains("Porridge, Granola"));
    }
}

use crate::catalog::Ingredient;
use crate::nutrition::{AbsoluteAmount, Totals};

/// Absolute totals for `amount` of an ingredient.
///
/// Per-100 bases divide the amount by 100, per-piece ingredients use it as a piece
/// count. No validation happens here: a negative or non-finite amount flows straight
/// through the multiplication.
pub fn normalize(ingredient: &Ingredient, amount: AbsoluteAmount) -> Totals {
    let factor = ingredient.basis.factor_for(amount.value());
    ingredient.per_basis.scaled(factor)
}

use serde::{Deserialize, Serialize};

use crate::model::{ExpandedLine, Recipe, RecipeId};
use crate::store::{RecipeBook, StoreError};

/// Cost breakdown of one batch of a recipe at its canonical yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCost {
    pub recipe_id: RecipeId,
    pub name: String,
    pub yield_qty: f64,
    pub yield_unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_yield_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_yield_unit: Option<String>,
    pub total_cost: f64,
    pub cost_per_yield_unit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_secondary_unit: Option<f64>,
    pub lines: Vec<ExpandedLine>,
}

fn breakdown(recipe: &Recipe, lines: Vec<ExpandedLine>) -> RecipeCost {
    // Subrecipe rows cost nothing here; their ingredients are already listed.
    let total_cost: f64 = lines.iter().map(ExpandedLine::line_cost).sum();
    let secondary = recipe.secondary_yield();

    RecipeCost {
        recipe_id: recipe.id,
        name: recipe.name.clone(),
        yield_qty: recipe.effective_yield(),
        yield_unit: recipe.yield_unit.clone(),
        secondary_yield_qty: secondary.map(|(qty, _)| qty),
        secondary_yield_unit: secondary.map(|(_, unit)| unit.to_string()),
        total_cost,
        cost_per_yield_unit: total_cost / recipe.effective_yield(),
        cost_per_secondary_unit: secondary.map(|(qty, _)| total_cost / qty),
        lines,
    }
}

/// Costs one batch of `id` and restates it per yield unit.
pub fn cost_recipe<B: RecipeBook + ?Sized>(book: &B, id: RecipeId) -> Result<RecipeCost, StoreError> {
    let recipe = book.recipe(id).ok_or(StoreError::RecipeNotFound(id))?;
    let lines = book.expand(id)?;
    Ok(breakdown(&recipe, lines))
}

/// Costs every recipe in `recipes`, sorted by name. Stops at the first failure.
pub fn cost_report<B: RecipeBook + ?Sized>(
    book: &B,
    recipes: &[Recipe],
) -> Result<Vec<RecipeCost>, StoreError> {
    let mut costs = recipes
        .iter()
        .map(|recipe| Ok(breakdown(recipe, book.expand(recipe.id)?)))
        .collect::<Result<Vec<_>, StoreError>>()?;
    costs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(costs)
}

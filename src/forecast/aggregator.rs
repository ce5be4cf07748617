use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{DishRequest, ForecastError};
use crate::model::{ExpandedLine, IngredientId, Recipe, RecipeId};
use crate::store::RecipeBook;

/// Total requirement of one ingredient across every forecast dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedIngredient {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub unit: String,
    pub cost_per_unit: f64,
    pub total_qty: f64,
    pub total_cost: f64,
}

/// Total requirement of one subrecipe across every forecast dish, for bulk prep.
/// Carries no cost: its ingredients are already in the ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSubrecipe {
    pub recipe_id: RecipeId,
    pub name: String,
    pub unit: String,
    pub total_qty: f64,
}

/// Consolidated result of a forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub dishes: Vec<DishRequest>,
    pub ingredients: Vec<AggregatedIngredient>,
    pub subrecipes: Vec<AggregatedSubrecipe>,
}

impl Forecast {
    pub fn total_cost(&self) -> f64 {
        self.ingredients.iter().map(|i| i.total_cost).sum()
    }
}

/// Scales each dish's flattened requirements by its own factor and merges
/// them by ingredient and subrecipe identity.
pub struct ForecastAggregator<'a, B: RecipeBook + ?Sized> {
    book: &'a B,
}

impl<'a, B: RecipeBook + ?Sized> ForecastAggregator<'a, B> {
    pub fn new(book: &'a B) -> Self {
        Self { book }
    }

    /// Aggregates `requests` into one forecast.
    ///
    /// The first dish whose recipe cannot be expanded aborts the whole run;
    /// no partial forecast is returned.
    pub fn aggregate(&self, requests: &[DishRequest]) -> Result<Forecast, ForecastError> {
        let mut ingredients: HashMap<IngredientId, AggregatedIngredient> = HashMap::new();
        let mut subrecipes: HashMap<RecipeId, AggregatedSubrecipe> = HashMap::new();

        for dish in requests {
            let scale = dish.scale();
            let lines = self
                .book
                .expand(dish.recipe_id)
                .map_err(|source| ForecastError::Expansion {
                    dish: dish.name.clone(),
                    source,
                })?;

            for line in lines {
                match line {
                    ExpandedLine::Ingredient(row) => {
                        let qty = row.qty_per_yield * scale;
                        let agg = ingredients
                            .entry(row.ingredient_id)
                            .or_insert_with(|| AggregatedIngredient {
                                ingredient_id: row.ingredient_id,
                                name: row.name,
                                unit: row.unit,
                                cost_per_unit: row.cost_per_unit,
                                total_qty: 0.0,
                                total_cost: 0.0,
                            });
                        agg.total_qty += qty;
                        agg.total_cost += qty * row.cost_per_unit;
                    }
                    ExpandedLine::Subrecipe(row) => {
                        let qty = row.qty_per_yield * scale;
                        let agg = subrecipes
                            .entry(row.recipe_id)
                            .or_insert_with(|| AggregatedSubrecipe {
                                recipe_id: row.recipe_id,
                                name: row.name,
                                unit: row.unit,
                                total_qty: 0.0,
                            });
                        agg.total_qty += qty;
                    }
                }
            }
        }

        let mut ingredients: Vec<AggregatedIngredient> = ingredients.into_values().collect();
        ingredients.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.ingredient_id.cmp(&b.ingredient_id))
        });

        let mut subrecipes: Vec<AggregatedSubrecipe> = subrecipes.into_values().collect();
        subrecipes.sort_by(|a, b| a.name.cmp(&b.name).then(a.recipe_id.cmp(&b.recipe_id)));

        Ok(Forecast {
            dishes: requests.to_vec(),
            ingredients,
            subrecipes,
        })
    }
}

/// Kitchen-wide procurement list: one batch of every top-level recipe of
/// `recipes`, aggregated like a forecast.
///
/// Recipes used as a subrecipe by another recipe in `recipes` are left out;
/// their ingredients already arrive through the dishes that use them.
pub fn market_list<B: RecipeBook + ?Sized>(
    book: &B,
    recipes: &[Recipe],
) -> Result<Forecast, ForecastError> {
    let nested: HashSet<RecipeId> = recipes
        .iter()
        .flat_map(|r| r.subrecipes.iter().map(|s| s.recipe_id))
        .collect();

    let mut requests: Vec<DishRequest> = recipes
        .iter()
        .filter(|r| !nested.contains(&r.id))
        .map(|r| DishRequest::new(r, r.effective_yield()))
        .collect();
    requests.sort_by(|a, b| a.name.cmp(&b.name).then(a.recipe_id.cmp(&b.recipe_id)));

    ForecastAggregator::new(book).aggregate(&requests)
}

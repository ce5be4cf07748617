//! Production forecasting: several dishes, each at its own portion count,
//! consolidated into one procurement list.

pub mod aggregator;
pub mod dish_spec;

pub use aggregator::{
    market_list, AggregatedIngredient, AggregatedSubrecipe, Forecast, ForecastAggregator,
};
pub use dish_spec::{
    parse_dish_spec, parse_dish_specs, resolve_dish, resolve_dishes, DishRequest, DishSpec,
    DishSpecError,
};

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Spec(#[from] DishSpecError),

    #[error("recipe not found for forecast: {0}")]
    RecipeNotFound(String),

    #[error("'{query}' matches several recipes: {}", .candidates.join(", "))]
    AmbiguousRecipe {
        query: String,
        candidates: Vec<String>,
    },

    #[error("error loading ingredients for {dish}: {source}")]
    Expansion {
        dish: String,
        #[source]
        source: StoreError,
    },
}

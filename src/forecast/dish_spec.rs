use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::ForecastError;
use crate::model::{Recipe, RecipeId};
use crate::store::{NameMatch, RecipeBook};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DishSpecError {
    #[error("invalid spec (expected NAME=PORTIONS): {0}")]
    MalformedSpec(String),

    #[error("invalid portions in spec (need a positive number): {0}")]
    InvalidPortions(String),
}

/// A `NAME=PORTIONS` request as typed by the operator, before the name is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DishSpec {
    pub name: String,
    pub portions: f64,
}

impl FromStr for DishSpec {
    type Err = DishSpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (raw_name, raw_portions) = spec
            .split_once('=')
            .ok_or_else(|| DishSpecError::MalformedSpec(spec.to_string()))?;

        let name = raw_name.trim();
        if name.is_empty() {
            return Err(DishSpecError::MalformedSpec(spec.to_string()));
        }

        let portions = raw_portions
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| DishSpecError::InvalidPortions(spec.to_string()))?;

        Ok(DishSpec {
            name: name.to_string(),
            portions,
        })
    }
}

pub fn parse_dish_spec(spec: &str) -> Result<DishSpec, DishSpecError> {
    spec.parse()
}

/// Parses every spec, stopping at the first invalid one.
pub fn parse_dish_specs<S: AsRef<str>>(specs: &[S]) -> Result<Vec<DishSpec>, DishSpecError> {
    specs.iter().map(|s| parse_dish_spec(s.as_ref())).collect()
}

/// A dish resolved to a concrete recipe, ready to be scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishRequest {
    pub recipe_id: RecipeId,
    pub name: String,
    pub portions: f64,
    /// Always positive; see [`Recipe::effective_yield`].
    pub yield_qty: f64,
    pub yield_unit: String,
}

impl DishRequest {
    pub fn new(recipe: &Recipe, portions: f64) -> Self {
        Self {
            recipe_id: recipe.id,
            name: recipe.name.clone(),
            portions,
            yield_qty: recipe.effective_yield(),
            yield_unit: recipe.yield_unit.clone(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.portions / self.yield_qty
    }
}

/// Resolves the dish name of `spec` through the recipe book.
///
/// Ambiguous names are returned as an error listing the candidates; picking
/// one is up to the caller.
pub fn resolve_dish<B: RecipeBook + ?Sized>(
    book: &B,
    spec: &DishSpec,
) -> Result<DishRequest, ForecastError> {
    match book.find_recipe(&spec.name) {
        NameMatch::Found(recipe) => Ok(DishRequest::new(&recipe, spec.portions)),
        NameMatch::NotFound => Err(ForecastError::RecipeNotFound(spec.name.clone())),
        NameMatch::Ambiguous(candidates) => Err(ForecastError::AmbiguousRecipe {
            query: spec.name.clone(),
            candidates: candidates.into_iter().map(|r| r.name).collect(),
        }),
    }
}

pub fn resolve_dishes<B: RecipeBook + ?Sized>(
    book: &B,
    specs: &[DishSpec],
) -> Result<Vec<DishRequest>, ForecastError> {
    specs.iter().map(|spec| resolve_dish(book, spec)).collect()
}

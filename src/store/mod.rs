//! Read-only data access used by the costing and forecasting code.
//!
//! The conversion and forecast modules only ever see the two traits below,
//! so they can run against the in-memory [`KitchenStore`] or any other backend.

pub mod loader;
pub mod memory;

pub use loader::{load_kitchen, KitchenDataset};
pub use memory::KitchenStore;

use crate::conversion::ConversionError;
use crate::model::{ConversionEdge, ExpandedLine, Ingredient, IngredientId, Recipe, RecipeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    IngredientNotFound(IngredientId),

    #[error("{0} not found")]
    RecipeNotFound(RecipeId),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("ingredient '{name}' has an invalid cost per unit ({cost})")]
    InvalidCost { name: String, cost: f64 },

    #[error("conversion {from_qty} {from_unit} -> {to_qty} {to_unit} for {ingredient} must use positive quantities")]
    InvalidConversion {
        ingredient: IngredientId,
        from_qty: f64,
        from_unit: String,
        to_qty: f64,
        to_unit: String,
    },

    #[error("recipe '{recipe}' uses a non-positive quantity ({qty}) of {item}")]
    InvalidItemQuantity { recipe: String, item: String, qty: f64 },

    #[error("recipe '{0}' cannot reference itself")]
    SelfReference(String),

    #[error("recipe '{0}' is part of a subrecipe cycle")]
    RecipeCycle(String),

    #[error("subrecipe '{subrecipe}' is used in '{unit}', which is neither its yield unit nor its secondary yield unit")]
    SubrecipeUnitMismatch { subrecipe: String, unit: String },

    #[error("cannot expand recipe '{recipe}': {source}")]
    Conversion {
        recipe: String,
        #[source]
        source: ConversionError,
    },

    #[error("invalid kitchen data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result of looking something up by a possibly partial, possibly mis-cased name.
#[derive(Debug, Clone, PartialEq)]
pub enum NameMatch<T> {
    Found(T),
    NotFound,
    Ambiguous(Vec<T>),
}

impl<T> NameMatch<T> {
    pub fn map<U>(self, f: impl Fn(T) -> U) -> NameMatch<U> {
        match self {
            NameMatch::Found(item) => NameMatch::Found(f(item)),
            NameMatch::NotFound => NameMatch::NotFound,
            NameMatch::Ambiguous(items) => NameMatch::Ambiguous(items.into_iter().map(f).collect()),
        }
    }
}

/// Finds `query` among `items`: exact name first, then case-insensitive
/// equality, then case-insensitive substring. Several hits at the first
/// stage that matches anything make the result ambiguous.
pub fn match_by_name<'a, T>(
    items: impl IntoIterator<Item = &'a T> + Clone,
    query: &str,
    name_of: impl Fn(&T) -> &str,
) -> NameMatch<&'a T>
where
    T: 'a,
{
    let query = query.trim();
    if query.is_empty() {
        return NameMatch::NotFound;
    }

    if let Some(exact) = items.clone().into_iter().find(|item| name_of(*item) == query) {
        return NameMatch::Found(exact);
    }

    let lowered = query.to_lowercase();
    let stages: [&dyn Fn(&str) -> bool; 2] = [
        &|name: &str| name.to_lowercase() == lowered,
        &|name: &str| name.to_lowercase().contains(&lowered),
    ];

    for matches in stages {
        let mut hits: Vec<&T> = items
            .clone()
            .into_iter()
            .filter(|item| matches(name_of(*item)))
            .collect();
        match hits.len() {
            0 => continue,
            1 => return NameMatch::Found(hits.remove(0)),
            _ => {
                hits.sort_by(|a, b| name_of(*a).cmp(name_of(*b)));
                return NameMatch::Ambiguous(hits);
            }
        }
    }

    NameMatch::NotFound
}

/// Ingredient and conversion lookups.
pub trait IngredientCatalog {
    fn ingredient(&self, id: IngredientId) -> Option<Ingredient>;

    /// Edges of `id` leaving `from_unit`, in the order the operator defined them.
    fn conversions_from(&self, id: IngredientId, from_unit: &str) -> Vec<ConversionEdge>;
}

/// Recipe lookups and the flattened view of a recipe.
pub trait RecipeBook {
    fn recipe(&self, id: RecipeId) -> Option<Recipe>;

    fn find_recipe(&self, query: &str) -> NameMatch<Recipe>;

    /// Rows for one canonical batch of `id`, flattened through every nested subrecipe.
    fn expand(&self, id: RecipeId) -> Result<Vec<ExpandedLine>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "Beef Patty".to_string(),
            "Burger Sauce".to_string(),
            "burger sauce".to_string(),
            "Lobster Roll".to_string(),
            "DISH Lobster Roll".to_string(),
        ]
    }

    #[test]
    fn test_exact_match_wins_over_case_insensitive() {
        let items = names();
        let found = match_by_name(&items, "Burger Sauce", |s| s.as_str());
        assert_eq!(found, NameMatch::Found(&items[1]));
    }

    #[test]
    fn test_case_insensitive_duplicates_are_ambiguous() {
        let items = names();
        match match_by_name(&items, "BURGER SAUCE", |s| s.as_str()) {
            NameMatch::Ambiguous(hits) => {
                assert_eq!(hits, vec![&items[1], &items[2]]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_substring_is_found() {
        let items = names();
        let found = match_by_name(&items, "patty", |s| s.as_str());
        assert_eq!(found, NameMatch::Found(&items[0]));
    }

    #[test]
    fn test_substring_hits_are_sorted() {
        let items = names();
        match match_by_name(&items, "lobster", |s| s.as_str()) {
            NameMatch::Ambiguous(hits) => {
                assert_eq!(hits, vec![&items[4], &items[3]]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_and_unknown_queries() {
        let items = names();
        assert_eq!(match_by_name(&items, "   ", |s| s.as_str()), NameMatch::NotFound);
        assert_eq!(match_by_name(&items, "Hammour", |s| s.as_str()), NameMatch::NotFound);
    }
}

use std::collections::{HashMap, HashSet};

use super::{match_by_name, IngredientCatalog, KitchenDataset, NameMatch, RecipeBook, StoreError};
use crate::conversion::ConversionResolver;
use crate::model::{
    ConversionEdge, ExpandedLine, Ingredient, IngredientId, IngredientLine, Recipe, RecipeId,
    SubrecipeLine,
};

/// Kitchen data held in memory for the length of one command.
#[derive(Debug, Clone, Default)]
pub struct KitchenStore {
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    // Per ingredient, in the order the operator defined them.
    conversions: HashMap<IngredientId, Vec<ConversionEdge>>,
    ingredient_index: HashMap<IngredientId, usize>,
    recipe_index: HashMap<RecipeId, usize>,
}

impl KitchenStore {
    /// Validates a dataset and indexes it.
    pub fn from_dataset(dataset: KitchenDataset) -> Result<Self, StoreError> {
        let KitchenDataset {
            ingredients,
            conversions,
            recipes,
        } = dataset;

        let mut ingredient_index = HashMap::new();
        let mut ingredient_names = HashSet::new();
        for (idx, ingredient) in ingredients.iter().enumerate() {
            if ingredient_index.insert(ingredient.id, idx).is_some() {
                return Err(StoreError::DuplicateId {
                    kind: "ingredient",
                    id: ingredient.id.0,
                });
            }
            if !ingredient_names.insert(ingredient.name.as_str()) {
                return Err(StoreError::DuplicateName {
                    kind: "ingredient",
                    name: ingredient.name.clone(),
                });
            }
            if !ingredient.cost_per_unit.is_finite() || ingredient.cost_per_unit < 0.0 {
                return Err(StoreError::InvalidCost {
                    name: ingredient.name.clone(),
                    cost: ingredient.cost_per_unit,
                });
            }
        }

        let mut conversions_by_ingredient: HashMap<IngredientId, Vec<ConversionEdge>> =
            HashMap::new();
        for edge in conversions {
            if !ingredient_index.contains_key(&edge.ingredient_id) {
                return Err(StoreError::IngredientNotFound(edge.ingredient_id));
            }
            let positive = |q: f64| q.is_finite() && q > 0.0;
            if !positive(edge.from_qty) || !positive(edge.to_qty) {
                return Err(StoreError::InvalidConversion {
                    ingredient: edge.ingredient_id,
                    from_qty: edge.from_qty,
                    from_unit: edge.from_unit,
                    to_qty: edge.to_qty,
                    to_unit: edge.to_unit,
                });
            }
            conversions_by_ingredient
                .entry(edge.ingredient_id)
                .or_default()
                .push(edge);
        }

        let mut recipe_index = HashMap::new();
        let mut recipe_names = HashSet::new();
        for (idx, recipe) in recipes.iter().enumerate() {
            if recipe_index.insert(recipe.id, idx).is_some() {
                return Err(StoreError::DuplicateId {
                    kind: "recipe",
                    id: recipe.id.0,
                });
            }
            if !recipe_names.insert(recipe.name.as_str()) {
                return Err(StoreError::DuplicateName {
                    kind: "recipe",
                    name: recipe.name.clone(),
                });
            }
        }

        for recipe in &recipes {
            for item in &recipe.items {
                let ingredient = ingredient_index
                    .get(&item.ingredient_id)
                    .map(|idx| &ingredients[*idx])
                    .ok_or(StoreError::IngredientNotFound(item.ingredient_id))?;
                if !(item.qty.is_finite() && item.qty > 0.0) {
                    return Err(StoreError::InvalidItemQuantity {
                        recipe: recipe.name.clone(),
                        item: ingredient.name.clone(),
                        qty: item.qty,
                    });
                }
            }
            for sub in &recipe.subrecipes {
                if sub.recipe_id == recipe.id {
                    return Err(StoreError::SelfReference(recipe.name.clone()));
                }
                let subrecipe = recipe_index
                    .get(&sub.recipe_id)
                    .map(|idx| &recipes[*idx])
                    .ok_or(StoreError::RecipeNotFound(sub.recipe_id))?;
                if !(sub.qty.is_finite() && sub.qty > 0.0) {
                    return Err(StoreError::InvalidItemQuantity {
                        recipe: recipe.name.clone(),
                        item: subrecipe.name.clone(),
                        qty: sub.qty,
                    });
                }
            }
        }

        Ok(Self {
            ingredients,
            recipes,
            conversions: conversions_by_ingredient,
            ingredient_index,
            recipe_index,
        })
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// All conversions defined for `id`, in definition order.
    pub fn conversions(&self, id: IngredientId) -> &[ConversionEdge] {
        self.conversions.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_ingredient(&self, query: &str) -> NameMatch<Ingredient> {
        match_by_name(&self.ingredients, query, |i| i.name.as_str()).map(Ingredient::clone)
    }

    /// Ingredients whose name contains `text`, ignoring case, sorted by name.
    pub fn search_ingredients(&self, text: &str) -> Vec<&Ingredient> {
        let needle = text.to_lowercase();
        let mut hits: Vec<&Ingredient> = self
            .ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }

    fn ingredient_ref(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredient_index.get(&id).map(|idx| &self.ingredients[*idx])
    }

    fn recipe_ref(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipe_index.get(&id).map(|idx| &self.recipes[*idx])
    }

    fn expand_into(
        &self,
        recipe: &Recipe,
        factor: f64,
        path: &mut Vec<RecipeId>,
        lines: &mut Vec<ExpandedLine>,
    ) -> Result<(), StoreError> {
        if path.contains(&recipe.id) {
            return Err(StoreError::RecipeCycle(recipe.name.clone()));
        }
        path.push(recipe.id);

        let resolver = ConversionResolver::new(self);
        for item in &recipe.items {
            let ingredient = self
                .ingredient_ref(item.ingredient_id)
                .ok_or(StoreError::IngredientNotFound(item.ingredient_id))?;
            let unit = item.unit.as_deref().unwrap_or(&ingredient.unit);
            let (base_qty, base_unit) = resolver
                .to_base_unit(ingredient.id, item.qty, unit)
                .map_err(|source| StoreError::Conversion {
                    recipe: recipe.name.clone(),
                    source,
                })?;

            lines.push(ExpandedLine::Ingredient(IngredientLine {
                ingredient_id: ingredient.id,
                name: ingredient.name.clone(),
                unit: base_unit,
                qty_per_yield: base_qty * factor,
                cost_per_unit: ingredient.cost_per_unit,
            }));
        }

        for sub in &recipe.subrecipes {
            let subrecipe = self
                .recipe_ref(sub.recipe_id)
                .ok_or(StoreError::RecipeNotFound(sub.recipe_id))?;
            let unit = sub.unit.as_deref().unwrap_or(&subrecipe.yield_unit);

            let batch_size = if unit == subrecipe.yield_unit {
                subrecipe.effective_yield()
            } else {
                match subrecipe.secondary_yield() {
                    Some((qty, secondary_unit)) if secondary_unit == unit => qty,
                    _ => {
                        return Err(StoreError::SubrecipeUnitMismatch {
                            subrecipe: subrecipe.name.clone(),
                            unit: unit.to_string(),
                        })
                    }
                }
            };

            lines.push(ExpandedLine::Subrecipe(SubrecipeLine {
                recipe_id: subrecipe.id,
                name: subrecipe.name.clone(),
                unit: unit.to_string(),
                qty_per_yield: sub.qty * factor,
            }));

            self.expand_into(subrecipe, factor * sub.qty / batch_size, path, lines)?;
        }

        path.pop();
        Ok(())
    }
}

impl IngredientCatalog for KitchenStore {
    fn ingredient(&self, id: IngredientId) -> Option<Ingredient> {
        self.ingredient_ref(id).cloned()
    }

    fn conversions_from(&self, id: IngredientId, from_unit: &str) -> Vec<ConversionEdge> {
        self.conversions(id)
            .iter()
            .filter(|edge| edge.from_unit == from_unit)
            .cloned()
            .collect()
    }
}

impl RecipeBook for KitchenStore {
    fn recipe(&self, id: RecipeId) -> Option<Recipe> {
        self.recipe_ref(id).cloned()
    }

    fn find_recipe(&self, query: &str) -> NameMatch<Recipe> {
        match_by_name(&self.recipes, query, |r| r.name.as_str()).map(Recipe::clone)
    }

    fn expand(&self, id: RecipeId) -> Result<Vec<ExpandedLine>, StoreError> {
        let recipe = self.recipe_ref(id).ok_or(StoreError::RecipeNotFound(id))?;
        let mut lines = Vec::new();
        self.expand_into(recipe, 1.0, &mut Vec::new(), &mut lines)?;
        Ok(lines)
    }
}

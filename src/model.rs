use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u32);

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ingredient #{}", self.0)
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recipe #{}", self.0)
    }
}

/// A purchasable ingredient, costed in its base unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    /// The unit `cost_per_unit` is expressed in (e.g. "kg", "l", "piece").
    pub unit: String,
    pub cost_per_unit: f64,
}

/// Operator assertion "`from_qty` `from_unit` equals `to_qty` `to_unit`" for one ingredient.
///
/// Edges are directed: no inverse edge is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEdge {
    pub ingredient_id: IngredientId,
    pub from_qty: f64,
    pub from_unit: String,
    pub to_qty: f64,
    pub to_unit: String,
}

impl ConversionEdge {
    /// Multiplier applied to a quantity expressed in `from_unit`.
    pub fn ratio(&self) -> f64 {
        self.to_qty / self.from_qty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    pub ingredient_id: IngredientId,
    pub qty: f64,
    /// Defaults to the ingredient's base unit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubrecipeItem {
    pub recipe_id: RecipeId,
    pub qty: f64,
    /// Defaults to the subrecipe's yield unit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub yield_qty: f64,
    pub yield_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_yield_qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_yield_unit: Option<String>,
    #[serde(default)]
    pub items: Vec<RecipeItem>,
    #[serde(default)]
    pub subrecipes: Vec<SubrecipeItem>,
}

impl Recipe {
    /// Yield used for scaling. A zero or negative yield in the source data
    /// is treated as 1 so a scale factor can always be computed.
    pub fn effective_yield(&self) -> f64 {
        if self.yield_qty > 0.0 {
            self.yield_qty
        } else {
            1.0
        }
    }

    /// Secondary yield (e.g. 40 pieces for a 10 kg dough), if one is defined and positive.
    pub fn secondary_yield(&self) -> Option<(f64, &str)> {
        match (self.secondary_yield_qty, self.secondary_yield_unit.as_deref()) {
            (Some(qty), Some(unit)) if qty > 0.0 && !unit.is_empty() => Some((qty, unit)),
            _ => None,
        }
    }
}

/// Ingredient requirement for one canonical batch of a recipe, in the ingredient's base unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub unit: String,
    pub qty_per_yield: f64,
    pub cost_per_unit: f64,
}

impl IngredientLine {
    pub fn line_cost(&self) -> f64 {
        self.qty_per_yield * self.cost_per_unit
    }
}

/// Subrecipe requirement for one canonical batch of a recipe, in the unit it is used in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubrecipeLine {
    pub recipe_id: RecipeId,
    pub name: String,
    pub unit: String,
    pub qty_per_yield: f64,
}

/// One row of a recipe flattened through all of its nested subrecipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpandedLine {
    Ingredient(IngredientLine),
    Subrecipe(SubrecipeLine),
}

impl ExpandedLine {
    pub fn name(&self) -> &str {
        match self {
            ExpandedLine::Ingredient(line) => &line.name,
            ExpandedLine::Subrecipe(line) => &line.name,
        }
    }

    /// Cost carried by the row. Subrecipe rows carry none: their cost is
    /// already attributed through their own ingredient rows.
    pub fn line_cost(&self) -> f64 {
        match self {
            ExpandedLine::Ingredient(line) => line.line_cost(),
            ExpandedLine::Subrecipe(_) => 0.0,
        }
    }
}

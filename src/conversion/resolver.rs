use serde::Serialize;

use super::{ConversionError, ConversionGraph};
use crate::model::IngredientId;
use crate::store::IngredientCatalog;

/// Cost of a quantity of an ingredient, with the quantity restated in the base unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCost {
    pub cost: f64,
    pub quantity: f64,
    pub unit: String,
}

/// Costs ingredient quantities given in any unit the operator can convert
/// to the ingredient's base unit.
pub struct ConversionResolver<'a, C: IngredientCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: IngredientCatalog + ?Sized> ConversionResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Restates `quantity` `unit` of `ingredient` in its base unit.
    pub fn to_base_unit(
        &self,
        ingredient: IngredientId,
        quantity: f64,
        unit: &str,
    ) -> Result<(f64, String), ConversionError> {
        let base_unit = self
            .catalog
            .ingredient(ingredient)
            .ok_or(ConversionError::IngredientNotFound(ingredient))?
            .unit;

        if unit == base_unit {
            return Ok((quantity, base_unit));
        }

        ConversionGraph::new(self.catalog, ingredient).resolve(quantity, unit, &base_unit)
    }

    /// Cost of `quantity` `unit` of `ingredient`.
    ///
    /// # Returns
    /// The cost together with the quantity expressed in the base unit, or the
    /// lookup/conversion failure. Nothing is rounded.
    pub fn cost_of(
        &self,
        ingredient: IngredientId,
        quantity: f64,
        unit: &str,
    ) -> Result<ResolvedCost, ConversionError> {
        let found = self
            .catalog
            .ingredient(ingredient)
            .ok_or(ConversionError::IngredientNotFound(ingredient))?;

        let (quantity, unit) = if unit == found.unit {
            (quantity, found.unit)
        } else {
            ConversionGraph::new(self.catalog, ingredient).resolve(quantity, unit, &found.unit)?
        };

        Ok(ResolvedCost {
            cost: quantity * found.cost_per_unit,
            quantity,
            unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConversionEdge, Ingredient};

    struct Pantry {
        ingredients: Vec<Ingredient>,
        edges: Vec<ConversionEdge>,
    }

    impl IngredientCatalog for Pantry {
        fn ingredient(&self, id: IngredientId) -> Option<Ingredient> {
            self.ingredients.iter().find(|i| i.id == id).cloned()
        }

        fn conversions_from(&self, id: IngredientId, from_unit: &str) -> Vec<ConversionEdge> {
            self.edges
                .iter()
                .filter(|e| e.ingredient_id == id && e.from_unit == from_unit)
                .cloned()
                .collect()
        }
    }

    fn pantry() -> Pantry {
        Pantry {
            ingredients: vec![
                Ingredient {
                    id: IngredientId(1),
                    name: "Brioche Flour".to_string(),
                    unit: "kg".to_string(),
                    cost_per_unit: 2.5,
                },
                Ingredient {
                    id: IngredientId(2),
                    name: "Eggs".to_string(),
                    unit: "piece".to_string(),
                    cost_per_unit: 0.3,
                },
            ],
            edges: vec![
                ConversionEdge {
                    ingredient_id: IngredientId(1),
                    from_qty: 1000.0,
                    from_unit: "g".to_string(),
                    to_qty: 1.0,
                    to_unit: "kg".to_string(),
                },
                ConversionEdge {
                    ingredient_id: IngredientId(1),
                    from_qty: 1.0,
                    from_unit: "bag".to_string(),
                    to_qty: 25000.0,
                    to_unit: "g".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_base_unit_fast_path() {
        let pantry = pantry();
        let resolver = ConversionResolver::new(&pantry);
        let cost = resolver.cost_of(IngredientId(2), 12.0, "piece").unwrap();
        assert!((cost.cost - 3.6).abs() < 1e-9);
        assert_eq!(cost.quantity, 12.0);
        assert_eq!(cost.unit, "piece");
    }

    #[test]
    fn test_cost_through_conversion_chain() {
        let pantry = pantry();
        let resolver = ConversionResolver::new(&pantry);
        let cost = resolver.cost_of(IngredientId(1), 2.0, "bag").unwrap();
        assert!((cost.quantity - 50.0).abs() < 1e-9);
        assert!((cost.cost - 125.0).abs() < 1e-9);
        assert_eq!(cost.unit, "kg");
    }

    #[test]
    fn test_resolved_cost_serializes_for_json_output() {
        let pantry = pantry();
        let cost = ConversionResolver::new(&pantry)
            .cost_of(IngredientId(2), 10.0, "piece")
            .unwrap();
        let json = serde_json::to_value(&cost).unwrap();
        assert_eq!(json["unit"], "piece");
        assert_eq!(json["quantity"], 10.0);
    }

    #[test]
    fn test_unknown_ingredient() {
        let pantry = pantry();
        let resolver = ConversionResolver::new(&pantry);
        assert_eq!(
            resolver.cost_of(IngredientId(99), 1.0, "kg"),
            Err(ConversionError::IngredientNotFound(IngredientId(99)))
        );
    }

    #[test]
    fn test_unit_without_conversions() {
        let pantry = pantry();
        let resolver = ConversionResolver::new(&pantry);
        match resolver.cost_of(IngredientId(2), 1.0, "dozen") {
            Err(ConversionError::NoConversionPath {
                from_unit, to_unit, ..
            }) => {
                assert_eq!(from_unit, "dozen");
                assert_eq!(to_unit, "piece");
            }
            other => panic!("expected no path, got {:?}", other),
        }
    }

    #[test]
    fn test_to_base_unit() {
        let pantry = pantry();
        let resolver = ConversionResolver::new(&pantry);
        let (qty, unit) = resolver.to_base_unit(IngredientId(1), 250.0, "g").unwrap();
        assert!((qty - 0.25).abs() < 1e-9);
        assert_eq!(unit, "kg");
    }
}

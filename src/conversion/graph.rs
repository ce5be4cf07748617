use std::collections::HashSet;

use super::ConversionError;
use crate::model::IngredientId;
use crate::store::IngredientCatalog;

/// Outcome of exploring one unit during the search.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Reached(f64),
    CycleDetected,
    NoPath,
}

/// Directed unit graph of a single ingredient, backed by its operator-defined
/// conversion edges.
///
/// Resolution is a depth-first search that returns the *first* path found,
/// trying the edges leaving a unit in the order they were defined. It is not
/// a shortest or cheapest path search.
///
/// One visited set is kept for the whole search, so a unit is expanded at
/// most once. Depth-first search with a single visited set still reaches
/// every unit reachable from the start, so no reachable target is lost to
/// exploration order.
pub struct ConversionGraph<'a, C: IngredientCatalog + ?Sized> {
    catalog: &'a C,
    ingredient: IngredientId,
}

impl<'a, C: IngredientCatalog + ?Sized> ConversionGraph<'a, C> {
    pub fn new(catalog: &'a C, ingredient: IngredientId) -> Self {
        Self { catalog, ingredient }
    }

    /// Converts `quantity` expressed in `from_unit` into `target_unit`.
    ///
    /// Ratios compound multiplicatively along the path; nothing is rounded.
    /// Asking for the unit the quantity is already in always succeeds, even
    /// when no edge mentions that unit.
    pub fn resolve(
        &self,
        quantity: f64,
        from_unit: &str,
        target_unit: &str,
    ) -> Result<(f64, String), ConversionError> {
        let mut visited = HashSet::new();
        match self.search(quantity, from_unit, target_unit, &mut visited) {
            Step::Reached(converted) => Ok((converted, target_unit.to_string())),
            step => Err(ConversionError::NoConversionPath {
                ingredient: self.ingredient,
                from_unit: from_unit.to_string(),
                to_unit: target_unit.to_string(),
                cycle_detected: step == Step::CycleDetected,
            }),
        }
    }

    fn search(
        &self,
        quantity: f64,
        unit: &str,
        target_unit: &str,
        visited: &mut HashSet<String>,
    ) -> Step {
        if unit == target_unit {
            return Step::Reached(quantity);
        }
        if !visited.insert(unit.to_string()) {
            return Step::CycleDetected;
        }

        let mut cycle_seen = false;
        for edge in self.catalog.conversions_from(self.ingredient, unit) {
            match self.search(quantity * edge.ratio(), &edge.to_unit, target_unit, visited) {
                Step::Reached(converted) => return Step::Reached(converted),
                Step::CycleDetected => cycle_seen = true,
                Step::NoPath => {}
            }
        }

        if cycle_seen {
            Step::CycleDetected
        } else {
            Step::NoPath
        }
    }
}

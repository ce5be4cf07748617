//! Unit conversion for ingredient costing.
//!
//! Every ingredient is costed in its own base unit. Recipes may use any unit,
//! as long as the operator defined a chain of conversions from that unit to
//! the base unit for that ingredient (e.g. `1 case -> 12 bottle`,
//! `1 bottle -> 0.75 l`).

pub mod graph;
pub mod resolver;

pub use graph::ConversionGraph;
pub use resolver::{ConversionResolver, ResolvedCost};

use crate::model::IngredientId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("{0} not found")]
    IngredientNotFound(IngredientId),

    #[error("cannot convert '{from_unit}' -> '{to_unit}' for {ingredient}{}", loop_note(.cycle_detected))]
    NoConversionPath {
        ingredient: IngredientId,
        from_unit: String,
        to_unit: String,
        /// At least one explored branch ended on a unit it had already visited.
        cycle_detected: bool,
    },
}

fn loop_note(cycle_detected: &bool) -> &'static str {
    if *cycle_detected {
        " (conversion loop detected)"
    } else {
        ""
    }
}

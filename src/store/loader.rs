use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use super::{KitchenStore, StoreError};
use crate::model::{ConversionEdge, Ingredient, Recipe};

/// On-disk shape of the kitchen data file.
///
/// ```json
/// {
///   "ingredients": [{ "id": 1, "name": "Beef", "unit": "kg", "cost_per_unit": 18.5 }],
///   "conversions": [{ "ingredient_id": 1, "from_qty": 1, "from_unit": "patty", "to_qty": 0.15, "to_unit": "kg" }],
///   "recipes": [{ "id": 1, "name": "DISH Burger", "yield_qty": 1, "yield_unit": "portion",
///                 "items": [{ "ingredient_id": 1, "qty": 1, "unit": "patty" }] }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KitchenDataset {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub conversions: Vec<ConversionEdge>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl KitchenDataset {
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reads, parses and validates the kitchen data file at `path`.
pub async fn load_kitchen(path: &Path) -> Result<KitchenStore> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Kitchen data file not found at: {:?}", path));
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read kitchen data file {:?}", path))?;

    let dataset = KitchenDataset::from_json_str(&content)
        .with_context(|| format!("Failed to parse kitchen data file {:?}", path))?;
    debug!(
        "Parsed {} ingredients, {} conversions, {} recipes",
        dataset.ingredients.len(),
        dataset.conversions.len(),
        dataset.recipes.len()
    );

    let store = KitchenStore::from_dataset(dataset)
        .with_context(|| format!("Invalid kitchen data in {:?}", path))?;
    info!(
        "Loaded kitchen data from {:?}: {} ingredients, {} recipes",
        path,
        store.ingredients().len(),
        store.recipes().len()
    );

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecipeBook;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const KITCHEN_JSON: &str = r#"{
        "ingredients": [
            { "id": 1, "name": "Beef", "unit": "kg", "cost_per_unit": 18.5 },
            { "id": 2, "name": "Brioche Bun", "unit": "piece", "cost_per_unit": 0.45 }
        ],
        "conversions": [
            { "ingredient_id": 1, "from_qty": 1, "from_unit": "patty", "to_qty": 0.15, "to_unit": "kg" }
        ],
        "recipes": [
            { "id": 1, "name": "DISH Burger", "yield_qty": 1, "yield_unit": "portion",
              "items": [
                { "ingredient_id": 1, "qty": 1, "unit": "patty" },
                { "ingredient_id": 2, "qty": 1 }
              ] }
        ]
    }"#;

    fn write_temp(content: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", content)?;
        file.flush()?;
        Ok(file)
    }

    #[tokio::test]
    async fn test_load_kitchen_success() -> Result<()> {
        let file = write_temp(KITCHEN_JSON)?;
        let store = load_kitchen(file.path()).await?;

        assert_eq!(store.ingredients().len(), 2);
        let recipe = store.recipes()[0].clone();
        assert_eq!(recipe.items[1].unit, None);
        assert_eq!(recipe.subrecipes.len(), 0);
        assert_eq!(store.expand(recipe.id)?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_kitchen_file_not_found() {
        let result = load_kitchen(Path::new("this_kitchen_does_not_exist.json")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Kitchen data file not found"));
    }

    #[tokio::test]
    async fn test_load_kitchen_rejects_invalid_data() -> Result<()> {
        let file = write_temp(&KITCHEN_JSON.replace("\"from_qty\": 1", "\"from_qty\": 0"))?;
        let err = load_kitchen(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid kitchen data"));
        assert!(format!("{:#}", err).contains("must use positive quantities"));
        Ok(())
    }

    #[test]
    fn test_from_json_str_reports_parse_errors() {
        let err = KitchenDataset::from_json_str("{ \"ingredients\": [ { \"id\": \"x\" } ] }")
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dataset = KitchenDataset::from_json_str("{}").unwrap();
        assert!(dataset.ingredients.is_empty());
        assert!(dataset.conversions.is_empty());
        assert!(dataset.recipes.is_empty());
    }
}

//! Text renderings of costing and forecast results.
//!
//! Nothing here touches the filesystem; callers decide where the output goes.

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use crate::costing::RecipeCost;
use crate::forecast::Forecast;
use crate::model::{ConversionEdge, ExpandedLine, Ingredient};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Csv,
    Json,
}

/// Left-aligned columns separated by two spaces.
fn text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut out = format_row(headers.to_vec());
    for row in rows {
        out.push_str(&format_row(row.iter().map(String::as_str).collect()));
    }
    out
}

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = format!("| {} |\n", headers.join(" | "));
    out.push_str(&format!(
        "|{}|\n",
        headers
            .iter()
            .map(|h| "-".repeat(h.len() + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

const DISH_HEADERS: [&str; 4] = ["Dish", "Portions", "Base yield", "Scale factor"];
const INGREDIENT_HEADERS: [&str; 5] = ["Ingredient", "Unit", "Total Qty", "Unit Cost", "Total Cost"];
const SUBRECIPE_HEADERS: [&str; 3] = ["Subrecipe", "Unit", "Total Qty"];

fn dish_rows(forecast: &Forecast) -> Vec<Vec<String>> {
    forecast
        .dishes
        .iter()
        .map(|d| {
            vec![
                d.name.clone(),
                format!("{:.3}", d.portions),
                format!("{:.3} {}", d.yield_qty, d.yield_unit),
                format!("{:.3}", d.scale()),
            ]
        })
        .collect()
}

fn ingredient_rows(forecast: &Forecast) -> Vec<Vec<String>> {
    forecast
        .ingredients
        .iter()
        .map(|i| {
            vec![
                i.name.clone(),
                i.unit.clone(),
                format!("{:.3}", i.total_qty),
                format!("{:.2}", i.cost_per_unit),
                format!("{:.2}", i.total_cost),
            ]
        })
        .collect()
}

fn subrecipe_rows(forecast: &Forecast) -> Vec<Vec<String>> {
    forecast
        .subrecipes
        .iter()
        .map(|s| vec![s.name.clone(), s.unit.clone(), format!("{:.3}", s.total_qty)])
        .collect()
}

/// CSV block with an optional one-field title row above the header.
fn csv_block(title: Option<&str>, headers: &[&str], rows: &[Vec<String>]) -> Result<String, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    if let Some(title) = title {
        writer.write_record([title])?;
    }
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Three-section CSV: dishes, aggregated ingredients, aggregated subrecipes.
/// Sections are separated by an empty line.
pub fn forecast_csv(forecast: &Forecast) -> Result<String, ReportError> {
    let sections = [
        csv_block(Some("# Dishes"), &DISH_HEADERS, &dish_rows(forecast))?,
        csv_block(
            Some("# Ingredients (aggregated)"),
            &INGREDIENT_HEADERS,
            &ingredient_rows(forecast),
        )?,
        csv_block(
            Some("# Subrecipes (aggregated, for bulk prep)"),
            &SUBRECIPE_HEADERS,
            &subrecipe_rows(forecast),
        )?,
    ];
    Ok(sections.join("\n"))
}

pub fn forecast_markdown(forecast: &Forecast) -> String {
    let mut out = String::from("# Production Forecast\n\n## Dishes\n\n");
    out.push_str(&markdown_table(&DISH_HEADERS, &dish_rows(forecast)));
    out.push_str("\n## Ingredients (aggregated)\n\n");
    out.push_str(&markdown_table(&INGREDIENT_HEADERS, &ingredient_rows(forecast)));
    out.push_str("\n## Subrecipes (aggregated, for bulk prep)\n\n");
    out.push_str(&markdown_table(&SUBRECIPE_HEADERS, &subrecipe_rows(forecast)));
    out.push_str(&format!("\n**Total Cost:** {:.2}\n", forecast.total_cost()));
    out
}

pub fn forecast_table(forecast: &Forecast) -> String {
    let mut out = String::from("DISHES\n");
    out.push_str(&text_table(&DISH_HEADERS, &dish_rows(forecast)));
    out.push_str("\nINGREDIENTS\n");
    out.push_str(&text_table(&INGREDIENT_HEADERS, &ingredient_rows(forecast)));
    if !forecast.subrecipes.is_empty() {
        out.push_str("\nSUBRECIPES (bulk prep)\n");
        out.push_str(&text_table(&SUBRECIPE_HEADERS, &subrecipe_rows(forecast)));
    }
    out.push_str(&format!("\nTotal cost: {:.2}\n", forecast.total_cost()));
    out
}

#[derive(Serialize)]
struct ForecastDocument<'a> {
    #[serde(flatten)]
    forecast: &'a Forecast,
    total_cost: f64,
}

pub fn render_forecast(forecast: &Forecast, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Table => Ok(forecast_table(forecast)),
        OutputFormat::Markdown => Ok(forecast_markdown(forecast)),
        OutputFormat::Csv => forecast_csv(forecast),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ForecastDocument {
            forecast,
            total_cost: forecast.total_cost(),
        })?),
    }
}

/// Ingredient section of `forecast` on its own, as a shopping list.
pub fn render_market_list(forecast: &Forecast, format: OutputFormat) -> Result<String, ReportError> {
    let rows = ingredient_rows(forecast);
    match format {
        OutputFormat::Table => Ok(format!(
            "{}\nEstimated cost: {:.2}\n",
            text_table(&INGREDIENT_HEADERS, &rows),
            forecast.total_cost()
        )),
        OutputFormat::Markdown => Ok(format!(
            "# Market List\n\n{}\n**Estimated Cost:** {:.2}\n",
            markdown_table(&INGREDIENT_HEADERS, &rows),
            forecast.total_cost()
        )),
        OutputFormat::Csv => csv_block(None, &INGREDIENT_HEADERS, &rows),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&forecast.ingredients)?),
    }
}

fn line_kind(line: &ExpandedLine) -> &'static str {
    match line {
        ExpandedLine::Ingredient(_) => "ingredient",
        ExpandedLine::Subrecipe(_) => "subrecipe",
    }
}

fn line_rows(lines: &[ExpandedLine]) -> Vec<Vec<String>> {
    lines
        .iter()
        .map(|line| {
            let (qty, unit) = match line {
                ExpandedLine::Ingredient(l) => (l.qty_per_yield, l.unit.as_str()),
                ExpandedLine::Subrecipe(l) => (l.qty_per_yield, l.unit.as_str()),
            };
            vec![
                line_kind(line).to_string(),
                line.name().to_string(),
                format!("{:.3}", qty),
                unit.to_string(),
                format!("{:.2}", line.line_cost()),
            ]
        })
        .collect()
}

const LINE_HEADERS: [&str; 5] = ["Type", "Name", "Qty", "Unit", "Line Cost"];

/// Expanded rows of one batch of a recipe.
pub fn expanded_lines_table(lines: &[ExpandedLine]) -> String {
    text_table(&LINE_HEADERS, &line_rows(lines))
}

fn cost_summary(cost: &RecipeCost) -> Vec<(String, String)> {
    let mut summary = vec![
        ("Total Cost".to_string(), format!("{:.2}", cost.total_cost)),
        (
            format!("Cost per {}", cost.yield_unit),
            format!("{:.4}", cost.cost_per_yield_unit),
        ),
    ];
    if let (Some(unit), Some(per_unit)) = (
        cost.secondary_yield_unit.as_deref(),
        cost.cost_per_secondary_unit,
    ) {
        summary.push((format!("Cost per {}", unit), format!("{:.4}", per_unit)));
    }
    summary
}

fn yield_labels(cost: &RecipeCost) -> Vec<(&'static str, String)> {
    let mut labels = vec![("Yield", format!("{:.2} {}", cost.yield_qty, cost.yield_unit))];
    if let (Some(qty), Some(unit)) = (cost.secondary_yield_qty, cost.secondary_yield_unit.as_deref()) {
        labels.push(("Secondary Yield", format!("{:.2} {}", qty, unit)));
    }
    labels
}

pub fn render_recipe_cost(cost: &RecipeCost, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Table => {
            let mut out = format!("{}\n\n", cost.name);
            out.push_str(&expanded_lines_table(&cost.lines));
            out.push('\n');

            let rows: Vec<(String, String)> = yield_labels(cost)
                .into_iter()
                .map(|(label, value)| (label.to_string(), value))
                .chain(cost_summary(cost))
                .collect();
            let width = rows.iter().map(|(label, _)| label.chars().count() + 1).max().unwrap_or(0);
            for (label, value) in rows {
                out.push_str(&format!("{:<width$}  {}\n", format!("{}:", label), value, width = width));
            }
            Ok(out)
        }
        OutputFormat::Markdown => {
            let mut out = format!("# {}\n\n", cost.name);
            for (label, value) in yield_labels(cost) {
                out.push_str(&format!("**{}:** {}\n\n", label, value));
            }
            out.push_str("## Ingredients\n\n");
            out.push_str(&markdown_table(&LINE_HEADERS, &line_rows(&cost.lines)));
            out.push_str("\n## Cost Summary\n\n");
            for (label, value) in cost_summary(cost) {
                out.push_str(&format!("- **{}:** {}\n", label, value));
            }
            Ok(out)
        }
        OutputFormat::Csv => csv_block(None, &LINE_HEADERS, &line_rows(&cost.lines)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(cost)?),
    }
}

const REPORT_HEADERS: [&str; 5] = ["Recipe", "Yield", "Total Cost", "Cost/Yield Unit", "Cost/Secondary Unit"];

fn report_rows(costs: &[RecipeCost]) -> Vec<Vec<String>> {
    costs
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                format!("{:.2} {}", c.yield_qty, c.yield_unit),
                format!("{:.2}", c.total_cost),
                format!("{:.4}", c.cost_per_yield_unit),
                match (c.cost_per_secondary_unit, c.secondary_yield_unit.as_deref()) {
                    (Some(per_unit), Some(unit)) => format!("{:.4} /{}", per_unit, unit),
                    _ => "-".to_string(),
                },
            ]
        })
        .collect()
}

/// One summary row per recipe; expanded lines are left out except in JSON.
pub fn render_cost_report(costs: &[RecipeCost], format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Table => Ok(text_table(&REPORT_HEADERS, &report_rows(costs))),
        OutputFormat::Markdown => Ok(format!(
            "# Recipe Cost Report\n\n{}",
            markdown_table(&REPORT_HEADERS, &report_rows(costs))
        )),
        OutputFormat::Csv => csv_block(None, &REPORT_HEADERS, &report_rows(costs)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(costs)?),
    }
}

pub fn ingredients_table(ingredients: &[&Ingredient]) -> String {
    let rows: Vec<Vec<String>> = ingredients
        .iter()
        .map(|i| {
            vec![
                i.id.0.to_string(),
                i.name.clone(),
                i.unit.clone(),
                format!("{:.2}", i.cost_per_unit),
            ]
        })
        .collect();
    text_table(&["ID", "NAME", "UNIT", "COST/UNIT"], &rows)
}

pub fn conversions_list(ingredient: &Ingredient, edges: &[ConversionEdge]) -> String {
    if edges.is_empty() {
        return format!("No conversions defined for {} (base unit: {})\n", ingredient.name, ingredient.unit);
    }
    let mut out = format!("Conversions for {} (base unit: {}):\n", ingredient.name, ingredient.unit);
    for edge in edges {
        out.push_str(&format!(
            "  {:.3} {} -> {:.3} {}\n",
            edge.from_qty, edge.from_unit, edge.to_qty, edge.to_unit
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{AggregatedIngredient, AggregatedSubrecipe, DishRequest};
    use crate::model::{IngredientId, IngredientLine, RecipeId, SubrecipeLine};

    fn forecast() -> Forecast {
        Forecast {
            dishes: vec![DishRequest {
                recipe_id: RecipeId(1),
                name: "DISH Burger".to_string(),
                portions: 600.0,
                yield_qty: 1.0,
                yield_unit: "portion".to_string(),
            }],
            ingredients: vec![
                AggregatedIngredient {
                    ingredient_id: IngredientId(10),
                    name: "Beef".to_string(),
                    unit: "kg".to_string(),
                    cost_per_unit: 20.0,
                    total_qty: 90.0,
                    total_cost: 1800.0,
                },
                AggregatedIngredient {
                    ingredient_id: IngredientId(11),
                    name: "Flour".to_string(),
                    unit: "kg".to_string(),
                    cost_per_unit: 1.0,
                    total_qty: 30.0,
                    total_cost: 30.0,
                },
            ],
            subrecipes: vec![AggregatedSubrecipe {
                recipe_id: RecipeId(5),
                name: "Bun Dough".to_string(),
                unit: "piece".to_string(),
                total_qty: 600.0,
            }],
        }
    }

    fn recipe_cost() -> RecipeCost {
        RecipeCost {
            recipe_id: RecipeId(2),
            name: "Tomato Sauce".to_string(),
            yield_qty: 2.0,
            yield_unit: "l".to_string(),
            secondary_yield_qty: Some(8.0),
            secondary_yield_unit: Some("portion".to_string()),
            total_cost: 9.0,
            cost_per_yield_unit: 4.5,
            cost_per_secondary_unit: Some(1.125),
            lines: vec![
                ExpandedLine::Ingredient(IngredientLine {
                    ingredient_id: IngredientId(1),
                    name: "Tomatoes".to_string(),
                    unit: "kg".to_string(),
                    qty_per_yield: 3.0,
                    cost_per_unit: 3.0,
                }),
                ExpandedLine::Subrecipe(SubrecipeLine {
                    recipe_id: RecipeId(3),
                    name: "Garlic Confit".to_string(),
                    unit: "g".to_string(),
                    qty_per_yield: 50.0,
                }),
            ],
        }
    }

    #[test]
    fn test_forecast_csv_sections() {
        let csv = forecast_csv(&forecast()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].contains("# Dishes"));
        assert_eq!(lines[1], "Dish,Portions,Base yield,Scale factor");
        assert_eq!(lines[2], "DISH Burger,600.000,1.000 portion,600.000");
        assert_eq!(lines[3], "");
        assert!(lines[4].contains("# Ingredients (aggregated)"));
        assert_eq!(lines[5], "Ingredient,Unit,Total Qty,Unit Cost,Total Cost");
        assert_eq!(lines[6], "Beef,kg,90.000,20.00,1800.00");
        assert_eq!(lines[7], "Flour,kg,30.000,1.00,30.00");
        assert_eq!(lines[8], "");
        assert!(lines[9].contains("# Subrecipes (aggregated, for bulk prep)"));
        assert_eq!(lines[10], "Subrecipe,Unit,Total Qty");
        assert_eq!(lines[11], "Bun Dough,piece,600.000");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_forecast_markdown_has_totals() {
        let md = forecast_markdown(&forecast());
        assert!(md.starts_with("# Production Forecast"));
        assert!(md.contains("| Beef | kg | 90.000 | 20.00 | 1800.00 |"));
        assert!(md.contains("**Total Cost:** 1830.00"));
    }

    #[test]
    fn test_forecast_json_includes_total_cost() {
        let json = render_forecast(&forecast(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_cost"], 1830.0);
        assert_eq!(value["ingredients"][0]["name"], "Beef");
        assert_eq!(value["dishes"][0]["portions"], 600.0);
    }

    #[test]
    fn test_forecast_table_skips_empty_subrecipe_section() {
        let mut f = forecast();
        f.subrecipes.clear();
        let table = forecast_table(&f);
        assert!(table.contains("INGREDIENTS"));
        assert!(!table.contains("SUBRECIPES"));
        assert!(table.ends_with("Total cost: 1830.00\n"));
    }

    #[test]
    fn test_market_list_formats() {
        let md = render_market_list(&forecast(), OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("# Market List"));
        assert!(md.contains("| Flour | kg | 30.000 | 1.00 | 30.00 |"));
        assert!(md.contains("**Estimated Cost:** 1830.00"));
        assert!(!md.contains("Bun Dough"));

        let csv = render_market_list(&forecast(), OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().next(), Some("Ingredient,Unit,Total Qty,Unit Cost,Total Cost"));
        assert_eq!(csv.lines().count(), 3);

        let json = render_market_list(&forecast(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Beef");
        assert_eq!(value[1]["total_cost"], 30.0);
    }

    #[test]
    fn test_markdown_cells_escape_pipes() {
        let mut f = forecast();
        f.ingredients[0].name = "Salt | Pepper".to_string();
        let md = forecast_markdown(&f);
        assert!(md.contains("| Salt \\| Pepper | kg | 90.000 | 20.00 | 1800.00 |"));
    }

    #[test]
    fn test_text_table_aligns_columns() {
        let table = text_table(
            &["A", "LONG HEADER"],
            &[vec!["wide cell".to_string(), "x".to_string()]],
        );
        assert_eq!(table, "A          LONG HEADER\nwide cell  x\n");
    }

    #[test]
    fn test_recipe_cost_markdown() {
        let md = render_recipe_cost(&recipe_cost(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("**Secondary Yield:** 8.00 portion"));
        assert!(md.contains("| ingredient | Tomatoes | 3.000 | kg | 9.00 |"));
        assert!(md.contains("| subrecipe | Garlic Confit | 50.000 | g | 0.00 |"));
        assert!(md.contains("- **Cost per portion:** 1.1250"));
    }

    #[test]
    fn test_recipe_cost_table_and_csv() {
        let table = render_recipe_cost(&recipe_cost(), OutputFormat::Table).unwrap();
        assert!(table.contains("Total Cost:"));
        assert!(table.contains("4.5000"));

        let csv = render_recipe_cost(&recipe_cost(), OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().nth(1), Some("ingredient,Tomatoes,3.000,kg,9.00"));
    }

    #[test]
    fn test_cost_report_without_secondary_yield() {
        let mut cost = recipe_cost();
        cost.cost_per_secondary_unit = None;
        cost.secondary_yield_qty = None;
        cost.secondary_yield_unit = None;
        let csv = render_cost_report(&[cost], OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().nth(1), Some("Tomato Sauce,2.00 l,9.00,4.5000,-"));
    }

    #[test]
    fn test_conversions_list() {
        let flour = Ingredient {
            id: IngredientId(1),
            name: "Flour".to_string(),
            unit: "kg".to_string(),
            cost_per_unit: 1.2,
        };
        assert_eq!(
            conversions_list(&flour, &[]),
            "No conversions defined for Flour (base unit: kg)\n"
        );
        let edges = vec![ConversionEdge {
            ingredient_id: IngredientId(1),
            from_qty: 1.0,
            from_unit: "bag".to_string(),
            to_qty: 25.0,
            to_unit: "kg".to_string(),
        }];
        assert!(conversions_list(&flour, &edges).contains("  1.000 bag -> 25.000 kg"));
    }
}

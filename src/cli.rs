use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe costing and production forecasting", long_about = None)]
pub struct Cli {
    /// Path to the kitchen data file (overrides CHEFOPS_DATA)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse ingredients and their unit conversions
    #[command(subcommand)]
    Ingredient(IngredientCommand),

    /// Inspect and cost recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),

    /// Consolidated procurement list for several dishes at once
    Forecast(ForecastArgs),

    /// Shopping list for one batch of every dish in the kitchen
    #[command(name = "marketlist")]
    MarketList {
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand, Debug)]
pub enum IngredientCommand {
    /// List all ingredients
    List,
    /// Search ingredients by name
    Find { text: String },
    /// Show the unit conversions defined for an ingredient
    Conversions { name: String },
    /// Cost a quantity of an ingredient given in any convertible unit
    Cost {
        name: String,
        qty: f64,
        unit: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommand {
    /// List all recipes
    List,
    /// Show a recipe flattened down to its ingredients
    Show { name: String },
    /// Cost one batch of a recipe
    Cost {
        name: String,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Cost every recipe
    Report {
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Write the forecast to this file instead of stdout (CSV unless --format says otherwise)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Dishes to produce, e.g. "DISH Burger=600"
    #[arg(required = true, value_name = "NAME=PORTIONS")]
    pub dishes: Vec<String>,
}

impl ForecastArgs {
    /// Explicit `--format` first, then CSV for file exports, then the configured default.
    pub fn output_format(&self, configured: OutputFormat) -> OutputFormat {
        match (self.format, &self.out) {
            (Some(format), _) => format,
            (None, Some(_)) => OutputFormat::Csv,
            (None, None) => configured,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

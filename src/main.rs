use anyhow::{anyhow, bail, Context, Result};
use chefops::cli::{parse_args, Command, ForecastArgs, IngredientCommand, RecipeCommand};
use chefops::config::{AppConfig, DEFAULT_LOG_FILTER};
use chefops::conversion::ConversionResolver;
use chefops::costing::{cost_recipe, cost_report};
use chefops::forecast::{
    market_list, parse_dish_specs, resolve_dish, DishSpec, ForecastAggregator, ForecastError,
};
use chefops::model::{Ingredient, Recipe};
use chefops::report;
use chefops::store::{load_kitchen, KitchenStore, NameMatch, RecipeBook};
use log::{debug, info};
use std::io::{self, BufRead, IsTerminal, Write};
use tokio::fs;

/// Asks the operator to pick one of `candidates` when stdin is a terminal.
/// Otherwise fails with the candidate list so scripted runs never block.
fn choose(query: &str, candidates: Vec<String>) -> Result<String> {
    if !io::stdin().is_terminal() {
        bail!("'{}' is ambiguous, candidates: {}", query, candidates.join(", "));
    }

    println!("'{}' matches several entries:", query);
    for (idx, name) in candidates.iter().enumerate() {
        println!("  {}) {}", idx + 1, name);
    }
    print!("Select 1-{}: ", candidates.len());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| candidates.get(idx).cloned())
        .ok_or_else(|| anyhow!("invalid selection '{}'", answer.trim()))
}

fn resolve_ingredient(store: &KitchenStore, query: &str) -> Result<Ingredient> {
    match store.find_ingredient(query) {
        NameMatch::Found(ingredient) => Ok(ingredient),
        NameMatch::NotFound => bail!("ingredient not found: {}", query),
        NameMatch::Ambiguous(hits) => {
            let picked = choose(query, hits.into_iter().map(|i| i.name).collect())?;
            resolve_ingredient(store, &picked)
        }
    }
}

fn resolve_recipe(store: &KitchenStore, query: &str) -> Result<Recipe> {
    match store.find_recipe(query) {
        NameMatch::Found(recipe) => Ok(recipe),
        NameMatch::NotFound => bail!("recipe not found: {}", query),
        NameMatch::Ambiguous(hits) => {
            let picked = choose(query, hits.into_iter().map(|r| r.name).collect())?;
            resolve_recipe(store, &picked)
        }
    }
}

fn run_ingredient(store: &KitchenStore, command: IngredientCommand) -> Result<()> {
    match command {
        IngredientCommand::List => {
            let all: Vec<&Ingredient> = store.search_ingredients("");
            print!("{}", report::ingredients_table(&all));
        }
        IngredientCommand::Find { text } => {
            let hits = store.search_ingredients(&text);
            if hits.is_empty() {
                println!("No ingredients matching '{}'", text);
            } else {
                print!("{}", report::ingredients_table(&hits));
            }
        }
        IngredientCommand::Conversions { name } => {
            let ingredient = resolve_ingredient(store, &name)?;
            print!(
                "{}",
                report::conversions_list(&ingredient, store.conversions(ingredient.id))
            );
        }
        IngredientCommand::Cost { name, qty, unit } => {
            let ingredient = resolve_ingredient(store, &name)?;
            let resolved = ConversionResolver::new(store)
                .cost_of(ingredient.id, qty, &unit)
                .with_context(|| format!("Failed to cost {} {} of {}", qty, unit, ingredient.name))?;
            println!(
                "{:.3} {} of {} = {:.3} {} -> cost {:.2}",
                qty, unit, ingredient.name, resolved.quantity, resolved.unit, resolved.cost
            );
        }
    }
    Ok(())
}

fn run_recipe(store: &KitchenStore, command: RecipeCommand, config: &AppConfig) -> Result<()> {
    match command {
        RecipeCommand::List => {
            let mut recipes: Vec<&Recipe> = store.recipes().iter().collect();
            recipes.sort_by(|a, b| a.name.cmp(&b.name));
            for recipe in recipes {
                println!(
                    "{:>4}  {}  ({:.2} {})",
                    recipe.id.0, recipe.name, recipe.yield_qty, recipe.yield_unit
                );
            }
        }
        RecipeCommand::Show { name } => {
            let recipe = resolve_recipe(store, &name)?;
            let lines = store
                .expand(recipe.id)
                .with_context(|| format!("Failed to expand recipe '{}'", recipe.name))?;
            println!("{} (yield {:.2} {})\n", recipe.name, recipe.effective_yield(), recipe.yield_unit);
            print!("{}", report::expanded_lines_table(&lines));
        }
        RecipeCommand::Cost { name, format } => {
            let recipe = resolve_recipe(store, &name)?;
            let cost = cost_recipe(store, recipe.id)
                .with_context(|| format!("Failed to cost recipe '{}'", recipe.name))?;
            print!("{}", report::render_recipe_cost(&cost, format.unwrap_or(config.format))?);
        }
        RecipeCommand::Report { format } => {
            let costs = cost_report(store, store.recipes()).context("Failed to build the cost report")?;
            print!("{}", report::render_cost_report(&costs, format.unwrap_or(config.format))?);
        }
    }
    Ok(())
}

async fn run_forecast(store: &KitchenStore, args: ForecastArgs, config: &AppConfig) -> Result<()> {
    let specs = parse_dish_specs(&args.dishes)?;

    let mut requests = Vec::with_capacity(specs.len());
    for spec in specs {
        let request = match resolve_dish(store, &spec) {
            Err(ForecastError::AmbiguousRecipe { query, candidates }) => {
                let name = choose(&query, candidates)?;
                resolve_dish(
                    store,
                    &DishSpec {
                        name,
                        portions: spec.portions,
                    },
                )?
            }
            other => other?,
        };
        debug!(
            "{} x{:.3} (yield {:.3} {}, scale {:.3})",
            request.name,
            request.portions,
            request.yield_qty,
            request.yield_unit,
            request.scale()
        );
        requests.push(request);
    }

    let forecast = ForecastAggregator::new(store).aggregate(&requests)?;
    info!(
        "Forecast for {} dishes: {} ingredients, {} subrecipes",
        forecast.dishes.len(),
        forecast.ingredients.len(),
        forecast.subrecipes.len()
    );

    let rendered = report::render_forecast(&forecast, args.output_format(config.format))?;
    match &args.out {
        Some(path) => {
            fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write forecast to {:?}", path))?;
            println!("Forecast exported to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn run_market_list(
    store: &KitchenStore,
    format: Option<report::OutputFormat>,
    config: &AppConfig,
) -> Result<()> {
    let list = market_list(store, store.recipes()).context("Failed to build the market list")?;
    info!(
        "Market list over {} dishes: {} ingredients",
        list.dishes.len(),
        list.ingredients.len()
    );
    print!("{}", report::render_market_list(&list, format.unwrap_or(config.format))?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // .env may set CHEFOPS_DATA / CHEFOPS_FORMAT
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();

    let cli = parse_args();
    let config = AppConfig::from_env()?.with_data_path(cli.data);
    debug!("Using kitchen data at {:?}", config.data_path);

    let store = load_kitchen(&config.data_path).await?;

    match cli.command {
        Command::Ingredient(command) => run_ingredient(&store, command),
        Command::Recipe(command) => run_recipe(&store, command, &config),
        Command::Forecast(args) => run_forecast(&store, args, &config).await,
        Command::MarketList { format } => run_market_list(&store, format, &config),
    }
}

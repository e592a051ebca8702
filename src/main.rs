mod cli;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use larder::inventory::Category;
use larder::nutrition::{DietType, MealType};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[derive(Parser)]
#[command(name = "larder", version, about = "Local nutrition log, pantry, and dish cache")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log meals, list them, or remove one
    Log {
        #[command(subcommand)]
        action: LogAction,
    },
    /// Show today's totals and progress against the diet plan
    Today,
    /// Show the last seven days and the weekly summary
    Week,
    /// Manage the diet plan
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Manage kitchen inventory
    Pantry {
        #[command(subcommand)]
        action: PantryAction,
    },
    /// Inspect or purge the worldwide dish cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Run database diagnostics
    Doctor,
    /// Print every stored collection as JSON
    Export,
}

#[derive(Subcommand)]
enum LogAction {
    /// Log a meal (nutrition values are per serving)
    Add {
        #[arg(long)]
        recipe_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        meal: MealType,
        #[arg(long, default_value_t = 1.0)]
        servings: f64,
        #[arg(long)]
        calories: f64,
        #[arg(long)]
        protein: f64,
        #[arg(long)]
        carbs: f64,
        #[arg(long)]
        fat: f64,
        #[arg(long)]
        fiber: Option<f64>,
        /// Day to file the meal under (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List logged meals
    List {
        #[arg(long, conflicts_with_all = ["from", "to"])]
        date: Option<NaiveDate>,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Remove a logged meal by id
    Remove { id: String },
}

#[derive(Subcommand)]
enum PlanAction {
    /// Save a diet plan, replacing any existing one
    Set {
        diet_type: DietType,
        /// Required for custom plans; overrides the preset otherwise
        #[arg(long)]
        calories: Option<f64>,
        #[arg(long)]
        protein: Option<f64>,
        #[arg(long)]
        carbs: Option<f64>,
        #[arg(long)]
        fat: Option<f64>,
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Show the stored plan
    Show,
    /// Delete the stored plan
    Clear,
}

#[derive(Subcommand)]
enum PantryAction {
    /// Add an item
    Add {
        name: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        unit: String,
        #[arg(long, default_value = "Other")]
        category: Category,
        #[arg(long)]
        expires: Option<NaiveDate>,
    },
    /// List items
    List {
        #[arg(long)]
        category: Option<Category>,
    },
    /// Use up some of an item
    Use {
        id: String,
        #[arg(long)]
        quantity: f64,
        /// Record the usage as part of cooking a recipe
        #[arg(long)]
        recipe: bool,
    },
    /// Remove an item by id
    Remove { id: String },
    /// List items expiring soon
    Expiring {
        #[arg(long, default_value_t = 3)]
        days: i64,
    },
    /// Show usage history
    History {
        #[arg(long)]
        item: Option<String>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached entries and their freshness
    List,
    /// Delete expired entries
    Purge,
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Start at the env (or default) level so config loading itself is logged,
    // then switch to the configured level.
    let bootstrap = std::env::var("LARDER_LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let (filter, filter_handle) = reload::Layer::new(env_filter(&bootstrap));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = larder::config::LarderConfig::load()?;
    if let Err(e) = filter_handle.reload(env_filter(&config.log.level)) {
        tracing::warn!(error = %e, "failed to apply configured log level");
    }

    match cli.command {
        Command::Log { action } => match action {
            LogAction::Add {
                recipe_id,
                title,
                meal,
                servings,
                calories,
                protein,
                carbs,
                fat,
                fiber,
                date,
            } => {
                let per_serving = larder::nutrition::NutritionInfo {
                    fiber,
                    ..larder::nutrition::NutritionInfo::new(calories, protein, carbs, fat)
                };
                cli::nutrition::log_add(
                    &config,
                    &recipe_id,
                    &title,
                    meal,
                    servings,
                    &per_serving,
                    date,
                )?;
            }
            LogAction::List { date, from, to } => {
                let range = from.zip(to);
                cli::nutrition::log_list(&config, date, range)?;
            }
            LogAction::Remove { id } => cli::nutrition::log_remove(&config, &id)?,
        },
        Command::Today => cli::nutrition::today(&config)?,
        Command::Week => cli::nutrition::week(&config)?,
        Command::Plan { action } => match action {
            PlanAction::Set {
                diet_type,
                calories,
                protein,
                carbs,
                fat,
                start,
            } => {
                let targets = cli::plan::PlanTargets {
                    calories,
                    protein,
                    carbs,
                    fat,
                };
                cli::plan::set(&config, diet_type, targets, start)?;
            }
            PlanAction::Show => cli::plan::show(&config)?,
            PlanAction::Clear => cli::plan::clear(&config)?,
        },
        Command::Pantry { action } => match action {
            PantryAction::Add {
                name,
                quantity,
                unit,
                category,
                expires,
            } => cli::pantry::add(&config, &name, quantity, &unit, category, expires)?,
            PantryAction::List { category } => cli::pantry::list(&config, category)?,
            PantryAction::Use {
                id,
                quantity,
                recipe,
            } => cli::pantry::use_item(&config, &id, quantity, recipe)?,
            PantryAction::Remove { id } => cli::pantry::remove(&config, &id)?,
            PantryAction::Expiring { days } => cli::pantry::expiring(&config, days)?,
            PantryAction::History { item } => cli::pantry::history(&config, item.as_deref())?,
        },
        Command::Cache { action } => match action {
            CacheAction::List => cli::cache::list(&config)?,
            CacheAction::Purge => cli::cache::purge(&config)?,
        },
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Export => cli::export::export(&config)?,
    }

    Ok(())
}

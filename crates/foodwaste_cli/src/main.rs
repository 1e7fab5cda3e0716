//! FoodWaste CLI
//!
//! Command-line tools for FoodWaste stores.
//!
//! # Commands
//!
//! - `init` - Create the schema in a new or existing store
//! - `food-groups` - Print the food group tree
//! - `add-food-group` - Add a food group
//! - `food-item` - Show a food item with its groups
//! - `add-food-item` - Add a food item to groups
//! - `delete-food-item` - Delete a food item and its dependent rows

mod commands;

use clap::{Parser, Subcommand};
use foodwaste_core::ProxyId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// FoodWaste command-line store tools.
#[derive(Parser)]
#[command(name = "foodwaste")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema
    Init,

    /// Print the food group tree
    FoodGroups {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Add a food group
    AddFoodGroup {
        /// Parent group identifier
        #[arg(long, value_parser = parse_id)]
        parent: Option<ProxyId>,

        /// Add the group as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Show a food item
    FoodItem {
        /// Food item identifier
        #[arg(value_parser = parse_id)]
        id: ProxyId,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Add a food item
    AddFoodItem {
        /// Primary food group identifier
        #[arg(long, value_parser = parse_id)]
        primary: ProxyId,

        /// Further food group identifiers
        #[arg(long = "group", value_parser = parse_id)]
        groups: Vec<ProxyId>,

        /// Add the item as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Delete a food item
    DeleteFoodItem {
        /// Food item identifier
        #[arg(value_parser = parse_id)]
        id: ProxyId,
    },

    /// Show version information
    Version,
}

fn parse_id(value: &str) -> Result<ProxyId, String> {
    ProxyId::parse_key(value).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            let path = cli.path.ok_or("Database path required for init")?;
            commands::init::run(&path)?;
        }
        Commands::FoodGroups { format } => {
            let path = cli.path.ok_or("Database path required for food-groups")?;
            let mut repository = commands::open(&path)?;
            commands::food_groups::list(&mut repository, &format)?;
        }
        Commands::AddFoodGroup { parent, inactive } => {
            let path = cli.path.ok_or("Database path required for add-food-group")?;
            let mut repository = commands::open(&path)?;
            commands::food_groups::add(&mut repository, parent, !inactive)?;
        }
        Commands::FoodItem { id, format } => {
            let path = cli.path.ok_or("Database path required for food-item")?;
            let mut repository = commands::open(&path)?;
            commands::food_items::show(&mut repository, id, &format)?;
        }
        Commands::AddFoodItem {
            primary,
            groups,
            inactive,
        } => {
            let path = cli.path.ok_or("Database path required for add-food-item")?;
            let mut repository = commands::open(&path)?;
            commands::food_items::add(&mut repository, primary, &groups, !inactive)?;
        }
        Commands::DeleteFoodItem { id } => {
            let path = cli.path.ok_or("Database path required for delete-food-item")?;
            let mut repository = commands::open(&path)?;
            commands::food_items::delete(&mut repository, id)?;
        }
        Commands::Version => {
            println!("FoodWaste CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

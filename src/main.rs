//! Inventory Mirror - command line front end
//!
//! Each subcommand maps onto one public library operation.

use clap::{Parser, Subcommand};
use inventory_mirror::{
    seed_sample_items, Config, Inventory, InventoryError, Item, ItemFields, MirrorFormat,
    SearchMode,
};
use std::path::PathBuf;

/// Inventory catalog with TXT/JSON/CSV mirrors
#[derive(Parser, Debug)]
#[command(name = "inventory_mirror")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Directory for the mirror files (default: `mirrors/` next to the database)
    #[arg(short, long)]
    mirror_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List items, newest first
    List {
        /// Only show the N most recent items
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Show one item
    Show { id: i64 },
    /// Search by name/description or by category
    Search {
        term: String,
        /// `name` or `category`
        #[arg(long, default_value = "name")]
        mode: String,
    },
    /// List distinct categories
    Categories,
    /// Inventory statistics
    Stats {
        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Add a new item
    Add(FieldArgs),
    /// Replace the fields of an existing item
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an item
    Remove { id: i64 },
    /// Regenerate all mirror files
    Export,
    /// Import items from a CSV or JSON file
    Import {
        path: PathBuf,
        /// Override format detection (`csv` or `json`)
        #[arg(long)]
        format: Option<String>,
    },
    /// Load the sample catalog
    Seed {
        /// Delete all existing items first
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
}

#[derive(clap::Args, Debug)]
struct FieldArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    quantity: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

impl From<FieldArgs> for ItemFields {
    fn from(args: FieldArgs) -> Self {
        ItemFields {
            name: args.name,
            description: args.description,
            quantity: args.quantity,
            price: args.price,
            category: args.category,
        }
    }
}

fn config_from_args(args: &Args) -> Config {
    match (&args.database, &args.mirror_dir) {
        (Some(db), Some(dir)) => Config::new(db, dir),
        (Some(db), None) => Config::beside_database(db),
        (None, Some(dir)) => Config {
            mirror_dir: dir.clone(),
            ..Config::default()
        },
        (None, None) => Config::default(),
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = config_from_args(&args);

    log::debug!("Database path: {}", config.database_path.display());
    log::debug!("Mirror directory: {}", config.mirror_dir.display());

    // Ensure parent directory exists
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
            log::info!("Created directory: {}", parent.display());
        }
    }

    let inventory = match Inventory::open(&config) {
        Ok(inventory) => inventory,
        Err(e) => {
            log::error!("Failed to open inventory: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&inventory, args.command) {
        if e.is_expected() {
            log::warn!("{}", e);
        } else {
            log::error!("{}", e);
        }
        std::process::exit(1);
    }
}

fn run(inventory: &Inventory, command: Command) -> inventory_mirror::Result<()> {
    match command {
        Command::List { recent } => {
            let items = match recent {
                Some(n) => inventory.recent(n)?,
                None => inventory.list_all()?,
            };
            print_items(&items);
        }
        Command::Show { id } => match inventory.get(id)? {
            Some(item) => print_item_detail(&item),
            None => return Err(InventoryError::NotFound(id)),
        },
        Command::Search { term, mode } => {
            let mode: SearchMode = mode.parse().unwrap_or(SearchMode::Unknown);
            let results = inventory.search(term.trim(), mode)?;
            if results.is_empty() {
                println!("No items match `{}` ({})", term.trim(), mode);
            } else {
                print_items(&results);
            }
        }
        Command::Categories => {
            for category in inventory.categories()? {
                println!("{}", category);
            }
        }
        Command::Stats { json } => {
            let stats = inventory.stats()?;
            if json {
                match serde_json::to_string_pretty(&stats) {
                    Ok(out) => println!("{}", out),
                    Err(e) => log::error!("Failed to encode stats: {}", e),
                }
            } else {
                println!("Total products:   {}", stats.total_products);
                println!("Inventory value:  {:.2}", stats.total_value);
                println!("Low stock items:  {}", stats.low_stock);
                println!("Categories:       {}", stats.categories);
                println!();
                println!("{:<20} {:>8} {:>14}", "Category", "Items", "Value");
                for row in inventory.category_breakdown()? {
                    println!("{:<20} {:>8} {:>14.2}", row.category, row.items, row.value);
                }
            }
        }
        Command::Add(fields) => {
            let item = inventory.create(&fields.into())?;
            println!("Created item {} ({})", item.id, item.name);
        }
        Command::Edit { id, fields } => {
            let item = inventory.update(id, &fields.into())?;
            println!("Updated item {} ({})", item.id, item.name);
        }
        Command::Remove { id } => {
            let item = inventory.delete(id)?;
            println!("Deleted item {} ({})", item.id, item.name);
        }
        Command::Export => {
            let report = inventory.resync()?;
            for path in &report.written {
                println!("Wrote {}", path.display());
            }
            for failure in &report.failures {
                log::error!("Failed {}: {}", failure.path.display(), failure.error);
            }
            if !report.is_complete() {
                std::process::exit(2);
            }
        }
        Command::Import { path, format } => {
            let format = format
                .as_deref()
                .map(str::parse::<MirrorFormat>)
                .transpose()?;
            let summary = inventory.import_file(&path, format)?;
            if summary.inserted == 0 {
                println!("Nothing imported ({} already present)", summary.skipped);
            } else {
                println!(
                    "Imported {} items ({} already present)",
                    summary.inserted, summary.skipped
                );
            }
        }
        Command::Seed { clear } => {
            if clear {
                let removed = inventory.clear()?;
                println!("Removed {} items", removed);
            }
            let report = seed_sample_items(inventory)?;
            println!(
                "Added {} sample items ({} already present)",
                report.added, report.skipped
            );
        }
    }
    Ok(())
}

fn print_items(items: &[Item]) {
    println!(
        "{:>5}  {:<32} {:>8} {:>10}  {}",
        "ID", "Name", "Qty", "Price", "Category"
    );
    for item in items {
        println!(
            "{:>5}  {:<32} {:>8} {:>10.2}  {}",
            item.id, item.name, item.quantity, item.price, item.category
        );
    }
}

fn print_item_detail(item: &Item) {
    println!("ID:          {}", item.id);
    println!("Name:        {}", item.name);
    println!("Description: {}", item.description);
    println!("Quantity:    {}", item.quantity);
    println!("Price:       {:.2}", item.price);
    println!("Category:    {}", item.category);
    println!("Created:     {}", item.created_at.format("%d/%m/%Y %H:%M"));
    println!("Updated:     {}", item.updated_at.format("%d/%m/%Y %H:%M"));
}

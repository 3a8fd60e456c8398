use std::{env, fs, path::PathBuf};

use foodboard::{
    config::{BackendKind, FoodboardConfig},
    logging,
    open_dashboard,
    presentation::{present, TextSurface},
    FilterDimension, FilterSelection,
};

fn bootstrap_duckdb(path: &std::path::Path) -> anyhow::Result<()> {
    let conn = duckdb::Connection::open(path)?;
    conn.execute_batch(
        "
        CREATE TABLE providers (
            Provider_ID INTEGER PRIMARY KEY,
            Name VARCHAR,
            Type VARCHAR,
            City VARCHAR
        );
        CREATE TABLE receivers (
            Receiver_ID INTEGER PRIMARY KEY,
            Name VARCHAR
        );
        CREATE TABLE food_listings (
            Food_ID INTEGER PRIMARY KEY,
            Food_Name VARCHAR,
            Quantity INTEGER,
            Provider_ID INTEGER,
            Location VARCHAR,
            Food_Type VARCHAR,
            Meal_Type VARCHAR
        );
        CREATE TABLE claims (
            Claim_ID INTEGER PRIMARY KEY,
            Food_ID INTEGER,
            Receiver_ID INTEGER,
            Status VARCHAR
        );
        INSERT INTO providers VALUES
            (1, 'Green Grocer', 'Grocery Store', 'Austin'),
            (2, 'Taco Hub', 'Restaurant', 'Austin'),
            (3, 'Bread Co', 'Restaurant', 'Reno'),
            (4, 'Harvest Mart', 'Supermarket', 'Boise');
        INSERT INTO receivers VALUES
            (1, 'Food Bank'),
            (2, 'Shelter');
        INSERT INTO food_listings VALUES
            (1, 'Rice', 10, 1, 'Austin', 'Vegetarian', 'Lunch'),
            (2, 'Soup', 5, 2, 'Austin', 'Vegan', 'Dinner'),
            (3, 'Bread', 20, 3, 'Reno', 'Vegetarian', 'Breakfast'),
            (4, 'Chicken', 8, 4, 'Boise', 'Non-Vegetarian', 'Dinner');
        INSERT INTO claims VALUES
            (1, 1, 1, 'Completed'),
            (2, 1, 2, 'Pending'),
            (3, 2, 1, 'Completed'),
            (4, 3, 2, 'Cancelled'),
            (5, 4, 1, 'Completed');
        ",
    )?;
    Ok(())
}

fn usage() {
    eprintln!("Usage: render_dashboard [db_path] [dimension=value ...]");
    eprintln!("Example: cargo run --example render_dashboard -- food.duckdb city=Austin status=Completed");
    eprintln!("Dimensions: city, provider_type, food_type, meal_type, status");
}

fn parse_dimension(key: &str) -> Option<FilterDimension> {
    match key {
        "city" => Some(FilterDimension::City),
        "provider_type" => Some(FilterDimension::ProviderType),
        "food_type" => Some(FilterDimension::FoodType),
        "meal_type" => Some(FilterDimension::MealType),
        "status" => Some(FilterDimension::Status),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = FoodboardConfig::load_default();
    logging::init(&config.logging.filter);

    let mut args = env::args().skip(1).peekable();
    match args.next_if(|a| !a.contains('=')) {
        Some(path) => config.store.path = PathBuf::from(path),
        None => {
            let demo = env::temp_dir().join("foodboard-demo.duckdb");
            if demo.exists() {
                fs::remove_file(&demo)?;
            }
            bootstrap_duckdb(&demo)?;
            config.store.backend = BackendKind::Duckdb;
            config.store.path = demo;
        }
    }

    let mut selection = FilterSelection::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            usage();
            std::process::exit(1);
        };
        let Some(dimension) = parse_dimension(key) else {
            usage();
            std::process::exit(1);
        };
        selection.set(dimension, value);
    }

    let dashboard = open_dashboard(&config)?;
    let (options, warnings) = dashboard.filter_options().await;
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    selection.sanitize(&options);
    for dimension in FilterDimension::ALL_DIMENSIONS {
        println!(
            "{}: {} (of {})",
            dimension.label(),
            selection.get(dimension),
            options.get(dimension).join(", ")
        );
    }
    println!();

    let view = dashboard.render(&selection).await;
    let stdout = std::io::stdout();
    let mut surface = TextSurface::new(stdout.lock());
    present(&view, &mut surface)?;
    Ok(())
}

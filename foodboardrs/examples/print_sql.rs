use std::env;

use foodboard::{catalog, FilterDimension, FilterSelection};

fn usage() {
    eprintln!("Usage: print_sql [report_id] [dimension=value ...]");
    eprintln!("Example: cargo run --example print_sql -- top_cities_by_providers city=Austin");
}

fn main() -> anyhow::Result<()> {
    let mut report_id = None;
    let mut selection = FilterSelection::default();
    for arg in env::args().skip(1) {
        let Some((key, value)) = arg.split_once('=') else {
            report_id = Some(arg);
            continue;
        };
        let dimension = match key {
            "city" => FilterDimension::City,
            "provider_type" => FilterDimension::ProviderType,
            "food_type" => FilterDimension::FoodType,
            "meal_type" => FilterDimension::MealType,
            "status" => FilterDimension::Status,
            _ => {
                usage();
                std::process::exit(1);
            }
        };
        selection.set(dimension, value);
    }

    let reports: Vec<_> = catalog()
        .into_iter()
        .filter(|r| report_id.as_deref().map_or(true, |id| id == r.id))
        .collect();
    if reports.is_empty() {
        usage();
        std::process::exit(1);
    }

    for report in reports {
        println!("-- {} ({})", report.title, report.id);
        if let Some(total) = report.total_query(&selection) {
            println!("{};", total.sql);
            println!("-- params: {}", serde_json::to_string(&total.params)?);
        }
        let query = report.build(&selection, None);
        println!("{};", query.sql);
        println!("-- params: {}", serde_json::to_string(&query.params)?);
        println!();
    }
    Ok(())
}

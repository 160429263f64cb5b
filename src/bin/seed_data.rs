use anyhow::Context;
use clap::Parser;
use recipe_book::config::ServerConfig;
use recipe_book::database::connection::establish_connection;
use recipe_book::database::models::recipe::Recipe;
use recipe_book::database::{create_tables, seed};
use recipe_book::logging;

/// Creates the catalog tables and fills an empty catalog with the demo recipes
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// SQLite database file, defaults to DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Add one view to every recipe once seeding is done
    #[arg(long)]
    bump_views: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ServerConfig::from_env().context("Unable to read configuration")?;

    logging::init(config.log_level).context("Unable to set global subscriber")?;

    let url = args.database_url.unwrap_or(config.database.url);
    let mut connection = establish_connection(&url, config.database.busy_timeout)
        .with_context(|| format!("Error connecting to {url}"))?;

    println!("Starting seed of {url}");

    create_tables(&mut connection).context("Unable to create tables")?;
    let added = seed::populate_if_empty(&mut connection)?;
    println!("Added {added} recipes");

    if args.bump_views {
        let touched = connection
            .immediate_transaction(|connection| Recipe::increment_views(connection, None))?;
        println!("Bumped views of {touched} recipes");
    }

    println!("End seed");
    Ok(())
}

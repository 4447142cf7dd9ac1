//! # Seed Tool
//!
//! Resets a database file to the seed catalog, clients and suppliers.
//!
//! ## Usage
//! ```bash
//! # Seed ./construflow_dev.db (refuses if it already holds data)
//! cargo run -p construflow-db --bin seed
//!
//! # Specify database path
//! cargo run -p construflow-db --bin seed -- --db ./data/construflow.db
//!
//! # Wipe everything (users and session included) and reseed
//! cargo run -p construflow-db --bin seed -- --force
//! ```

use clap::Parser;
use std::path::PathBuf;

use construflow_db::{Database, DbConfig};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "ConstruFlow seed data tool")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./construflow_dev.db")]
    db: PathBuf,

    /// Reseed even when the database already holds data
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("🌱 ConstruFlow Seed Tool");
    println!("=======================");
    println!("Database: {}", args.db.display());
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let written = db.written_collections().await?;
    if !written.is_empty() && !args.force {
        println!("⚠ Database already has data: {}", written.join(", "));
        println!("  Skipping seed. Pass --force to wipe and reseed.");
        return Ok(());
    }

    db.reset_to_seed().await?;

    let products = db.products().list().await?;
    let clients = db.clients().list().await?;
    let suppliers = db.suppliers().list().await?;

    println!();
    println!("✓ {} products", products.len());
    println!("✓ {} clients", clients.len());
    println!("✓ {} suppliers", suppliers.len());
    println!();
    println!("✓ Seed complete! Run `construflow setup` to create the admin account.");

    db.close().await;
    Ok(())
}

//! # Seed Data Generator
//!
//! Populates the database with demo pharmacy inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./medpos_dev.db
//! cargo run -p medpos-db --bin seed
//!
//! # Specify database path and starting stock
//! cargo run -p medpos-db --bin seed -- --db ./data/medpos.db --stock 500
//! ```
//!
//! Every item is stocked in base units (tablets, capsules, bottles). Most
//! carry a unit table so the POS can sell by strip or box.

use chrono::Utc;
use serde_json::json;
use std::env;

use medpos_core::InventoryItem;
use medpos_db::repository::inventory;
use medpos_db::{Database, DbConfig};
use uuid::Uuid;

/// (name, price per base unit, cost per base unit, tablets per strip, strips per box)
const CATALOGUE: &[(&str, i64, i64, Option<i64>, Option<i64>)] = &[
    ("Paracetamol 500mg Tablet", 20, 12, Some(10), Some(10)),
    ("Amoxicillin 500mg Capsule", 75, 45, Some(10), Some(2)),
    ("Ibuprofen 400mg Tablet", 30, 18, Some(10), Some(10)),
    ("Metformin 500mg Tablet", 25, 14, Some(14), Some(4)),
    ("Amlodipine 5mg Tablet", 40, 22, Some(10), Some(3)),
    ("Ciprofloxacin 500mg Tablet", 90, 55, Some(10), Some(1)),
    ("Artemether/Lumefantrine 20/120mg Tablet", 150, 95, Some(6), Some(4)),
    ("Omeprazole 20mg Capsule", 45, 25, Some(14), Some(2)),
    ("Vitamin C 1000mg Tablet", 15, 8, Some(10), Some(10)),
    ("ORS Sachet", 100, 60, None, Some(20)),
    ("Cough Syrup 100ml", 1_200, 750, None, None),
    ("Hand Sanitizer 250ml", 1_500, 900, None, None),
];

fn unit_table(per_strip: Option<i64>, strips_per_box: Option<i64>, base_price: i64) -> Option<String> {
    let mut units = Vec::new();

    if let Some(strip) = per_strip {
        units.push(json!({ "type": "strip", "quantity": strip }));
        if let Some(strips) = strips_per_box {
            let per_box = strip * strips;
            // Box price carries a 5% bulk discount
            units.push(json!({
                "type": "box",
                "quantity": per_box,
                "price_cents": base_price * per_box * 95 / 100,
            }));
        }
    } else if let Some(per_box) = strips_per_box {
        units.push(json!({ "type": "box", "quantity": per_box }));
    }

    if units.is_empty() {
        None
    } else {
        Some(serde_json::Value::Array(units).to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./medpos_dev.db");
    let mut stock: i64 = 1_000;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    stock = args[i + 1].parse().unwrap_or(1_000);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("MedPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./medpos_dev.db)");
                println!("  -s, --stock <N>    Starting stock per item in base units (default: 1000)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("MedPOS Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Stock:    {} base units per item", stock);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut conn = db.connection().await?;
    let existing = inventory::count(&mut conn).await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut generated = 0;
    for (name, price, cost, per_strip, strips_per_box) in CATALOGUE {
        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            unit_price_cents: *price,
            cost_price_cents: *cost,
            stock_quantity: stock,
            unit_conversions: unit_table(*per_strip, *strips_per_box, *price),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = inventory::insert(&mut conn, &item).await {
            eprintln!("Failed to insert {}: {}", item.name, e);
            continue;
        }

        println!("  {:<42} {}", item.name, item.id);
        generated += 1;
    }

    println!();
    println!("✓ Seeded {} items", generated);
    Ok(())
}

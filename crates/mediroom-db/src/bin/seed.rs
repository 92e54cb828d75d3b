//! # Seed Data Generator
//!
//! Populates a database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./mediroom_dev.db
//! cargo run -p mediroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p mediroom-db --bin seed -- --db ./data/mediroom.db
//! ```
//!
//! ## Generated Data
//! - One appointment per doctor slot in the catalog
//! - A handful of gallery items (references only, no image files)
//! - A few reviews
//!
//! Tables that already have rows are left alone.

use std::env;

use mediroom_core::catalog;
use mediroom_core::{Appointment, GalleryItem, Review};
use mediroom_db::{Database, DbConfig, Table, TableAccessor};
use tracing_subscriber::EnvFilter;

/// (image reference, title, description)
const GALLERY: &[(&str, &str, &str)] = &[
    ("content://media/external/images/101", "Reception", "Main entrance and front desk"),
    ("content://media/external/images/102", "Ward B", "Recovery ward after renovation"),
    ("content://media/external/images/103", "Garden", "Courtyard garden for visitors"),
];

const REVIEWS: &[&str] = &[
    "Friendly staff and very short waiting time.",
    "The booking was easy and the doctor was on time.",
    "Clean rooms, but parking was hard to find.",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./mediroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("MediRoom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./mediroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 MediRoom Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");
    println!();

    // Appointments: one per catalog slot
    if db.count(Table::Appointment).await? == 0 {
        let appointments = db.appointments();
        for doctor in catalog::doctors() {
            for time in doctor.available_times {
                appointments
                    .insert(&Appointment::new(doctor.name, *time, ""))
                    .await?;
            }
        }
        println!("✓ Appointments: {}", db.count(Table::Appointment).await?);
    } else {
        println!("⚠ Appointments already present, skipping");
    }

    if db.count(Table::GalleryItems).await? == 0 {
        let gallery = db.gallery();
        for (uri, title, description) in GALLERY {
            gallery
                .insert(&GalleryItem::new(*uri, *description).with_title(*title))
                .await?;
        }
        println!("✓ Gallery items: {}", GALLERY.len());
    } else {
        println!("⚠ Gallery items already present, skipping");
    }

    if db.count(Table::Reviews).await? == 0 {
        let reviews = db.reviews();
        for content in REVIEWS {
            reviews.insert(&Review::new(*content)).await?;
        }
        println!("✓ Reviews: {}", REVIEWS.len());
    } else {
        println!("⚠ Reviews already present, skipping");
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

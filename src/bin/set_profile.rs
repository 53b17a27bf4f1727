//! Utility to set a local user's physical profile
//! Usage: cargo run --bin set_profile -- <user> <gender> <weight_kg> <height_cm> <age>

use std::path::PathBuf;

use fitzy::config::default_database_path;
use fitzy::db::Database;
use fitzy::models::{Gender, Profile};

const USAGE: &str = "usage: set_profile <user> <male|female> <weight_kg> <height_cm> <age>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 5 {
        return Err(USAGE.into());
    }

    let user_id = &args[0];
    let profile = Profile {
        gender: Gender::from_str(&args[1]).ok_or(USAGE)?,
        weight_kg: args[2].parse()?,
        height_cm: args[3].parse()?,
        age: args[4].parse()?,
    };
    profile.validate()?;

    let db_path = std::env::var("FITZY_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path());
    println!("Database path: {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::open_migrated(&db_path)?;
    database.with_conn(|conn| Profile::set(conn, user_id, &profile))?;

    println!("Profile set for '{}':", user_id);
    println!("  Gender: {}", profile.gender.as_str());
    println!("  Weight: {} kg", profile.weight_kg);
    println!("  Height: {} cm", profile.height_cm);
    println!("  Age: {}", profile.age);

    Ok(())
}

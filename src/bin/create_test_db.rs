use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, macros::datetime};

use check_loading::{Check, CheckStore, SQLiteCheckStore, initialize_db};

/// A utility for creating a test database for the check server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of sample checks to create for each customer.
    #[arg(long, short, default_value_t = 12)]
    checks_per_customer: i64,
}

const CUSTOMERS: [&str; 3] = ["UID_15", "UID_16", "UID_42"];
const POINTS_OF_SALE: [&str; 2] = ["POS_1", "POS_2"];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample checks...");

    let store = SQLiteCheckStore::new(Arc::new(Mutex::new(conn)));
    let first_issuance_time = datetime!(2022-07-01 09:00 +03:00);

    for (customer_index, customer_id) in CUSTOMERS.iter().enumerate() {
        for check_index in 0..args.checks_per_customer {
            let pos_id = POINTS_OF_SALE[check_index as usize % POINTS_OF_SALE.len()];

            store.insert_unique(Check {
                check_number: format!("N{customer_index:02}{check_index:05}"),
                check_issuance_time: first_issuance_time
                    + Duration::hours(13 * check_index + customer_index as i64),
                total: 1_000 + 250 * check_index,
                customer_id: customer_id.to_string(),
                pos_id: pos_id.to_owned(),
            })?;
        }
    }

    println!("Success!");

    Ok(())
}

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use finance_tracker::{
    budget::{Budget, Period, create_budget},
    initialize_db,
    transaction::{
        Transaction,
        TransactionType::{Expense, Income},
        create_transaction,
    },
};

/// A utility for creating a test database for the finance tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating transactions...");
    let today = OffsetDateTime::now_utc().date();
    let month_start = today.replace_day(1)?;

    for (days_ago, transaction_type, amount, category, description) in [
        (0, Expense, 12.5, "Food", Some("Lunch")),
        (1, Expense, 84.3, "Food", Some("Groceries")),
        (2, Expense, 45.0, "Transport", None),
        (3, Income, 2500.0, "Salary", Some("Monthly pay")),
        (5, Expense, 1200.0, "Rent", None),
        (8, Expense, 60.0, "Entertainment", Some("Concert tickets")),
        (12, Expense, 38.9, "Food", None),
        (20, Income, 150.0, "Freelance", None),
        (35, Expense, 1200.0, "Rent", None),
        (40, Income, 2500.0, "Salary", Some("Monthly pay")),
    ] {
        let date: Date = today - Duration::days(days_ago);

        create_transaction(
            Transaction::build(transaction_type, amount, category, date).description(description),
            &conn,
        )?;
    }

    println!("Creating budgets...");
    for (category, amount, period) in [
        ("Food", 400.0, Period::Monthly),
        ("Food", 100.0, Period::Weekly),
        ("Transport", 50.0, Period::Monthly),
        ("Rent", 1200.0, Period::Monthly),
        ("Entertainment", 500.0, Period::Yearly),
    ] {
        create_budget(
            Budget::build(category, amount, period).dates(Some(month_start), None),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::macros::date;

use finance_manager::{
    CreateUserRequest, NewTransaction, NewUser, create_transaction, create_user, initialize_db,
    with_session,
};

/// A utility for creating a test database for the REST API server of the finance manager.
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

    println!("Creating test user and transactions...");

    let conn = std::sync::Mutex::new(conn);
    let transaction_count = with_session(&conn, |connection| {
        let new_user = NewUser::try_from(CreateUserRequest {
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
        })?;
        let user = create_user(new_user, connection)?;

        let transactions = [
            (Decimal::new(250_000, 2), "salary", date!(2024 - 01 - 01)),
            (Decimal::new(-120_000, 2), "rent", date!(2024 - 01 - 02)),
            (Decimal::new(-8_745, 2), "groceries", date!(2024 - 01 - 05)),
            (Decimal::new(-1_250, 2), "transport", date!(2024 - 01 - 09)),
            (Decimal::new(-4_599, 2), "eating out", date!(2024 - 01 - 13)),
        ];

        for (amount, category, date) in &transactions {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    amount: *amount,
                    category: (*category).to_owned(),
                    date: *date,
                },
                connection,
            )?;
        }

        Ok(transactions.len())
    })?;

    println!("Created 1 user and {transaction_count} transactions.");
    println!("Success!");

    Ok(())
}

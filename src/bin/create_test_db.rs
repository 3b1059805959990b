use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use spendwise_rs::{
    BudgetStore, Money, NewBudget, NewTransaction, NewUser, PasswordHash, SQLiteBudgetStore,
    SQLiteTransactionStore, TransactionKind, TransactionStore, ValidatedPassword, create_user,
    initialize_db,
};

/// A utility for creating a test database for the SpendWise server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "test";

/// (description, category, kind, amount in cents, days ago)
const DEMO_TRANSACTIONS: [(&str, &str, TransactionKind, i64, i64); 10] = [
    ("Salary", "Salary", TransactionKind::Income, 4200_00, 2),
    ("Salary", "Salary", TransactionKind::Income, 4200_00, 32),
    ("Freelance design", "Side Work", TransactionKind::Income, 650_00, 50),
    ("Weekly groceries", "Food", TransactionKind::Expense, 142_35, 1),
    ("Dinner out", "Food", TransactionKind::Expense, 68_00, 6),
    ("Electricity bill", "Utilities", TransactionKind::Expense, 120_80, 10),
    ("Internet bill", "Utilities", TransactionKind::Expense, 79_99, 40),
    ("Rent", "Housing", TransactionKind::Expense, 1800_00, 3),
    ("Rent", "Housing", TransactionKind::Expense, 1800_00, 33),
    ("Train tickets", "Travel", TransactionKind::Expense, 96_50, 75),
];

/// (category, limit in cents)
const DEMO_BUDGETS: [(&str, i64); 3] = [("Food", 400_00), ("Utilities", 150_00), ("Housing", 1800_00)];

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
    let connection = Connection::open(output_path)?;
    initialize_db(&connection)?;

    println!("Creating test user {DEMO_EMAIL} with the password '{DEMO_PASSWORD}'...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        NewUser {
            username: "Demo User".to_owned(),
            email: EmailAddress::new_unchecked(DEMO_EMAIL),
            password_hash,
        },
        &connection,
    )?;

    let connection = Arc::new(Mutex::new(connection));
    let transaction_store = SQLiteTransactionStore::new(connection.clone());
    let budget_store = SQLiteBudgetStore::new(connection);

    println!("Creating transactions...");
    let now = OffsetDateTime::now_utc();
    for (description, category, kind, cents, days_ago) in DEMO_TRANSACTIONS {
        transaction_store.create(
            user.id,
            NewTransaction::new(
                description,
                Money::from_cents(cents),
                category,
                kind,
                now - Duration::days(days_ago),
            )?,
        )?;
    }

    println!("Creating budgets...");
    for (category, cents) in DEMO_BUDGETS {
        budget_store.create(user.id, NewBudget::new(category, Money::from_cents(cents))?)?;
    }

    println!("Success!");

    Ok(())
}

//! Implements a SQLite backed budget store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row};

use crate::{
    Error, Money, UserID,
    budget::{Budget, BudgetId, NewBudget},
    stores::BudgetStore,
};

/// Stores budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

fn not_found_as_missing_budget(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::BudgetNotFound,
        error => error.into(),
    }
}

impl BudgetStore for SQLiteBudgetStore {
    /// Create a new budget in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateBudgetCategory] if `owner` already has a budget for the category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, owner: UserID, budget: NewBudget) -> Result<Budget, Error> {
        self.connection()?
            .prepare(
                "INSERT INTO budget (user_id, category, \"limit\") VALUES (?1, ?2, ?3)
                 RETURNING id, user_id, category, \"limit\"",
            )?
            .query_row(
                (owner.as_i64(), &budget.category, budget.limit),
                map_budget_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                    },
                    _,
                ) => Error::DuplicateBudgetCategory(budget.category.clone()),
                error => error.into(),
            })
    }

    /// Retrieve a budget by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::BudgetNotFound] if `id` does not refer to a budget,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: BudgetId) -> Result<Budget, Error> {
        self.connection()?
            .prepare("SELECT id, user_id, category, \"limit\" FROM budget WHERE id = :id")?
            .query_row(&[(":id", &id)], map_budget_row)
            .map_err(not_found_as_missing_budget)
    }

    /// Retrieve all of `owner`'s budgets, oldest first.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn get_by_owner(&self, owner: UserID) -> Result<Vec<Budget>, Error> {
        let budgets = self
            .connection()?
            .prepare(
                "SELECT id, user_id, category, \"limit\" FROM budget
                 WHERE user_id = :user_id ORDER BY id ASC",
            )?
            .query_map(&[(":user_id", &owner.as_i64())], map_budget_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Change the limit of a budget.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::BudgetNotFound] if `id` does not refer to a budget,
    /// - or [Error::SqlError] there is some other SQL error.
    fn update_limit(&self, id: BudgetId, limit: Money) -> Result<Budget, Error> {
        self.connection()?
            .prepare(
                "UPDATE budget SET \"limit\" = ?1 WHERE id = ?2
                 RETURNING id, user_id, category, \"limit\"",
            )?
            .query_row((limit, id), map_budget_row)
            .map_err(not_found_as_missing_budget)
    }

    /// Delete a budget.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::BudgetNotFound] if `id` does not refer to a budget,
    /// - or [Error::SqlError] there is some other SQL error.
    fn delete(&self, id: BudgetId) -> Result<(), Error> {
        let rows_affected = self
            .connection()?
            .execute("DELETE FROM budget WHERE id = ?1", (id,))?;

        if rows_affected == 0 {
            return Err(Error::BudgetNotFound);
        }

        Ok(())
    }
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                \"limit\" INTEGER NOT NULL CHECK (\"limit\" > 0),
                UNIQUE(user_id, category),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Budget.
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        limit: row.get(3)?,
    })
}

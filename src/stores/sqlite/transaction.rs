//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    stores::{SortOrder, TransactionQuery, TransactionStore},
    transaction::{NewTransaction, Transaction, TransactionId},
};

/// Stores transactions in a SQLite database.
///
/// Because transactions belong to a [User](crate::User), the user table must
/// be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
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

const TRANSACTION_COLUMNS: &str = "id, user_id, description, amount, category, kind, occurred_at";

fn not_found_as_missing_transaction(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
        error => error.into(),
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is an SQL error,
    /// e.g. `owner` is not a registered user.
    fn create(&self, owner: UserID, transaction: NewTransaction) -> Result<Transaction, Error> {
        let created = self
            .connection()?
            .prepare(&format!(
                "INSERT INTO \"transaction\" (user_id, description, amount, category, kind, occurred_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    owner.as_i64(),
                    &transaction.description,
                    transaction.amount,
                    &transaction.category,
                    transaction.kind,
                    transaction.occurred_at.unix_timestamp(),
                ),
                map_transaction_row,
            )?;

        Ok(created)
    }

    /// Retrieve one of `owner`'s transactions by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TransactionNotFound] if `id` does not refer to one of `owner`'s transactions,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, owner: UserID, id: TransactionId) -> Result<Transaction, Error> {
        self.connection()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &owner.as_i64())],
                map_transaction_row,
            )
            .map_err(not_found_as_missing_transaction)
    }

    /// Query for `owner`'s transactions in the database.
    ///
    /// The description search is done after the SQL query so that case is
    /// ignored for non-ASCII text too.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn get_query(
        &self,
        owner: UserID,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"")];
        let mut where_clause_parts = vec!["user_id = ?1".to_owned()];
        let mut query_parameters = vec![Value::Integer(owner.as_i64())];

        if let Some(kind) = query.kind {
            query_parameters.push(Value::Text(kind.as_str().to_owned()));
            where_clause_parts.push(format!("kind = ?{}", query_parameters.len()));
        }

        if let Some(category) = &query.category {
            query_parameters.push(Value::Text(category.clone()));
            where_clause_parts.push(format!("category = ?{}", query_parameters.len()));
        }

        if let Some(occurred_from) = query.occurred_from {
            query_parameters.push(Value::Integer(occurred_from.unix_timestamp()));
            where_clause_parts.push(format!("occurred_at >= ?{}", query_parameters.len()));
        }

        if let Some(occurred_before) = query.occurred_before {
            query_parameters.push(Value::Integer(occurred_before.unix_timestamp()));
            where_clause_parts.push(format!("occurred_at < ?{}", query_parameters.len()));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));

        match query.sort_date {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY occurred_at ASC, id ASC".to_owned())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY occurred_at DESC, id DESC".to_owned())
            }
            None => query_string_parts.push("ORDER BY id ASC".to_owned()),
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        let transactions = self
            .connection()?
            .prepare(&query_string)?
            .query_map(params, map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let Some(search) = query.search.as_deref().map(str::to_lowercase) else {
            return Ok(transactions);
        };

        Ok(transactions
            .into_iter()
            .filter(|transaction| transaction.description.to_lowercase().contains(&search))
            .collect())
    }

    /// Replace the fields of one of `owner`'s transactions.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TransactionNotFound] if `id` does not refer to one of `owner`'s transactions,
    /// - or [Error::SqlError] there is some other SQL error.
    fn update(
        &self,
        owner: UserID,
        id: TransactionId,
        transaction: NewTransaction,
    ) -> Result<Transaction, Error> {
        self.connection()?
            .prepare(&format!(
                "UPDATE \"transaction\"
                    SET description = ?1, amount = ?2, category = ?3, kind = ?4, occurred_at = ?5
                  WHERE id = ?6 AND user_id = ?7
                  RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    &transaction.description,
                    transaction.amount,
                    &transaction.category,
                    transaction.kind,
                    transaction.occurred_at.unix_timestamp(),
                    id,
                    owner.as_i64(),
                ),
                map_transaction_row,
            )
            .map_err(not_found_as_missing_transaction)
    }

    /// Delete one of `owner`'s transactions.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TransactionNotFound] if `id` does not refer to one of `owner`'s transactions,
    /// - or [Error::SqlError] there is some other SQL error.
    fn delete(&self, owner: UserID, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self.connection()?.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, owner.as_i64()),
        )?;

        if rows_affected == 0 {
            return Err(Error::TransactionNotFound);
        }

        Ok(())
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                occurred_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query filters by owner and most sort by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, occurred_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_occurred_at: i64 = row.get(6)?;
    let occurred_at = OffsetDateTime::from_unix_timestamp(raw_occurred_at).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Integer, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        kind: row.get(5)?,
        occurred_at,
    })
}

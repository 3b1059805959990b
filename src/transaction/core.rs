//! Defines the core data models for transactions and how they are validated.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{Error, Money, UserID};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionKind {
    /// The name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub owner_id: UserID,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned. Always positive, [Transaction::kind]
    /// gives the direction.
    pub amount: Money,
    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    pub category: String,
    /// Whether the money was spent or earned.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the transaction happened.
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl Transaction {
    /// Whether the transaction is an expense.
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Whether the transaction is income.
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }
}

/// The validated fields of a transaction that has not been saved yet.
///
/// Use [NewTransaction::new] to create one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub(crate) description: String,
    pub(crate) amount: Money,
    pub(crate) category: String,
    pub(crate) kind: TransactionKind,
    pub(crate) occurred_at: OffsetDateTime,
}

impl NewTransaction {
    /// Validate the fields of a transaction.
    ///
    /// `description` and `category` are trimmed.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::EmptyField] if `description` or `category` is blank,
    /// - [Error::NonPositiveAmount] if `amount` is zero or negative,
    /// - [Error::AmountTooLarge] if `amount` is more than [Money::MAX].
    pub fn new(
        description: &str,
        amount: Money,
        category: &str,
        kind: TransactionKind,
        occurred_at: OffsetDateTime,
    ) -> Result<Self, Error> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::EmptyField("description"));
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        if !amount.is_positive() {
            return Err(Error::NonPositiveAmount);
        }

        if !amount.is_within_max() {
            return Err(Error::AmountTooLarge);
        }

        Ok(Self {
            description: description.to_owned(),
            amount,
            category: category.to_owned(),
            kind,
            occurred_at,
        })
    }

    /// The trimmed description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The trimmed category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The amount of money.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Whether the money was spent or earned.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// When the transaction happened.
    pub fn occurred_at(&self) -> OffsetDateTime {
        self.occurred_at
    }
}

// ============================================================================
// PARSING
// ============================================================================

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a calendar date in the format "YYYY-MM-DD".
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` is not a valid date.
pub fn parse_date(raw: &str) -> Result<Date, Error> {
    Date::parse(raw.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(raw.to_owned()))
}

/// Parse when a transaction happened.
///
/// Accepts either an RFC 3339 date-time, or a plain "YYYY-MM-DD" date which is
/// taken as midnight at `local_offset`.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` is neither.
pub fn parse_occurred_at(raw: &str, local_offset: UtcOffset) -> Result<OffsetDateTime, Error> {
    let raw = raw.trim();

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(date_time);
    }

    parse_date(raw).map(|date| date.midnight().assume_offset(local_offset))
}

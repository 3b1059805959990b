//! Defines the budget model and how budgets are validated.

use serde::Serialize;

use crate::{Error, Money, UserID};

/// Alias for the integer type used for budget IDs.
pub type BudgetId = i64;

/// A spending limit for one category, owned by one user.
///
/// A user has at most one budget per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user the budget belongs to.
    pub owner_id: UserID,
    /// The category of expenses this budget limits.
    pub category: String,
    /// The most the user wants to spend in the category.
    pub limit: Money,
}

impl Budget {
    /// Check that `user_id` owns the budget.
    ///
    /// # Errors
    /// Returns [Error::Forbidden] if the budget belongs to another user.
    pub fn ensure_owned_by(&self, user_id: UserID) -> Result<(), Error> {
        if self.owner_id != user_id {
            tracing::warn!(
                "User {user_id} tried to modify budget {} owned by user {}",
                self.id,
                self.owner_id
            );
            return Err(Error::Forbidden);
        }

        Ok(())
    }
}

/// The validated fields of a budget that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub(crate) category: String,
    pub(crate) limit: Money,
}

impl NewBudget {
    /// Validate the fields of a budget. `category` is trimmed.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::EmptyField] if `category` is blank,
    /// - [Error::NonPositiveLimit] if `limit` is zero or negative,
    /// - [Error::LimitTooLarge] if `limit` is more than [Money::MAX].
    pub fn new(category: &str, limit: Money) -> Result<Self, Error> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        Ok(Self {
            category: category.to_owned(),
            limit: validate_limit(limit)?,
        })
    }

    /// The trimmed category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The spending limit.
    pub fn limit(&self) -> Money {
        self.limit
    }
}

/// Check that a budget limit is positive.
///
/// # Errors
/// Returns [Error::NonPositiveLimit] if `limit` is zero or negative, or
/// [Error::LimitTooLarge] if it is more than [Money::MAX].
pub fn validate_limit(limit: Money) -> Result<Money, Error> {
    if !limit.is_positive() {
        return Err(Error::NonPositiveLimit);
    }

    if !limit.is_within_max() {
        return Err(Error::LimitTooLarge);
    }

    Ok(limit)
}

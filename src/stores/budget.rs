//! Defines the budget store trait.

use std::fmt::Debug;

use crate::{
    Error, Money, UserID,
    budget::{Budget, BudgetId, NewBudget},
};

/// Handles the creation and retrieval of budgets.
pub trait BudgetStore: Debug + Send + Sync {
    /// Create a new budget for `owner`.
    ///
    /// Implementers must return [Error::DuplicateBudgetCategory] if `owner`
    /// already has a budget for the category.
    fn create(&self, owner: UserID, budget: NewBudget) -> Result<Budget, Error>;

    /// Retrieve a budget by its ID regardless of who owns it, so that callers
    /// can tell a missing budget apart from someone else's.
    ///
    /// Implementers must return [Error::BudgetNotFound] if there is no such budget.
    fn get(&self, id: BudgetId) -> Result<Budget, Error>;

    /// Retrieve all of `owner`'s budgets in the order they were created.
    fn get_by_owner(&self, owner: UserID) -> Result<Vec<Budget>, Error>;

    /// Change the limit of a budget.
    fn update_limit(&self, id: BudgetId, limit: Money) -> Result<Budget, Error>;

    /// Delete a budget.
    fn delete(&self, id: BudgetId) -> Result<(), Error>;
}

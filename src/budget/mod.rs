//! Budgets: per-category spending limits and the endpoints that manage them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{Budget, BudgetId, NewBudget, validate_limit};
pub use create_endpoint::{BudgetData, CreateBudgetState, create_budget_endpoint};
pub use delete_endpoint::{DeleteBudgetState, delete_budget_endpoint};
pub use edit_endpoint::{BudgetLimitData, EditBudgetState, edit_budget_endpoint};
pub use list_endpoint::{
    BudgetListQuery, ListBudgetsState, get_budget_summary, get_budgets_endpoint, load_budget_views,
};

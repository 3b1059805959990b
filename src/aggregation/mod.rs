//! Pure functions that turn a user's transactions and budgets into the
//! numbers shown on the dashboard, budget and profile pages.
//!
//! Nothing in here touches the database or the clock. Callers pass in a
//! snapshot of the user's data and, where needed, the current time.

mod budget;
mod dashboard;
mod monthly;

pub use budget::{BudgetStatus, BudgetSummary, BudgetView, compute_budget_views, summarize_budgets};
pub use dashboard::{
    CategorySpending, DashboardSummary, NO_TOP_CATEGORY, RECENT_TRANSACTION_COUNT,
    TOP_BUDGET_COUNT, UPCOMING_BILL_COUNT, compute_dashboard_summary,
};
pub use monthly::{MONTH_COUNT, MonthBucket, bucket_by_month, month_label, trailing_months};

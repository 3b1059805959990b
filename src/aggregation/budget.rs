//! Budget progress: how much of each budget has been spent.

use serde::Serialize;

use crate::{
    Money, Percentage,
    budget::Budget,
    transaction::{Transaction, TransactionKind},
};

/// A budget together with how much has been spent against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    /// The budget.
    #[serde(flatten)]
    pub budget: Budget,
    /// The sum of the owner's expenses in the budget's category.
    pub spent: Money,
    /// `spent` as a percentage of the budget's limit. Not capped at 100%.
    /// Zero when the limit is not positive.
    pub progress: Percentage,
}

/// Where a budget stands relative to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Less than the limit has been spent.
    Active,
    /// Exactly the limit has been spent, judged on the rounded progress.
    Completed,
    /// More than the limit has been spent.
    Exceeded,
}

impl BudgetView {
    /// Where the budget stands, or `None` if the budget has no positive limit
    /// and so no meaningful progress.
    ///
    /// The status follows the rounded `progress` clients see, so 99.996%
    /// counts as [BudgetStatus::Completed].
    pub fn status(&self) -> Option<BudgetStatus> {
        if !self.budget.limit.is_positive() {
            return None;
        }

        let status = match self.progress.cmp(&Percentage::ONE_HUNDRED) {
            std::cmp::Ordering::Less => BudgetStatus::Active,
            std::cmp::Ordering::Equal => BudgetStatus::Completed,
            std::cmp::Ordering::Greater => BudgetStatus::Exceeded,
        };

        Some(status)
    }

    /// Whether the budget still has room left, compared exactly in cents.
    /// Budgets without a positive limit are never active.
    pub fn is_active(&self) -> bool {
        self.budget.limit.is_positive() && self.spent < self.budget.limit
    }
}

/// Compute how much has been spent against each budget.
///
/// A transaction counts towards a budget if it is an expense and its category
/// is exactly the budget's category (case-sensitive). Income in
/// `transactions` is ignored. Views are returned in the order of `budgets`.
pub fn compute_budget_views(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetView> {
    budgets
        .iter()
        .map(|budget| {
            let spent: Money = transactions
                .iter()
                .filter(|transaction| {
                    transaction.kind == TransactionKind::Expense
                        && transaction.category == budget.category
                })
                .map(|transaction| transaction.amount)
                .sum();

            let progress = Percentage::of(spent, budget.limit).unwrap_or(Percentage::ZERO);

            BudgetView {
                budget: budget.clone(),
                spent,
                progress,
            }
        })
        .collect()
}

/// Totals across all of a user's budgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    /// How many budgets the user has.
    pub budget_count: usize,
    /// How many budgets still have room left.
    pub active_budgets: usize,
    /// The sum of all budget limits.
    pub total_limit: Money,
    /// The sum of spending across all budgets.
    pub total_spent: Money,
    /// `total_limit` minus `total_spent`. Negative when over budget overall.
    pub remaining: Money,
}

/// Summarise budget views for the summary cards.
pub fn summarize_budgets(views: &[BudgetView]) -> BudgetSummary {
    let total_limit: Money = views.iter().map(|view| view.budget.limit).sum();
    let total_spent: Money = views.iter().map(|view| view.spent).sum();

    BudgetSummary {
        budget_count: views.len(),
        active_budgets: views.iter().filter(|view| view.is_active()).count(),
        total_limit,
        total_spent,
        remaining: total_limit - total_spent,
    }
}

//! Computes the dashboard summary from a user's transactions and budgets.

use serde::{Serialize, Serializer, ser::SerializeMap};
use time::OffsetDateTime;

use crate::{
    Money,
    aggregation::{
        budget::{BudgetView, compute_budget_views},
        monthly::{MonthBucket, bucket_by_month},
    },
    budget::Budget,
    transaction::{Transaction, TransactionKind},
};

/// The category reported as the top category when there are no expenses.
pub const NO_TOP_CATEGORY: &str = "N/A";

/// How many budgets are shown on the dashboard.
pub const TOP_BUDGET_COUNT: usize = 3;

/// How many of the latest transactions are shown on the dashboard.
pub const RECENT_TRANSACTION_COUNT: usize = 5;

/// How many bills are shown on the dashboard.
pub const UPCOMING_BILL_COUNT: usize = 3;

/// Expenses summed per category, in the order each category was first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySpending(Vec<(String, Money)>);

impl CategorySpending {
    /// Sum the amounts of `expenses` per category.
    fn from_expenses<'a>(expenses: impl Iterator<Item = &'a Transaction>) -> Self {
        let mut totals: Vec<(String, Money)> = Vec::new();

        for expense in expenses {
            match totals
                .iter_mut()
                .find(|(category, _)| *category == expense.category)
            {
                Some((_, total)) => *total += expense.amount,
                None => totals.push((expense.category.clone(), expense.amount)),
            }
        }

        Self(totals)
    }

    /// The categories and their totals in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.0.iter().map(|(category, total)| (category.as_str(), *total))
    }

    /// Whether there are no expenses at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The category with the highest total. On a tie the category seen first wins.
    pub fn top_category(&self) -> Option<&str> {
        let mut top: Option<(&str, Money)> = None;

        for (category, total) in self.iter() {
            match top {
                Some((_, top_total)) if total <= top_total => {}
                _ => top = Some((category, total)),
            }
        }

        top.map(|(category, _)| category)
    }
}

impl Serialize for CategorySpending {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, total) in &self.0 {
            map.serialize_entry(category, total)?;
        }
        map.end()
    }
}

/// Everything shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// The sum of all income.
    pub total_income: Money,
    /// The sum of all expenses.
    pub total_expenses: Money,
    /// Income minus expenses. May be negative.
    pub total_balance: Money,
    /// The category with the most spending, or [NO_TOP_CATEGORY].
    pub top_category: String,
    /// Expenses per category.
    pub category_spending: CategorySpending,
    /// Income and expenses for the last six calendar months, oldest first.
    pub monthly_data: Vec<MonthBucket>,
    /// The budgets with the highest progress.
    pub top_budgets: Vec<BudgetView>,
    /// The latest transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
    /// Expenses whose description mentions "bill".
    ///
    /// There is no due date on transactions, so these are not really upcoming,
    /// just bills that have been recorded.
    pub upcoming_bills: Vec<Transaction>,
}

/// Compute the dashboard summary from a snapshot of a user's data.
///
/// `now` sets the monthly window and the offset used to decide which month a
/// transaction falls in. `transactions` may be in any order.
pub fn compute_dashboard_summary(
    transactions: &[Transaction],
    budgets: &[Budget],
    now: OffsetDateTime,
) -> DashboardSummary {
    let expenses: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .cloned()
        .collect();

    let total_income: Money = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Income)
        .map(|transaction| transaction.amount)
        .sum();
    let total_expenses: Money = expenses.iter().map(|expense| expense.amount).sum();

    let category_spending = CategorySpending::from_expenses(expenses.iter());
    let top_category = category_spending
        .top_category()
        .unwrap_or(NO_TOP_CATEGORY)
        .to_owned();

    let mut top_budgets = compute_budget_views(budgets, &expenses);
    // Stable sort so that budgets with equal progress keep their original order.
    top_budgets.sort_by(|a, b| b.progress.cmp(&a.progress));
    top_budgets.truncate(TOP_BUDGET_COUNT);

    let mut recent_transactions = transactions.to_vec();
    recent_transactions.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    recent_transactions.truncate(RECENT_TRANSACTION_COUNT);

    let upcoming_bills = transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionKind::Expense && is_bill(&transaction.description)
        })
        .take(UPCOMING_BILL_COUNT)
        .cloned()
        .collect();

    DashboardSummary {
        total_income,
        total_expenses,
        total_balance: total_income - total_expenses,
        top_category,
        category_spending,
        monthly_data: bucket_by_month(transactions, now),
        top_budgets,
        recent_transactions,
        upcoming_bills,
    }
}

fn is_bill(description: &str) -> bool {
    description.to_lowercase().contains("bill")
}

#[cfg(test)]
mod dashboard_tests {
    use time::{
        OffsetDateTime,
        macros::{datetime, offset},
    };

    use crate::{
        Money, Percentage, UserID,
        aggregation::{
            NO_TOP_CATEGORY, compute_dashboard_summary,
            monthly::MONTH_COUNT,
        },
        budget::Budget,
        transaction::{Transaction, TransactionKind},
    };

    fn transaction(
        id: i64,
        kind: TransactionKind,
        description: &str,
        category: &str,
        amount_cents: i64,
        occurred_at: OffsetDateTime,
    ) -> Transaction {
        Transaction {
            id,
            owner_id: UserID::new(1),
            description: description.to_owned(),
            amount: Money::from_cents(amount_cents),
            category: category.to_owned(),
            kind,
            occurred_at,
        }
    }

    fn expense(id: i64, category: &str, amount_cents: i64) -> Transaction {
        transaction(
            id,
            TransactionKind::Expense,
            &format!("expense {id}"),
            category,
            amount_cents,
            datetime!(2024-03-05 12:00 UTC),
        )
    }

    fn budget(id: i64, category: &str, limit_cents: i64) -> Budget {
        Budget {
            id,
            owner_id: UserID::new(1),
            category: category.to_owned(),
            limit: Money::from_cents(limit_cents),
        }
    }

    fn food_example() -> Vec<Transaction> {
        vec![
            transaction(
                1,
                TransactionKind::Expense,
                "Groceries",
                "Food",
                120_00,
                datetime!(2024-03-05 00:00 UTC),
            ),
            transaction(
                2,
                TransactionKind::Expense,
                "Takeaways",
                "Food",
                30_00,
                datetime!(2024-03-20 00:00 UTC),
            ),
            transaction(
                3,
                TransactionKind::Income,
                "Salary",
                "Salary",
                1000_00,
                datetime!(2024-03-01 00:00 UTC),
            ),
        ]
    }

    #[test]
    fn empty_snapshot_gives_zero_summary() {
        let summary = compute_dashboard_summary(&[], &[], datetime!(2024-03-15 12:00 UTC));

        assert_eq!(summary.total_income, Money::ZERO);
        assert_eq!(summary.total_expenses, Money::ZERO);
        assert_eq!(summary.total_balance, Money::ZERO);
        assert_eq!(summary.top_category, NO_TOP_CATEGORY);
        assert!(summary.category_spending.is_empty());
        assert_eq!(summary.monthly_data.len(), MONTH_COUNT);
        assert!(
            summary
                .monthly_data
                .iter()
                .all(|bucket| bucket.income == Money::ZERO && bucket.expenses == Money::ZERO)
        );
        assert!(summary.top_budgets.is_empty());
        assert!(summary.recent_transactions.is_empty());
        assert!(summary.upcoming_bills.is_empty());
    }

    #[test]
    fn food_example_totals() {
        let summary = compute_dashboard_summary(
            &food_example(),
            &[budget(1, "Food", 100_00)],
            datetime!(2024-03-15 12:00 UTC),
        );

        assert_eq!(summary.total_income, Money::from_cents(1000_00));
        assert_eq!(summary.total_expenses, Money::from_cents(150_00));
        assert_eq!(summary.total_balance, Money::from_cents(850_00));
        assert_eq!(summary.top_category, "Food");
        assert_eq!(
            summary.category_spending.iter().collect::<Vec<_>>(),
            [("Food", Money::from_cents(150_00))]
        );
        assert_eq!(summary.top_budgets.len(), 1);
        assert_eq!(summary.top_budgets[0].spent, Money::from_cents(150_00));
        assert_eq!(
            summary.top_budgets[0].progress,
            Percentage::from_hundredths(150_00)
        );
        assert_eq!(summary.monthly_data[5].label, "Mar");
        assert_eq!(summary.monthly_data[5].income, Money::from_cents(1000_00));
        assert_eq!(summary.monthly_data[5].expenses, Money::from_cents(150_00));
    }

    #[test]
    fn balance_can_be_negative() {
        let summary = compute_dashboard_summary(
            &[expense(1, "Rent", 500_00)],
            &[],
            datetime!(2024-03-15 12:00 UTC),
        );

        assert_eq!(summary.total_balance, Money::from_cents(-500_00));
    }

    #[test]
    fn category_spending_keeps_first_seen_order() {
        let transactions = vec![
            expense(1, "Rent", 10_00),
            expense(2, "Food", 20_00),
            expense(3, "Rent", 15_00),
            expense(4, "Fun", 5_00),
        ];

        let summary =
            compute_dashboard_summary(&transactions, &[], datetime!(2024-03-15 12:00 UTC));

        let totals: Vec<_> = summary.category_spending.iter().collect();
        assert_eq!(
            totals,
            [
                ("Rent", Money::from_cents(25_00)),
                ("Food", Money::from_cents(20_00)),
                ("Fun", Money::from_cents(5_00)),
            ]
        );
        assert_eq!(summary.top_category, "Rent");
    }

    #[test]
    fn huge_amounts_do_not_overflow_totals() {
        let transactions = vec![
            expense(1, "Property", 5_000_000_000_000_000_000),
            expense(2, "Property", 5_000_000_000_000_000_000),
        ];

        let summary =
            compute_dashboard_summary(&transactions, &[], datetime!(2024-03-15 12:00 UTC));

        assert_eq!(summary.total_expenses, Money::from_cents(i64::MAX));
        assert_eq!(summary.total_balance, Money::from_cents(-i64::MAX));
        assert_eq!(summary.top_category, "Property");
    }

    #[test]
    fn top_category_tie_goes_to_first_seen() {
        let transactions = vec![
            expense(1, "Food", 20_00),
            expense(2, "Rent", 20_00),
        ];

        let summary =
            compute_dashboard_summary(&transactions, &[], datetime!(2024-03-15 12:00 UTC));

        assert_eq!(summary.top_category, "Food");
    }

    #[test]
    fn income_only_has_no_top_category() {
        let transactions = vec![transaction(
            1,
            TransactionKind::Income,
            "Salary",
            "Work",
            100_00,
            datetime!(2024-03-01 00:00 UTC),
        )];

        let summary =
            compute_dashboard_summary(&transactions, &[], datetime!(2024-03-15 12:00 UTC));

        assert_eq!(summary.top_category, NO_TOP_CATEGORY);
    }

    #[test]
    fn category_spending_serializes_as_ordered_object() {
        let transactions = vec![expense(1, "Rent", 10_00), expense(2, "Food", 20_50)];

        let summary =
            compute_dashboard_summary(&transactions, &[], datetime!(2024-03-15 12:00 UTC));

        assert_eq!(
            serde_json::to_string(&summary.category_spending).unwrap(),
            r#"{"Rent":10.0,"Food":20.5}"#
        );
    }

    #[test]
    fn top_budgets_sorted_by_progress_with_stable_ties() {
        let budgets = vec![
            budget(1, "A", 100_00),
            budget(2, "B", 100_00),
            budget(3, "C", 100_00),
            budget(4, "D", 100_00),
            budget(5, "E", 100_00),
        ];
        let transactions = vec![
            expense(1, "A", 10_00),
            expense(2, "B", 50_00),
            expense(3, "C", 200_00),
            expense(4, "D", 50_00),
            expense(5, "E", 5_00),
        ];

        let summary =
            compute_dashboard_summary(&transactions, &budgets, datetime!(2024-03-15 12:00 UTC));

        let ids: Vec<_> = summary
            .top_budgets
            .iter()
            .map(|view| view.budget.id)
            .collect();
        assert_eq!(ids, [3, 2, 4]);
        // Progress is not capped in the output.
        assert_eq!(
            summary.top_budgets[0].progress,
            Percentage::from_hundredths(200_00)
        );
    }

    #[test]
    fn recent_transactions_sorted_newest_first_regardless_of_input_order() {
        let transactions: Vec<_> = [3, 7, 1, 5, 2, 6, 4]
            .into_iter()
            .map(|day| {
                transaction(
                    day,
                    TransactionKind::Expense,
                    "thing",
                    "Misc",
                    1_00,
                    datetime!(2024-03-01 00:00 UTC) + time::Duration::days(day),
                )
            })
            .collect();

        let summary =
            compute_dashboard_summary(&transactions, &[], datetime!(2024-03-15 12:00 UTC));

        let ids: Vec<_> = summary
            .recent_transactions
            .iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids, [7, 6, 5, 4, 3]);
    }

    #[test]
    fn upcoming_bills_are_expenses_mentioning_bill_in_input_order() {
        let at = datetime!(2024-03-05 00:00 UTC);
        let transactions = vec![
            transaction(1, TransactionKind::Expense, "Phone BILL", "Utilities", 1_00, at),
            transaction(2, TransactionKind::Income, "Bill refund", "Utilities", 1_00, at),
            transaction(3, TransactionKind::Expense, "Groceries", "Food", 1_00, at),
            transaction(4, TransactionKind::Expense, "Power bill", "Utilities", 1_00, at),
            transaction(5, TransactionKind::Expense, "Billiards", "Fun", 1_00, at),
            transaction(6, TransactionKind::Expense, "Water bill", "Utilities", 1_00, at),
        ];

        let summary = compute_dashboard_summary(&transactions, &[], at);

        let ids: Vec<_> = summary.upcoming_bills.iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 4, 5]);
    }

    #[test]
    fn summary_is_idempotent() {
        let transactions = food_example();
        let budgets = vec![budget(1, "Food", 100_00), budget(2, "Rent", 900_00)];
        let now = datetime!(2024-03-15 12:00 +13:00);

        let first = compute_dashboard_summary(&transactions, &budgets, now);
        let second = compute_dashboard_summary(&transactions, &budgets, now);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn now_offset_decides_current_month() {
        let transactions = vec![transaction(
            1,
            TransactionKind::Income,
            "Salary",
            "Work",
            100_00,
            datetime!(2024-02-29 20:00 UTC),
        )];
        let now = datetime!(2024-03-02 12:00 UTC).to_offset(offset!(+13:00));

        let summary = compute_dashboard_summary(&transactions, &[], now);

        assert_eq!(summary.monthly_data[5].income, Money::from_cents(100_00));
    }

    #[test]
    fn serializes_camel_case_fields() {
        let summary = compute_dashboard_summary(
            &food_example(),
            &[budget(1, "Food", 100_00)],
            datetime!(2024-03-15 12:00 UTC),
        );

        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["totalIncome"], serde_json::json!(1000.0));
        assert_eq!(json["totalExpenses"], serde_json::json!(150.0));
        assert_eq!(json["totalBalance"], serde_json::json!(850.0));
        assert_eq!(json["topCategory"], serde_json::json!("Food"));
        assert_eq!(json["categorySpending"], serde_json::json!({"Food": 150.0}));
        assert_eq!(json["monthlyData"].as_array().unwrap().len(), 6);
        assert_eq!(json["topBudgets"][0]["progress"], serde_json::json!(150.0));
        assert_eq!(
            json["recentTransactions"][0]["date"],
            serde_json::json!("2024-03-20T00:00:00Z")
        );
        assert_eq!(
            json["recentTransactions"][0]["type"],
            serde_json::json!("expense")
        );
    }
}

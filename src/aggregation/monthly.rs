//! Buckets transactions into trailing calendar months.

use serde::Serialize;
use time::{Month, OffsetDateTime};

use crate::{
    Money,
    transaction::{Transaction, TransactionKind},
};

/// The number of months shown in the monthly overview, including the current month.
pub const MONTH_COUNT: usize = 6;

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    /// Three-letter month name, e.g. "Mar".
    #[serde(rename = "month")]
    pub label: String,
    /// The calendar year of the month.
    #[serde(skip)]
    pub year: i32,
    /// The calendar month.
    #[serde(skip)]
    pub month: Month,
    /// Total income in the month.
    pub income: Money,
    /// Total expenses in the month.
    pub expenses: Money,
}

/// Formats a month as a three-letter abbreviation, e.g. "Jan".
pub fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// The `count` calendar months ending with the month of `now`, oldest first.
///
/// Steps back month by month so that January rolls over to December of the
/// previous year.
pub fn trailing_months(now: OffsetDateTime, count: usize) -> Vec<(i32, Month)> {
    let mut months = Vec::with_capacity(count);
    let (mut year, mut month) = (now.year(), now.month());

    for _ in 0..count {
        months.push((year, month));

        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    months.reverse();
    months
}

/// Sum income and expenses per calendar month for the [MONTH_COUNT] months
/// ending with the month of `now`, oldest first.
///
/// A transaction belongs to a month if its date, seen in the offset of `now`,
/// is in that calendar month. Transactions outside the window are ignored.
pub fn bucket_by_month(transactions: &[Transaction], now: OffsetDateTime) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = trailing_months(now, MONTH_COUNT)
        .into_iter()
        .map(|(year, month)| MonthBucket {
            label: month_label(month).to_owned(),
            year,
            month,
            income: Money::ZERO,
            expenses: Money::ZERO,
        })
        .collect();

    for transaction in transactions {
        let Some(local) = transaction.occurred_at.checked_to_offset(now.offset()) else {
            continue;
        };

        let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| bucket.year == local.year() && bucket.month == local.month())
        else {
            continue;
        };

        match transaction.kind {
            TransactionKind::Income => bucket.income += transaction.amount,
            TransactionKind::Expense => bucket.expenses += transaction.amount,
        }
    }

    buckets
}

//! Turns the transactions of a month into the per-category breakdown shown on the home screen.
//!
//! Everything here is pure. Grouping goes through a `BTreeMap` keyed by category so the output
//! never depends on the order the transactions arrive in.

use crate::model::{
    local_date, CategoryEnum, CategoryMonthDetail, FinanceEnum, FinanceScreenExpense,
    FinanceScreenModel, Transaction,
};
use chrono::Datelike;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Builds the home screen model for the given transactions. Callers pass the transactions of one
/// month; expenses and incomes are split by `kind`.
pub fn aggregate<'a, I>(transactions: I) -> FinanceScreenModel
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (expenses, income): (Vec<&Transaction>, Vec<&Transaction>) = transactions
        .into_iter()
        .partition(|t| t.kind == FinanceEnum::Expense);
    let (expense_amount, expenses) = breakdown(expenses);
    let (income_amount, income) = breakdown(income);
    FinanceScreenModel {
        expense_amount,
        income_amount,
        expenses,
        income,
    }
}

/// Groups `transactions` by category and returns the total together with one row per category,
/// sorted by descending amount with ties broken by category declaration order.
pub fn breakdown<'a, I>(transactions: I) -> (i64, Vec<FinanceScreenExpense>)
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut groups: BTreeMap<CategoryEnum, (i64, u32)> = BTreeMap::new();
    for t in transactions {
        let (amount, count) = groups.entry(t.category).or_default();
        *amount += t.amount;
        *count += 1;
    }

    let total: i64 = groups.values().map(|(amount, _)| amount).sum();
    let mut rows: Vec<FinanceScreenExpense> = groups
        .into_iter()
        .map(|(category, (amount, count))| FinanceScreenExpense {
            category,
            amount,
            percentage: percentage(amount, total),
            count,
        })
        .collect();
    rows.sort_by_key(|row| (Reverse(row.amount), row.category));
    (total, rows)
}

/// `round(100 * amount / total)` with halves rounded up, clamped to `0..=100`. A zero total gives
/// zero.
pub fn percentage(amount: i64, total: i64) -> u8 {
    if total == 0 {
        return 0;
    }
    let amount = i128::from(amount);
    let total = i128::from(total);
    // floor((200a + t) / 2t) == round_half_up(100a / t) for a positive total
    let (amount, total) = if total < 0 {
        (-amount, -total)
    } else {
        (amount, total)
    };
    let rounded = (200 * amount + total).div_euclid(2 * total);
    rounded.clamp(0, 100) as u8
}

/// Collects the expenses of `category` in `month_key`: newest first, with a per-day total.
pub fn category_month_detail<'a, I>(
    category: CategoryEnum,
    month_key: &str,
    transactions: I,
) -> CategoryMonthDetail
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut matching: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| t.is_expense() && t.category == category && t.month_key == month_key)
        .cloned()
        .collect();
    matching.sort_by_key(|t| (Reverse(t.occurred_at_millis), Reverse(t.id)));

    let mut daily: BTreeMap<u32, i64> = BTreeMap::new();
    for t in &matching {
        if let Some(date) = local_date(t.occurred_at_millis) {
            *daily.entry(date.day()).or_default() += t.amount;
        }
    }

    CategoryMonthDetail {
        category,
        month_key: month_key.to_string(),
        month_amount: matching.iter().map(|t| t.amount).sum(),
        transactions: matching,
        daily: daily.into_iter().collect(),
    }
}

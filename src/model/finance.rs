use crate::model::{CategoryEnum, Money, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a month's breakdown: everything spent (or earned) in a single category.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FinanceScreenExpense {
    pub category: CategoryEnum,
    /// Amount in minor units.
    pub amount: i64,
    /// Share of the month total, rounded half-up to a whole percent.
    pub percentage: u8,
    pub count: u32,
}

impl FinanceScreenExpense {
    pub fn money(&self) -> Money {
        Money::from_minor_units(self.amount)
    }
}

/// What the home screen shows for a month. Recomputed on every load and never persisted.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FinanceScreenModel {
    pub expense_amount: i64,
    pub income_amount: i64,
    pub expenses: Vec<FinanceScreenExpense>,
    pub income: Vec<FinanceScreenExpense>,
}

impl FinanceScreenModel {
    /// Income minus expenses, in minor units.
    pub fn balance(&self) -> i64 {
        self.income_amount - self.expense_amount
    }
}

/// The expenses of one category within one month.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryMonthDetail {
    pub category: CategoryEnum,
    pub month_key: String,
    /// Sum of `transactions`, in minor units.
    pub month_amount: i64,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    /// `(day of month, amount)` pairs, ascending by day, only for days with spending.
    pub daily: Vec<(u32, i64)>,
}

/// Months that have data, grouped by year. Each year's months are ascending and are represented
/// by the first day of the month.
pub type Months = BTreeMap<i32, Vec<NaiveDate>>;

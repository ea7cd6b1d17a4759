use crate::model::{month_key_from_millis, CategoryEnum, Money};
use serde::{Deserialize, Serialize};

/// Whether a transaction is money going out or money coming in. A transaction is one or the
/// other, never both.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinanceEnum {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(FinanceEnum);
serde_plain::derive_fromstr_from_deserialize!(FinanceEnum);

impl FinanceEnum {
    /// The category a blank form of this kind starts out with.
    pub fn default_category(&self) -> CategoryEnum {
        match self {
            FinanceEnum::Expense => CategoryEnum::Food,
            FinanceEnum::Income => CategoryEnum::Work,
        }
    }
}

/// A single recorded income or expense. Owned by the repository; the core only reads it.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub id: i64,
    /// Amount in minor units.
    pub amount: i64,
    pub category: CategoryEnum,
    pub note: String,
    pub occurred_at_millis: i64,
    /// The `MMYYYY` month this transaction is filed under.
    pub month_key: String,
    pub kind: FinanceEnum,
}

impl Transaction {
    /// Creates a transaction and files it under the local month of `occurred_at_millis`.
    pub fn new(
        id: i64,
        kind: FinanceEnum,
        amount: i64,
        category: CategoryEnum,
        note: impl Into<String>,
        occurred_at_millis: i64,
    ) -> Self {
        Self {
            id,
            amount,
            category,
            note: note.into(),
            occurred_at_millis,
            month_key: month_key_from_millis(occurred_at_millis),
            kind,
        }
    }

    pub fn money(&self) -> Money {
        Money::from_minor_units(self.amount)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == FinanceEnum::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == FinanceEnum::Income
    }
}

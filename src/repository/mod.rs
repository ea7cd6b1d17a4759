//! The persistence boundary. The core only ever talks to a `FinanceRepository`; what sits behind
//! it (a database, a file, memory) is not its concern.

mod memory;

use crate::model::{CategoryEnum, FinanceEnum, Transaction};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use memory::InMemoryRepository;

/// What an edit screen hands to the repository when the user saves.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EditParams {
    /// Amount in minor units.
    pub amount: i64,
    pub note: String,
    pub date_in_millis: i64,
    /// `0` creates a new record, anything else updates the record with that id.
    pub id: i64,
    pub category: CategoryEnum,
}

/// Identifies the record to delete.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeleteParams {
    pub kind: FinanceEnum,
    pub id: i64,
    pub month_key: String,
}

/// Source and sink of transactions.
///
/// Implementations must be cheap to share behind an `Arc`; every screen container holds one.
#[async_trait::async_trait]
pub trait FinanceRepository: Send + Sync {
    /// Subscribes to the transactions of `month_key`. The current set is sent immediately and the
    /// full set is sent again after every change. The subscription ends when the receiver is
    /// dropped.
    fn observe_month(&self, month_key: &str) -> mpsc::Receiver<Result<Vec<Transaction>>>;

    /// Returns the first day of every month that has at least one transaction.
    async fn months(&self) -> Result<Vec<NaiveDate>>;

    /// Fetches one record of the given kind.
    async fn get(&self, kind: FinanceEnum, id: i64) -> Result<Transaction>;

    /// Creates (`params.id == 0`) or updates a record of the given kind.
    async fn edit(&self, kind: FinanceEnum, params: EditParams) -> Result<()>;

    async fn delete(&self, params: DeleteParams) -> Result<()>;
}

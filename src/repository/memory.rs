//! Implements the `FinanceRepository` trait using in-memory data, optionally mirrored to a JSON
//! file.
//!
//! Note: this is compiled in the "production" version of this app so that the whole app can run,
//! top-to-bottom, without a database.

use crate::model::{
    local_noon_millis, month_key_from_millis, parse_month_key, CategoryEnum, FinanceEnum,
    Transaction,
};
use crate::repository::{DeleteParams, EditParams, FinanceRepository};
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, trace, warn};

/// Buffer for each month subscription.
const SUBSCRIPTION_BUFFER: usize = 4;

/// The serialized form of everything the repository holds.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct Store {
    /// The highest id handed out so far.
    last_id: i64,
    transactions: Vec<Transaction>,
}

impl Store {
    fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let last_id = transactions.iter().map(|t| t.id).max().unwrap_or_default();
        Self {
            last_id,
            transactions,
        }
    }

    fn position(&self, kind: FinanceEnum, id: i64) -> Option<usize> {
        self.transactions
            .iter()
            .position(|t| t.kind == kind && t.id == id)
    }
}

struct Inner {
    store: Mutex<Store>,
    /// Bumped after every mutation; month subscriptions watch it.
    revision: watch::Sender<u64>,
    /// When set, every mutation is written back to this JSON file.
    path: Option<PathBuf>,
}

/// An implementation of the `FinanceRepository` trait that holds its data in memory and, when
/// opened from a file, writes every change back to that file.
#[derive(Clone)]
pub struct InMemoryRepository {
    inner: Arc<Inner>,
}

impl InMemoryRepository {
    /// Create a new repository holding `transactions`, not backed by any file.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self::from_store(Store::from_transactions(transactions), None)
    }

    fn from_store(store: Store, path: Option<PathBuf>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                revision,
                path,
            }),
        }
    }

    /// Opens the JSON data file at `path`. A missing file is created and filled with the seed
    /// data from this module.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = if path.is_file() {
            debug!("Loading transactions from {}", path.display());
            utils::deserialize::<Store>(&path).await?
        } else {
            debug!("Seeding a new data file at {}", path.display());
            let store = Store::from_transactions(seed_transactions()?);
            save(&path, &store).await?;
            store
        };
        Ok(Self::from_store(store, Some(path)))
    }

    /// Writes the seed data from this module to `path`, replacing whatever is there.
    pub async fn seed_file(path: &Path) -> Result<()> {
        save(path, &Store::from_transactions(seed_transactions()?)).await
    }

    /// Returns a snapshot of every transaction held.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.inner.store.lock().await.transactions.clone()
    }

    async fn month(&self, month_key: &str) -> Vec<Transaction> {
        self.inner
            .store
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| t.month_key == month_key)
            .cloned()
            .collect()
    }

    /// Persists `next` if file backed, then swaps it in and wakes every month subscription. A
    /// failed write leaves `store` untouched.
    async fn commit(&self, store: &mut Store, next: Store) -> Result<()> {
        if let Some(path) = &self.inner.path {
            save(path, &next).await?;
        }
        *store = next;
        self.inner.revision.send_modify(|r| *r += 1);
        Ok(())
    }
}

impl Default for InMemoryRepository {
    /// Loads seed data from this module.
    fn default() -> Self {
        let transactions = seed_transactions().unwrap_or_else(|e| {
            warn!("Unable to load seed data: {e:#}");
            Vec::new()
        });
        Self::new(transactions)
    }
}

#[async_trait::async_trait]
impl FinanceRepository for InMemoryRepository {
    fn observe_month(&self, month_key: &str) -> mpsc::Receiver<Result<Vec<Transaction>>> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let repo = self.clone();
        let month_key = month_key.to_string();
        let mut revisions = self.inner.revision.subscribe();
        tokio::spawn(async move {
            loop {
                let revision = *revisions.borrow_and_update();
                trace!("Sending month {month_key} at revision {revision}");
                let snapshot = repo.month(&month_key).await;
                if tx.send(Ok(snapshot)).await.is_err() {
                    return;
                }
                tokio::select! {
                    _ = tx.closed() => return,
                    changed = revisions.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        rx
    }

    async fn months(&self) -> Result<Vec<NaiveDate>> {
        let store = self.inner.store.lock().await;
        let mut months = BTreeSet::new();
        for t in &store.transactions {
            match parse_month_key(&t.month_key) {
                Ok(date) => {
                    months.insert(date);
                }
                Err(e) => warn!("Skipping transaction {} with a bad month key: {e:#}", t.id),
            }
        }
        Ok(months.into_iter().collect())
    }

    async fn get(&self, kind: FinanceEnum, id: i64) -> Result<Transaction> {
        let store = self.inner.store.lock().await;
        store
            .position(kind, id)
            .map(|ix| store.transactions[ix].clone())
            .with_context(|| format!("No {kind} with id {id} was found"))
    }

    async fn edit(&self, kind: FinanceEnum, params: EditParams) -> Result<()> {
        let mut store = self.inner.store.lock().await;
        let mut next = store.clone();
        if params.id == 0 {
            next.last_id += 1;
            let id = next.last_id;
            debug!("Creating {kind} {id}");
            next.transactions.push(Transaction::new(
                id,
                kind,
                params.amount,
                params.category,
                params.note,
                params.date_in_millis,
            ));
        } else {
            let ix = match next.position(kind, params.id) {
                Some(ix) => ix,
                None => bail!("Unable to update {kind} {}: it does not exist", params.id),
            };
            debug!("Updating {kind} {}", params.id);
            let t = &mut next.transactions[ix];
            t.amount = params.amount;
            t.note = params.note;
            t.category = params.category;
            t.occurred_at_millis = params.date_in_millis;
            t.month_key = month_key_from_millis(params.date_in_millis);
        }
        self.commit(&mut store, next).await
    }

    async fn delete(&self, params: DeleteParams) -> Result<()> {
        let mut store = self.inner.store.lock().await;
        let mut next = store.clone();
        let ix = match next.position(params.kind, params.id) {
            Some(ix) => ix,
            None => bail!("Unable to delete {} {}: it does not exist", params.kind, params.id),
        };
        let removed = next.transactions.remove(ix);
        if removed.month_key != params.month_key {
            warn!(
                "Deleted {} {} was filed under {}, not {}",
                params.kind, params.id, removed.month_key, params.month_key
            );
        }
        debug!("Deleted {} {}", params.kind, params.id);
        self.commit(&mut store, next).await
    }
}

async fn save(path: &Path, store: &Store) -> Result<()> {
    let json = serde_json::to_string_pretty(store).context("Failed to serialize transactions")?;
    utils::write(path, json).await
}

/// One row of the seed CSV.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SeedRow {
    kind: FinanceEnum,
    date: NaiveDate,
    amount: i64,
    category: CategoryEnum,
    note: String,
}

/// Parses the seed CSV into transactions with ids assigned in row order.
fn seed_transactions() -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(SEED_DATA.as_bytes()));

    let mut transactions = Vec::new();
    for (ix, result) in rdr.deserialize::<SeedRow>().enumerate() {
        let row = result.with_context(|| format!("Bad seed row {}", ix + 1))?;
        let noon = local_noon_millis(row.date)
            .with_context(|| format!("No local noon on {}", row.date))?;
        transactions.push(Transaction::new(
            ix as i64 + 1,
            row.kind,
            row.amount,
            row.category,
            row.note,
            noon,
        ));
    }
    Ok(transactions)
}

/// Seed transaction data. Amounts are in minor units.
const SEED_DATA: &str = r##"kind,date,amount,category,note
INCOME,2026-09-01,320000,WORK,September salary
EXPENSE,2026-09-02,8743,FOOD,Groceries
EXPENSE,2026-09-05,14267,SERVICES,Electricity
EXPENSE,2026-09-09,5230,TRANSPORT,Fuel
EXPENSE,2026-09-14,4230,ENTERTAINMENT,Cinema and dinner
EXPENSE,2026-09-21,6321,FOOD,Groceries
INCOME,2026-09-25,5000,GIFT,Birthday
INCOME,2026-10-01,320000,WORK,October salary
EXPENSE,2026-10-02,9582,FOOD,Groceries
EXPENSE,2026-10-03,675,FOOD,Coffee
EXPENSE,2026-10-04,8999,SERVICES,Internet
EXPENSE,2026-10-06,4890,TRANSPORT,Fuel
EXPENSE,2026-10-08,11856,SHOPPING,Shoes
EXPENSE,2026-10-10,7500,HEALTH,Pharmacy
EXPENSE,2026-10-12,1485,FOOD,Lunch
EXPENSE,2026-10-15,95000,HOME,Rent
INCOME,2026-10-16,15000,OTHER,Sold a bike
"##;

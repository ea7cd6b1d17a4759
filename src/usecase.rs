//! Use cases are the only way screens reach the repository. Each one makes a single call and turns
//! its outcome into a `GenericState`, so repository failures never escape as errors.

use crate::aggregation::{aggregate, category_month_detail};
use crate::model::{
    CategoryEnum, CategoryMonthDetail, FinanceEnum, FinanceScreenModel, Months, Transaction,
};
use crate::repository::{DeleteParams, EditParams, FinanceRepository};
use crate::state::{run_once, run_stream, GenericState, StateStream};
use chrono::Datelike;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to the repository.
pub type Repository = Arc<dyn FinanceRepository>;

/// Streams the aggregated home screen model for a month, re-emitting after every change.
#[derive(Clone)]
pub struct GetFinanceUseCase {
    repository: Repository,
}

impl GetFinanceUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn invoke(&self, month_key: &str) -> StateStream<FinanceScreenModel> {
        debug!("Subscribing to finance for {month_key}");
        let upstream = self.repository.observe_month(month_key);
        run_stream(upstream, |transactions| aggregate(&transactions))
    }
}

/// Lists the months that have data, grouped by year.
#[derive(Clone)]
pub struct GetMonthsUseCase {
    repository: Repository,
}

impl GetMonthsUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn invoke(&self) -> StateStream<Months> {
        let repository = self.repository.clone();
        run_once(async move {
            let months = repository.months().await?;
            Ok(group_by_year(months))
        })
    }
}

fn group_by_year(months: impl IntoIterator<Item = chrono::NaiveDate>) -> Months {
    let mut grouped = Months::new();
    for month in months {
        grouped.entry(month.year()).or_default().push(month);
    }
    for dates in grouped.values_mut() {
        dates.sort();
        dates.dedup();
    }
    grouped
}

/// Streams the expenses of one category within one month.
#[derive(Clone)]
pub struct GetCategoryMonthDetailUseCase {
    repository: Repository,
}

impl GetCategoryMonthDetailUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn invoke(
        &self,
        category: CategoryEnum,
        month_key: &str,
    ) -> StateStream<CategoryMonthDetail> {
        let upstream = self.repository.observe_month(month_key);
        let month_key = month_key.to_string();
        run_stream(upstream, move |transactions| {
            category_month_detail(category, &month_key, &transactions)
        })
    }
}

/// Fetches one income or one expense, depending on how it was constructed.
#[derive(Clone)]
pub struct GetRecordUseCase {
    repository: Repository,
    kind: FinanceEnum,
}

impl GetRecordUseCase {
    pub fn income(repository: Repository) -> Self {
        Self::new(repository, FinanceEnum::Income)
    }

    pub fn expense(repository: Repository) -> Self {
        Self::new(repository, FinanceEnum::Expense)
    }

    pub fn new(repository: Repository, kind: FinanceEnum) -> Self {
        Self { repository, kind }
    }

    pub async fn invoke(&self, id: i64) -> GenericState<Transaction> {
        self.repository.get(self.kind, id).await.into()
    }
}

/// Creates or updates one income or one expense. The id in the params decides which; this use
/// case forwards it untouched.
#[derive(Clone)]
pub struct EditRecordUseCase {
    repository: Repository,
    kind: FinanceEnum,
}

impl EditRecordUseCase {
    pub fn income(repository: Repository) -> Self {
        Self::new(repository, FinanceEnum::Income)
    }

    pub fn expense(repository: Repository) -> Self {
        Self::new(repository, FinanceEnum::Expense)
    }

    pub fn new(repository: Repository, kind: FinanceEnum) -> Self {
        Self { repository, kind }
    }

    pub async fn invoke(&self, params: EditParams) -> GenericState<()> {
        self.repository.edit(self.kind, params).await.into()
    }
}

#[derive(Clone)]
pub struct DeleteUseCase {
    repository: Repository,
}

impl DeleteUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn invoke(&self, params: DeleteParams) -> GenericState<()> {
        self.repository.delete(params).await.into()
    }
}

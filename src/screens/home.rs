//! The month overview: totals and the per-category breakdown of one month, kept live.

use crate::container::{Container, Reducer, Reduction};
use crate::model::{
    current_month_key, month_name, parse_month_key, CategoryEnum, FinanceScreenModel,
};
use crate::state::GenericState;
use crate::usecase::{GetFinanceUseCase, Repository};
use serde::Serialize;
use tracing::{debug, trace, warn};

const FINANCE_SUBSCRIPTION: &str = "finance";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HomeState {
    /// The `MMYYYY` month being shown. Empty until the first load.
    pub month_key: String,
    /// Upper-case month name, e.g. `OCTOBER`.
    pub month_name: String,
    pub finance: GenericState<FinanceScreenModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeIntent {
    Load(String),
    Refresh,
    OpenCategory(CategoryEnum),
    AddExpense,
    AddIncome,
    SeeMonths,
    FinanceChanged {
        month_key: String,
        finance: GenericState<FinanceScreenModel>,
    },
}

/// Navigation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeEffect {
    OpenCategoryDetail {
        category: CategoryEnum,
        month_key: String,
    },
    CreateExpense,
    CreateIncome,
    Months,
}

pub struct HomeReducer {
    finance: GetFinanceUseCase,
}

impl HomeReducer {
    pub fn new(repository: Repository) -> Self {
        Self {
            finance: GetFinanceUseCase::new(repository),
        }
    }

    fn subscribe(
        &self,
        state: &mut HomeState,
        month_key: String,
    ) -> Reduction<HomeIntent, HomeEffect> {
        let date = match parse_month_key(&month_key) {
            Ok(date) => date,
            Err(e) => {
                warn!("Not loading month: {e:#}");
                // no month is shown, so nothing queued by the old subscription matches
                state.month_key.clear();
                state.month_name.clear();
                state.finance = GenericState::Error(format!("{e:#}"));
                return Reduction::cancel(FINANCE_SUBSCRIPTION);
            }
        };
        debug!("Showing month {month_key}");
        state.month_name = month_name(date);
        state.month_key = month_key.clone();
        state.finance = GenericState::Loading;
        let stream = self.finance.invoke(&month_key);
        Reduction::subscribe(FINANCE_SUBSCRIPTION, stream, move |finance| {
            HomeIntent::FinanceChanged {
                month_key: month_key.clone(),
                finance,
            }
        })
    }
}

impl Reducer for HomeReducer {
    type State = HomeState;
    type Intent = HomeIntent;
    type SideEffect = HomeEffect;

    fn reduce(
        &self,
        state: &mut HomeState,
        intent: HomeIntent,
    ) -> Reduction<HomeIntent, HomeEffect> {
        match intent {
            HomeIntent::Load(month_key) => self.subscribe(state, month_key),
            HomeIntent::Refresh => {
                let month_key = if state.month_key.is_empty() {
                    current_month_key()
                } else {
                    state.month_key.clone()
                };
                self.subscribe(state, month_key)
            }
            HomeIntent::FinanceChanged { month_key, finance } => {
                // a replaced subscription may still have an emission in the queue
                if month_key == state.month_key {
                    state.finance = finance;
                } else {
                    trace!("Dropping finance for {month_key}, showing {}", state.month_key);
                }
                Reduction::none()
            }
            HomeIntent::OpenCategory(category) => {
                Reduction::effect(HomeEffect::OpenCategoryDetail {
                    category,
                    month_key: state.month_key.clone(),
                })
            }
            HomeIntent::AddExpense => Reduction::effect(HomeEffect::CreateExpense),
            HomeIntent::AddIncome => Reduction::effect(HomeEffect::CreateIncome),
            HomeIntent::SeeMonths => Reduction::effect(HomeEffect::Months),
        }
    }
}

pub type HomeScreen = Container<HomeReducer>;

impl HomeScreen {
    pub fn create(repository: Repository) -> Self {
        Container::new(HomeReducer::new(repository), HomeState::default())
    }

    /// Shows `month_key`, replacing the subscription to any month shown before.
    pub fn load(&self, month_key: impl Into<String>) {
        self.intent(HomeIntent::Load(month_key.into()))
    }

    /// Re-subscribes to the month being shown, or to the current month if none is.
    pub fn refresh(&self) {
        self.intent(HomeIntent::Refresh)
    }

    pub fn open_category(&self, category: CategoryEnum) {
        self.intent(HomeIntent::OpenCategory(category))
    }

    pub fn add_expense(&self) {
        self.intent(HomeIntent::AddExpense)
    }

    pub fn add_income(&self) {
        self.intent(HomeIntent::AddIncome)
    }

    pub fn see_months(&self) {
        self.intent(HomeIntent::SeeMonths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FinanceEnum, Transaction};
    use crate::repository::{EditParams, FinanceRepository, InMemoryRepository};
    use crate::test::{expense, income, TEST_MILLIS};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load_month() {
        let e = expense(1, CategoryEnum::Food, 250);
        let month_key = e.month_key.clone();
        let repo = InMemoryRepository::new(vec![e, income(2, CategoryEnum::Work, 1_000)]);
        let screen = HomeScreen::create(Arc::new(repo));
        screen.load(month_key.clone());
        let state = screen.wait_for(|s| s.finance.is_success()).await;
        assert_eq!(state.month_key, month_key);
        assert!(!state.month_name.is_empty());
        let finance = state.finance.data().unwrap();
        assert_eq!(finance.expense_amount, 250);
        assert_eq!(finance.income_amount, 1_000);
        assert_eq!(finance.balance(), 750);
    }

    #[tokio::test]
    async fn test_re_emits_after_edit() {
        let e = expense(1, CategoryEnum::Food, 250);
        let month_key = e.month_key.clone();
        let repo = InMemoryRepository::new(vec![e]);
        let screen = HomeScreen::create(Arc::new(repo.clone()));
        screen.load(month_key);
        screen.wait_for(|s| s.finance.is_success()).await;

        let params = EditParams {
            amount: 750,
            note: "dinner".to_string(),
            date_in_millis: TEST_MILLIS,
            id: 0,
            category: CategoryEnum::Entertainment,
        };
        repo.edit(FinanceEnum::Expense, params).await.unwrap();
        let state = screen
            .wait_for(|s| s.finance.data().map(|f| f.expense_amount) == Some(1_000))
            .await;
        let finance = state.finance.into_data().unwrap();
        assert_eq!(finance.expenses[0].category, CategoryEnum::Entertainment);
        assert_eq!(finance.expenses[0].percentage, 75);
        assert_eq!(finance.expenses[1].percentage, 25);
    }

    #[tokio::test]
    async fn test_switching_months_drops_stale_data() {
        let e = expense(1, CategoryEnum::Food, 250);
        let first = e.month_key.clone();
        let repo = InMemoryRepository::new(vec![e]);
        let screen = HomeScreen::create(Arc::new(repo));
        screen.load(first);
        screen.load("012030");
        let state = screen.wait_for(|s| s.finance.is_success()).await;
        assert_eq!(state.month_key, "012030");
        assert_eq!(state.month_name, "JANUARY");
        assert_eq!(state.finance.into_data().unwrap().expense_amount, 0);
    }

    #[tokio::test]
    async fn test_bad_month_key() {
        let repo = InMemoryRepository::new(Vec::<Transaction>::new());
        let screen = HomeScreen::create(Arc::new(repo));
        screen.load("2026-10");
        screen.settle().await;
        assert!(screen.state().finance.is_error());
        assert!(screen.state().month_key.is_empty());
    }

    #[tokio::test]
    async fn test_bad_month_key_stops_the_shown_month() {
        let e = expense(1, CategoryEnum::Food, 250);
        let month_key = e.month_key.clone();
        let repo = InMemoryRepository::new(vec![e]);
        let screen = HomeScreen::create(Arc::new(repo.clone()));
        screen.load(month_key);
        screen.wait_for(|s| s.finance.is_success()).await;

        screen.load("13-2026");
        screen.settle().await;
        assert!(screen.state().finance.is_error());
        assert!(screen.state().month_name.is_empty());

        // a change to the month shown before must not replace the error
        let params = EditParams {
            amount: 100,
            note: "snack".to_string(),
            date_in_millis: TEST_MILLIS,
            id: 0,
            category: CategoryEnum::Food,
        };
        repo.edit(FinanceEnum::Expense, params).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        screen.settle().await;
        assert!(screen.state().finance.is_error());
    }

    #[tokio::test]
    async fn test_navigation_effects() {
        let mut screen = HomeScreen::create(Arc::new(InMemoryRepository::new(Vec::new())));
        screen.load("102026");
        screen.open_category(CategoryEnum::Home);
        screen.add_expense();
        screen.add_income();
        screen.see_months();
        assert_eq!(
            screen.next_effect().await,
            Some(HomeEffect::OpenCategoryDetail {
                category: CategoryEnum::Home,
                month_key: "102026".to_string(),
            })
        );
        assert_eq!(screen.next_effect().await, Some(HomeEffect::CreateExpense));
        assert_eq!(screen.next_effect().await, Some(HomeEffect::CreateIncome));
        assert_eq!(screen.next_effect().await, Some(HomeEffect::Months));
    }
}

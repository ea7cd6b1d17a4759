//! The list of months that have data, grouped by year.

use crate::container::{Container, Reducer, Reduction};
use crate::model::{month_key, Months};
use crate::state::GenericState;
use crate::usecase::{GetMonthsUseCase, Repository};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum MonthsIntent {
    Load,
    Changed(GenericState<Months>),
    OpenMonth(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthsEffect {
    OpenMonth { month_key: String },
}

pub struct MonthsReducer {
    months: GetMonthsUseCase,
}

impl MonthsReducer {
    pub fn new(repository: Repository) -> Self {
        Self {
            months: GetMonthsUseCase::new(repository),
        }
    }
}

impl Reducer for MonthsReducer {
    type State = GenericState<Months>;
    type Intent = MonthsIntent;
    type SideEffect = MonthsEffect;

    fn reduce(
        &self,
        state: &mut GenericState<Months>,
        intent: MonthsIntent,
    ) -> Reduction<MonthsIntent, MonthsEffect> {
        match intent {
            MonthsIntent::Load => {
                Reduction::subscribe("months", self.months.invoke(), MonthsIntent::Changed)
            }
            MonthsIntent::Changed(months) => {
                *state = months;
                Reduction::none()
            }
            MonthsIntent::OpenMonth(date) => Reduction::effect(MonthsEffect::OpenMonth {
                month_key: month_key(date),
            }),
        }
    }
}

pub type MonthsScreen = Container<MonthsReducer>;

impl MonthsScreen {
    pub fn create(repository: Repository) -> Self {
        Container::new(MonthsReducer::new(repository), GenericState::Initial)
    }

    pub fn load(&self) {
        self.intent(MonthsIntent::Load)
    }

    pub fn open_month(&self, date: NaiveDate) {
        self.intent(MonthsIntent::OpenMonth(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::test::FakeRepository;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load() {
        let screen = MonthsScreen::create(Arc::new(InMemoryRepository::default()));
        assert!(screen.state().is_initial());
        screen.load();
        let state = screen.wait_for(|s| s.is_terminal()).await;
        let months = state.into_data().unwrap();
        assert_eq!(months.keys().copied().collect::<Vec<_>>(), vec![2026]);
        assert_eq!(months[&2026].len(), 2);
    }

    #[tokio::test]
    async fn test_load_error() {
        let fake = FakeRepository::default();
        fake.fail_with("offline");
        let screen = MonthsScreen::create(Arc::new(fake));
        screen.load();
        let state = screen.wait_for(|s| s.is_terminal()).await;
        assert_eq!(state, GenericState::Error("offline".to_string()));
    }

    #[tokio::test]
    async fn test_open_month() {
        let mut screen = MonthsScreen::create(Arc::new(FakeRepository::default()));
        screen.open_month(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(
            screen.next_effect().await,
            Some(MonthsEffect::OpenMonth {
                month_key: "032026".to_string()
            })
        );
    }
}

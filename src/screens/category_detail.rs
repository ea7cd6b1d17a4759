//! Every expense of one category in one month, kept live.

use crate::container::{Container, Reducer, Reduction};
use crate::model::{CategoryEnum, CategoryMonthDetail};
use crate::state::GenericState;
use crate::usecase::{GetCategoryMonthDetailUseCase, Repository};
use serde::Serialize;
use tracing::trace;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryDetailState {
    pub category: CategoryEnum,
    pub month_key: String,
    pub detail: GenericState<CategoryMonthDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryDetailIntent {
    Load {
        category: CategoryEnum,
        month_key: String,
    },
    Changed {
        category: CategoryEnum,
        month_key: String,
        detail: GenericState<CategoryMonthDetail>,
    },
    OpenExpense(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryDetailEffect {
    EditExpense { id: i64 },
}

pub struct CategoryDetailReducer {
    detail: GetCategoryMonthDetailUseCase,
}

impl CategoryDetailReducer {
    pub fn new(repository: Repository) -> Self {
        Self {
            detail: GetCategoryMonthDetailUseCase::new(repository),
        }
    }
}

impl Reducer for CategoryDetailReducer {
    type State = CategoryDetailState;
    type Intent = CategoryDetailIntent;
    type SideEffect = CategoryDetailEffect;

    fn reduce(
        &self,
        state: &mut CategoryDetailState,
        intent: CategoryDetailIntent,
    ) -> Reduction<CategoryDetailIntent, CategoryDetailEffect> {
        match intent {
            CategoryDetailIntent::Load {
                category,
                month_key,
            } => {
                state.category = category;
                state.month_key = month_key.clone();
                state.detail = GenericState::Loading;
                let stream = self.detail.invoke(category, &month_key);
                Reduction::subscribe("detail", stream, move |detail| {
                    CategoryDetailIntent::Changed {
                        category,
                        month_key: month_key.clone(),
                        detail,
                    }
                })
            }
            CategoryDetailIntent::Changed {
                category,
                month_key,
                detail,
            } => {
                if category == state.category && month_key == state.month_key {
                    state.detail = detail;
                } else {
                    trace!("Dropping detail for {category} in {month_key}");
                }
                Reduction::none()
            }
            CategoryDetailIntent::OpenExpense(id) => {
                Reduction::effect(CategoryDetailEffect::EditExpense { id })
            }
        }
    }
}

pub type CategoryDetailScreen = Container<CategoryDetailReducer>;

impl CategoryDetailScreen {
    pub fn create(repository: Repository) -> Self {
        Container::new(
            CategoryDetailReducer::new(repository),
            CategoryDetailState::default(),
        )
    }

    pub fn load(&self, category: CategoryEnum, month_key: impl Into<String>) {
        self.intent(CategoryDetailIntent::Load {
            category,
            month_key: month_key.into(),
        })
    }

    pub fn open_expense(&self, id: i64) {
        self.intent(CategoryDetailIntent::OpenExpense(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FinanceEnum;
    use crate::repository::{DeleteParams, FinanceRepository, InMemoryRepository};
    use crate::test::{expense, income};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load_and_follow_deletes() {
        let a = expense(1, CategoryEnum::Food, 100);
        let b = expense(2, CategoryEnum::Food, 300);
        let month_key = a.month_key.clone();
        let repo = InMemoryRepository::new(vec![
            a,
            b,
            expense(3, CategoryEnum::Home, 900),
            income(4, CategoryEnum::Work, 5_000),
        ]);
        let screen = CategoryDetailScreen::create(Arc::new(repo.clone()));
        screen.load(CategoryEnum::Food, month_key.clone());
        let state = screen.wait_for(|s| s.detail.is_success()).await;
        let detail = state.detail.into_data().unwrap();
        assert_eq!(detail.month_amount, 400);
        // same instant, so the higher id comes first
        let ids: Vec<i64> = detail.transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(detail.daily.len(), 1);

        let params = DeleteParams {
            kind: FinanceEnum::Expense,
            id: 2,
            month_key,
        };
        repo.delete(params).await.unwrap();
        screen
            .wait_for(|s| s.detail.data().map(|d| d.month_amount) == Some(100))
            .await;
    }

    #[tokio::test]
    async fn test_open_expense() {
        let repo = InMemoryRepository::new(Vec::new());
        let mut screen = CategoryDetailScreen::create(Arc::new(repo));
        screen.open_expense(12);
        assert_eq!(
            screen.next_effect().await,
            Some(CategoryDetailEffect::EditExpense { id: 12 })
        );
    }
}

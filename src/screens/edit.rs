//! The create/edit form shared by incomes and expenses.
//!
//! The form keeps two views of the amount: `amount_field` is what the text field shows and
//! `amount` is the value it stands for. Every keystroke is parsed as cents and re-rendered, so the
//! field always reads like `$1,234.56` no matter what was typed.
//!
//! Saving validates amount, then date, then note, and stops at the first failure. Only the failed
//! field's flag is raised.

use crate::container::{Container, Reducer, Reduction};
use crate::model::{
    format_ddmmyyyy, format_money, parse_amount, to_minor_units, CategoryEnum, FinanceEnum,
    Transaction,
};
use crate::repository::{DeleteParams, EditParams};
use crate::state::GenericState;
use crate::usecase::{DeleteUseCase, EditRecordUseCase, GetRecordUseCase, Repository};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EditScreenState {
    pub kind: FinanceEnum,
    pub category: CategoryEnum,
    /// The amount as displayed, e.g. `$5.00`.
    pub amount_field: String,
    /// The amount in major units.
    pub amount: Decimal,
    /// The picked date as `DD/MM/YYYY`.
    pub date: String,
    /// `0` means no date has been picked.
    pub date_in_millis: i64,
    pub note: String,
    pub show_date_error: bool,
    pub show_note_error: bool,
    pub show_amount_error: bool,
    pub initial_data_loaded: bool,
    pub show_loading: bool,
    /// `0` until an existing record is loaded; saving with `0` creates.
    pub id: i64,
    pub month_key: String,
}

impl EditScreenState {
    /// A blank form for a new record of `kind`.
    pub fn new(kind: FinanceEnum) -> Self {
        Self {
            kind,
            category: kind.default_category(),
            amount_field: format_money(Decimal::ZERO),
            amount: Decimal::ZERO,
            date: String::new(),
            date_in_millis: 0,
            note: String::new(),
            show_date_error: false,
            show_note_error: false,
            show_amount_error: false,
            initial_data_loaded: false,
            show_loading: false,
            id: 0,
            month_key: String::new(),
        }
    }
}

impl Default for EditScreenState {
    fn default() -> Self {
        Self::new(FinanceEnum::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    SetCategory(CategoryEnum),
    SetDate(i64),
    SetAmount(String),
    SetNote(String),
    ShowAmountError(bool),
    ShowDateError(bool),
    ShowNoteError(bool),
    Submit,
    Delete,
    Load(i64),
    Loaded(GenericState<Transaction>),
    Saved(GenericState<()>),
    Deleted(GenericState<()>),
}

/// One-shot events for the UI, typically to close the form or show a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "effect", content = "result")]
pub enum EditEffect {
    Loaded(GenericState<()>),
    Saved(GenericState<()>),
    Deleted(GenericState<()>),
}

pub struct EditReducer {
    kind: FinanceEnum,
    get: GetRecordUseCase,
    edit: EditRecordUseCase,
    delete: DeleteUseCase,
}

impl EditReducer {
    pub fn new(kind: FinanceEnum, repository: Repository) -> Self {
        Self {
            kind,
            get: GetRecordUseCase::new(repository.clone(), kind),
            edit: EditRecordUseCase::new(repository.clone(), kind),
            delete: DeleteUseCase::new(repository),
        }
    }

    fn submit(&self, state: &mut EditScreenState) -> Reduction<EditIntent, EditEffect> {
        state.show_amount_error = false;
        state.show_date_error = false;
        state.show_note_error = false;

        let amount = match to_minor_units(state.amount) {
            Some(amount) if amount > 0 => amount,
            _ => {
                state.show_amount_error = true;
                return Reduction::none();
            }
        };
        if state.date_in_millis == 0 {
            state.show_date_error = true;
            return Reduction::none();
        }
        if state.note.trim().is_empty() {
            state.show_note_error = true;
            return Reduction::none();
        }

        state.show_loading = true;
        let params = EditParams {
            amount,
            note: state.note.clone(),
            date_in_millis: state.date_in_millis,
            id: state.id,
            category: state.category,
        };
        debug!("Saving {} {}", self.kind, params.id);
        let edit = self.edit.clone();
        Reduction::run(async move { EditIntent::Saved(edit.invoke(params).await) })
    }

    /// Copies a fetched record into the form through the same reductions the UI would use.
    fn loaded(
        &self,
        state: &mut EditScreenState,
        transaction: Transaction,
    ) -> Reduction<EditIntent, EditEffect> {
        let reduction = self
            .reduce(state, EditIntent::SetAmount(transaction.amount.to_string()))
            .merge(self.reduce(state, EditIntent::SetCategory(transaction.category)))
            .merge(self.reduce(state, EditIntent::SetDate(transaction.occurred_at_millis)))
            .merge(self.reduce(state, EditIntent::SetNote(transaction.note)));
        state.initial_data_loaded = true;
        state.id = transaction.id;
        state.month_key = transaction.month_key;
        reduction.and_effect(EditEffect::Loaded(GenericState::Success(())))
    }
}

impl Reducer for EditReducer {
    type State = EditScreenState;
    type Intent = EditIntent;
    type SideEffect = EditEffect;

    fn reduce(
        &self,
        state: &mut EditScreenState,
        intent: EditIntent,
    ) -> Reduction<EditIntent, EditEffect> {
        match intent {
            EditIntent::SetCategory(category) => {
                state.category = category;
                Reduction::none()
            }
            EditIntent::SetDate(millis) => {
                state.date_in_millis = millis;
                state.date = format_ddmmyyyy(millis);
                Reduction::none()
            }
            EditIntent::SetAmount(text) => {
                if text == state.amount_field {
                    return Reduction::none();
                }
                match parse_amount(&text) {
                    Ok(amount) => {
                        state.amount = amount;
                        state.amount_field = format_money(amount);
                    }
                    Err(e) => warn!("Ignoring amount input {text:?}: {e}"),
                }
                Reduction::none()
            }
            EditIntent::SetNote(note) => {
                state.note = note;
                Reduction::none()
            }
            EditIntent::ShowAmountError(show) => {
                state.show_amount_error = show;
                Reduction::none()
            }
            EditIntent::ShowDateError(show) => {
                state.show_date_error = show;
                Reduction::none()
            }
            EditIntent::ShowNoteError(show) => {
                state.show_note_error = show;
                Reduction::none()
            }
            EditIntent::Submit => self.submit(state),
            EditIntent::Delete => {
                let params = DeleteParams {
                    kind: self.kind,
                    id: state.id,
                    month_key: state.month_key.clone(),
                };
                let delete = self.delete.clone();
                Reduction::run(async move { EditIntent::Deleted(delete.invoke(params).await) })
            }
            EditIntent::Load(id) => {
                let get = self.get.clone();
                Reduction::run(async move { EditIntent::Loaded(get.invoke(id).await) })
            }
            EditIntent::Loaded(GenericState::Success(transaction)) => {
                self.loaded(state, transaction)
            }
            EditIntent::Loaded(other) => {
                if let Some(reason) = other.error() {
                    warn!("Unable to load {}: {reason}", self.kind);
                }
                Reduction::effect(EditEffect::Loaded(other.map(|_| ())))
            }
            EditIntent::Saved(result) => {
                if let Some(reason) = result.error() {
                    warn!("Unable to save {}: {reason}", self.kind);
                    state.show_loading = false;
                }
                Reduction::effect(EditEffect::Saved(result))
            }
            EditIntent::Deleted(result) => {
                if let Some(reason) = result.error() {
                    warn!("Unable to delete {} {}: {reason}", self.kind, state.id);
                }
                Reduction::effect(EditEffect::Deleted(result))
            }
        }
    }
}

/// The create/edit form for one income or one expense.
pub type EditScreen = Container<EditReducer>;

impl EditScreen {
    pub fn income(repository: Repository) -> Self {
        Self::for_kind(FinanceEnum::Income, repository)
    }

    pub fn expense(repository: Repository) -> Self {
        Self::for_kind(FinanceEnum::Expense, repository)
    }

    pub fn for_kind(kind: FinanceEnum, repository: Repository) -> Self {
        Container::new(EditReducer::new(kind, repository), EditScreenState::new(kind))
    }

    pub fn set_category(&self, category: CategoryEnum) {
        self.intent(EditIntent::SetCategory(category))
    }

    pub fn set_date(&self, millis: i64) {
        self.intent(EditIntent::SetDate(millis))
    }

    pub fn set_amount(&self, text: impl Into<String>) {
        self.intent(EditIntent::SetAmount(text.into()))
    }

    pub fn set_note(&self, note: impl Into<String>) {
        self.intent(EditIntent::SetNote(note.into()))
    }

    pub fn show_amount_error(&self, show: bool) {
        self.intent(EditIntent::ShowAmountError(show))
    }

    pub fn show_date_error(&self, show: bool) {
        self.intent(EditIntent::ShowDateError(show))
    }

    pub fn show_note_error(&self, show: bool) {
        self.intent(EditIntent::ShowNoteError(show))
    }

    /// Validates the form and saves it. The outcome arrives as [`EditEffect::Saved`].
    pub fn submit(&self) {
        self.intent(EditIntent::Submit)
    }

    /// Deletes the loaded record. The outcome arrives as [`EditEffect::Deleted`].
    pub fn delete(&self) {
        self.intent(EditIntent::Delete)
    }

    /// Fetches record `id` into the form. The outcome arrives as [`EditEffect::Loaded`].
    pub fn load(&self, id: i64) {
        self.intent(EditIntent::Load(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{expense, income, FakeRepository, TEST_MILLIS};
    use std::str::FromStr;
    use std::sync::Arc;

    fn reducer() -> EditReducer {
        EditReducer::new(FinanceEnum::Expense, Arc::new(FakeRepository::default()))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_state() {
        let income = EditScreenState::new(FinanceEnum::Income);
        assert_eq!(income.category, CategoryEnum::Work);
        assert_eq!(income.amount_field, "$0.00");
        let expense = EditScreenState::default();
        assert_eq!(expense.kind, FinanceEnum::Expense);
        assert_eq!(expense.category, CategoryEnum::Food);
        assert!(!expense.show_loading);
    }

    #[test]
    fn test_set_amount_reads_cents() {
        let r = reducer();
        let mut state = EditScreenState::default();
        r.reduce(&mut state, EditIntent::SetAmount("500".to_string()));
        assert_eq!(state.amount, dec("5.00"));
        assert_eq!(state.amount_field, "$5.00");

        // a keystroke appended to the display string shifts every digit left
        r.reduce(&mut state, EditIntent::SetAmount("$5.001".to_string()));
        assert_eq!(state.amount, dec("50.01"));
        assert_eq!(state.amount_field, "$50.01");

        r.reduce(&mut state, EditIntent::SetAmount("abc".to_string()));
        assert_eq!(state.amount, Decimal::ZERO);
        assert_eq!(state.amount_field, "$0.00");
    }

    #[test]
    fn test_set_amount_is_idempotent() {
        let r = reducer();
        let mut state = EditScreenState::default();
        r.reduce(&mut state, EditIntent::SetAmount("$1,234.56".to_string()));
        let amount = state.amount;
        assert_eq!(state.amount_field, "$1,234.56");
        let field = state.amount_field.clone();
        r.reduce(&mut state, EditIntent::SetAmount(field));
        assert_eq!(state.amount, amount);
        assert_eq!(state.amount_field, "$1,234.56");
    }

    #[test]
    fn test_set_date() {
        let r = reducer();
        let mut state = EditScreenState::default();
        r.reduce(&mut state, EditIntent::SetDate(TEST_MILLIS));
        assert_eq!(state.date_in_millis, TEST_MILLIS);
        assert_eq!(state.date, format_ddmmyyyy(TEST_MILLIS));
        assert_eq!(state.date.len(), 10);
    }

    #[test]
    fn test_validation_priority() {
        let r = reducer();
        let mut state = EditScreenState::default();
        let reduction = r.reduce(&mut state, EditIntent::Submit);
        assert!(state.show_amount_error);
        assert!(!state.show_date_error);
        assert!(!state.show_note_error);
        assert!(!state.show_loading);
        assert_eq!(reduction.commands(), 0);

        r.reduce(&mut state, EditIntent::SetAmount("100".to_string()));
        r.reduce(&mut state, EditIntent::Submit);
        assert!(!state.show_amount_error);
        assert!(state.show_date_error);
        assert!(!state.show_note_error);

        r.reduce(&mut state, EditIntent::SetDate(TEST_MILLIS));
        r.reduce(&mut state, EditIntent::SetNote("   ".to_string()));
        r.reduce(&mut state, EditIntent::Submit);
        assert!(!state.show_date_error);
        assert!(state.show_note_error);

        r.reduce(&mut state, EditIntent::ShowNoteError(false));
        assert!(!state.show_note_error);
    }

    #[test]
    fn test_set_amount_ignores_digits_past_the_limit() {
        let r = reducer();
        let mut state = EditScreenState::default();
        r.reduce(&mut state, EditIntent::SetAmount("999999999999".to_string()));
        assert_eq!(state.amount_field, "$9,999,999,999.99");

        r.reduce(&mut state, EditIntent::SetAmount("12345678901234567890".to_string()));
        assert_eq!(state.amount, dec("9999999999.99"));
        assert_eq!(state.amount_field, "$9,999,999,999.99");
    }

    #[tokio::test]
    async fn test_huge_amount_is_never_saved() {
        let fake = FakeRepository::default();
        let mut screen = EditScreen::expense(Arc::new(fake.clone()));
        screen.set_amount("12345678901234567890");
        screen.set_date(TEST_MILLIS);
        screen.set_note("big");
        screen.submit();
        screen.settle().await;
        assert!(screen.state().show_amount_error);
        assert!(fake.edits().is_empty());

        // an amount that cannot be stored as cents fails validation
        let r = reducer();
        let mut state = EditScreenState {
            amount: dec("123456789012345678.90"),
            date_in_millis: TEST_MILLIS,
            note: "big".to_string(),
            ..EditScreenState::default()
        };
        let reduction = r.reduce(&mut state, EditIntent::Submit);
        assert!(state.show_amount_error);
        assert!(!state.show_loading);
        assert_eq!(reduction.commands(), 0);
    }

    #[tokio::test]
    async fn test_submit_creates_record() {
        let fake = FakeRepository::default();
        let mut screen = EditScreen::expense(Arc::new(fake.clone()));
        screen.set_amount("500");
        screen.set_date(TEST_MILLIS);
        screen.set_note("lunch");
        screen.submit();
        screen.settle().await;

        assert_eq!(
            fake.edits(),
            vec![(
                FinanceEnum::Expense,
                EditParams {
                    amount: 500,
                    note: "lunch".to_string(),
                    date_in_millis: TEST_MILLIS,
                    id: 0,
                    category: CategoryEnum::Food,
                }
            )]
        );
        assert_eq!(
            screen.next_effect().await,
            Some(EditEffect::Saved(GenericState::Success(())))
        );
        assert!(screen.state().show_loading);
    }

    #[tokio::test]
    async fn test_failed_save_clears_loading() {
        let fake = FakeRepository::default();
        fake.fail_with("disk full");
        let mut screen = EditScreen::income(Arc::new(fake.clone()));
        screen.set_amount("1");
        screen.set_date(TEST_MILLIS);
        screen.set_note("tip");
        screen.submit();
        assert_eq!(
            screen.next_effect().await,
            Some(EditEffect::Saved(GenericState::Error(
                "disk full".to_string()
            )))
        );
        // the state is published before the effect
        assert!(!screen.state().show_loading);
        assert_eq!(fake.edits()[0].0, FinanceEnum::Income);
    }

    #[tokio::test]
    async fn test_load_fills_the_form() {
        let mut record = expense(3, CategoryEnum::Home, 123_456);
        record.note = "rent".to_string();
        let fake = FakeRepository::with(vec![record.clone()]);
        let mut screen = EditScreen::expense(Arc::new(fake));
        screen.load(3);
        assert_eq!(
            screen.next_effect().await,
            Some(EditEffect::Loaded(GenericState::Success(())))
        );
        let state = screen.state();
        assert_eq!(state.amount_field, "$1,234.56");
        assert_eq!(state.amount, dec("1234.56"));
        assert_eq!(state.category, CategoryEnum::Home);
        assert_eq!(state.date_in_millis, TEST_MILLIS);
        assert_eq!(state.date, format_ddmmyyyy(TEST_MILLIS));
        assert_eq!(state.note, "rent");
        assert!(state.initial_data_loaded);
        assert_eq!(state.id, 3);
        assert_eq!(state.month_key, record.month_key);
    }

    #[tokio::test]
    async fn test_load_failure() {
        let fake = FakeRepository::with(vec![income(1, CategoryEnum::Work, 100)]);
        let mut screen = EditScreen::expense(Arc::new(fake));
        screen.load(1);
        assert_eq!(
            screen.next_effect().await,
            Some(EditEffect::Loaded(GenericState::Error("not found".to_string())))
        );
        assert!(!screen.state().initial_data_loaded);
    }

    #[tokio::test]
    async fn test_edit_then_save_updates() {
        let fake = FakeRepository::with(vec![income(8, CategoryEnum::Gift, 2_000)]);
        let mut screen = EditScreen::income(Arc::new(fake.clone()));
        screen.load(8);
        screen.next_effect().await;
        screen.set_category(CategoryEnum::Other);
        screen.submit();
        screen.settle().await;
        let (kind, params) = fake.edits().remove(0);
        assert_eq!(kind, FinanceEnum::Income);
        assert_eq!(params.id, 8);
        assert_eq!(params.amount, 2_000);
        assert_eq!(params.category, CategoryEnum::Other);
        assert_eq!(params.note, "test income");
    }

    #[tokio::test]
    async fn test_delete() {
        let record = expense(5, CategoryEnum::Food, 100);
        let fake = FakeRepository::with(vec![record.clone()]);
        let mut screen = EditScreen::expense(Arc::new(fake.clone()));
        screen.load(5);
        screen.next_effect().await;
        screen.delete();
        assert_eq!(
            screen.next_effect().await,
            Some(EditEffect::Deleted(GenericState::Success(())))
        );
        assert_eq!(
            fake.deletes(),
            vec![DeleteParams {
                kind: FinanceEnum::Expense,
                id: 5,
                month_key: record.month_key,
            }]
        );
    }
}

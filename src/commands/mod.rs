//! Command handlers for the myfinances CLI.
//!
//! Every command drives the same screen containers a UI would, against the repository backed by
//! the data file in the home directory.

mod category;
mod delete;
mod home;
mod init;
mod insert;
mod months;
mod update;

use crate::model::{local_noon_millis, FinanceEnum};
use crate::screens::{EditEffect, EditScreen, EditScreenState};
use crate::state::GenericState;
use crate::usecase::Repository;
use crate::{Config, Result};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use category::category;
pub use delete::delete;
pub use home::home;
pub use init::init;
pub use insert::insert;
pub use months::months;
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

async fn repository(config: &Config) -> Result<Repository> {
    let repository = config
        .repository()
        .await
        .context("Unable to open the data file")?;
    Ok(Arc::new(repository))
}

fn date_millis(date: NaiveDate) -> Result<i64> {
    local_noon_millis(date).with_context(|| format!("The date {date} has no local noon"))
}

/// Opens an edit form for record `id` and waits until it is filled.
async fn load_form(kind: FinanceEnum, id: i64, repository: Repository) -> Result<EditScreen> {
    let mut screen = EditScreen::for_kind(kind, repository);
    screen.load(id);
    match screen.next_effect().await {
        Some(EditEffect::Loaded(GenericState::Success(()))) => Ok(screen),
        Some(EditEffect::Loaded(GenericState::Error(reason))) => bail!("{reason}"),
        other => bail!("Unexpected outcome while loading {kind} {id}: {other:?}"),
    }
}

/// Submits the form and turns a validation failure or a failed save into an error.
async fn save_form(screen: &mut EditScreen) -> Result<EditScreenState> {
    screen.submit();
    screen.settle().await;
    let state = screen.state();
    if state.show_amount_error {
        bail!("The amount must be greater than zero")
    }
    if state.show_date_error {
        bail!("A date is required")
    }
    if state.show_note_error {
        bail!("A note is required")
    }
    match screen.try_next_effect() {
        Some(EditEffect::Saved(GenericState::Success(()))) => Ok(state),
        Some(EditEffect::Saved(GenericState::Error(reason))) => bail!("{reason}"),
        other => bail!("Unexpected outcome while saving: {other:?}"),
    }
}

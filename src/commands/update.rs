use crate::args::UpdateArgs;
use crate::commands::{date_millis, load_form, repository, save_form, Out};
use crate::screens::EditScreenState;
use crate::{Config, Result};

/// Loads an existing record into the edit form, applies the given fields and saves it.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<EditScreenState>> {
    let kind = args.kind().unwrap_or(config.default_kind());
    let mut screen = load_form(kind, args.id(), repository(&config).await?).await?;
    if let Some(amount) = args.amount() {
        screen.set_amount(amount);
    }
    if let Some(category) = args.category() {
        screen.set_category(category);
    }
    if let Some(date) = args.date() {
        screen.set_date(date_millis(date)?);
    }
    if let Some(note) = args.note() {
        screen.set_note(note);
    }
    let state = save_form(&mut screen).await?;
    Ok(Out::new(format!("Updated {kind} {}", args.id()), state))
}

use crate::args::InsertArgs;
use crate::commands::{date_millis, repository, save_form, Out};
use crate::screens::{EditScreen, EditScreenState};
use crate::{Config, Result};

/// Records a new income or expense through the create form, so it is validated exactly like a
/// form submission.
///
/// # Errors
///
/// - Returns an error if the amount is zero, or the note is blank.
/// - Returns an error if the data file cannot be written.
pub async fn insert(config: Config, args: InsertArgs) -> Result<Out<EditScreenState>> {
    let kind = args.kind().unwrap_or(config.default_kind());
    let mut screen = EditScreen::for_kind(kind, repository(&config).await?);
    screen.set_amount(args.amount());
    screen.set_category(args.category().unwrap_or(kind.default_category()));
    screen.set_date(date_millis(args.date())?);
    screen.set_note(args.note());
    let state = save_form(&mut screen).await?;
    Ok(Out::new(
        format!(
            "Recorded {} {} in {} on {}",
            kind, state.amount_field, state.category, state.date
        ),
        state,
    ))
}

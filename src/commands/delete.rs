use crate::args::DeleteArgs;
use crate::commands::{load_form, repository, Out};
use crate::screens::EditEffect;
use crate::state::GenericState;
use crate::{Config, Result};
use anyhow::bail;

/// Deletes a record. The record is loaded first so the delete is filed under its month.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<()>> {
    let kind = args.kind().unwrap_or(config.default_kind());
    let mut screen = load_form(kind, args.id(), repository(&config).await?).await?;
    screen.delete();
    match screen.next_effect().await {
        Some(EditEffect::Deleted(GenericState::Success(()))) => {
            Ok(format!("Deleted {kind} {}", args.id()).into())
        }
        Some(EditEffect::Deleted(GenericState::Error(reason))) => bail!("{reason}"),
        other => bail!("Unexpected outcome while deleting: {other:?}"),
    }
}

use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory with:
/// - an initial `config.json` file with default settings
/// - a data file seeded with sample incomes and expenses
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/myfinances`
///
/// # Errors
/// - Returns an error if the directory already holds a config file or any file operation fails.
pub async fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Successfully created the myfinances directory at {}",
        config.root().display()
    )
    .into())
}

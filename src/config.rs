//! Configuration file handling for my-finances.
//!
//! The configuration file is stored at `$MYFINANCES_HOME/config.json` and names the data file that
//! holds the recorded incomes and expenses.

use crate::model::FinanceEnum;
use crate::repository::InMemoryRepository;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "myfinances";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA_JSON: &str = "data.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$MYFINANCES_HOME` and from there it loads `$MYFINANCES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and:
    /// - writes an initial `config.json` with default settings
    /// - seeds the data file with sample incomes and expenses
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the myfinances home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
        };
        InMemoryRepository::seed_file(&config.data_path())
            .await
            .context("Unable to seed the data file")?;
        Ok(config)
    }

    /// Validates that `home` and its config file exist, then loads the config file.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The myfinances home directory is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The data file, resolved against the home directory when relative.
    pub fn data_path(&self) -> PathBuf {
        if self.config_file.data_file.is_absolute() {
            return self.config_file.data_file.clone();
        }
        self.root.join(&self.config_file.data_file)
    }

    /// The kind a command works on when none is given.
    pub fn default_kind(&self) -> FinanceEnum {
        self.config_file.default_kind
    }

    /// Opens the repository backed by the data file.
    pub async fn repository(&self) -> Result<InMemoryRepository> {
        InMemoryRepository::open(self.data_path()).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "myfinances",
///   "config_version": 1,
///   "data_file": "data.json",
///   "default_kind": "EXPENSE"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "myfinances"
    app_name: String,

    config_version: u8,

    /// Path to the data file, relative to the home directory or absolute
    data_file: PathBuf,

    #[serde(default)]
    default_kind: FinanceEnum,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            data_file: PathBuf::from(DATA_JSON),
            default_kind: FinanceEnum::Expense,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks that it belongs to this app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

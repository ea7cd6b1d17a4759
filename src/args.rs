//! These structs provide the CLI interface for the myfinances CLI.

use crate::model::{CategoryEnum, FinanceEnum};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// myfinances: record incomes and expenses and see where the money went each month.
///
/// Data lives in a JSON file inside the home directory. Run `myfinances init` once to create the
/// home directory with some sample data, then use `home` to see a month.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory with a config file and a data file seeded with sample data.
    Init,
    /// Show the totals and the per-category breakdown of a month.
    Home(HomeArgs),
    /// List the months that have data.
    Months,
    /// Show every expense of one category in a month.
    Category(CategoryArgs),
    /// Record a new income or expense.
    Insert(InsertArgs),
    /// Change an existing income or expense. Fields that are not given keep their value.
    Update(UpdateArgs),
    /// Delete an income or expense.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where myfinances data and configuration is held. Defaults to ~/myfinances
    #[arg(long, env = "MYFINANCES_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `myfinances home` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct HomeArgs {
    /// The month to show as MMYYYY, e.g. 102026. Defaults to the current month.
    #[arg(long)]
    month: Option<String>,
}

impl HomeArgs {
    pub fn new(month: Option<String>) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

/// (Not shown): Args for the `myfinances category` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoryArgs {
    /// The category, e.g. FOOD.
    #[arg(long)]
    category: CategoryEnum,

    /// The month as MMYYYY. Defaults to the current month.
    #[arg(long)]
    month: Option<String>,
}

impl CategoryArgs {
    pub fn new(category: CategoryEnum, month: Option<String>) -> Self {
        Self { category, month }
    }

    pub fn category(&self) -> CategoryEnum {
        self.category
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

/// (Not shown): Args for the `myfinances insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// EXPENSE or INCOME. Defaults to the `default_kind` in the config file.
    #[arg(long)]
    kind: Option<FinanceEnum>,

    /// The amount as typed, e.g. 12.50 or $1,200.00. Every digit counts, so always give cents.
    #[arg(long)]
    amount: String,

    /// The category, e.g. FOOD. Defaults to the first category for the kind.
    #[arg(long)]
    category: Option<CategoryEnum>,

    /// The date as YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,

    #[arg(long)]
    note: String,
}

impl InsertArgs {
    pub fn new(
        kind: Option<FinanceEnum>,
        amount: impl Into<String>,
        category: Option<CategoryEnum>,
        date: NaiveDate,
        note: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount: amount.into(),
            category,
            date,
            note: note.into(),
        }
    }

    pub fn kind(&self) -> Option<FinanceEnum> {
        self.kind
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<CategoryEnum> {
        self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// (Not shown): Args for the `myfinances update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// EXPENSE or INCOME. Defaults to the `default_kind` in the config file.
    #[arg(long)]
    kind: Option<FinanceEnum>,

    #[arg(long)]
    id: i64,

    #[arg(long)]
    amount: Option<String>,

    #[arg(long)]
    category: Option<CategoryEnum>,

    /// The date as YYYY-MM-DD.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    note: Option<String>,
}

impl UpdateArgs {
    pub fn new(kind: Option<FinanceEnum>, id: i64) -> Self {
        Self {
            kind,
            id,
            amount: None,
            category: None,
            date: None,
            note: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_category(mut self, category: CategoryEnum) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn kind(&self) -> Option<FinanceEnum> {
        self.kind
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn category(&self) -> Option<CategoryEnum> {
        self.category
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// (Not shown): Args for the `myfinances delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// EXPENSE or INCOME. Defaults to the `default_kind` in the config file.
    #[arg(long)]
    kind: Option<FinanceEnum>,

    #[arg(long)]
    id: i64,
}

impl DeleteArgs {
    pub fn new(kind: Option<FinanceEnum>, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn kind(&self) -> Option<FinanceEnum> {
        self.kind
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("myfinances"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or MYFINANCES_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("myfinances")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let args = Args::try_parse_from([
            "myfinances",
            "--home",
            "/tmp/mf",
            "insert",
            "--kind",
            "INCOME",
            "--amount",
            "12.50",
            "--category",
            "GIFT",
            "--date",
            "2026-10-03",
            "--note",
            "birthday",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/mf"));
        match args.command() {
            Command::Insert(insert) => {
                assert_eq!(insert.kind(), Some(FinanceEnum::Income));
                assert_eq!(insert.amount(), "12.50");
                assert_eq!(insert.category(), Some(CategoryEnum::Gift));
                assert_eq!(insert.date(), NaiveDate::from_ymd_opt(2026, 10, 3).unwrap());
                assert_eq!(insert.note(), "birthday");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_log_level_and_category() {
        let args = Args::try_parse_from([
            "myfinances",
            "--log-level",
            "debug",
            "category",
            "--category",
            "FOOD",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Category(c) => {
                assert_eq!(c.category(), CategoryEnum::Food);
                assert_eq!(c.month(), None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_category_is_rejected() {
        let result = Args::try_parse_from(["myfinances", "category", "--category", "PIZZA"]);
        assert!(result.is_err());
    }
}

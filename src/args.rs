//! These structs provide the CLI interface for the ledger CLI.

use crate::aggregate::YearMonth;
use crate::format::Locale;
use crate::model::TransactionType;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: record income and expenses and see where your money goes.
///
/// Transactions are stored per signed-in user in a key-value store inside the ledger home
/// directory. The dashboard shows the total of your entries, the total of your expenses, the
/// balance, and when the last transaction of each kind happened.
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
    /// Create the ledger home directory and its configuration file.
    ///
    /// This is the first command you should run. By default the ledger home is $HOME/gofinances;
    /// pass --ledger-home or set LEDGER_HOME to put it somewhere else.
    Init(InitArgs),
    /// Sign in as a user. Every other command reads and writes the ledger of this user.
    SignIn(SignInArgs),
    /// Sign out the current user.
    SignOut,
    /// Register a new income or expense transaction.
    Register(RegisterArgs),
    /// List the transactions of the signed-in user, in the order they were registered.
    List,
    /// Show the highlights: entries, expenses, balance and the last transaction dates.
    Dashboard,
    /// Show the expenses per category, optionally for one month.
    Resume(ResumeArgs),
    /// List the categories a transaction can be filed under.
    Categories,
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

    /// The directory where the ledger data and configuration is held. Defaults to ~/gofinances
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The prefix of every ledger key in the store. Defaults to @gofinances
    #[arg(long)]
    namespace: Option<String>,

    /// How amounts and dates are displayed: pt-BR or en-US
    #[arg(long, default_value_t = Locale::default())]
    locale: Locale,
}

impl InitArgs {
    pub fn new(namespace: Option<String>, locale: Locale) -> Self {
        Self { namespace, locale }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// Args for the `ledger sign-in` command.
#[derive(Debug, Parser, Clone)]
pub struct SignInArgs {
    /// The user id, as issued by your identity provider
    #[arg(long)]
    id: String,

    /// Your display name
    #[arg(long)]
    name: String,

    /// A URL to your profile photo
    #[arg(long, default_value = "")]
    photo: String,
}

impl SignInArgs {
    pub fn new(id: impl Into<String>, name: impl Into<String>, photo: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo: photo.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo(&self) -> &str {
        &self.photo
    }
}

/// Args for the `ledger register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    /// What the transaction was, e.g. "Groceries"
    #[arg(long)]
    name: String,

    /// The amount, always positive. Use --type to say whether it is income or an expense
    #[arg(long)]
    amount: String,

    /// positive (income) or negative (expense)
    #[arg(long = "type")]
    transaction_type: TransactionType,

    /// The category key, see `ledger categories`
    #[arg(long)]
    category: String,

    /// When the transaction happened, RFC 3339. Defaults to now
    #[arg(long)]
    date: Option<DateTime<Utc>>,
}

impl RegisterArgs {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        transaction_type: TransactionType,
        category: impl Into<String>,
        date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            transaction_type,
            category: category.into(),
            date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }
}

/// Args for the `ledger resume` command.
#[derive(Debug, Parser, Clone)]
pub struct ResumeArgs {
    /// Only count expenses in this month, written YYYY-MM
    #[arg(long, value_parser = parse_month)]
    month: Option<YearMonth>,
}

impl ResumeArgs {
    pub fn new(month: Option<YearMonth>) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.month
    }
}

fn parse_month(s: &str) -> Result<YearMonth, String> {
    YearMonth::from_str(s).map_err(|e| e.to_string())
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("gofinances"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("gofinances")
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

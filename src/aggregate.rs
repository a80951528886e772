//! Turns the raw records of a ledger into what the dashboard shows: the formatted transaction
//! list and the three highlight cards (entries, expenses and the net total).

use crate::error::Res;
use crate::format::Formatter;
use crate::model::{category, TransactionRecord, TransactionType, CATEGORIES};
use anyhow::{bail, Context};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::{Display, Formatter as FmtFormatter};
use std::str::FromStr;
use tracing::warn;

/// Shown instead of a date label when there are no transactions to take a date from.
pub const NO_TRANSACTIONS: &str = "No transactions";

/// The most recent transaction of some kind, or the explicit absence of one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LastTransaction {
    /// No transaction matched. This is never rendered as a date.
    None,
    At(DateTime<Utc>),
}

impl LastTransaction {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            LastTransaction::None => None,
            LastTransaction::At(date) => Some(*date),
        }
    }
}

/// One highlight card.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HighlightProps {
    pub amount: String,
    pub last_transaction: String,
}

/// The three highlight cards of the dashboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HighlightData {
    pub entries: HighlightProps,
    pub expensive: HighlightProps,
    pub total: HighlightProps,
}

/// A record with its amount and date formatted for display. The other fields are unchanged.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DisplayTransaction {
    pub id: String,
    pub name: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: String,
}

/// Everything derived from one ledger snapshot. Both views come from the same records.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Dashboard {
    pub transactions: Vec<DisplayTransaction>,
    pub highlights: HighlightData,
}

/// Builds the display list and the highlights from `records`.
///
/// The display list keeps the order of `records`. An empty slice gives zero totals and
/// `NO_TRANSACTIONS` on every label.
pub fn aggregate(records: &[TransactionRecord], formatter: &Formatter) -> Dashboard {
    let mut entries_total = Decimal::ZERO;
    let mut expensive_total = Decimal::ZERO;
    let mut transactions = Vec::with_capacity(records.len());

    for record in records {
        match record.transaction_type() {
            TransactionType::Positive => {
                entries_total = add_or_saturate(entries_total, record.amount().value())
            }
            TransactionType::Negative => {
                expensive_total = add_or_saturate(expensive_total, record.amount().value())
            }
        }
        transactions.push(DisplayTransaction {
            id: record.id().to_string(),
            name: record.name().to_string(),
            amount: formatter.format_currency(record.amount().value()),
            transaction_type: record.transaction_type(),
            category: record.category().to_string(),
            date: formatter.format_short_date(record.date()),
        });
    }

    let last_entry = last_transaction_date(records, TransactionType::Positive);
    let last_expense = last_transaction_date(records, TransactionType::Negative);

    let label = |last: LastTransaction, render: &dyn Fn(String) -> String| match last.date() {
        Some(date) => render(formatter.format_long_day_month(date)),
        None => NO_TRANSACTIONS.to_string(),
    };

    let highlights = HighlightData {
        entries: HighlightProps {
            amount: formatter.format_currency(entries_total),
            last_transaction: label(last_entry, &|d: String| format!("Last entry on {d}")),
        },
        expensive: HighlightProps {
            amount: formatter.format_currency(expensive_total),
            last_transaction: label(last_expense, &|d: String| format!("Last expense on {d}")),
        },
        // The period runs up to the last expense, not the last transaction of either kind.
        total: HighlightProps {
            amount: formatter.format_currency(sub_or_saturate(entries_total, expensive_total)),
            last_transaction: label(last_expense, &|d: String| format!("01 to {d}")),
        },
    };

    Dashboard {
        transactions,
        highlights,
    }
}

/// Adds two amounts, holding at the representable bound instead of overflowing. Validated input
/// never gets near it; ledgers written by other programs might.
fn add_or_saturate(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        warn!("Total of {total} and {amount} is out of range, the shown total is capped");
        total.saturating_add(amount)
    })
}

fn sub_or_saturate(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_sub(rhs).unwrap_or_else(|| {
        warn!("Difference of {lhs} and {rhs} is out of range, the shown total is capped");
        lhs.saturating_sub(rhs)
    })
}

/// Returns the latest `date` among the records of `transaction_type`.
pub fn last_transaction_date(
    records: &[TransactionRecord],
    transaction_type: TransactionType,
) -> LastTransaction {
    records
        .iter()
        .filter(|r| r.transaction_type() == transaction_type)
        .map(|r| r.date())
        .max()
        .map_or(LastTransaction::None, LastTransaction::At)
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Res<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month must be between 1 and 12, got {month}");
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn contains<D: Datelike>(&self, date: &D) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .with_context(|| format!("Expected a month like 2024-04, got '{s}'"))?;
        YearMonth::new(date.year(), date.month())
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The expenses of one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub name: String,
    pub color: String,
    /// The unformatted total, for charting.
    pub total: Decimal,
    pub total_formatted: String,
    /// Share of all expenses in the period, e.g. `42%`.
    pub percent: String,
}

/// Sums the expenses per category, optionally restricted to `month` (in the formatter's time
/// zone). Categories without expenses are left out; the rest follow the taxonomy order. Records
/// whose category is not in the taxonomy still count toward the period total.
pub fn summarize_by_category(
    records: &[TransactionRecord],
    month: Option<YearMonth>,
    formatter: &Formatter,
) -> Vec<CategorySummary> {
    let expenses: Vec<&TransactionRecord> = records
        .iter()
        .filter(|r| r.transaction_type() == TransactionType::Negative)
        .filter(|r| match month {
            Some(m) => m.contains(&r.date().with_timezone(&formatter.offset())),
            None => true,
        })
        .collect();

    let period_total = expenses
        .iter()
        .fold(Decimal::ZERO, |sum, r| add_or_saturate(sum, r.amount().value()));
    if period_total.is_zero() {
        return Vec::new();
    }

    CATEGORIES
        .iter()
        .filter_map(|c| {
            let total = expenses
                .iter()
                .filter(|r| r.category() == c.key)
                .fold(Decimal::ZERO, |sum, r| add_or_saturate(sum, r.amount().value()));
            if total.is_zero() {
                return None;
            }
            let percent = share(total, period_total)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            Some(CategorySummary {
                key: c.key.to_string(),
                name: c.name.to_string(),
                color: c.color.to_string(),
                total,
                total_formatted: formatter.format_currency(total),
                percent: format!("{percent}%"),
            })
        })
        .collect()
}

/// `part` as a percentage of `whole`, which must not be zero.
fn share(part: Decimal, whole: Decimal) -> Decimal {
    match part
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
    {
        Some(percent) => percent,
        // Dividing first loses a few digits but cannot overflow.
        None => part
            .checked_div(whole)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ONE_HUNDRED),
    }
}

/// Resolves the display name of a category key, falling back to the key itself.
pub fn category_name(key: &str) -> &str {
    category::find(key).map_or(key, |c| c.name)
}

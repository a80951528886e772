//! Locale-aware display formatting for amounts and dates.
//!
//! All functions here are pure: the same value and locale always give the same text.

use crate::error::Res;
use anyhow::Context;
use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The locales the formatter knows how to render.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese: `R$1.234,56`, `10/04/24`, `10 de abril`.
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// US English: `$1,234.56`, `04/10/24`, `April 10`.
    #[serde(rename = "en-US")]
    EnUs,
}

serde_plain::derive_display_from_serialize!(Locale);
serde_plain::derive_fromstr_from_deserialize!(Locale);

const PT_BR_MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const EN_US_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Locale {
    fn currency_symbol(&self) -> &'static str {
        match self {
            Locale::PtBr => "R$",
            Locale::EnUs => "$",
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Locale::PtBr => '.',
            Locale::EnUs => ',',
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Locale::PtBr => ',',
            Locale::EnUs => '.',
        }
    }

    fn month_name(&self, month0: u32) -> &'static str {
        let months = match self {
            Locale::PtBr => &PT_BR_MONTHS,
            Locale::EnUs => &EN_US_MONTHS,
        };
        months[month0 as usize % 12]
    }
}

/// Below this magnitude an amount with two decimals has at most 15 significant digits, which an
/// `f64` carries exactly.
const F64_EXACT_LIMIT: i64 = 10_000_000_000_000;

/// Renders a non-negative value with two decimals as `1,234.56`.
fn group_digits(value: Decimal) -> String {
    if value < Decimal::from(F64_EXACT_LIMIT) {
        if let Some(f) = value.to_f64() {
            return format_num::format_num!(",.2", f);
        }
    }
    let integer = value.trunc().normalize().to_string();
    let cents = (value.fract() * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{cents:02}")
}

/// Renders amounts and dates for one locale, in one time zone.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Formatter {
    locale: Locale,
    offset: FixedOffset,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl Formatter {
    /// Creates a formatter that renders dates in UTC.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            offset: Utc.fix(),
        }
    }

    /// Renders dates in the time zone given by `offset` instead of UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Formats `amount` as currency with grouping and two fractional digits, e.g. `R$1.234,56` or
    /// `-R$60,00`.
    pub fn format_currency(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits: String = group_digits(rounded.abs())
            .chars()
            .map(|c| match c {
                ',' => self.locale.group_separator(),
                '.' => self.locale.decimal_separator(),
                other => other,
            })
            .collect();
        format!("{sign}{}{digits}", self.locale.currency_symbol())
    }

    /// Parses text produced by `format_currency` back into a value.
    pub fn parse_currency(&self, text: &str) -> Res<Decimal> {
        let trimmed = text.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest
            .trim_start()
            .strip_prefix(self.locale.currency_symbol())
            .unwrap_or(rest)
            .trim();
        let normalized: String = rest
            .chars()
            .filter(|c| *c != self.locale.group_separator())
            .map(|c| {
                if c == self.locale.decimal_separator() {
                    '.'
                } else {
                    c
                }
            })
            .collect();
        let value = Decimal::from_str(&normalized)
            .with_context(|| format!("'{text}' is not a {} currency value", self.locale))?;
        Ok(if negative { -value } else { value })
    }

    /// Formats the day, month and two-digit year, e.g. `10/04/24` (pt-BR) or `04/10/24` (en-US).
    pub fn format_short_date(&self, date: DateTime<Utc>) -> String {
        let local = date.with_timezone(&self.offset);
        match self.locale {
            Locale::PtBr => local.format("%d/%m/%y").to_string(),
            Locale::EnUs => local.format("%m/%d/%y").to_string(),
        }
    }

    /// Formats the day of the month and the full month name, e.g. `10 de abril` or `April 10`.
    pub fn format_long_day_month(&self, date: DateTime<Utc>) -> String {
        let local = date.with_timezone(&self.offset);
        let month = self.locale.month_name(local.month0());
        match self.locale {
            Locale::PtBr => format!("{} de {month}", local.day()),
            Locale::EnUs => format!("{month} {}", local.day()),
        }
    }
}

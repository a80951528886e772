//! Read-only commands: the transaction list, the dashboard highlights and the category resume.

use crate::aggregate::{aggregate, category_name, summarize_by_category, CategorySummary, Dashboard};
use crate::args::ResumeArgs;
use crate::commands::Out;
use crate::dashboard::DashboardState;
use crate::model::{Category, TransactionType, CATEGORIES};
use crate::{Config, Result};

/// Lists the signed-in user's transactions in the order they were registered.
pub async fn list(config: &Config) -> Result<Out<Dashboard>> {
    let user = config.session().require_user().await?;
    let records = config.ledger(&user).load().await?;
    let dashboard = aggregate(&records, &config.formatter());
    if dashboard.transactions.is_empty() {
        return Ok(Out::new("No transactions yet", dashboard));
    }
    Ok(Out::new(format_list(&dashboard), dashboard))
}

/// Loads the signed-in user's ledger and shows the three highlight cards.
pub async fn dashboard(config: &Config) -> Result<Out<Dashboard>> {
    let user = config.session().require_user().await?;
    let state = DashboardState::new(config.ledger(&user), config.formatter());
    let Some(dashboard) = state.refresh().await? else {
        return Ok("The dashboard was refreshed by a newer request".into());
    };
    let h = &dashboard.highlights;
    let message = format!(
        "Hello, {}\n\
         Entries   {:>16}   {}\n\
         Expenses  {:>16}   {}\n\
         Total     {:>16}   {}",
        user.name,
        h.entries.amount,
        h.entries.last_transaction,
        h.expensive.amount,
        h.expensive.last_transaction,
        h.total.amount,
        h.total.last_transaction,
    );
    Ok(Out::new(message, Dashboard::clone(&dashboard)))
}

/// Shows the signed-in user's expenses per category.
pub async fn resume(config: &Config, args: &ResumeArgs) -> Result<Out<Vec<CategorySummary>>> {
    let user = config.session().require_user().await?;
    let records = config.ledger(&user).load().await?;
    let summary = summarize_by_category(&records, args.month(), &config.formatter());
    let period = match args.month() {
        Some(month) => format!(" in {month}"),
        None => String::new(),
    };
    if summary.is_empty() {
        return Ok(Out::new(format!("No expenses{period}"), summary));
    }
    Ok(Out::new(format_resume(&period, &summary), summary))
}

/// Lists the categories a transaction can be filed under.
pub async fn categories() -> Result<Out<Vec<Category>>> {
    let lines: Vec<String> = CATEGORIES
        .iter()
        .map(|c| format!("{:<10} {}", c.key, c.name))
        .collect();
    Ok(Out::new(lines.join("\n"), CATEGORIES.to_vec()))
}

fn format_list(dashboard: &Dashboard) -> String {
    dashboard
        .transactions
        .iter()
        .map(|t| {
            let sign = match t.transaction_type {
                TransactionType::Positive => "",
                TransactionType::Negative => "- ",
            };
            format!(
                "{}  {:<24} {:>16}  {}",
                t.date,
                t.name,
                format!("{sign}{}", t.amount),
                category_name(&t.category)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_resume(period: &str, summary: &[CategorySummary]) -> String {
    let mut lines = vec![format!("Expenses by category{period}")];
    lines.extend(
        summary
            .iter()
            .map(|s| format!("{:<10} {:>16} {:>5}", s.name, s.total_formatted, s.percent)),
    );
    lines.join("\n")
}

use crate::args::RegisterArgs;
use crate::commands::Out;
use crate::model::{NewTransaction, TransactionRecord, TransactionType};
use crate::{Config, Result};
use chrono::Utc;

/// Validates and appends a new transaction to the signed-in user's ledger.
///
/// A unique id is generated for the transaction. When `args` has no date, the transaction is
/// dated now.
///
/// # Errors
///
/// - `ErrorType::Config` if nobody is signed in.
/// - `ErrorType::Validation` if the name is blank, the amount is not a positive number, or the
///   category is unknown. Nothing is written in that case.
/// - `ErrorType::StorageRead` or `ErrorType::StorageWrite` if the store fails.
pub async fn register(config: &Config, args: &RegisterArgs) -> Result<Out<TransactionRecord>> {
    let user = config.session().require_user().await?;
    let form = NewTransaction::new(
        args.name(),
        args.amount(),
        args.transaction_type(),
        args.category(),
    );
    let date = args.date().unwrap_or_else(Utc::now);
    let record = config.ledger(&user).register(form, date).await?;

    let kind = match record.transaction_type() {
        TransactionType::Positive => "entry",
        TransactionType::Negative => "expense",
    };
    let message = format!(
        "Registered {kind} '{}' of {}",
        record.name(),
        config.formatter().format_currency(record.amount().value())
    );
    Ok(Out::new(message, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::ErrorType;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_register_appends_to_signed_in_ledger() {
        let env = TestEnv::new().await;
        let config = env.config();
        let date = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let args = RegisterArgs::new("Salary", "1500", TransactionType::Positive, "salary", Some(date));

        let out = register(&config, &args).await.unwrap();
        assert_eq!(out.message(), "Registered entry 'Salary' of R$1.500,00");

        let records = config.ledger(env.user()).load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(Some(&records[0]), out.structure());
        assert_eq!(records[0].date(), date);
    }

    #[tokio::test]
    async fn test_register_invalid_is_validation_error() {
        let env = TestEnv::new().await;
        let config = env.config();
        let args = RegisterArgs::new("Salary", "abc", TransactionType::Positive, "salary", None);
        let err = register(&config, &args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(config.ledger(env.user()).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_requires_sign_in() {
        let env = TestEnv::new().await;
        let config = env.config();
        config.session().sign_out().await.unwrap();
        let args = RegisterArgs::new("Salary", "10", TransactionType::Positive, "salary", None);
        let err = register(&config, &args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}

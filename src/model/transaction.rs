use crate::error::Res;
use crate::model::{category, Amount};
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a transaction brings money in (`Positive`) or takes money out (`Negative`).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Positive,
    Negative,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single persisted ledger entry. Records are never modified after they are written.
///
/// The JSON shape is the one shared with every other writer of the ledger:
///
/// ```json
/// {
///   "id": "5f1c3a56-8a7e-4c1e-9f49-6a7b0c7c2b8e",
///   "name": "Salary",
///   "amount": "100",
///   "type": "positive",
///   "category": "salary",
///   "date": "2024-04-01T12:00:00.000Z"
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    id: String,
    name: String,
    amount: Amount,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: String,
    date: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Amount,
        transaction_type: TransactionType,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            transaction_type,
            category: category.into(),
            date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// The raw values of a registration form, before validation.
///
/// Every field is optional or free text so that the form can be submitted half-filled and the
/// rejection explained to the user.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub amount: String,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
}

impl NewTransaction {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        transaction_type: TransactionType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            transaction_type: Some(transaction_type),
            category: Some(category.into()),
        }
    }

    /// Checks the submission and, when it is acceptable, builds the record to store with a fresh
    /// id and `date` as its timestamp.
    pub(crate) fn into_record(self, date: DateTime<Utc>) -> Res<TransactionRecord> {
        let name = self.name.trim();
        ensure!(!name.is_empty(), "Name is required");
        let amount = Amount::parse_positive(&self.amount)?;
        let transaction_type = self
            .transaction_type
            .context("Select the transaction type")?;
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => bail!("Select the category"),
            Some(key) => key,
        };
        ensure!(
            category::find(category).is_some(),
            "Unknown category '{category}'"
        );
        Ok(TransactionRecord::new(
            Uuid::new_v4().to_string(),
            name,
            amount,
            transaction_type,
            category,
            date,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_deserialize_record_with_numeric_amount() {
        let json = r#"{
            "id": "abc",
            "name": "Rent",
            "amount": 1200,
            "type": "negative",
            "category": "purchases",
            "date": "2024-04-10T15:30:00.000Z"
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), "abc");
        assert_eq!(record.amount().value(), Decimal::from(1200));
        assert_eq!(record.transaction_type(), TransactionType::Negative);
        assert_eq!(record.date(), now());
    }

    #[test]
    fn test_deserialize_record_with_string_amount() {
        let json = r#"{"id":"1","name":"Pay","amount":"99.90","type":"positive","category":"salary","date":"2024-04-10T15:30:00Z"}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.amount().value(), Decimal::from_str("99.90").unwrap());
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let record = TransactionRecord::new(
            "1",
            "Pay",
            Amount::new(Decimal::from(5)),
            TransactionType::Positive,
            "salary",
            now(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "positive");
        assert_eq!(value["amount"], "5");
        assert_eq!(value["date"], "2024-04-10T15:30:00Z");
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!(
            TransactionType::from_str("negative").unwrap(),
            TransactionType::Negative
        );
        assert!(TransactionType::from_str("sideways").is_err());
    }

    #[test]
    fn test_into_record() {
        let form = NewTransaction::new("  Lunch ", "32.5", TransactionType::Negative, "food");
        let record = form.into_record(now()).unwrap();
        assert_eq!(record.name(), "Lunch");
        assert_eq!(record.category(), "food");
        assert_eq!(record.date(), now());
        assert!(Uuid::parse_str(record.id()).is_ok());
    }

    #[test]
    fn test_into_record_ids_are_unique() {
        let form = NewTransaction::new("Lunch", "32.5", TransactionType::Negative, "food");
        let a = form.clone().into_record(now()).unwrap();
        let b = form.into_record(now()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_into_record_requires_name() {
        let form = NewTransaction::new(" ", "10", TransactionType::Positive, "salary");
        let err = form.into_record(now()).unwrap_err();
        assert!(err.to_string().contains("Name is required"));
    }

    #[test]
    fn test_into_record_requires_positive_amount() {
        let form = NewTransaction::new("Refund", "-10", TransactionType::Positive, "salary");
        assert!(form.into_record(now()).is_err());
    }

    #[test]
    fn test_into_record_requires_type() {
        let form = NewTransaction {
            name: "Pay".to_string(),
            amount: "10".to_string(),
            transaction_type: None,
            category: Some("salary".to_string()),
        };
        let err = form.into_record(now()).unwrap_err();
        assert!(err.to_string().contains("transaction type"));
    }

    #[test]
    fn test_into_record_requires_known_category() {
        let missing = NewTransaction {
            category: None,
            ..NewTransaction::new("Pay", "10", TransactionType::Positive, "")
        };
        let err = missing.into_record(now()).unwrap_err();
        assert!(err.to_string().contains("Select the category"));

        let unknown = NewTransaction::new("Pay", "10", TransactionType::Positive, "yachts");
        let err = unknown.into_record(now()).unwrap_err();
        assert!(err.to_string().contains("Unknown category"));
    }
}

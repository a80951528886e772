//! Types that represent the core data model, such as `TransactionRecord` and `Category`.
mod amount;
pub mod category;
mod transaction;
mod user;

pub use amount::{Amount, MAX_AMOUNT};
pub use category::{Category, CATEGORIES};
pub use transaction::{NewTransaction, TransactionRecord, TransactionType};
pub use user::User;

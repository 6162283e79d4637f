//! Core data models for ledgerdash
//!
//! Strongly typed entities the rest of the crate works with. Raw store rows
//! are converted into these by `loader::normalize` and nowhere else.

pub mod account;
pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod scope;
pub mod transaction;

pub use account::{Account, AssetClass, CreditCard, Investment};
pub use budget::{first_of_month, BudgetLimit};
pub use category::{Category, CategoryKind};
pub use ids::{
    AccountId, BudgetLimitId, CategoryId, CreditCardId, InvestmentId, TransactionId, UserId,
};
pub use money::Money;
pub use scope::{AccountingMode, DateWindow, Scope, ScopeError};
pub use transaction::{Transaction, TransactionFact, TransactionKind, TransactionStatus};

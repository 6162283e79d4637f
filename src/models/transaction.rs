//! Transaction model
//!
//! The full transaction record as the store keeps it, plus the narrow
//! projection the rollup engine consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, CreditCardId, InvestmentId, TransactionId};
use super::money::Money;
use super::scope::AccountingMode;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Some(Self::Income),
            "expense" | "despesa" => Some(Self::Expense),
            _ => None,
        }
    }
}

/// Settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Not yet paid or received
    #[default]
    Pending,
    /// Settled
    Paid,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendente" | "open" => Some(Self::Pending),
            "paid" | "pago" | "settled" => Some(Self::Paid),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Paid => write!(f, "Paid"),
        }
    }
}

/// A transaction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Positive magnitude; the kind carries the direction
    pub amount: Money,

    /// Nominal transaction date
    pub date: NaiveDate,

    /// Due/settlement date; falls back to `date` when absent
    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: TransactionStatus,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub account_id: Option<AccountId>,

    #[serde(default)]
    pub credit_card_id: Option<CreditCardId>,

    /// Set on both legs of an internal transfer
    #[serde(default)]
    pub transfer_id: Option<TransactionId>,

    /// Set on investment postings
    #[serde(default)]
    pub investment_id: Option<InvestmentId>,
}

impl Transaction {
    /// Create a pending transaction due on its own date
    pub fn new(kind: TransactionKind, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            date,
            due_date: date,
            status: TransactionStatus::Pending,
            description: String::new(),
            category_id: None,
            account_id: None,
            credit_card_id: None,
            transfer_id: None,
            investment_id: None,
        }
    }

    pub fn expense(amount: Money, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Expense, amount, date)
    }

    pub fn income(amount: Money, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, amount, date)
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// A genuine income/expense movement: neither a transfer leg nor an
    /// investment posting
    pub fn is_movement(&self) -> bool {
        self.transfer_id.is_none() && self.investment_id.is_none()
    }

    /// The date the accounting mode scopes this transaction by
    pub fn date_for(&self, mode: AccountingMode) -> NaiveDate {
        match mode {
            AccountingMode::Accrual => self.date,
            AccountingMode::Cash => self.due_date,
        }
    }

    /// The projection the rollup engine consumes
    pub fn fact(&self, mode: AccountingMode) -> TransactionFact {
        TransactionFact {
            category_id: self.category_id,
            amount: self.amount,
            date: self.date_for(mode),
        }
    }
}

/// Read-only projection of a transaction for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionFact {
    pub category_id: Option<CategoryId>,
    pub amount: Money,
    /// The date selected by the accounting mode
    pub date: NaiveDate,
}

impl TransactionFact {
    pub fn new(category_id: CategoryId, amount: Money, date: NaiveDate) -> Self {
        Self {
            category_id: Some(category_id),
            amount,
            date,
        }
    }
}

//! Account, investment and credit card models
//!
//! Only the fields the dashboard blends into its summary are modelled.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CreditCardId, InvestmentId};
use super::money::Money;

/// A bank or cash account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Current balance, any sign
    pub balance: Money,
}

impl Account {
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            balance,
        }
    }
}

/// Fixed enumeration of asset classes used for allocation charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    FixedIncome,
    Equities,
    RealEstateFunds,
    Crypto,
    Other,
}

impl AssetClass {
    /// All classes in chart order
    pub fn all() -> &'static [Self] {
        &[
            Self::FixedIncome,
            Self::Equities,
            Self::RealEstateFunds,
            Self::Crypto,
            Self::Other,
        ]
    }

    /// Map a stored label to a class; unknown labels land in `Other`
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "fixed_income" | "renda_fixa" => Self::FixedIncome,
            "equities" | "stocks" | "acoes" | "ações" => Self::Equities,
            "real_estate_funds" | "reits" | "fiis" | "fii" => Self::RealEstateFunds,
            "crypto" | "cripto" => Self::Crypto,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FixedIncome => "Fixed income",
            Self::Equities => "Equities",
            Self::RealEstateFunds => "Real estate funds",
            Self::Crypto => "Crypto",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An investment holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_class: AssetClass,
    /// Unit value
    pub value: Money,
    pub quantity: f64,
}

impl Investment {
    pub fn new(name: impl Into<String>, asset_class: AssetClass, value: Money, quantity: f64) -> Self {
        Self {
            id: InvestmentId::new(),
            name: name.into(),
            asset_class,
            value,
            quantity,
        }
    }

    /// `value × quantity`
    pub fn position(&self) -> Money {
        self.value.times(self.quantity)
    }
}

/// A credit card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: CreditCardId,
    pub name: String,
    pub credit_limit: Money,
}

impl CreditCard {
    pub fn new(name: impl Into<String>, credit_limit: Money) -> Self {
        Self {
            id: CreditCardId::new(),
            name: name.into(),
            credit_limit,
        }
    }
}

//! Budget limit model
//!
//! A budget limit is the planned amount for one category in one month. Limits
//! are stored per month even when the dashboard shows a whole year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetLimitId, CategoryId, UserId};
use super::money::Money;

/// Planned amount for a category in a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub id: BudgetLimitId,

    /// Owner; part of the upsert key together with category and month
    #[serde(default)]
    pub user_id: Option<UserId>,

    pub category_id: CategoryId,

    /// Non-negative planned amount
    pub amount: Money,

    /// Always the first day of the month
    pub month: NaiveDate,
}

impl BudgetLimit {
    /// Create a limit, normalizing `month` to the first of its month
    pub fn new(category_id: CategoryId, month: NaiveDate, amount: Money) -> Self {
        Self {
            id: BudgetLimitId::new(),
            user_id: None,
            category_id,
            amount,
            month: first_of_month(month),
        }
    }

    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.amount.is_negative() {
            return Err(BudgetValidationError::NegativeAmount);
        }
        if self.month.day() != 1 {
            return Err(BudgetValidationError::NotFirstOfMonth(self.month));
        }
        Ok(())
    }
}

impl fmt::Display for BudgetLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.month.format("%Y-%m"), self.amount)
    }
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Validation errors for budget limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeAmount,
    NotFirstOfMonth(NaiveDate),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount => write!(f, "Budget amount cannot be negative"),
            Self::NotFirstOfMonth(date) => {
                write!(f, "Budget month must be the first of a month, got {}", date)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}

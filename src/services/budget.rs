//! Budget service
//!
//! Writes monthly budget limits. Writes go straight to the store and mark
//! the board stale; they never refresh it.

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::loader::normalize;
use crate::models::{BudgetLimit, CategoryId, Money, Scope};
use crate::services::BudgetBoard;
use crate::store::{tables, Filter, Query, RemoteStore};

/// Columns identifying one limit row
pub const LIMIT_CONFLICT_KEYS: &[&str] = &["user_id", "category_id", "month"];

/// Service for budget limits
pub struct BudgetService<'a, S> {
    board: &'a BudgetBoard<S>,
}

impl<'a, S: RemoteStore> BudgetService<'a, S> {
    pub fn new(board: &'a BudgetBoard<S>) -> Self {
        Self { board }
    }

    /// Set the planned amount for a category in the scope's month
    ///
    /// Needs a signed-in principal and a single-month scope. The row is
    /// upserted on (user, category, month), so setting twice replaces.
    pub fn set_budget_limit(
        &self,
        scope: Scope,
        category_id: CategoryId,
        amount: Money,
    ) -> LedgerResult<BudgetLimit> {
        let store = self.board.store();
        let user = store.session().ok_or(LedgerError::Unauthenticated)?;

        if amount.is_negative() {
            return Err(LedgerError::Validation(format!(
                "Budget amount cannot be negative: {}",
                amount
            )));
        }
        let month = scope.budget_month().ok_or_else(|| {
            LedgerError::Validation(format!(
                "Budget limits are set per month; {} is a full year",
                scope
            ))
        })?;

        let exists = store.select(
            &Query::table(tables::CATEGORIES)
                .filter(Filter::eq("id", category_id.to_row_value()))
                .limit(1),
        )?;
        if exists.is_empty() {
            return Err(LedgerError::category_not_found(category_id.to_string()));
        }

        let limit = BudgetLimit::new(category_id, month, amount).owned_by(user);
        limit
            .validate()
            .map_err(|e| LedgerError::Budget(e.to_string()))?;

        let rows = store.upsert(
            tables::BUDGET_LIMITS,
            vec![normalize::budget_limit_row(&limit)],
            LIMIT_CONFLICT_KEYS,
        )?;
        let saved = rows
            .first()
            .and_then(normalize::budget_limit)
            .unwrap_or(limit);

        info!(category = %category_id, %month, amount = %amount, "budget limit set");
        self.board.invalidate();
        Ok(saved)
    }
}

//! Rollup Engine
//!
//! Merges flat category, budget-limit and transaction facts into a two-level
//! planned-vs-actual view. A parent's `actual` always includes the actual of
//! every child folded into it; a parent's `planned` only counts limits set
//! directly on the parent.
//!
//! Everything here is a pure function of its inputs. `compute` is the single
//! entry point the board calls after the loader returns.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::directory::CategoryDirectory;
use crate::error::LedgerResult;
use crate::loader::BudgetFacts;
use crate::models::{
    AccountingMode, BudgetLimit, Category, CategoryId, CategoryKind, Money, Scope,
    TransactionFact,
};
use crate::view::{self, Insights};

/// Planned vs actual for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpending {
    pub category_id: CategoryId,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub planned: Money,
    pub actual: Money,
}

impl CategorySpending {
    fn from_category(category: &Category) -> Self {
        Self {
            category_id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            planned: Money::zero(),
            actual: Money::zero(),
        }
    }

    /// Any planned or actual amount in the period
    pub fn has_activity(&self) -> bool {
        !self.planned.is_zero() || !self.actual.is_zero()
    }

    pub fn percentage(&self) -> i64 {
        view::percentage(self.actual, self.planned)
    }
}

/// A root category with its retained children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentCategorySpending {
    pub category_id: CategoryId,
    pub name: String,
    pub color: String,
    pub icon: String,
    /// Limits set directly on this category
    pub planned: Money,
    /// Own actual plus the actual of every child
    pub actual: Money,
    /// Transactions booked directly on this category
    pub own_actual: Money,
    /// Children with planned or actual activity, highest actual first
    pub children: Vec<CategorySpending>,
}

impl ParentCategorySpending {
    fn from_spending(own: &CategorySpending) -> Self {
        Self {
            category_id: own.category_id,
            name: own.name.clone(),
            color: own.color.clone(),
            icon: own.icon.clone(),
            planned: own.planned,
            actual: own.actual,
            own_actual: own.actual,
            children: Vec::new(),
        }
    }

    /// Flat view of the root's own totals
    pub fn as_spending(&self) -> CategorySpending {
        CategorySpending {
            category_id: self.category_id,
            name: self.name.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
            planned: self.planned,
            actual: self.actual,
        }
    }

    fn is_empty(&self) -> bool {
        self.planned.is_zero() && self.actual.is_zero() && self.children.is_empty()
    }

    pub fn percentage(&self) -> i64 {
        view::percentage(self.actual, self.planned)
    }
}

/// Fold categories, limits and facts into sorted roots
///
/// Limits and facts are summed as given: for a full-year scope every
/// month-row of a category adds into the same `planned`. Facts whose
/// category does not resolve are dropped. Ties on `actual` keep directory
/// order.
pub fn rollup(
    directory: &CategoryDirectory,
    limits: &[BudgetLimit],
    facts: &[TransactionFact],
) -> Vec<ParentCategorySpending> {
    let mut entries: Vec<CategorySpending> =
        directory.iter().map(CategorySpending::from_category).collect();
    let position: HashMap<CategoryId, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.category_id, i))
        .collect();

    for limit in limits {
        if let Some(&i) = position.get(&limit.category_id) {
            entries[i].planned += limit.amount;
        }
    }

    let mut dropped = 0usize;
    for fact in facts {
        match fact.category_id.and_then(|id| position.get(&id)) {
            Some(&i) => entries[i].actual += fact.amount,
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "transactions without a resolvable category skipped");
    }

    let mut roots: Vec<ParentCategorySpending> = Vec::new();
    let mut root_position: HashMap<CategoryId, usize> = HashMap::new();
    for entry in &entries {
        if directory.parent_of(entry.category_id).is_none() {
            root_position.insert(entry.category_id, roots.len());
            roots.push(ParentCategorySpending::from_spending(entry));
        }
    }

    for entry in entries {
        let Some(parent) = directory.parent_of(entry.category_id) else {
            continue;
        };
        let Some(&i) = root_position.get(&parent.id) else {
            continue;
        };
        let root = &mut roots[i];
        root.actual += entry.actual;
        if entry.has_activity() {
            root.children.push(entry);
        }
    }

    for root in &mut roots {
        root.children.sort_by(|a, b| b.actual.cmp(&a.actual));
    }
    roots.retain(|root| !root.is_empty());
    roots.sort_by(|a, b| b.actual.cmp(&a.actual));
    roots
}

/// Immutable result of one fetch cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSnapshot {
    pub scope: Scope,
    pub mode: AccountingMode,
    pub kind: CategoryKind,
    pub roots: Vec<ParentCategorySpending>,
    pub total_planned: Money,
    pub total_actual: Money,
    pub insights: Insights,
}

impl BudgetSnapshot {
    pub fn find_root(&self, id: CategoryId) -> Option<&ParentCategorySpending> {
        self.roots.iter().find(|r| r.category_id == id)
    }

    pub fn total_percentage(&self) -> i64 {
        view::percentage(self.total_actual, self.total_planned)
    }
}

/// `compute(scope, mode, facts) -> snapshot`
///
/// Applies the scope window once more so a loader that over-fetches cannot
/// leak rows from outside the period into the totals.
pub fn compute(
    scope: Scope,
    mode: AccountingMode,
    facts: &BudgetFacts,
) -> LedgerResult<BudgetSnapshot> {
    let directory = CategoryDirectory::new(facts.categories.clone())?;
    let window = scope.window();
    let wanted = facts.kind.transaction_kind();

    let limits: Vec<BudgetLimit> = facts
        .limits
        .iter()
        .filter(|l| window.contains(l.month))
        .cloned()
        .collect();

    let transaction_facts: Vec<TransactionFact> = facts
        .transactions
        .iter()
        .filter(|t| t.kind == wanted && t.is_movement())
        .map(|t| t.fact(mode))
        .filter(|f| window.contains(f.date))
        .collect();

    let roots = rollup(&directory, &limits, &transaction_facts);
    let total_planned = roots.iter().map(|r| r.planned).sum();
    let total_actual = roots.iter().map(|r| r.actual).sum();
    let insights = view::insights(&roots);

    Ok(BudgetSnapshot {
        scope,
        mode,
        kind: facts.kind,
        roots,
        total_planned,
        total_actual,
        insights,
    })
}

//! View Model Emitter
//!
//! Side-effect-free shaping of rollup and dashboard output into the lists
//! and series presentation layers draw: drill-down lists, budget chart
//! points, allocation slices and insight lists.

use serde::Serialize;

use crate::dashboard::AllocationEntry;
use crate::models::{CategoryId, Money};
use crate::rollup::{CategorySpending, ParentCategorySpending};

/// Label of the single slice shown when nothing is invested
pub const EMPTY_ALLOCATION_LABEL: &str = "No investments";

/// `round(actual / planned × 100)`, 0 when nothing is planned
pub fn percentage(actual: Money, planned: Money) -> i64 {
    actual.percent_of(planned)
}

/// Spent more than a positive plan
pub fn is_over_budget(actual: Money, planned: Money) -> bool {
    planned.is_positive() && actual > planned
}

/// Spent less than half of a positive plan
pub fn is_healthy(actual: Money, planned: Money) -> bool {
    planned.is_positive() && actual.cents().saturating_mul(2) < planned.cents()
}

/// One category flagged by an insight classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub category_id: CategoryId,
    pub name: String,
    pub planned: Money,
    pub actual: Money,
    pub percentage: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub over_budget: Vec<Insight>,
    pub healthy: Vec<Insight>,
}

/// Classify roots; order follows the root list
pub fn insights(roots: &[ParentCategorySpending]) -> Insights {
    let mut result = Insights::default();
    for root in roots {
        let insight = || Insight {
            category_id: root.category_id,
            name: root.name.clone(),
            planned: root.planned,
            actual: root.actual,
            percentage: root.percentage(),
        };
        if is_over_budget(root.actual, root.planned) {
            result.over_budget.push(insight());
        } else if is_healthy(root.actual, root.planned) {
            result.healthy.push(insight());
        }
    }
    result
}

/// The list a drill-down view shows
///
/// With no selection, or a selection that is not among the roots, this is
/// the root list. Otherwise it is the selected root's children.
pub fn drill_down(
    roots: &[ParentCategorySpending],
    selected: Option<CategoryId>,
) -> Vec<CategorySpending> {
    let selected_root = selected.and_then(|id| roots.iter().find(|r| r.category_id == id));
    match selected_root {
        Some(root) => root.children.clone(),
        None => roots.iter().map(ParentCategorySpending::as_spending).collect(),
    }
}

/// A planned-vs-actual bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub planned: Money,
    pub actual: Money,
}

pub fn budget_chart(roots: &[ParentCategorySpending]) -> Vec<ChartPoint> {
    roots
        .iter()
        .map(|root| ChartPoint {
            label: root.name.clone(),
            planned: root.planned,
            actual: root.actual,
        })
        .collect()
}

/// A pie slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    /// Slice weight in currency units
    pub value: f64,
    pub percentage: i64,
    pub placeholder: bool,
}

/// Allocation slices, or one placeholder slice of value 100 when the total is zero
pub fn allocation_chart(allocation: &[AllocationEntry]) -> Vec<ChartSlice> {
    let total: Money = allocation.iter().map(|entry| entry.value).sum();
    if total.is_zero() {
        return vec![ChartSlice {
            label: EMPTY_ALLOCATION_LABEL.to_string(),
            value: 100.0,
            percentage: 100,
            placeholder: true,
        }];
    }

    allocation
        .iter()
        .map(|entry| ChartSlice {
            label: entry.asset_class.label().to_string(),
            value: entry.value.to_decimal(),
            percentage: entry.value.percent_of(total),
            placeholder: false,
        })
        .collect()
}

//! Budget snapshot display
//!
//! Renders the two-level planned-vs-actual view as an indented table with
//! progress bars, followed by totals and insight lines.

use super::format::{fit, format_bar, format_percentage};
use crate::rollup::{BudgetSnapshot, CategorySpending};
use crate::view;

const NAME_WIDTH: usize = 24;
const BAR_WIDTH: usize = 12;

fn line(name: &str, planned: String, actual: String, pct: &str, bar: &str) -> String {
    format!(
        "{:<name_w$}  {:>12}  {:>12}  {:>6}  {}\n",
        name,
        planned,
        actual,
        pct,
        bar,
        name_w = NAME_WIDTH
    )
}

/// Format a full snapshot
pub fn format_budget_snapshot(snapshot: &BudgetSnapshot, symbol: &str) -> String {
    let mut output = format!(
        "Budget {} ({} basis)\n\n",
        snapshot.scope, snapshot.mode
    );

    if snapshot.roots.is_empty() {
        output.push_str("No planned or actual spending in this period.\n");
        return output;
    }

    output.push_str(&line(
        "Category",
        "Planned".into(),
        "Actual".into(),
        "%",
        "",
    ));
    output.push_str(&format!("{:-<1$}\n", "", NAME_WIDTH + 2 + 12 + 2 + 12 + 2 + 6 + 2 + BAR_WIDTH));

    for root in &snapshot.roots {
        let pct = root.percentage();
        let marker = if view::is_over_budget(root.actual, root.planned) {
            " !"
        } else {
            ""
        };
        output.push_str(&line(
            &fit(&format!("{}{}", root.name, marker), NAME_WIDTH),
            root.planned.format_with_symbol(symbol),
            root.actual.format_with_symbol(symbol),
            &format_percentage(pct, root.planned.is_zero()),
            &format_bar(pct, BAR_WIDTH),
        ));

        for (i, child) in root.children.iter().enumerate() {
            let prefix = if i + 1 == root.children.len() {
                "└─ "
            } else {
                "├─ "
            };
            let pct = child.percentage();
            output.push_str(&line(
                &fit(&format!("  {}{}", prefix, child.name), NAME_WIDTH),
                child.planned.format_with_symbol(symbol),
                child.actual.format_with_symbol(symbol),
                &format_percentage(pct, child.planned.is_zero()),
                "",
            ));
        }
    }

    output.push('\n');
    output.push_str(&line(
        "Total",
        snapshot.total_planned.format_with_symbol(symbol),
        snapshot.total_actual.format_with_symbol(symbol),
        &format_percentage(snapshot.total_percentage(), snapshot.total_planned.is_zero()),
        &format_bar(snapshot.total_percentage(), BAR_WIDTH),
    ));

    let insights = &snapshot.insights;
    if !insights.over_budget.is_empty() {
        output.push_str("\nOver budget:\n");
        for item in &insights.over_budget {
            output.push_str(&format!(
                "  {} ({}% of {})\n",
                item.name,
                item.percentage,
                item.planned.format_with_symbol(symbol)
            ));
        }
    }
    if !insights.healthy.is_empty() {
        output.push_str("\nWell under budget:\n");
        for item in &insights.healthy {
            output.push_str(&format!("  {} ({}%)\n", item.name, item.percentage));
        }
    }

    output
}

/// Format a drill-down list (roots, or one root's children)
pub fn format_spending_list(title: &str, items: &[CategorySpending], symbol: &str) -> String {
    let mut output = format!("{}\n\n", title);
    if items.is_empty() {
        output.push_str("Nothing to show.\n");
        return output;
    }

    output.push_str(&line("Category", "Planned".into(), "Actual".into(), "%", ""));
    for item in items {
        let pct = item.percentage();
        output.push_str(&line(
            &fit(&item.name, NAME_WIDTH),
            item.planned.format_with_symbol(symbol),
            item.actual.format_with_symbol(symbol),
            &format_percentage(pct, item.planned.is_zero()),
            &format_bar(pct, BAR_WIDTH),
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::BudgetFacts;
    use crate::models::{
        AccountingMode, BudgetLimit, Category, CategoryKind, Money, Scope, Transaction,
    };
    use crate::rollup::compute;
    use chrono::NaiveDate;

    fn snapshot() -> BudgetSnapshot {
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let food = Category::new("Food", CategoryKind::Expense);
        let groceries = Category::child_of("Groceries", &food);
        let restaurants = Category::child_of("Restaurants", &food);
        let facts = BudgetFacts {
            kind: CategoryKind::Expense,
            categories: vec![food.clone(), groceries.clone(), restaurants.clone()],
            limits: vec![BudgetLimit::new(food.id, day, Money::from_units(500))],
            transactions: vec![
                Transaction::expense(Money::from_units(300), day).in_category(groceries.id),
                Transaction::expense(Money::from_units(250), day).in_category(restaurants.id),
            ],
        };
        compute(Scope::month(2025, 3).unwrap(), AccountingMode::Accrual, &facts).unwrap()
    }

    #[test]
    fn test_snapshot_rendering() {
        let text = format_budget_snapshot(&snapshot(), "$");

        assert!(text.starts_with("Budget 2025-03 (accrual basis)"));
        assert!(text.contains("Food !"));
        assert!(text.contains("├─ Groceries"));
        assert!(text.contains("└─ Restaurants"));
        assert!(text.contains("$550.00"));
        assert!(text.contains("Over budget:\n  Food (110% of $500.00)"));
    }

    #[test]
    fn test_drill_down_rendering() {
        let snap = snapshot();
        let children = view::drill_down(&snap.roots, Some(snap.roots[0].category_id));
        let text = format_spending_list("Food", &children, "$");
        assert!(text.contains("Groceries"));
        assert!(!text.contains("Food !"));
    }
}

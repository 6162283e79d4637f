//! Dashboard display

use super::format::{fit, format_bar};
use crate::dashboard::DashboardSnapshot;
use crate::view;

/// Format the current-month summary
pub fn format_dashboard(snapshot: &DashboardSnapshot, symbol: &str) -> String {
    let money = |m: crate::models::Money| m.format_with_symbol(symbol);
    let mut output = format!("Dashboard for {} (month {})\n\n", snapshot.today, snapshot.scope);

    output.push_str(&format!("  Total balance:      {:>14}\n", money(snapshot.total_balance)));
    output.push_str(&format!("  Income this month:  {:>14}\n", money(snapshot.monthly_income)));
    output.push_str(&format!("  Expenses this month:{:>14}\n", money(snapshot.monthly_expenses)));
    output.push_str(&format!("  Net this month:     {:>14}\n", money(snapshot.monthly_net())));
    output.push_str(&format!("  Due today:          {:>14}\n", money(snapshot.due_today)));

    output.push_str("\nCredit cards\n");
    output.push_str(&format!("  Limit:              {:>14}\n", money(snapshot.credit_limit_total)));
    output.push_str(&format!("  Open balance:       {:>14}\n", money(snapshot.credit_used)));
    output.push_str(&format!("  Due this month:     {:>14}\n", money(snapshot.credit_used_this_month)));
    output.push_str(&format!("  Available:          {:>14}\n", money(snapshot.credit_available())));

    output.push_str(&format!(
        "\nInvestments ({})\n",
        money(snapshot.investments_total)
    ));
    for slice in view::allocation_chart(&snapshot.allocation) {
        output.push_str(&format!(
            "  {:<20} {:>4}%  {}\n",
            slice.label,
            slice.percentage,
            format_bar(slice.percentage, 20)
        ));
    }

    output.push_str("\nSpending by category\n");
    if snapshot.expense_breakdown.is_empty() {
        output.push_str("  No expenses this month.\n");
    }
    for entry in &snapshot.expense_breakdown {
        output.push_str(&format!("  {:<24} {:>14}\n", fit(&entry.name, 24), money(entry.value)));
        for child in &entry.children {
            output.push_str(&format!(
                "    {:<22} {:>14}\n",
                fit(&child.name, 22),
                money(child.value)
            ));
        }
    }

    output.push_str("\nBudgets\n");
    if snapshot.top_budgets.is_empty() {
        output.push_str("  No budgets set for this month.\n");
    }
    for item in &snapshot.top_budgets {
        output.push_str(&format!(
            "  {:<20} {:>4}%  {}  {} of {}\n",
            fit(&item.name, 20),
            item.percentage,
            format_bar(item.percentage, 12),
            money(item.spent),
            money(item.limit)
        ));
    }

    output
}

//! Dashboard Aggregator
//!
//! A current-month summary that blends balances, investment allocation,
//! credit-card utilization and a name-keyed expense breakdown. It shares the
//! parent/child folding idea with the rollup engine but keeps its own,
//! lighter rollups: the scope is always the month containing `today` and
//! transactions are scoped by due date.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::directory::CategoryDirectory;
use crate::error::LedgerResult;
use crate::loader::DashboardFacts;
use crate::models::{AssetClass, CategoryId, Money, Scope, Transaction, TransactionKind};

/// Value held in one asset class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationEntry {
    pub asset_class: AssetClass,
    pub value: Money,
}

/// A child slice of the expense breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownChild {
    pub name: String,
    pub value: Money,
}

/// A root slice of the expense breakdown, keyed by category name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub color: String,
    /// Own spending plus every child's
    pub value: Money,
    pub children: Vec<BreakdownChild>,
}

/// How far a month's budget has been used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetAdherence {
    pub category_id: CategoryId,
    pub name: String,
    pub limit: Money,
    pub spent: Money,
    pub percentage: i64,
}

/// Current-month summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub today: NaiveDate,
    pub scope: Scope,
    pub total_balance: Money,
    pub investments_total: Money,
    /// Non-empty asset classes in chart order
    pub allocation: Vec<AllocationEntry>,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    pub due_today: Money,
    pub credit_limit_total: Money,
    pub credit_used: Money,
    pub credit_used_this_month: Money,
    pub expense_breakdown: Vec<BreakdownEntry>,
    pub top_budgets: Vec<BudgetAdherence>,
}

impl DashboardSnapshot {
    pub fn monthly_net(&self) -> Money {
        self.monthly_income - self.monthly_expenses
    }

    pub fn credit_available(&self) -> Money {
        self.credit_limit_total - self.credit_used
    }
}

fn total<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Money {
    txns.into_iter().map(|t| t.amount).sum()
}

fn expenses(txns: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    txns.iter().filter(|t| t.kind == TransactionKind::Expense)
}

/// Build the summary; `top_n` bounds the budget-adherence list
pub fn compute_dashboard(facts: &DashboardFacts, top_n: usize) -> LedgerResult<DashboardSnapshot> {
    let directory = CategoryDirectory::new(facts.categories.clone())?;
    let scope = Scope::containing(facts.today);

    let month: Vec<Transaction> = facts
        .month_transactions
        .iter()
        .filter(|t| t.is_movement() && scope.contains(t.due_date))
        .cloned()
        .collect();
    let month_expenses: Vec<Transaction> = expenses(&month).cloned().collect();

    let due_today = total(
        expenses(&facts.due_today)
            .filter(|t| t.status.is_open() && t.due_date == facts.today),
    );

    let credit_used = total(
        expenses(&facts.open_card_transactions)
            .filter(|t| t.credit_card_id.is_some() && t.status.is_open()),
    );
    let credit_used_this_month = total(
        expenses(&facts.month_card_transactions)
            .filter(|t| t.credit_card_id.is_some() && scope.contains(t.due_date)),
    );

    let allocation = allocation(facts);

    Ok(DashboardSnapshot {
        today: facts.today,
        scope,
        total_balance: facts.accounts.iter().map(|a| a.balance).sum(),
        investments_total: allocation.iter().map(|e| e.value).sum(),
        allocation,
        monthly_income: total(month.iter().filter(|t| t.kind == TransactionKind::Income)),
        monthly_expenses: total(&month_expenses),
        due_today,
        credit_limit_total: facts.credit_cards.iter().map(|c| c.credit_limit).sum(),
        credit_used,
        credit_used_this_month,
        expense_breakdown: expense_breakdown(&directory, &month_expenses),
        top_budgets: top_budgets(&directory, facts, &month_expenses, top_n),
    })
}

fn allocation(facts: &DashboardFacts) -> Vec<AllocationEntry> {
    AssetClass::all()
        .iter()
        .map(|&asset_class| AllocationEntry {
            asset_class,
            value: facts
                .investments
                .iter()
                .filter(|i| i.asset_class == asset_class)
                .map(|i| i.position())
                .sum(),
        })
        .filter(|entry| !entry.value.is_zero())
        .collect()
}

/// Two-level breakdown keyed by name; children are kept even at zero
pub fn expense_breakdown(
    directory: &CategoryDirectory,
    txns: &[Transaction],
) -> Vec<BreakdownEntry> {
    let mut spent: HashMap<CategoryId, Money> = HashMap::new();
    for txn in txns {
        if let Some(id) = txn.category_id.filter(|id| directory.contains(*id)) {
            *spent.entry(id).or_default() += txn.amount;
        }
    }

    let mut entries: Vec<BreakdownEntry> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    for category in directory.iter() {
        let Some(&amount) = spent.get(&category.id) else {
            continue;
        };
        let parent = directory.parent_of(category.id);
        let root = parent.unwrap_or(category);
        let i = *by_name.entry(root.name.clone()).or_insert_with(|| {
            entries.push(BreakdownEntry {
                name: root.name.clone(),
                color: root.color.clone(),
                value: Money::zero(),
                children: Vec::new(),
            });
            entries.len() - 1
        });
        let entry = &mut entries[i];
        entry.value += amount;

        if parent.is_some() {
            match entry.children.iter_mut().find(|c| c.name == category.name) {
                Some(child) => child.value += amount,
                None => entry.children.push(BreakdownChild {
                    name: category.name.clone(),
                    value: amount,
                }),
            }
        }
    }

    for entry in &mut entries {
        entry.children.sort_by(|a, b| b.value.cmp(&a.value));
    }
    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries
}

/// Highest-percentage budgets of the month
///
/// A budget's `spent` counts transactions booked on its category or on any
/// child of it.
pub fn top_budgets(
    directory: &CategoryDirectory,
    facts: &DashboardFacts,
    month_expenses: &[Transaction],
    top_n: usize,
) -> Vec<BudgetAdherence> {
    let month = Scope::containing(facts.today);
    let mut items: Vec<BudgetAdherence> = facts
        .limits
        .iter()
        .filter(|limit| month.contains(limit.month))
        .filter_map(|limit| {
            let category = directory.get(limit.category_id)?;
            let spent = total(month_expenses.iter().filter(|t| {
                t.category_id.is_some_and(|id| {
                    id == limit.category_id
                        || directory
                            .parent_of(id)
                            .is_some_and(|p| p.id == limit.category_id)
                })
            }));
            Some(BudgetAdherence {
                category_id: limit.category_id,
                name: category.name.clone(),
                limit: limit.amount,
                spent,
                percentage: spent.percent_of(limit.amount),
            })
        })
        .collect();

    items.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    items.truncate(top_n);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Account, BudgetLimit, Category, CategoryKind, CreditCard, Investment,
        TransactionId, TransactionStatus,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    fn empty_facts(today: NaiveDate) -> DashboardFacts {
        DashboardFacts {
            today,
            accounts: Vec::new(),
            investments: Vec::new(),
            credit_cards: Vec::new(),
            categories: Vec::new(),
            limits: Vec::new(),
            month_transactions: Vec::new(),
            due_today: Vec::new(),
            open_card_transactions: Vec::new(),
            month_card_transactions: Vec::new(),
        }
    }

    #[test]
    fn test_balances_and_allocation() {
        let mut facts = empty_facts(date(2025, 3, 10));
        facts.accounts = vec![
            Account::new("Checking", units(1200)),
            Account::new("Overdraft", units(-200)),
        ];
        facts.investments = vec![
            Investment::new("Bond", AssetClass::FixedIncome, units(100), 3.0),
            Investment::new("BTC", AssetClass::Crypto, units(500), 0.5),
            Investment::new("Sold", AssetClass::Equities, units(40), 0.0),
        ];

        let snapshot = compute_dashboard(&facts, 4).unwrap();

        assert_eq!(snapshot.total_balance, units(1000));
        assert_eq!(snapshot.investments_total, units(550));
        let classes: Vec<_> = snapshot.allocation.iter().map(|e| e.asset_class).collect();
        assert_eq!(classes, vec![AssetClass::FixedIncome, AssetClass::Crypto]);
    }

    #[test]
    fn test_monthly_totals_and_due_today() {
        let today = date(2025, 3, 10);
        let mut facts = empty_facts(today);
        let mut transfer = Transaction::expense(units(999), date(2025, 3, 2));
        transfer.transfer_id = Some(TransactionId::new());
        let mut paid = Transaction::expense(units(15), today);
        paid.status = TransactionStatus::Paid;

        facts.month_transactions = vec![
            Transaction::income(units(3000), date(2025, 3, 5)),
            Transaction::expense(units(120), date(2025, 2, 25)).due_on(date(2025, 3, 5)),
            transfer,
        ];
        facts.due_today = vec![
            Transaction::expense(units(40), date(2025, 3, 1)).due_on(today),
            paid,
        ];

        let snapshot = compute_dashboard(&facts, 4).unwrap();

        assert_eq!(snapshot.monthly_income, units(3000));
        assert_eq!(snapshot.monthly_expenses, units(120));
        assert_eq!(snapshot.monthly_net(), units(2880));
        assert_eq!(snapshot.due_today, units(40));
    }

    #[test]
    fn test_credit_figures() {
        let today = date(2025, 3, 10);
        let mut facts = empty_facts(today);
        let card = CreditCard::new("Visa", units(5000));
        facts.credit_cards = vec![card.clone(), CreditCard::new("Amex", units(2000))];

        let on_card = |amount: i64, due: NaiveDate| {
            let mut txn = Transaction::expense(units(amount), due);
            txn.credit_card_id = Some(card.id);
            txn
        };
        facts.open_card_transactions = vec![on_card(300, date(2025, 1, 5)), on_card(200, today)];
        facts.month_card_transactions = vec![on_card(200, today)];

        let snapshot = compute_dashboard(&facts, 4).unwrap();

        assert_eq!(snapshot.credit_limit_total, units(7000));
        assert_eq!(snapshot.credit_used, units(500));
        assert_eq!(snapshot.credit_used_this_month, units(200));
        assert_eq!(snapshot.credit_available(), units(6500));
    }

    #[test]
    fn test_expense_breakdown_by_name() {
        let food = Category::new("Food", CategoryKind::Expense).with_style("#0a0", "");
        let groceries = Category::child_of("Groceries", &food);
        let restaurants = Category::child_of("Restaurants", &food);
        let rent = Category::new("Rent", CategoryKind::Expense);
        let dir = CategoryDirectory::new(vec![
            food.clone(),
            groceries.clone(),
            rent.clone(),
            restaurants.clone(),
        ])
        .unwrap();

        let day = date(2025, 3, 3);
        let txns = vec![
            Transaction::expense(units(300), day).in_category(groceries.id),
            Transaction::expense(units(0), day).in_category(restaurants.id),
            Transaction::expense(units(900), day).in_category(rent.id),
            Transaction::expense(units(50), day).in_category(food.id),
            Transaction::expense(units(70), day).in_category(CategoryId::new()),
        ];

        let breakdown = expense_breakdown(&dir, &txns);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].name, "Rent");
        assert_eq!(breakdown[1].name, "Food");
        assert_eq!(breakdown[1].value, units(350));
        assert_eq!(breakdown[1].color, "#0a0");
        let children: Vec<_> = breakdown[1]
            .children
            .iter()
            .map(|c| (c.name.as_str(), c.value))
            .collect();
        assert_eq!(children, vec![("Groceries", units(300)), ("Restaurants", Money::zero())]);
    }

    #[test]
    fn test_top_budgets_count_children_and_rank() {
        let today = date(2025, 3, 10);
        let food = Category::new("Food", CategoryKind::Expense);
        let groceries = Category::child_of("Groceries", &food);
        let rent = Category::new("Rent", CategoryKind::Expense);
        let fun = Category::new("Fun", CategoryKind::Expense);
        let travel = Category::new("Travel", CategoryKind::Expense);
        let pets = Category::new("Pets", CategoryKind::Expense);

        let mut facts = empty_facts(today);
        facts.categories = vec![
            food.clone(),
            fun.clone(),
            groceries.clone(),
            pets.clone(),
            rent.clone(),
            travel.clone(),
        ];
        facts.limits = vec![
            BudgetLimit::new(food.id, today, units(500)),
            BudgetLimit::new(rent.id, today, units(1000)),
            BudgetLimit::new(fun.id, today, units(100)),
            BudgetLimit::new(travel.id, today, units(0)),
            BudgetLimit::new(pets.id, today, units(200)),
        ];
        facts.month_transactions = vec![
            Transaction::expense(units(300), today).in_category(groceries.id),
            Transaction::expense(units(100), today).in_category(food.id),
            Transaction::expense(units(1000), today).in_category(rent.id),
            Transaction::expense(units(30), today).in_category(fun.id),
            Transaction::expense(units(80), today).in_category(travel.id),
            Transaction::expense(units(20), today).in_category(pets.id),
        ];

        let snapshot = compute_dashboard(&facts, 4).unwrap();
        let ranked: Vec<_> = snapshot
            .top_budgets
            .iter()
            .map(|b| (b.name.as_str(), b.percentage))
            .collect();

        assert_eq!(
            ranked,
            vec![("Rent", 100), ("Food", 80), ("Fun", 30), ("Pets", 10)]
        );
        assert_eq!(snapshot.top_budgets[1].spent, units(400));
    }
}

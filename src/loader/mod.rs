//! Fact Loader
//!
//! Turns a scope and accounting mode into the set of store queries a fetch
//! needs, runs them concurrently and joins on all of them. If any query
//! fails (after the store's own retries) the whole fetch fails; there are no
//! partial results.

pub mod normalize;

use std::thread;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    first_of_month, Account, AccountingMode, BudgetLimit, Category, CategoryKind, CreditCard,
    Investment, Scope, Transaction, TransactionStatus,
};
use crate::store::{tables, Filter, Query, RemoteStore, Row};

/// Everything the rollup engine needs for one scope
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetFacts {
    /// Classification the categories and transactions were filtered by
    pub kind: CategoryKind,
    /// Ordered by name
    pub categories: Vec<Category>,
    pub limits: Vec<BudgetLimit>,
    pub transactions: Vec<Transaction>,
}

/// Everything the dashboard aggregator needs for the current month
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFacts {
    pub today: NaiveDate,
    pub accounts: Vec<Account>,
    pub investments: Vec<Investment>,
    pub credit_cards: Vec<CreditCard>,
    /// Expense categories, ordered by name
    pub categories: Vec<Category>,
    /// Limits keyed to the current month
    pub limits: Vec<BudgetLimit>,
    /// Income and expense movements due this month
    pub month_transactions: Vec<Transaction>,
    /// Open expenses due exactly today
    pub due_today: Vec<Transaction>,
    /// Open credit-card transactions, all time
    pub open_card_transactions: Vec<Transaction>,
    /// Credit-card transactions due this month
    pub month_card_transactions: Vec<Transaction>,
}

/// Issues scoped queries against a store
#[derive(Debug, Clone)]
pub struct FactLoader<S> {
    store: S,
}

impl<S: RemoteStore> FactLoader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The three queries of a budget fetch: categories, limits, transactions
    pub fn budget_queries(scope: Scope, mode: AccountingMode, kind: CategoryKind) -> [Query; 3] {
        let window = scope.window();
        let months = scope.months();
        let first_month = months.first().copied().unwrap_or(window.start);
        let last_month = months.last().copied().unwrap_or(window.start);
        let column = mode.date_column();

        [
            Query::table(tables::CATEGORIES)
                .filter(Filter::eq("type", kind.as_str()))
                .order_by("name"),
            Query::table(tables::BUDGET_LIMITS)
                .filter(Filter::gte("month", iso(first_month)))
                .filter(Filter::lte("month", iso(last_month))),
            Query::table(tables::TRANSACTIONS)
                .filter(Filter::eq("type", kind.transaction_kind().as_str()))
                .filter(Filter::is_null("transfer_id"))
                .filter(Filter::is_null("investment_id"))
                .filter(Filter::gte(column, iso(window.start)))
                .filter(Filter::lte(column, iso(window.end)))
                .order_by(column),
        ]
    }

    /// Expense categories, limits and movements for a budget view
    pub fn fetch_budget_facts(
        &self,
        scope: Scope,
        mode: AccountingMode,
    ) -> LedgerResult<BudgetFacts> {
        self.fetch_facts(scope, mode, CategoryKind::Expense)
    }

    pub fn fetch_facts(
        &self,
        scope: Scope,
        mode: AccountingMode,
        kind: CategoryKind,
    ) -> LedgerResult<BudgetFacts> {
        let queries = Self::budget_queries(scope, mode, kind);
        let [categories, limits, transactions] = self.select_all(&queries)?;

        Ok(BudgetFacts {
            kind,
            categories: normalize::all(tables::CATEGORIES, categories, normalize::category),
            limits: normalize::all(tables::BUDGET_LIMITS, limits, normalize::budget_limit),
            transactions: normalize::all(
                tables::TRANSACTIONS,
                transactions,
                normalize::transaction,
            ),
        })
    }

    /// The nine queries behind the dashboard summary
    pub fn dashboard_queries(today: NaiveDate) -> [Query; 9] {
        let window = Scope::containing(today).window();
        let start = iso(window.start);
        let end = iso(window.end);
        let pending = TransactionStatus::Pending.as_str();

        [
            Query::table(tables::ACCOUNTS).order_by("name"),
            Query::table(tables::INVESTMENTS).order_by("name"),
            Query::table(tables::CREDIT_CARDS).order_by("name"),
            Query::table(tables::CATEGORIES)
                .filter(Filter::eq("type", CategoryKind::Expense.as_str()))
                .order_by("name"),
            Query::table(tables::BUDGET_LIMITS)
                .filter(Filter::eq("month", iso(first_of_month(today)))),
            Query::table(tables::TRANSACTIONS)
                .filter(Filter::is_null("transfer_id"))
                .filter(Filter::is_null("investment_id"))
                .filter(Filter::gte("due_date", start.clone()))
                .filter(Filter::lte("due_date", end.clone())),
            Query::table(tables::TRANSACTIONS)
                .filter(Filter::eq("type", "expense"))
                .filter(Filter::eq("status", pending))
                .filter(Filter::eq("due_date", iso(today))),
            Query::table(tables::TRANSACTIONS)
                .filter(Filter::not_null("credit_card_id"))
                .filter(Filter::eq("status", pending)),
            Query::table(tables::TRANSACTIONS)
                .filter(Filter::not_null("credit_card_id"))
                .filter(Filter::gte("due_date", start))
                .filter(Filter::lte("due_date", end)),
        ]
    }

    pub fn fetch_dashboard_facts(&self, today: NaiveDate) -> LedgerResult<DashboardFacts> {
        let queries = Self::dashboard_queries(today);
        let [accounts, investments, cards, categories, limits, month, due, open_card, month_card] =
            self.select_all(&queries)?;

        let txns = |rows: Vec<Row>| normalize::all(tables::TRANSACTIONS, rows, normalize::transaction);
        Ok(DashboardFacts {
            today,
            accounts: normalize::all(tables::ACCOUNTS, accounts, normalize::account),
            investments: normalize::all(tables::INVESTMENTS, investments, normalize::investment),
            credit_cards: normalize::all(tables::CREDIT_CARDS, cards, normalize::credit_card),
            categories: normalize::all(tables::CATEGORIES, categories, normalize::category),
            limits: normalize::all(tables::BUDGET_LIMITS, limits, normalize::budget_limit),
            month_transactions: txns(month),
            due_today: txns(due),
            open_card_transactions: txns(open_card),
            month_card_transactions: txns(month_card),
        })
    }

    /// Fan out every query on its own thread and wait for all of them
    ///
    /// The first failure in query order is returned once every thread has
    /// finished.
    fn select_all<const N: usize>(&self, queries: &[Query; N]) -> LedgerResult<[Vec<Row>; N]> {
        let results: Vec<LedgerResult<Vec<Row>>> = thread::scope(|scope| {
            let handles: Vec<_> = queries
                .iter()
                .map(|query| {
                    scope.spawn(move || {
                        debug!(
                            table = %query.table,
                            filters = query.filters.len(),
                            "issuing store query"
                        );
                        self.store.select(query)
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(queries.iter())
                .map(|(handle, query)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(LedgerError::store(&query.table, "query worker panicked"))
                    })
                })
                .collect()
        });

        let rows = results.into_iter().collect::<LedgerResult<Vec<_>>>()?;
        rows.try_into()
            .map_err(|_| LedgerError::Validation("query result count mismatch".into()))
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetClass, Money, TransactionId};
    use crate::store::retry::tests::FlakyStore;
    use crate::store::{JsonStore, RetryPolicy, RetryingStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed(store: &JsonStore) -> (Category, Category) {
        let food = Category::new("Food", CategoryKind::Expense);
        let groceries = Category::child_of("Groceries", &food);
        let salary = Category::new("Salary", CategoryKind::Income);
        store
            .insert(
                tables::CATEGORIES,
                [&groceries, &food, &salary]
                    .iter()
                    .map(|c| normalize::category_row(c))
                    .collect(),
            )
            .unwrap();

        let limits = [
            BudgetLimit::new(food.id, date(2025, 2, 1), Money::from_units(400)),
            BudgetLimit::new(food.id, date(2025, 3, 1), Money::from_units(500)),
        ];
        store
            .insert(
                tables::BUDGET_LIMITS,
                limits.iter().map(normalize::budget_limit_row).collect(),
            )
            .unwrap();

        let mut transfer = Transaction::expense(Money::from_units(900), date(2025, 3, 2));
        transfer.transfer_id = Some(TransactionId::new());
        let txns = [
            Transaction::expense(Money::from_units(30), date(2025, 3, 5)).in_category(groceries.id),
            Transaction::expense(Money::from_units(80), date(2025, 2, 27))
                .in_category(groceries.id)
                .due_on(date(2025, 3, 3)),
            Transaction::income(Money::from_units(3000), date(2025, 3, 1)).in_category(salary.id),
            transfer,
        ];
        store
            .insert(
                tables::TRANSACTIONS,
                txns.iter().map(normalize::transaction_row).collect(),
            )
            .unwrap();
        (food, groceries)
    }

    #[test]
    fn test_budget_fetch_applies_scope_and_mode() {
        let store = JsonStore::in_memory();
        let (food, groceries) = seed(&store);
        let loader = FactLoader::new(store);
        let march = Scope::month(2025, 3).unwrap();

        let accrual = loader.fetch_budget_facts(march, AccountingMode::Accrual).unwrap();
        let names: Vec<_> = accrual.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Groceries"]);
        assert_eq!(accrual.limits.len(), 1);
        assert_eq!(accrual.limits[0].category_id, food.id);
        assert_eq!(accrual.transactions.len(), 1);
        assert_eq!(accrual.transactions[0].category_id, Some(groceries.id));

        let cash = loader.fetch_budget_facts(march, AccountingMode::Cash).unwrap();
        assert_eq!(cash.transactions.len(), 2);
    }

    #[test]
    fn test_full_year_fetch_covers_every_month() {
        let store = JsonStore::in_memory();
        seed(&store);
        let loader = FactLoader::new(store);

        let facts = loader
            .fetch_budget_facts(Scope::year(2025).unwrap(), AccountingMode::Accrual)
            .unwrap();
        assert_eq!(facts.limits.len(), 2);
        assert_eq!(facts.transactions.len(), 2);
    }

    #[test]
    fn test_any_failed_query_fails_the_fetch() {
        let flaky = FlakyStore::new(tables::BUDGET_LIMITS, 10);
        let store = RetryingStore::new(flaky, RetryPolicy::immediate(2));
        let loader = FactLoader::new(store);

        let err = loader
            .fetch_budget_facts(Scope::month(2025, 3).unwrap(), AccountingMode::Accrual)
            .unwrap_err();
        assert!(matches!(err, LedgerError::RetriesExhausted { ref table, .. } if table == "budget_limits"));
    }

    #[test]
    fn test_transient_failure_recovered_by_retry() {
        let flaky = FlakyStore::new(tables::TRANSACTIONS, 1);
        seed(&flaky.inner);
        let store = RetryingStore::new(flaky, RetryPolicy::immediate(3));
        let loader = FactLoader::new(store);

        let facts = loader
            .fetch_budget_facts(Scope::month(2025, 3).unwrap(), AccountingMode::Accrual)
            .unwrap();
        assert_eq!(facts.transactions.len(), 1);
    }

    #[test]
    fn test_dashboard_fetch() {
        let store = JsonStore::in_memory();
        seed(&store);
        store
            .insert(
                tables::INVESTMENTS,
                vec![normalize::investment_row(&Investment::new(
                    "Bonds",
                    AssetClass::FixedIncome,
                    Money::from_units(100),
                    2.0,
                ))],
            )
            .unwrap();
        let loader = FactLoader::new(store);

        let facts = loader.fetch_dashboard_facts(date(2025, 3, 3)).unwrap();
        assert_eq!(facts.investments.len(), 1);
        assert_eq!(facts.limits.len(), 1);
        assert_eq!(facts.month_transactions.len(), 3);
        assert_eq!(facts.due_today.len(), 1);
        assert!(facts.open_card_transactions.is_empty());
    }
}

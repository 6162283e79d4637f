//! Budget board
//!
//! Holds the current budget and dashboard snapshots for presentation
//! consumers, together with the loading flag and a stale marker. Each
//! refresh is stamped with a generation; a completed fetch is installed only
//! if no newer refresh was requested while it ran. A failed fetch leaves the
//! previous snapshot in place.
//!
//! Mutations never fetch on their own. They call `invalidate`, and the
//! caller decides when to `refresh_if_stale`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::dashboard::{compute_dashboard, DashboardSnapshot};
use crate::error::{LedgerError, LedgerResult};
use crate::loader::FactLoader;
use crate::models::{AccountingMode, Scope};
use crate::rollup::{compute, BudgetSnapshot};
use crate::store::RemoteStore;

/// What happened to a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh<T> {
    /// The result is now the current snapshot
    Installed(Arc<T>),
    /// A newer refresh was requested while this one ran
    Superseded { generation: u64 },
}

impl<T> Refresh<T> {
    pub fn installed(self) -> Option<Arc<T>> {
        match self {
            Self::Installed(snapshot) => Some(snapshot),
            Self::Superseded { .. } => None,
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    current: Option<Arc<T>>,
    installed_generation: u64,
    in_flight: usize,
    last_error: Option<String>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            current: None,
            installed_generation: 0,
            in_flight: 0,
            last_error: None,
        }
    }
}

#[derive(Debug, Default)]
struct BoardState {
    budget: Slot<BudgetSnapshot>,
    dashboard: Slot<DashboardSnapshot>,
    stale: bool,
}

/// Snapshot holder in front of a fact loader
#[derive(Debug)]
pub struct BudgetBoard<S> {
    loader: FactLoader<S>,
    state: RwLock<BoardState>,
    budget_requests: AtomicU64,
    dashboard_requests: AtomicU64,
    /// Bumped by every `invalidate`
    invalidations: AtomicU64,
}

impl<S: RemoteStore> BudgetBoard<S> {
    pub fn new(store: S) -> Self {
        Self {
            loader: FactLoader::new(store),
            state: RwLock::new(BoardState::default()),
            budget_requests: AtomicU64::new(0),
            dashboard_requests: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &S {
        self.loader.store()
    }

    pub fn loader(&self) -> &FactLoader<S> {
        &self.loader
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, BoardState>> {
        self.state
            .read()
            .map_err(|e| LedgerError::Store {
                table: "board".into(),
                message: format!("Failed to acquire read lock: {}", e),
            })
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, BoardState>> {
        self.state
            .write()
            .map_err(|e| LedgerError::Store {
                table: "board".into(),
                message: format!("Failed to acquire write lock: {}", e),
            })
    }

    /// The current budget snapshot, if any fetch has completed
    pub fn snapshot(&self) -> Option<Arc<BudgetSnapshot>> {
        self.read().ok()?.budget.current.clone()
    }

    pub fn dashboard(&self) -> Option<Arc<DashboardSnapshot>> {
        self.read().ok()?.dashboard.current.clone()
    }

    /// Whether any budget or dashboard fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.read()
            .map(|s| s.budget.in_flight > 0 || s.dashboard.in_flight > 0)
            .unwrap_or(false)
    }

    /// Message of the most recent failed budget fetch, cleared on install
    pub fn last_error(&self) -> Option<String> {
        self.read().ok()?.budget.last_error.clone()
    }

    /// Mark the current snapshots out of date
    ///
    /// A fetch that started before this call still installs, but leaves the
    /// board stale so the next `refresh_if_stale` fetches again.
    pub fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut state) = self.write() {
            state.stale = true;
        }
    }

    /// Out of date, never loaded, or loaded for a different scope or mode
    pub fn is_stale_for(&self, scope: Scope, mode: AccountingMode) -> bool {
        match self.read() {
            Ok(state) => {
                state.stale
                    || state
                        .budget
                        .current
                        .as_ref()
                        .map_or(true, |s| s.scope != scope || s.mode != mode)
            }
            Err(_) => true,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.read()
            .map(|s| s.stale || s.budget.current.is_none())
            .unwrap_or(true)
    }

    /// Fetch, roll up and install a budget snapshot
    pub fn refresh(&self, scope: Scope, mode: AccountingMode) -> LedgerResult<Refresh<BudgetSnapshot>> {
        let generation = self.budget_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.invalidations.load(Ordering::SeqCst);
        self.write()?.budget.in_flight += 1;

        let result = self
            .loader
            .fetch_budget_facts(scope, mode)
            .and_then(|facts| compute(scope, mode, &facts));
        self.finish_budget(generation, epoch, result)
    }

    /// Refresh only when `is_stale_for` says so
    pub fn refresh_if_stale(
        &self,
        scope: Scope,
        mode: AccountingMode,
    ) -> LedgerResult<Option<Arc<BudgetSnapshot>>> {
        if !self.is_stale_for(scope, mode) {
            return Ok(self.snapshot());
        }
        Ok(self.refresh(scope, mode)?.installed())
    }

    /// `epoch` is the invalidation count read before the facts were fetched
    fn finish_budget(
        &self,
        generation: u64,
        epoch: u64,
        result: LedgerResult<BudgetSnapshot>,
    ) -> LedgerResult<Refresh<BudgetSnapshot>> {
        let latest = self.budget_requests.load(Ordering::SeqCst);
        let mut state = self.write()?;
        state.budget.in_flight = state.budget.in_flight.saturating_sub(1);

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(generation, error = %err, "budget fetch failed, keeping previous snapshot");
                state.budget.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        if generation < latest || generation < state.budget.installed_generation {
            warn!(generation, latest, "discarding superseded budget fetch");
            return Ok(Refresh::Superseded { generation });
        }

        info!(
            generation,
            scope = %snapshot.scope,
            mode = %snapshot.mode,
            roots = snapshot.roots.len(),
            "budget snapshot installed"
        );
        let snapshot = Arc::new(snapshot);
        state.budget.current = Some(Arc::clone(&snapshot));
        state.budget.installed_generation = generation;
        state.budget.last_error = None;
        if self.invalidations.load(Ordering::SeqCst) == epoch {
            state.stale = false;
        } else {
            warn!(generation, "store changed during budget fetch, snapshot stays stale");
        }
        Ok(Refresh::Installed(snapshot))
    }

    /// Fetch and install the current-month dashboard
    pub fn refresh_dashboard(
        &self,
        today: NaiveDate,
        top_n: usize,
    ) -> LedgerResult<Refresh<DashboardSnapshot>> {
        let generation = self.dashboard_requests.fetch_add(1, Ordering::SeqCst) + 1;
        self.write()?.dashboard.in_flight += 1;

        let result = self
            .loader
            .fetch_dashboard_facts(today)
            .and_then(|facts| compute_dashboard(&facts, top_n));

        let latest = self.dashboard_requests.load(Ordering::SeqCst);
        let mut state = self.write()?;
        state.dashboard.in_flight = state.dashboard.in_flight.saturating_sub(1);

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(generation, error = %err, "dashboard fetch failed, keeping previous snapshot");
                state.dashboard.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        if generation < latest {
            warn!(generation, latest, "discarding superseded dashboard fetch");
            return Ok(Refresh::Superseded { generation });
        }

        info!(generation, %today, "dashboard snapshot installed");
        let snapshot = Arc::new(snapshot);
        state.dashboard.current = Some(Arc::clone(&snapshot));
        state.dashboard.installed_generation = generation;
        state.dashboard.last_error = None;
        Ok(Refresh::Installed(snapshot))
    }
}

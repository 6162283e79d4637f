//! JSON-backed table store
//!
//! Holds every table in memory behind a lock and, when opened on a path,
//! rewrites the whole snapshot atomically after each mutation. This is the
//! store the CLI runs against; tests use the in-memory form.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::file_io::{read_snapshot, write_snapshot};
use super::{compare_values, Filter, Query, RemoteStore, Row};
use crate::error::{LedgerError, LedgerResult};
use crate::models::UserId;

/// On-disk layout of the store file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    tables: BTreeMap<String, Vec<Row>>,
}

/// Table store persisted as a single JSON document
pub struct JsonStore {
    path: Option<PathBuf>,
    tables: RwLock<BTreeMap<String, Vec<Row>>>,
    principal: RwLock<Option<UserId>>,
}

impl JsonStore {
    /// A store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: RwLock::new(BTreeMap::new()),
            principal: RwLock::new(None),
        }
    }

    /// Open (or lazily create) a store file
    pub fn open(path: PathBuf) -> LedgerResult<Self> {
        let file: StoreFile = read_snapshot(&path)?;
        Ok(Self {
            path: Some(path),
            tables: RwLock::new(file.tables),
            principal: RwLock::new(None),
        })
    }

    /// Set the principal reported by `session()`
    pub fn with_principal(self, principal: Option<UserId>) -> Self {
        if let Ok(mut guard) = self.principal.write() {
            *guard = principal;
        }
        self
    }

    pub fn sign_in(&self, user: UserId) -> LedgerResult<()> {
        let mut guard = self
            .principal
            .write()
            .map_err(|e| LedgerError::Io(format!("Failed to acquire write lock: {}", e)))?;
        *guard = Some(user);
        Ok(())
    }

    pub fn sign_out(&self) -> LedgerResult<()> {
        let mut guard = self
            .principal
            .write()
            .map_err(|e| LedgerError::Io(format!("Failed to acquire write lock: {}", e)))?;
        *guard = None;
        Ok(())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> LedgerResult<usize> {
        Ok(self.read_tables()?.get(table).map_or(0, Vec::len))
    }

    fn read_tables(&self) -> LedgerResult<RwLockReadGuard<'_, BTreeMap<String, Vec<Row>>>> {
        self.tables
            .read()
            .map_err(|e| LedgerError::Io(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_tables(&self) -> LedgerResult<RwLockWriteGuard<'_, BTreeMap<String, Vec<Row>>>> {
        self.tables
            .write()
            .map_err(|e| LedgerError::Io(format!("Failed to acquire write lock: {}", e)))
    }

    fn persist(&self, tables: &BTreeMap<String, Vec<Row>>) -> LedgerResult<()> {
        match &self.path {
            Some(path) => write_snapshot(
                path,
                &StoreFile {
                    tables: tables.clone(),
                },
            ),
            None => Ok(()),
        }
    }
}

fn ensure_id(row: &mut Row) {
    let missing = row.get("id").map_or(true, Value::is_null);
    if missing {
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    }
}

fn same_key(existing: &Row, candidate: &Row, keys: &[&str]) -> bool {
    !keys.is_empty()
        && keys.iter().all(|k| {
            let value = candidate.get(*k).unwrap_or(&Value::Null);
            existing.get(*k).unwrap_or(&Value::Null) == value
        })
}

fn order_rows(rows: &mut [Row], query: &Query) {
    if query.ordering.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for key in &query.ordering {
            let left = a.get(&key.column).unwrap_or(&Value::Null);
            let right = b.get(&key.column).unwrap_or(&Value::Null);
            // nulls sort last in either direction
            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => CmpOrdering::Equal,
                (true, false) => return CmpOrdering::Greater,
                (false, true) => return CmpOrdering::Less,
                (false, false) => compare_values(left, right).unwrap_or(CmpOrdering::Equal),
            };
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != CmpOrdering::Equal {
                return ordering;
            }
        }
        CmpOrdering::Equal
    });
}

impl RemoteStore for JsonStore {
    fn select(&self, query: &Query) -> LedgerResult<Vec<Row>> {
        let tables = self.read_tables()?;
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        drop(tables);

        order_rows(&mut rows, query);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn insert(&self, table: &str, rows: Vec<Row>) -> LedgerResult<Vec<Row>> {
        let mut tables = self.write_tables()?;
        let target = tables.entry(table.to_string()).or_default();

        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            ensure_id(&mut row);
            target.push(row.clone());
            inserted.push(row);
        }

        self.persist(&tables)?;
        Ok(inserted)
    }

    fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        conflict_keys: &[&str],
    ) -> LedgerResult<Vec<Row>> {
        let mut tables = self.write_tables()?;
        let target = tables.entry(table.to_string()).or_default();

        let mut written = Vec::with_capacity(rows.len());
        for mut row in rows {
            match target.iter_mut().find(|r| same_key(r, &row, conflict_keys)) {
                Some(existing) => {
                    // the stored row keeps its identity
                    row.remove("id");
                    existing.extend(row);
                    written.push(existing.clone());
                }
                None => {
                    ensure_id(&mut row);
                    target.push(row.clone());
                    written.push(row);
                }
            }
        }

        self.persist(&tables)?;
        Ok(written)
    }

    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LedgerResult<Vec<Row>> {
        let mut tables = self.write_tables()?;
        let mut updated = Vec::new();

        if let Some(rows) = tables.get_mut(table) {
            for row in rows
                .iter_mut()
                .filter(|r| filters.iter().all(|f| f.matches(r)))
            {
                for (column, value) in &patch {
                    if column != "id" {
                        row.insert(column.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }

        if !updated.is_empty() {
            self.persist(&tables)?;
        }
        Ok(updated)
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> LedgerResult<()> {
        let mut tables = self.write_tables()?;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !filters.iter().all(|f| f.matches(r)));
        }
        self.persist(&tables)
    }

    fn session(&self) -> Option<UserId> {
        self.principal.read().ok().and_then(|guard| *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tables;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_assigns_ids() {
        let store = JsonStore::in_memory();
        let inserted = store
            .insert(tables::CATEGORIES, vec![row(json!({"name": "Food"}))])
            .unwrap();

        assert!(inserted[0]["id"].is_string());
        assert_eq!(store.row_count(tables::CATEGORIES).unwrap(), 1);
    }

    #[test]
    fn test_select_orders_and_limits() {
        let store = JsonStore::in_memory();
        store
            .insert(
                tables::CATEGORIES,
                vec![
                    row(json!({"name": "Rent"})),
                    row(json!({"name": "Food"})),
                    row(json!({"name": "Leisure"})),
                ],
            )
            .unwrap();

        let rows = store
            .select(&Query::table(tables::CATEGORIES).order_by("name").limit(2))
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Food", "Leisure"]);
    }

    #[test]
    fn test_upsert_replaces_on_conflict_keys() {
        let store = JsonStore::in_memory();
        let keys = ["user_id", "category_id", "month"];
        let first = store
            .upsert(
                tables::BUDGET_LIMITS,
                vec![row(json!({"user_id": "u", "category_id": "c", "month": "2025-03-01", "amount": 100.0}))],
                &keys,
            )
            .unwrap();
        let second = store
            .upsert(
                tables::BUDGET_LIMITS,
                vec![row(json!({"user_id": "u", "category_id": "c", "month": "2025-03-01", "amount": 250.0}))],
                &keys,
            )
            .unwrap();

        assert_eq!(store.row_count(tables::BUDGET_LIMITS).unwrap(), 1);
        assert_eq!(first[0]["id"], second[0]["id"]);
        assert_eq!(second[0]["amount"], json!(250.0));
    }

    #[test]
    fn test_update_and_delete() {
        let store = JsonStore::in_memory();
        store
            .insert(
                tables::CATEGORIES,
                vec![row(json!({"id": "a", "name": "Food"})), row(json!({"id": "b", "name": "Rent"}))],
            )
            .unwrap();

        let updated = store
            .update(
                tables::CATEGORIES,
                &[Filter::eq("id", "a")],
                row(json!({"name": "Groceries"})),
            )
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["name"], json!("Groceries"));

        store
            .delete(tables::CATEGORIES, &[Filter::eq("id", "b")])
            .unwrap();
        assert_eq!(store.row_count(tables::CATEGORIES).unwrap(), 1);
    }

    #[test]
    fn test_persists_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let store = JsonStore::open(path.clone()).unwrap();
        store
            .insert(tables::ACCOUNTS, vec![row(json!({"name": "Checking", "balance": 10.0}))])
            .unwrap();

        let reopened = JsonStore::open(path).unwrap();
        assert_eq!(reopened.row_count(tables::ACCOUNTS).unwrap(), 1);
    }

    #[test]
    fn test_session() {
        let store = JsonStore::in_memory();
        assert!(store.session().is_none());

        let user = UserId::new();
        store.sign_in(user).unwrap();
        assert_eq!(store.session(), Some(user));
        store.sign_out().unwrap();
        assert!(store.session().is_none());
    }
}

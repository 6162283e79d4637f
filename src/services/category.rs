//! Category service
//!
//! Category CRUD against the store. The one-level nesting rule is checked
//! here before anything is written, so the directory never sees a second
//! level coming from this crate.

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::loader::normalize;
use crate::models::{Category, CategoryId, CategoryKind};
use crate::services::BudgetBoard;
use crate::store::{tables, Filter, Query, RemoteStore};

/// Fields to change on an existing category; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// `Some(None)` makes the category a root
    pub parent: Option<Option<CategoryId>>,
}

/// Service for category management
pub struct CategoryService<'a, S> {
    board: &'a BudgetBoard<S>,
}

impl<'a, S: RemoteStore> CategoryService<'a, S> {
    pub fn new(board: &'a BudgetBoard<S>) -> Self {
        Self { board }
    }

    fn store(&self) -> &S {
        self.board.store()
    }

    /// Categories ordered by name, optionally of one classification
    pub fn list(&self, kind: Option<CategoryKind>) -> LedgerResult<Vec<Category>> {
        let mut query = Query::table(tables::CATEGORIES).order_by("name");
        if let Some(kind) = kind {
            query = query.filter(Filter::eq("type", kind.as_str()));
        }
        let rows = self.store().select(&query)?;
        Ok(normalize::all(tables::CATEGORIES, rows, normalize::category))
    }

    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        let rows = self.store().select(
            &Query::table(tables::CATEGORIES)
                .filter(Filter::eq("id", id.to_row_value()))
                .limit(1),
        )?;
        Ok(rows.first().and_then(normalize::category))
    }

    /// Find a category by name (case-insensitive) or id string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Category>> {
        let wanted = identifier.trim().to_lowercase();
        let all = self.list(None)?;
        if let Some(found) = all.iter().find(|c| c.name.to_lowercase() == wanted) {
            return Ok(Some(found.clone()));
        }

        if let Ok(id) = identifier.trim().parse::<CategoryId>() {
            return Ok(all.into_iter().find(|c| c.id == id));
        }

        Ok(None)
    }

    pub fn create_category(
        &self,
        name: &str,
        kind: CategoryKind,
        color: &str,
        icon: &str,
        parent: Option<CategoryId>,
    ) -> LedgerResult<Category> {
        let mut category = Category::new(name.trim(), kind).with_style(color, icon);
        category.parent_id = parent;

        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let all = self.list(None)?;
        check_unique_name(&all, &category)?;
        check_parent(&all, &category)?;

        self.store()
            .insert(tables::CATEGORIES, vec![normalize::category_row(&category)])?;

        info!(category = %category.name, kind = %kind, "category created");
        self.board.invalidate();
        Ok(category)
    }

    pub fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> LedgerResult<Category> {
        let all = self.list(None)?;
        let mut category = all
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        if let Some(name) = patch.name {
            category.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        if let Some(icon) = patch.icon {
            category.icon = icon;
        }
        if let Some(parent) = patch.parent {
            category.parent_id = parent;
        }

        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        check_unique_name(&all, &category)?;
        check_parent(&all, &category)?;

        let mut row = normalize::category_row(&category);
        row.remove("id");
        self.store().update(
            tables::CATEGORIES,
            &[Filter::eq("id", id.to_row_value())],
            row,
        )?;

        info!(category = %category.name, "category updated");
        self.board.invalidate();
        Ok(category)
    }

    /// Delete a category and its budget limits
    ///
    /// A category that still has children cannot be deleted.
    pub fn delete_category(&self, id: CategoryId) -> LedgerResult<Category> {
        let all = self.list(None)?;
        let category = all
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        let children = all.iter().filter(|c| c.parent_id == Some(id)).count();
        if children > 0 {
            return Err(LedgerError::Validation(format!(
                "Category '{}' has {} subcategories; move or delete them first",
                category.name, children
            )));
        }

        let by_category = [Filter::eq("category_id", id.to_row_value())];
        self.store().delete(tables::BUDGET_LIMITS, &by_category)?;
        self.store()
            .delete(tables::CATEGORIES, &[Filter::eq("id", id.to_row_value())])?;

        info!(category = %category.name, "category deleted");
        self.board.invalidate();
        Ok(category)
    }
}

fn check_unique_name(all: &[Category], category: &Category) -> LedgerResult<()> {
    let wanted = category.name.to_lowercase();
    let clash = all.iter().any(|c| {
        c.id != category.id && c.kind == category.kind && c.name.to_lowercase() == wanted
    });
    if clash {
        return Err(LedgerError::Duplicate {
            entity_type: "Category",
            identifier: category.name.clone(),
        });
    }
    Ok(())
}

/// A parent must exist, be a root, and share the classification; a category
/// with children of its own cannot become a child
fn check_parent(all: &[Category], category: &Category) -> LedgerResult<()> {
    let Some(parent_id) = category.parent_id else {
        return Ok(());
    };
    let parent = all
        .iter()
        .find(|c| c.id == parent_id)
        .ok_or_else(|| LedgerError::category_not_found(parent_id.to_string()))?;

    let parent_is_child = parent
        .parent_id
        .is_some_and(|grandparent| all.iter().any(|c| c.id == grandparent));
    let has_children = all.iter().any(|c| c.parent_id == Some(category.id));
    if parent_is_child || has_children {
        return Err(LedgerError::Nesting {
            category: category.name.clone(),
            parent: parent.name.clone(),
        });
    }

    if parent.kind != category.kind {
        return Err(LedgerError::Validation(format!(
            "'{}' is {} but '{}' is {}",
            category.name, category.kind, parent.name, parent.kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountingMode, BudgetLimit, Money, Scope};
    use crate::store::JsonStore;
    use chrono::NaiveDate;

    fn board() -> BudgetBoard<JsonStore> {
        BudgetBoard::new(JsonStore::in_memory())
    }

    #[test]
    fn test_create_and_list() {
        let board = board();
        let service = CategoryService::new(&board);

        let food = service
            .create_category("Food", CategoryKind::Expense, "#0a0", "utensils", None)
            .unwrap();
        service
            .create_category("Groceries", CategoryKind::Expense, "", "", Some(food.id))
            .unwrap();
        service
            .create_category("Salary", CategoryKind::Income, "", "", None)
            .unwrap();

        let expenses = service.list(Some(CategoryKind::Expense)).unwrap();
        let names: Vec<_> = expenses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Groceries"]);
        assert_eq!(expenses[1].parent_id, Some(food.id));
        assert_eq!(service.find("food").unwrap().unwrap().color, "#0a0");
        assert!(board.is_stale());
    }

    #[test]
    fn test_nesting_rules() {
        let board = board();
        let service = CategoryService::new(&board);
        let food = service
            .create_category("Food", CategoryKind::Expense, "", "", None)
            .unwrap();
        let groceries = service
            .create_category("Groceries", CategoryKind::Expense, "", "", Some(food.id))
            .unwrap();
        let salary = service
            .create_category("Salary", CategoryKind::Income, "", "", None)
            .unwrap();

        let deep = service.create_category("Produce", CategoryKind::Expense, "", "", Some(groceries.id));
        assert!(matches!(deep.unwrap_err(), LedgerError::Nesting { .. }));

        let mixed = service.create_category("Bonus", CategoryKind::Income, "", "", Some(food.id));
        assert!(mixed.unwrap_err().is_validation());

        let rent = service
            .create_category("Rent", CategoryKind::Expense, "", "", None)
            .unwrap();
        let patch = CategoryPatch {
            parent: Some(Some(rent.id)),
            ..Default::default()
        };
        let parent_under_root = service.update_category(food.id, patch);
        assert!(matches!(parent_under_root.unwrap_err(), LedgerError::Nesting { .. }));

        let dup = service.create_category("food", CategoryKind::Expense, "", "", None);
        assert!(matches!(dup.unwrap_err(), LedgerError::Duplicate { .. }));
        assert!(service
            .create_category("Food", CategoryKind::Income, "", "", Some(salary.id))
            .is_ok());
    }

    #[test]
    fn test_update_moves_and_renames() {
        let board = board();
        let service = CategoryService::new(&board);
        let food = service
            .create_category("Food", CategoryKind::Expense, "", "", None)
            .unwrap();
        let snacks = service
            .create_category("Snacks", CategoryKind::Expense, "", "", None)
            .unwrap();

        let moved = service
            .update_category(
                snacks.id,
                CategoryPatch {
                    name: Some(" Treats ".into()),
                    parent: Some(Some(food.id)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.name, "Treats");

        let stored = service.get(snacks.id).unwrap().unwrap();
        assert_eq!(stored.parent_id, Some(food.id));
        assert_eq!(stored.name, "Treats");
    }

    #[test]
    fn test_delete_rules() {
        let board = board();
        let service = CategoryService::new(&board);
        let food = service
            .create_category("Food", CategoryKind::Expense, "", "", None)
            .unwrap();
        let groceries = service
            .create_category("Groceries", CategoryKind::Expense, "", "", Some(food.id))
            .unwrap();
        let month = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        board
            .store()
            .insert(
                tables::BUDGET_LIMITS,
                vec![normalize::budget_limit_row(&BudgetLimit::new(
                    groceries.id,
                    month,
                    Money::from_units(100),
                ))],
            )
            .unwrap();

        assert!(service.delete_category(food.id).unwrap_err().is_validation());

        service.delete_category(groceries.id).unwrap();
        assert_eq!(board.store().row_count(tables::BUDGET_LIMITS).unwrap(), 0);
        service.delete_category(food.id).unwrap();
        assert!(service.list(None).unwrap().is_empty());

        let snapshot = board
            .refresh_if_stale(Scope::month(2025, 3).unwrap(), AccountingMode::Accrual)
            .unwrap()
            .unwrap();
        assert!(snapshot.roots.is_empty());
    }
}

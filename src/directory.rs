//! Category Directory
//!
//! A point-in-time snapshot of every category with O(1) lookup by id and
//! parent/child navigation. One level of nesting is a structural rule here:
//! building a directory in which a child's parent itself has a (resolvable)
//! parent fails with `LedgerError::Nesting`. A parent id that does not
//! resolve is not an error; that category simply acts as a root.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryId};

/// Indexed, immutable view over a category list
#[derive(Debug, Clone, Default)]
pub struct CategoryDirectory {
    categories: Vec<Category>,
    index: HashMap<CategoryId, usize>,
    children: HashMap<CategoryId, Vec<usize>>,
}

impl CategoryDirectory {
    /// Build a directory, keeping the input order for iteration
    pub fn new(categories: Vec<Category>) -> LedgerResult<Self> {
        let mut index = HashMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if index.insert(category.id, position).is_some() {
                return Err(LedgerError::Duplicate {
                    entity_type: "Category",
                    identifier: category.id.to_string(),
                });
            }
        }

        let resolve = |id: Option<CategoryId>| id.and_then(|id| index.get(&id).copied());

        let mut children: HashMap<CategoryId, Vec<usize>> = HashMap::new();
        let mut orphans = 0usize;
        for (position, category) in categories.iter().enumerate() {
            let Some(parent_id) = category.parent_id else {
                continue;
            };
            let Some(parent_pos) = resolve(Some(parent_id)) else {
                orphans += 1;
                continue;
            };
            let parent = &categories[parent_pos];
            if resolve(parent.parent_id).is_some() {
                return Err(LedgerError::Nesting {
                    category: category.name.clone(),
                    parent: parent.name.clone(),
                });
            }
            children.entry(parent_id).or_default().push(position);
        }

        if orphans > 0 {
            debug!(orphans, "categories with unresolved parents treated as roots");
        }

        Ok(Self {
            categories,
            index,
            children,
        })
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.index.get(&id).map(|&i| &self.categories[i])
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.index.contains_key(&id)
    }

    /// The resolved parent, `None` for roots and orphans
    pub fn parent_of(&self, id: CategoryId) -> Option<&Category> {
        self.get(id)?.parent_id.and_then(|parent| self.get(parent))
    }

    /// The category a fact rolls up into: its parent if resolvable, else itself
    pub fn root_id_of(&self, id: CategoryId) -> Option<CategoryId> {
        self.get(id)?;
        Some(self.parent_of(id).map_or(id, |p| p.id))
    }

    /// Children of `parent_id` in directory order
    pub fn children_of(&self, parent_id: CategoryId) -> Vec<&Category> {
        self.children
            .get(&parent_id)
            .map(|positions| positions.iter().map(|&i| &self.categories[i]).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: CategoryId) -> bool {
        self.children.get(&id).is_some_and(|c| !c.is_empty())
    }

    /// Categories with no resolvable parent, in directory order
    pub fn roots(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| c.parent_id.map_or(true, |p| !self.index.contains_key(&p)))
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let wanted = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

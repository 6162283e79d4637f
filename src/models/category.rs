//! Category model
//!
//! Categories classify transactions as income or expense. A category may
//! name one parent; parents themselves are always roots.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::transaction::TransactionKind;

/// Classification of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[default]
    Expense,
    Income,
}

impl CategoryKind {
    /// The value stored in the `type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Parse a classification, accepting the legacy Portuguese labels
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "despesa" => Some(Self::Expense),
            "income" | "receita" => Some(Self::Income),
            _ => None,
        }
    }

    /// Transactions of this direction book against categories of this kind
    pub fn transaction_kind(&self) -> TransactionKind {
        match self {
            Self::Expense => TransactionKind::Expense,
            Self::Income => TransactionKind::Income,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
        }
    }
}

/// A spending or income category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Expense or income
    #[serde(rename = "type")]
    pub kind: CategoryKind,

    /// Display hint, opaque to the engine
    #[serde(default)]
    pub color: String,

    /// Display hint, opaque to the engine
    #[serde(default)]
    pub icon: String,

    /// Parent category (one level of nesting at most)
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Create a new root category
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            color: String::new(),
            icon: String::new(),
            parent_id: None,
        }
    }

    /// Create a new category nested under `parent`
    pub fn child_of(name: impl Into<String>, parent: &Category) -> Self {
        let mut category = Self::new(name, parent.kind);
        category.parent_id = Some(parent.id);
        category
    }

    /// Builder-style display hints
    pub fn with_style(mut self, color: impl Into<String>, icon: impl Into<String>) -> Self {
        self.color = color.into();
        self.icon = icon.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Validate the category on its own; hierarchy rules need the directory
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if self.parent_id == Some(self.id) {
            return Err(CategoryValidationError::OwnParent);
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    OwnParent,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::OwnParent => write!(f, "A category cannot be its own parent"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_inherits_kind() {
        let food = Category::new("Food", CategoryKind::Expense);
        let groceries = Category::child_of("Groceries", &food);

        assert_eq!(groceries.parent_id, Some(food.id));
        assert_eq!(groceries.kind, CategoryKind::Expense);
        assert!(food.is_root());
        assert!(!groceries.is_root());
    }

    #[test]
    fn test_validation() {
        let mut category = Category::new("Valid", CategoryKind::Income);
        assert!(category.validate().is_ok());

        category.name = "  ".into();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        category.name = "a".repeat(51);
        assert_eq!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        );

        category.name = "Salary".into();
        category.parent_id = Some(category.id);
        assert_eq!(category.validate(), Err(CategoryValidationError::OwnParent));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(CategoryKind::parse("Despesa"), Some(CategoryKind::Expense));
        assert_eq!(CategoryKind::parse("income"), Some(CategoryKind::Income));
        assert_eq!(CategoryKind::parse("transfer"), None);
    }

    #[test]
    fn test_serialization_uses_type_column() {
        let category = Category::new("Rent", CategoryKind::Expense);
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["type"], "expense");
        assert!(json["parent_id"].is_null());
    }
}

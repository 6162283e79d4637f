//! Category display formatting
//!
//! A tree view (roots with their children) and a flat table.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::directory::CategoryDirectory;
use crate::models::Category;

#[derive(Tabled)]
struct CategoryLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Color")]
    color: String,
}

/// Format categories as a table; parents are shown by name
pub fn format_category_table(directory: &CategoryDirectory) -> String {
    if directory.is_empty() {
        return "No categories found.".to_string();
    }

    let lines: Vec<CategoryLine> = directory
        .iter()
        .map(|c| CategoryLine {
            id: c.id.to_string(),
            name: c.name.clone(),
            kind: c.kind.to_string(),
            parent: directory
                .parent_of(c.id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            color: c.color.clone(),
        })
        .collect();

    let mut table = Table::new(lines);
    table.with(Style::sharp());
    table.to_string()
}

/// Format categories as a tree of roots and children
pub fn format_category_tree(directory: &CategoryDirectory) -> String {
    if directory.is_empty() {
        return "No categories found.\n\nRun 'ledgerdash category add <NAME>' to create one."
            .to_string();
    }

    let mut output = String::new();
    for root in directory.roots() {
        output.push_str(&format!("{} [{}]\n", root.name, root.kind.as_str()));
        let children = directory.children_of(root.id);
        for (j, child) in children.iter().enumerate() {
            let prefix = if j + 1 == children.len() {
                "└── "
            } else {
                "├── "
            };
            output.push_str(&format!("  {}{}\n", prefix, child.name));
        }
    }
    output
}

/// Format one category's details
pub fn format_category_details(category: &Category, parent: Option<&Category>) -> String {
    let mut output = format!("Category: {}\n", category.name);
    output.push_str(&format!("  ID:     {}\n", category.id));
    output.push_str(&format!("  Type:   {}\n", category.kind));
    if let Some(parent) = parent {
        output.push_str(&format!("  Parent: {}\n", parent.name));
    }
    if !category.color.is_empty() {
        output.push_str(&format!("  Color:  {}\n", category.color));
    }
    if !category.icon.is_empty() {
        output.push_str(&format!("  Icon:   {}\n", category.icon));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryKind;

    fn directory() -> CategoryDirectory {
        let food = Category::new("Food", CategoryKind::Expense);
        let groceries = Category::child_of("Groceries", &food);
        let restaurants = Category::child_of("Restaurants", &food);
        let rent = Category::new("Rent", CategoryKind::Expense);
        CategoryDirectory::new(vec![food, groceries, rent, restaurants]).unwrap()
    }

    #[test]
    fn test_tree() {
        let text = format_category_tree(&directory());
        assert_eq!(
            text,
            "Food [expense]\n  ├── Groceries\n  └── Restaurants\nRent [expense]\n"
        );
    }

    #[test]
    fn test_table_names_parents() {
        let text = format_category_table(&directory());
        assert!(text.contains("Groceries"));
        assert!(text.contains("Parent"));
        assert_eq!(text.matches("Food").count(), 3);
    }

    #[test]
    fn test_empty() {
        let empty = CategoryDirectory::new(Vec::new()).unwrap();
        assert_eq!(format_category_table(&empty), "No categories found.");
    }
}

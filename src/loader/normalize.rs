//! Row normalization
//!
//! The only place raw store rows are interpreted. Store rows are loosely
//! shaped: a related record can come back as a nested object
//! (`"category": {"id": ..}`) or as a one-element array, amounts can be
//! numbers or strings, optional columns can be missing or null. Every
//! conversion here returns `None` for a row it cannot make sense of, and
//! `all` skips such rows with a debug count instead of failing the fetch.
//!
//! The `*_row` functions go the other way and produce rows in the store's
//! column layout (decimal amounts, ISO dates, full uuid strings).

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::{
    Account, AssetClass, BudgetLimit, Category, CategoryKind, CreditCard, Investment, Money,
    Transaction, TransactionKind, TransactionStatus,
};
use crate::store::Row;

/// Convert every row, skipping the ones `convert` rejects
pub fn all<T>(table: &str, rows: Vec<Row>, convert: impl Fn(&Row) -> Option<T>) -> Vec<T> {
    let total = rows.len();
    let items: Vec<T> = rows.iter().filter_map(|row| convert(row)).collect();
    let skipped = total - items.len();
    if skipped > 0 {
        debug!(table, skipped, "malformed rows skipped");
    }
    items
}

/// A column value with one-element arrays unwrapped and null treated as absent
fn field<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    unwrap_single(row.get(column)?)
}

fn unwrap_single(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::Array(items) if items.len() == 1 => unwrap_single(&items[0]),
        Value::Array(_) => None,
        other => Some(other),
    }
}

fn text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    field(row, column)?.as_str()
}

fn text_or_empty(row: &Row, column: &str) -> String {
    text(row, column).unwrap_or_default().to_string()
}

fn id_from<T: FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Object(nested) => nested.get("id").and_then(unwrap_single).and_then(id_from),
        _ => None,
    }
}

/// An id column, or the `id` of a nested relation when the column is absent
fn reference<T: FromStr>(row: &Row, column: &str, relation: &str) -> Option<T> {
    field(row, column)
        .or_else(|| field(row, relation))
        .and_then(id_from)
}

fn money(row: &Row, column: &str) -> Option<Money> {
    match field(row, column)? {
        Value::Number(n) => n.as_f64().map(Money::from_decimal),
        Value::String(s) => Money::parse(s).ok(),
        _ => None,
    }
}

fn number(row: &Row, column: &str) -> Option<f64> {
    match field(row, column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// ISO date, tolerating a trailing time component
fn date(row: &Row, column: &str) -> Option<NaiveDate> {
    let raw = text(row, column)?;
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn category(row: &Row) -> Option<Category> {
    let name = text(row, "name")?.trim();
    if name.is_empty() {
        return None;
    }
    Some(Category {
        id: reference(row, "id", "id")?,
        name: name.to_string(),
        kind: text(row, "type")
            .and_then(CategoryKind::parse)
            .unwrap_or_default(),
        color: text_or_empty(row, "color"),
        icon: text_or_empty(row, "icon"),
        parent_id: reference(row, "parent_id", "parent"),
    })
}

pub fn budget_limit(row: &Row) -> Option<BudgetLimit> {
    let amount = money(row, "amount")?;
    let month = date(row, "month")?;
    let mut limit = BudgetLimit::new(reference(row, "category_id", "category")?, month, amount);
    limit.id = reference(row, "id", "id")?;
    limit.user_id = reference(row, "user_id", "user");
    Some(limit)
}

pub fn transaction(row: &Row) -> Option<Transaction> {
    let kind = text(row, "type").and_then(TransactionKind::parse)?;
    let amount = money(row, "amount")?.abs();
    let on = date(row, "date")?;
    Some(Transaction {
        id: reference(row, "id", "id")?,
        kind,
        amount,
        date: on,
        due_date: date(row, "due_date").unwrap_or(on),
        status: text(row, "status")
            .and_then(TransactionStatus::parse)
            .unwrap_or_default(),
        description: text_or_empty(row, "description"),
        category_id: reference(row, "category_id", "category"),
        account_id: reference(row, "account_id", "account"),
        credit_card_id: reference(row, "credit_card_id", "credit_card"),
        transfer_id: reference(row, "transfer_id", "transfer"),
        investment_id: reference(row, "investment_id", "investment"),
    })
}

pub fn account(row: &Row) -> Option<Account> {
    Some(Account {
        id: reference(row, "id", "id")?,
        name: text_or_empty(row, "name"),
        balance: money(row, "balance").unwrap_or_default(),
    })
}

pub fn investment(row: &Row) -> Option<Investment> {
    Some(Investment {
        id: reference(row, "id", "id")?,
        name: text_or_empty(row, "name"),
        asset_class: text(row, "type")
            .map(AssetClass::from_label)
            .unwrap_or(AssetClass::Other),
        value: money(row, "value").unwrap_or_default(),
        quantity: number(row, "quantity").unwrap_or(1.0),
    })
}

pub fn credit_card(row: &Row) -> Option<CreditCard> {
    Some(CreditCard {
        id: reference(row, "id", "id")?,
        name: text_or_empty(row, "name"),
        credit_limit: money(row, "credit_limit").unwrap_or_default(),
    })
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

pub fn category_row(category: &Category) -> Row {
    object(json!({
        "id": category.id.to_row_value(),
        "name": category.name,
        "type": category.kind.as_str(),
        "color": category.color,
        "icon": category.icon,
        "parent_id": category.parent_id.map(|p| p.to_row_value()),
    }))
}

pub fn budget_limit_row(limit: &BudgetLimit) -> Row {
    object(json!({
        "id": limit.id.to_row_value(),
        "user_id": limit.user_id.map(|u| u.to_row_value()),
        "category_id": limit.category_id.to_row_value(),
        "amount": limit.amount.to_decimal(),
        "month": iso(limit.month),
    }))
}

pub fn transaction_row(txn: &Transaction) -> Row {
    object(json!({
        "id": txn.id.to_row_value(),
        "type": txn.kind.as_str(),
        "amount": txn.amount.to_decimal(),
        "date": iso(txn.date),
        "due_date": iso(txn.due_date),
        "status": txn.status.as_str(),
        "description": txn.description,
        "category_id": txn.category_id.map(|c| c.to_row_value()),
        "account_id": txn.account_id.map(|a| a.to_row_value()),
        "credit_card_id": txn.credit_card_id.map(|c| c.to_row_value()),
        "transfer_id": txn.transfer_id.map(|t| t.to_row_value()),
        "investment_id": txn.investment_id.map(|i| i.to_row_value()),
    }))
}

pub fn account_row(account: &Account) -> Row {
    object(json!({
        "id": account.id.to_row_value(),
        "name": account.name,
        "balance": account.balance.to_decimal(),
    }))
}

pub fn investment_row(investment: &Investment) -> Row {
    let class = serde_json::to_value(investment.asset_class).unwrap_or(Value::Null);
    object(json!({
        "id": investment.id.to_row_value(),
        "name": investment.name,
        "type": class,
        "value": investment.value.to_decimal(),
        "quantity": investment.quantity,
    }))
}

pub fn credit_card_row(card: &CreditCard) -> Row {
    object(json!({
        "id": card.id.to_row_value(),
        "name": card.name,
        "credit_limit": card.credit_limit.to_decimal(),
    }))
}

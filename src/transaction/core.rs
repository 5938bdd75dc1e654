//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{RowsAffected, TransactionId},
    update_builder::{UpdateBuilder, deserialize_some},
    validation::{validate_amount, validate_category},
};

const TRANSACTION_TABLE: &str = "transactions";
const TRANSACTION_COLUMNS: &str =
    "id, type, amount, category, date, description, createdAt, updatedAt";

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The string stored in the database and used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidRequest(format!(
                "type must be either 'income' or 'expense', got '{other}'"
            ))),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// A free-form label, e.g. "Food" or "Salary".
    ///
    /// Budgets are matched to transactions by this label.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// An optional note about the transaction.
    pub description: Option<String>,
    /// When the transaction was first recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            category: category.to_owned(),
            date,
            description: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder is also the JSON body for creating a transaction, in which case
/// it should be checked with [TransactionBuilder::validate] before it is
/// passed to [create_transaction].
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let transaction = Transaction::build(
///         TransactionType::Expense,
///         45.99,
///         "Food",
///         date!(2025 - 01 - 15),
///     )
///     .description(Some("Coffee shop purchase"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBuilder {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money, must be greater than zero.
    pub amount: f64,
    /// The category label.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// An optional note.
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_owned);
        self
    }

    /// Check the amount and category.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is out of range, or
    /// [Error::EmptyCategory] if the category is blank.
    pub fn validate(self) -> Result<Self, Error> {
        validate_amount(self.amount)?;
        validate_category(&self.category)?;

        Ok(self)
    }
}

/// A partial set of transaction fields for an update.
///
/// Fields set to `None` are left untouched. For `description`, `Some(None)`
/// clears the description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    /// The new transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new category.
    pub category: Option<String>,
    /// The new date.
    pub date: Option<Date>,
    /// The new description, `Some(None)` removes it.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

impl TransactionPatch {
    /// Check any amount and category in the patch.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is out of range, or
    /// [Error::EmptyCategory] if the category is blank.
    pub fn validate(self) -> Result<Self, Error> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }

        if let Some(category) = &self.category {
            validate_category(category)?;
        }

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// including when the amount or type violate the table constraints.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO {TRANSACTION_TABLE}
                (type, amount, category, date, description, createdAt, updatedAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.transaction_type,
                builder.amount,
                builder.category,
                builder.date,
                builder.description,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM {TRANSACTION_TABLE} WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions, most recent first.
///
/// Transactions are sorted by date, and then by creation order so that
/// transactions on the same day keep a stable order.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM {TRANSACTION_TABLE}
             ORDER BY date DESC, createdAt DESC, id DESC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Update the fields of transaction `id` that are set in `patch`.
///
/// An empty patch does not write anything and returns the current transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let update = UpdateBuilder::new(TRANSACTION_TABLE)
        .set_if_some("type", patch.transaction_type)
        .set_if_some("amount", patch.amount)
        .set_if_some("category", patch.category)
        .set_if_some("date", patch.date)
        .set_if_some("description", patch.description);

    if update.is_empty() {
        return get_transaction(id, connection);
    }

    update
        .set("updatedAt", OffsetDateTime::now_utc())
        .query_row(id, TRANSACTION_COLUMNS, connection, map_transaction_row)
        .map_err(Error::from)
}

/// Delete transaction `id`, returning the number of rows deleted.
///
/// Zero rows affected means there was no transaction with the ID `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            &format!("DELETE FROM {TRANSACTION_TABLE} WHERE id = :id"),
            &[(":id", &id)],
        )
        .map_err(Error::from)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL CHECK(type IN ('income', 'expense')),
            amount REAL NOT NULL CHECK(amount > 0),
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            description TEXT,
            createdAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updatedAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_date_category ON transactions(date, category);
        CREATE INDEX IF NOT EXISTS idx_transactions_type_date ON transactions(type, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        transaction_type: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{Transaction, TransactionPatch, TransactionType},
    };

    #[test]
    fn transaction_type_parses_lowercase_names() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
        assert!("Income".parse::<TransactionType>().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_amount() {
        let date = date!(2024 - 07 - 01);
        let builder = Transaction::build(TransactionType::Expense, 0.0, "Food", date);

        assert_eq!(builder.validate(), Err(Error::InvalidAmount(0.0)));
    }

    #[test]
    fn validate_rejects_blank_category() {
        let date = date!(2024 - 07 - 01);
        let builder = Transaction::build(TransactionType::Income, 1.0, "  ", date);

        assert_eq!(builder.validate(), Err(Error::EmptyCategory));
    }

    #[test]
    fn patch_validate_ignores_missing_fields() {
        assert_eq!(
            TransactionPatch::default().validate(),
            Ok(TransactionPatch::default())
        );
    }

    #[test]
    fn patch_validate_rejects_negative_amount() {
        let patch = TransactionPatch {
            amount: Some(-5.0),
            ..Default::default()
        };

        assert_eq!(patch.validate(), Err(Error::InvalidAmount(-5.0)));
    }
}

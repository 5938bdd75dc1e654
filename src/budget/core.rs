//! Defines the core data models and database queries for budgets.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{BudgetId, RowsAffected},
    update_builder::{UpdateBuilder, deserialize_some},
    validation::{validate_amount, validate_category},
};

const BUDGET_TABLE: &str = "budgets";
const BUDGET_COLUMNS: &str =
    "id, category, amount, period, startDate, endDate, createdAt, updatedAt";

// ============================================================================
// MODELS
// ============================================================================

/// How often a budget resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Every week.
    Weekly,
    /// Every month.
    #[default]
    Monthly,
    /// Every three months.
    Quarterly,
    /// Every year.
    Yearly,
}

impl Period {
    /// The string stored in the database and used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "quarterly" => Ok(Period::Quarterly),
            "yearly" => Ok(Period::Yearly),
            other => Err(Error::InvalidRequest(format!(
                "period must be one of 'weekly', 'monthly', 'quarterly' or 'yearly', got '{other}'"
            ))),
        }
    }
}

impl ToSql for Period {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Period {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A spending limit for a category over a period.
///
/// Budgets are linked to transactions by category name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category the budget limits spending for.
    pub category: String,
    /// The most that should be spent in one period.
    pub amount: f64,
    /// How often the budget resets.
    pub period: Period,
    /// When the budget starts applying. Informational only.
    pub start_date: Option<Date>,
    /// When the budget stops applying. Informational only.
    pub end_date: Option<Date>,
    /// When the budget was first recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the budget was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Budget {
    /// Create a new budget.
    ///
    /// Shortcut for [BudgetBuilder] for discoverability.
    pub fn build(category: &str, amount: f64, period: Period) -> BudgetBuilder {
        BudgetBuilder {
            category: category.to_owned(),
            amount,
            period,
            start_date: None,
            end_date: None,
        }
    }
}

/// A builder for creating [Budget] instances, also used as the JSON body for
/// creating a budget.
///
/// The period defaults to monthly when it is left out of the JSON body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBuilder {
    /// The category label.
    pub category: String,
    /// The budgeted amount, must be greater than zero.
    pub amount: f64,
    /// How often the budget resets.
    #[serde(default)]
    pub period: Period,
    /// An optional start date.
    #[serde(default)]
    pub start_date: Option<Date>,
    /// An optional end date.
    #[serde(default)]
    pub end_date: Option<Date>,
}

impl BudgetBuilder {
    /// Set the start and end dates of the budget.
    pub fn dates(mut self, start_date: Option<Date>, end_date: Option<Date>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
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

/// A partial set of budget fields for an update.
///
/// `None` leaves a field untouched, while `Some(None)` clears a date.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    /// The new category.
    pub category: Option<String>,
    /// The new budgeted amount.
    pub amount: Option<f64>,
    /// The new period.
    pub period: Option<Period>,
    /// The new start date.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_date: Option<Option<Date>>,
    /// The new end date.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_date: Option<Option<Date>>,
}

impl BudgetPatch {
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

/// Create a new budget in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if there is already a budget for the category
///   and period,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(builder: BudgetBuilder, connection: &Connection) -> Result<Budget, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO {BUDGET_TABLE}
                (category, amount, period, startDate, endDate, createdAt, updatedAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (
                &builder.category,
                builder.amount,
                builder.period,
                builder.start_date,
                builder.end_date,
                now,
            ),
            map_budget_row,
        )
        .map_err(|error| map_unique_violation(error, builder.category, builder.period))
}

/// Retrieve a budget from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_budget(id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM {BUDGET_TABLE} WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_budget_row)?;

    Ok(budget)
}

/// Retrieve the budget for `category` and `period`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no budget for the category and period,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_budget_by_category_and_period(
    category: &str,
    period: Period,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM {BUDGET_TABLE}
             WHERE category = :category AND period = :period"
        ))?
        .query_one(
            rusqlite::named_params! {":category": category, ":period": period},
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve all budgets ordered by category.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM {BUDGET_TABLE} ORDER BY category ASC, id ASC"
        ))?
        .query_map([], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Update the fields of budget `id` that are set in `patch`.
///
/// An empty patch does not write anything and returns the current budget.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - [Error::DuplicateBudget] if the new category and period belong to
///   another budget,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    patch: BudgetPatch,
    connection: &Connection,
) -> Result<Budget, Error> {
    let new_category = patch.category.clone();
    let new_period = patch.period;

    let update = UpdateBuilder::new(BUDGET_TABLE)
        .set_if_some("category", patch.category)
        .set_if_some("amount", patch.amount)
        .set_if_some("period", patch.period)
        .set_if_some("startDate", patch.start_date)
        .set_if_some("endDate", patch.end_date);

    if update.is_empty() {
        return get_budget(id, connection);
    }

    let result = update
        .set("updatedAt", OffsetDateTime::now_utc())
        .query_row(id, BUDGET_COLUMNS, connection, map_budget_row);

    match result {
        Ok(budget) => Ok(budget),
        Err(error) if is_unique_violation(&error) => {
            let current = get_budget(id, connection)?;

            Err(Error::DuplicateBudget {
                category: new_category.unwrap_or(current.category),
                period: new_period.unwrap_or(current.period),
            })
        }
        Err(error) => Err(error.into()),
    }
}

/// Delete budget `id`, returning the number of rows deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_budget(id: BudgetId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            &format!("DELETE FROM {BUDGET_TABLE} WHERE id = :id"),
            &[(":id", &id)],
        )
        .map_err(Error::from)
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            amount REAL NOT NULL CHECK(amount > 0),
            period TEXT NOT NULL CHECK(period IN ('weekly', 'monthly', 'quarterly', 'yearly')),
            startDate TEXT,
            endDate TEXT,
            createdAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updatedAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(category, period)
        );",
    )?;

    Ok(())
}

/// Map a database row to a Budget.
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        amount: row.get(2)?,
        period: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )
    )
}

fn map_unique_violation(error: rusqlite::Error, category: String, period: Period) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateBudget { category, period }
    } else {
        error.into()
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        budget::{
            Budget, BudgetPatch, Period, create_budget, delete_budget, get_all_budgets, get_budget,
            get_budget_by_category_and_period, update_budget,
        },
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let builder = Budget::build("Food", 200.0, Period::Monthly)
            .dates(Some(date!(2024 - 07 - 01)), Some(date!(2024 - 12 - 31)));

        let budget = create_budget(builder.clone(), &conn).expect("Could not create budget");

        assert!(budget.id > 0);
        assert_eq!(budget.category, builder.category);
        assert_eq!(budget.amount, builder.amount);
        assert_eq!(budget.period, builder.period);
        assert_eq!(budget.start_date, builder.start_date);
        assert_eq!(budget.end_date, builder.end_date);
        assert_eq!(get_budget(budget.id, &conn), Ok(budget));
    }

    #[test]
    fn create_duplicate_category_and_period_fails() {
        let conn = get_test_connection();
        create_budget(Budget::build("Food", 200.0, Period::Monthly), &conn).unwrap();

        let result = create_budget(Budget::build("Food", 300.0, Period::Monthly), &conn);

        assert_eq!(
            result,
            Err(Error::DuplicateBudget {
                category: "Food".to_owned(),
                period: Period::Monthly,
            })
        );
    }

    #[test]
    fn create_same_category_with_different_period_succeeds() {
        let conn = get_test_connection();
        create_budget(Budget::build("Food", 200.0, Period::Monthly), &conn).unwrap();

        let result = create_budget(Budget::build("Food", 50.0, Period::Weekly), &conn);

        assert!(result.is_ok(), "want budget, got {result:?}");
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();

        let result = create_budget(Budget::build("Food", 0.0, Period::Monthly), &conn);

        assert!(
            matches!(result, Err(Error::SqlError(_))),
            "want SQL error, got {result:?}"
        );
    }

    #[test]
    fn get_by_category_and_period() {
        let conn = get_test_connection();
        let monthly = create_budget(Budget::build("Food", 200.0, Period::Monthly), &conn).unwrap();
        create_budget(Budget::build("Food", 50.0, Period::Weekly), &conn).unwrap();

        assert_eq!(
            get_budget_by_category_and_period("Food", Period::Monthly, &conn),
            Ok(monthly)
        );
        assert_eq!(
            get_budget_by_category_and_period("Food", Period::Yearly, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_missing_budget_returns_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_budget(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_is_ordered_by_category() {
        let conn = get_test_connection();
        let [transport, food_monthly, food_weekly] = [
            Budget::build("Transport", 80.0, Period::Monthly),
            Budget::build("Food", 200.0, Period::Monthly),
            Budget::build("Food", 50.0, Period::Weekly),
        ]
        .map(|builder| create_budget(builder, &conn).expect("Could not create budget"));

        let got = get_all_budgets(&conn).expect("Could not get budgets");

        assert_eq!(got, vec![food_monthly, food_weekly, transport]);
    }

    #[test]
    fn update_changes_only_provided_fields() {
        let conn = get_test_connection();
        let original = create_budget(
            Budget::build("Food", 200.0, Period::Monthly).dates(Some(date!(2024 - 01 - 01)), None),
            &conn,
        )
        .unwrap();

        let updated = update_budget(
            original.id,
            BudgetPatch {
                amount: Some(250.0),
                end_date: Some(Some(date!(2024 - 12 - 31))),
                ..Default::default()
            },
            &conn,
        )
        .expect("Could not update budget");

        assert_eq!(updated.amount, 250.0);
        assert_eq!(updated.end_date, Some(date!(2024 - 12 - 31)));
        assert_eq!(updated.category, original.category);
        assert_eq!(updated.period, original.period);
        assert_eq!(updated.start_date, original.start_date);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn update_with_null_date_clears_it() {
        let conn = get_test_connection();
        let original = create_budget(
            Budget::build("Food", 200.0, Period::Monthly).dates(Some(date!(2024 - 01 - 01)), None),
            &conn,
        )
        .unwrap();

        let updated = update_budget(
            original.id,
            BudgetPatch {
                start_date: Some(None),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.start_date, None);
    }

    #[test]
    fn update_with_empty_patch_returns_current_budget() {
        let conn = get_test_connection();
        let original = create_budget(Budget::build("Food", 200.0, Period::Monthly), &conn).unwrap();

        let got = update_budget(original.id, BudgetPatch::default(), &conn);

        assert_eq!(got, Ok(original));
    }

    #[test]
    fn update_into_existing_category_and_period_fails() {
        let conn = get_test_connection();
        create_budget(Budget::build("Food", 200.0, Period::Monthly), &conn).unwrap();
        let weekly = create_budget(Budget::build("Food", 50.0, Period::Weekly), &conn).unwrap();

        let result = update_budget(
            weekly.id,
            BudgetPatch {
                period: Some(Period::Monthly),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::DuplicateBudget {
                category: "Food".to_owned(),
                period: Period::Monthly,
            })
        );
        assert_eq!(get_budget(weekly.id, &conn), Ok(weekly));
    }

    #[test]
    fn update_missing_budget_returns_not_found() {
        let conn = get_test_connection();

        let got = update_budget(
            42,
            BudgetPatch {
                amount: Some(1.0),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn update_missing_budget_with_empty_patch_returns_not_found() {
        let conn = get_test_connection();

        let got = update_budget(42, BudgetPatch::default(), &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_then_get_returns_not_found() {
        let conn = get_test_connection();
        let budget = create_budget(Budget::build("Food", 200.0, Period::Monthly), &conn).unwrap();

        assert_eq!(delete_budget(budget.id, &conn), Ok(1));
        assert_eq!(get_budget(budget.id, &conn), Err(Error::NotFound));
        assert_eq!(delete_budget(budget.id, &conn), Ok(0));
    }
}

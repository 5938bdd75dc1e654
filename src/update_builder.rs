//! Builds `UPDATE` statements that only touch the columns present in a partial record.
//!
//! Each provided field becomes an explicit `(column, value)` assignment. Column
//! names come from the caller as `&'static str` constants and values are always
//! bound as positional parameters, so no user input ends up in the SQL text.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::{Deserialize, Deserializer};

use crate::database_id::DatabaseId;

/// A single `column = ?` assignment in an `UPDATE` statement.
pub(crate) struct Assignment {
    pub column: &'static str,
    pub value: Box<dyn ToSql>,
}

/// Collects the assignments for updating a single row by its `id`.
pub(crate) struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<Assignment>,
}

impl UpdateBuilder {
    /// Start an update for a row in `table`.
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    /// Assign `value` to `column`.
    pub fn set<T: ToSql + 'static>(mut self, column: &'static str, value: T) -> Self {
        self.assignments.push(Assignment {
            column,
            value: Box::new(value),
        });
        self
    }

    /// Assign `value` to `column` only if the value was provided.
    pub fn set_if_some<T: ToSql + 'static>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    /// Whether no fields have been assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The assigned columns in the order they were added.
    #[cfg(test)]
    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments
            .iter()
            .map(|assignment| assignment.column)
            .collect()
    }

    /// Render the `UPDATE` statement.
    ///
    /// The assigned values take the parameters `?1..?n` and the row ID takes
    /// `?n+1`. `returning` is a comma separated column list for the `RETURNING`
    /// clause.
    pub fn to_sql(&self, returning: &str) -> String {
        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, assignment)| format!("{} = ?{}", assignment.column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "UPDATE {} SET {} WHERE id = ?{} RETURNING {}",
            self.table,
            set_clause,
            self.assignments.len() + 1,
            returning
        )
    }

    /// Run the update against the row with `id` and map the updated row.
    ///
    /// # Errors
    /// Returns [rusqlite::Error::QueryReturnedNoRows] if no row has the ID `id`,
    /// or any other [rusqlite::Error] raised by the statement, such as a
    /// constraint violation.
    pub fn query_row<T, F>(
        self,
        id: DatabaseId,
        returning: &str,
        connection: &Connection,
        map_row: F,
    ) -> Result<T, rusqlite::Error>
    where
        F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
    {
        let sql = self.to_sql(returning);
        let id: Box<dyn ToSql> = Box::new(id);
        let params = self
            .assignments
            .iter()
            .map(|assignment| &assignment.value)
            .chain(std::iter::once(&id));

        connection.query_row(&sql, params_from_iter(params), map_row)
    }
}

/// Deserialize a field that is present in the input into `Some`, including an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` to tell apart an omitted field (`None`) from a field
/// set to `null` (`Some(None)`).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

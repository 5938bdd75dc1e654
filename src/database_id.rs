//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a row in the transactions table.
pub type TransactionId = DatabaseId;
/// The ID of a row in the budgets table.
pub type BudgetId = DatabaseId;
/// The number of rows changed by an `UPDATE` or `DELETE` statement.
pub type RowsAffected = usize;

//! Checks shared by transactions and budgets before they reach the database.

use crate::Error;

/// The largest amount accepted for a single transaction or budget.
///
/// Sums of many amounts this size stay finite and keep cent precision.
pub(crate) const MAX_AMOUNT: f64 = 1e12;

/// Check that `amount` is a positive number no larger than [MAX_AMOUNT].
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is zero, negative, not finite or
/// larger than [MAX_AMOUNT].
pub(crate) fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 && amount <= MAX_AMOUNT {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

/// Check that `category` has at least one non-whitespace character.
///
/// The category is not trimmed, since categories are matched by exact value.
///
/// # Errors
/// Returns [Error::EmptyCategory] if `category` is blank.
pub(crate) fn validate_category(category: &str) -> Result<&str, Error> {
    if category.trim().is_empty() {
        Err(Error::EmptyCategory)
    } else {
        Ok(category)
    }
}

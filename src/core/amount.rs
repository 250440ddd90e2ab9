use rust_decimal::{Decimal, RoundingStrategy};

use super::error::PainError;

/// Maximum digits (excluding the decimal point) of an instructed amount.
pub fn max_digits(currency: &str) -> usize {
    if currency == "EUR" { 11 } else { 15 }
}

/// Round to cents, half away from zero.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render with exactly two decimals, `.` separator, no grouping.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = round_amount(amount);
    rounded.rescale(2);
    rounded.to_string()
}

/// Number of digits in the rendered amount.
pub fn digit_count(amount: Decimal) -> usize {
    format_amount(amount)
        .chars()
        .filter(char::is_ascii_digit)
        .count()
}

/// Fail with [`PainError::AmountTooLarge`] when the rendered amount does not
/// fit the currency's digit limit.
pub fn check_amount_digits(amount: Decimal, currency: &str) -> Result<(), PainError> {
    let limit = max_digits(currency);
    if digit_count(amount) > limit {
        return Err(PainError::AmountTooLarge {
            amount: format_amount(amount),
            currency: currency.to_string(),
            max_digits: limit,
        });
    }
    Ok(())
}

/// Largest amount accepted for `currency`, e.g. `999999999.99` for EUR.
pub fn max_amount(currency: &str) -> Decimal {
    let nines = "9".repeat(max_digits(currency) - 2);
    // A string of nines followed by two decimals always parses.
    format!("{nines}.99").parse().unwrap_or(Decimal::MAX)
}

//! BIC normalisation and per-variant format checks.

use std::sync::LazyLock;

use regex::Regex;

use super::error::PainError;
use super::variant::{BicPattern, Variant};

static STRICT_BIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3})?$").expect("valid BIC regex")
});

static RELAXED_BIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("valid BIC regex")
});

/// Uppercase and strip spaces.
pub fn normalize_bic(bic: &str) -> String {
    bic.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Whether an already normalised BIC matches `pattern`.
pub fn matches_pattern(bic: &str, pattern: BicPattern) -> bool {
    match pattern {
        BicPattern::Strict => STRICT_BIC.is_match(bic),
        BicPattern::Relaxed => RELAXED_BIC.is_match(bic),
    }
}

/// Normalise and validate a BIC for `variant`.
///
/// Returns `Ok(None)` for missing or blank input and
/// [`PainError::InvalidBic`] naming `party` when the code does not match.
pub fn clean_bic(
    bic: Option<&str>,
    variant: Variant,
    party: &str,
) -> Result<Option<String>, PainError> {
    let Some(raw) = bic else {
        return Ok(None);
    };
    let cleaned = normalize_bic(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }
    if matches_pattern(&cleaned, variant.rules().bic_pattern) {
        Ok(Some(cleaned))
    } else {
        Err(PainError::InvalidBic {
            bic: cleaned,
            party: party.to_string(),
        })
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a credit transfer document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PainError {
    /// The batch failed preflight validation. Carries every problem found.
    #[error("preflight failed: {0}")]
    Preflight(PreflightReport),

    /// A BIC is present but does not match the variant's pattern.
    #[error("invalid BIC '{bic}' on the bank of {party}")]
    InvalidBic { bic: String, party: String },

    /// The variant requires a BIC and none is set.
    #[error("{party} has no BIC, which this variant requires")]
    MissingBic { party: String },

    /// The rendered amount has more digits than the currency allows.
    #[error("amount {amount} {currency} is too large (max {max_digits} digits)")]
    AmountTooLarge {
        amount: String,
        currency: String,
        max_digits: usize,
    },

    /// SEPA mode requires an IBAN on the creditor account.
    #[error("the account of {party} is not an IBAN")]
    NonIbanAccount { party: String },

    /// `NbOfTxs` cannot hold the number of transactions.
    #[error("too many transactions for a single file: {0}")]
    TooManyTransactions(usize),

    /// Invalid builder input.
    #[error("builder error: {0}")]
    Builder(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl PainError {
    /// Preflight issues carried by this error, empty for other variants.
    pub fn issues(&self) -> &[PreflightIssue] {
        match self {
            Self::Preflight(report) => &report.issues,
            _ => &[],
        }
    }
}

/// Stable classification of a preflight problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Initiating party IBAN (or name) missing.
    MissingCredentials,
    /// A business creditor has no country code.
    MissingPartnerCountry,
    /// A country code is not an ISO 3166-1 alpha-2 code.
    InvalidCountry,
    /// SEPA mode and a creditor account is not an IBAN.
    MissingIban,
    /// Amount is zero or negative, or overflows the currency's digits.
    InvalidAmount,
    /// Amount has more digits than the currency allows. Always reported
    /// together with [`IssueKind::InvalidAmount`].
    AmountTooLarge,
    /// Currency code malformed, or not EUR in SEPA mode.
    InvalidCurrency,
    /// BIC required by the variant and absent.
    #[serde(rename = "MissingBIC")]
    MissingBic,
    /// BIC present but malformed.
    #[serde(rename = "InvalidBIC")]
    InvalidBic,
    /// UETR missing or not a lowercase UUIDv4 where one is required.
    InvalidUetr,
    /// Batch size overflows the 15-digit `NbOfTxs`.
    TooManyTransactions,
}

impl IssueKind {
    /// Stable tag, e.g. `"MissingBIC"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MissingCredentials",
            Self::MissingPartnerCountry => "MissingPartnerCountry",
            Self::InvalidCountry => "InvalidCountry",
            Self::MissingIban => "MissingIban",
            Self::InvalidAmount => "InvalidAmount",
            Self::AmountTooLarge => "AmountTooLarge",
            Self::InvalidCurrency => "InvalidCurrency",
            Self::MissingBic => "MissingBIC",
            Self::InvalidBic => "InvalidBIC",
            Self::InvalidUetr => "InvalidUetr",
            Self::TooManyTransactions => "TooManyTransactions",
        }
    }

    /// Whether this kind rejects the payment amount. Digit overflow is the
    /// "too large" flavour of an invalid amount.
    pub fn is_amount_problem(&self) -> bool {
        matches!(self, Self::InvalidAmount | Self::AmountTooLarge)
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single preflight problem, tagged with the failing party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightIssue {
    pub kind: IssueKind,
    /// Name of the party the problem belongs to.
    pub party: String,
    /// Zero-based index of the payment, `None` for batch-level problems.
    pub payment: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.payment {
            Some(idx) => write!(
                f,
                "[{}] payment #{} ({}): {}",
                self.kind, idx, self.party, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.kind, self.party, self.message),
        }
    }
}

impl PreflightIssue {
    /// Issue attached to the batch as a whole.
    pub fn batch(kind: IssueKind, party: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            party: party.into(),
            payment: None,
            message: message.into(),
        }
    }

    /// Issue attached to one payment.
    pub fn payment(
        kind: IssueKind,
        index: usize,
        party: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            party: party.into(),
            payment: Some(index),
            message: message.into(),
        }
    }
}

/// Aggregate of all preflight problems found in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightReport {
    pub issues: Vec<PreflightIssue>,
}

impl PreflightReport {
    pub fn new(issues: Vec<PreflightIssue>) -> Self {
        Self { issues }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether at least one issue has the given kind.
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// Whether at least one issue rejects an amount (≤ 0 or overflow).
    pub fn has_invalid_amount(&self) -> bool {
        self.issues.iter().any(|i| i.kind.is_amount_problem())
    }
}

impl std::fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = self
            .issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&msg)
    }
}

impl From<Vec<PreflightIssue>> for PainError {
    fn from(issues: Vec<PreflightIssue>) -> Self {
        Self::Preflight(PreflightReport::new(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_with_and_without_payment() {
        let batch = PreflightIssue::batch(IssueKind::MissingCredentials, "ACME", "no IBAN");
        assert_eq!(batch.to_string(), "[MissingCredentials] ACME: no IBAN");

        let pay = PreflightIssue::payment(IssueKind::MissingBic, 2, "Kunde AG", "no BIC");
        assert_eq!(pay.to_string(), "[MissingBIC] payment #2 (Kunde AG): no BIC");
    }

    #[test]
    fn report_joins_all_issues() {
        let err: PainError = vec![
            PreflightIssue::batch(IssueKind::MissingCredentials, "ACME", "no IBAN"),
            PreflightIssue::payment(IssueKind::InvalidAmount, 0, "X", "amount must be positive"),
        ]
        .into();
        assert_eq!(err.issues().len(), 2);
        let text = err.to_string();
        assert!(text.starts_with("preflight failed: [MissingCredentials]"));
        assert!(text.contains("; [InvalidAmount] payment #0"));
    }

    #[test]
    fn amount_problem_family() {
        assert!(IssueKind::InvalidAmount.is_amount_problem());
        assert!(IssueKind::AmountTooLarge.is_amount_problem());
        assert!(!IssueKind::MissingIban.is_amount_problem());
    }

    #[test]
    fn kind_serializes_to_stable_tag() {
        let json = serde_json::to_string(&IssueKind::MissingBic).unwrap();
        assert_eq!(json, "\"MissingBIC\"");
        let json = serde_json::to_string(&IssueKind::MissingIban).unwrap();
        assert_eq!(json, "\"MissingIban\"");
    }
}

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::variant::Variant;

/// A batch of outgoing credit transfers drawn on one debtor account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Bank-specific flavour of pain.001 to emit.
    pub variant: Variant,
    /// The ordering entity; its account is debited.
    pub initiating_party: Party,
    /// Payments, in the order they should appear in the file.
    pub payments: Vec<Payment>,
    /// Ask the bank to book one aggregate line per `PmtInf`.
    pub batch_booking: bool,
    /// Non-SEPA transfer: service level `NURG`, any currency, any account number.
    pub generic: bool,
    /// Salary run: high priority, `SALA` category purpose, `/A/ ` remittance prefix.
    pub is_salary: bool,
    /// Caller-supplied `MsgId`. Derived from the build timestamp when absent.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Currency of the debtor account (`DbtrAcct/Ccy`).
    #[serde(default)]
    pub account_currency: Option<String>,
}

/// Person or organisation taking part in a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    /// Legal name.
    pub name: String,
    /// Organisation (true) or individual (false).
    #[serde(default = "default_true")]
    pub is_company: bool,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Organisation tax identifier.
    #[serde(default)]
    pub vat: Option<String>,
    /// BIC of the bank holding `account_number`.
    #[serde(default)]
    pub bic: Option<String>,
    /// IBAN, or any account number in generic mode.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Holder name registered on the bank account, if it differs from `name`.
    #[serde(default)]
    pub account_holder: Option<String>,
    /// Name of the commercial entity the party belongs to.
    #[serde(default)]
    pub commercial_name: Option<String>,
    /// ISO 17442 Legal Entity Identifier.
    #[serde(default)]
    pub lei: Option<String>,
    /// Organisation identifier for `Id/OrgId/Othr/Id`.
    #[serde(default)]
    pub initiating_party_id: Option<String>,
    /// Issuer of `initiating_party_id`.
    #[serde(default)]
    pub initiating_party_issuer: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Party {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_company: true,
            country_code: None,
            street: None,
            zip: None,
            city: None,
            phone: None,
            email: None,
            vat: None,
            bic: None,
            account_number: None,
            account_holder: None,
            commercial_name: None,
            lei: None,
            initiating_party_id: None,
            initiating_party_issuer: None,
        }
    }
}

impl Party {
    /// Country code if set and non-blank.
    pub fn country(&self) -> Option<&str> {
        non_blank(self.country_code.as_deref())
    }

    /// BIC if set and non-blank.
    pub fn bic(&self) -> Option<&str> {
        non_blank(self.bic.as_deref())
    }

    /// Account number if set and non-blank.
    pub fn account(&self) -> Option<&str> {
        non_blank(self.account_number.as_deref())
    }

    /// Name to print in error messages.
    pub fn display_name(&self) -> &str {
        non_blank(Some(self.name.as_str()))
            .or_else(|| non_blank(self.commercial_name.as_deref()))
            .unwrap_or("<unnamed party>")
    }
}

/// One credit transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Instruction id (`InstrId`), free-form.
    #[serde(default)]
    pub name: Option<String>,
    /// Stable string the `EndToEndId` is derived from.
    pub end_to_end_id_source: String,
    pub creditor: Party,
    /// Must be positive.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Requested execution date. Past dates are moved to the build date.
    pub execution_date: NaiveDate,
    /// Free-form or structured remittance information.
    #[serde(default)]
    pub remittance: Option<String>,
    /// Lowercase UUIDv4, required by `generic_09`.
    #[serde(default)]
    pub uetr: Option<String>,
}

/// Per-call build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Frozen clock for `CreDtTm`, the derived `MsgId` and date rounding.
    /// `None` reads the local system clock.
    pub created_at: Option<NaiveDateTime>,
    /// Indentation width for pretty printing; `0` writes compact XML.
    pub indent: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            created_at: None,
            indent: 2,
        }
    }
}

impl BuildOptions {
    /// Options with a frozen creation timestamp.
    pub fn at(created_at: NaiveDateTime) -> Self {
        Self {
            created_at: Some(created_at),
            ..Self::default()
        }
    }

    /// Resolve the creation timestamp, truncated to whole seconds.
    pub fn timestamp(&self) -> NaiveDateTime {
        let now = self
            .created_at
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        now.with_nanosecond(0).unwrap_or(now)
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

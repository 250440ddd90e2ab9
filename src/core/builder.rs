use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::PainError;
use super::types::*;
use super::validation;
use super::variant::Variant;

/// Builder for a credit transfer batch.
///
/// ```
/// use pain001::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let debtor = PartyBuilder::new("ACME GmbH")
///     .country("DE")
///     .account("DE89 3704 0044 0532 0130 00")
///     .bic("COBADEFFXXX")
///     .build();
/// let creditor = PartyBuilder::new("Kunde BV")
///     .address("Rue Neuve 1", "1000", "Bruxelles", "BE")
///     .account("BE68 5390 0754 7034")
///     .bic("GKCCBEBB")
///     .build();
///
/// let batch = BatchRequestBuilder::new(Variant::German03, debtor)
///     .payment(PaymentBuilder::new("INV-2024-001", creditor, dec!(1234.50),
///         NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
///         .remittance("+++090/9337/55493+++")
///         .build())
///     .build()
///     .unwrap();
/// assert_eq!(batch.payments.len(), 1);
/// ```
pub struct BatchRequestBuilder {
    variant: Variant,
    initiating_party: Party,
    payments: Vec<Payment>,
    batch_booking: bool,
    generic: bool,
    is_salary: bool,
    message_id: Option<String>,
    account_currency: Option<String>,
}

impl BatchRequestBuilder {
    pub fn new(variant: Variant, initiating_party: Party) -> Self {
        Self {
            variant,
            initiating_party,
            payments: Vec::new(),
            batch_booking: false,
            generic: false,
            is_salary: false,
            message_id: None,
            account_currency: None,
        }
    }

    pub fn payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn payments(mut self, payments: impl IntoIterator<Item = Payment>) -> Self {
        self.payments.extend(payments);
        self
    }

    pub fn batch_booking(mut self, batch_booking: bool) -> Self {
        self.batch_booking = batch_booking;
        self
    }

    /// Non-SEPA transfer (`NURG`, any currency, any account number).
    pub fn generic(mut self, generic: bool) -> Self {
        self.generic = generic;
        self
    }

    pub fn salary(mut self, is_salary: bool) -> Self {
        self.is_salary = is_salary;
        self
    }

    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn account_currency(mut self, currency: impl Into<String>) -> Self {
        self.account_currency = Some(currency.into());
        self
    }

    /// Build and run preflight validation.
    pub fn build(self) -> Result<BatchRequest, PainError> {
        let request = self.build_unchecked();
        let issues = validation::preflight(&request);
        if !issues.is_empty() {
            return Err(issues.into());
        }
        Ok(request)
    }

    /// Build without validation (for testing or when validating later).
    pub fn build_unchecked(self) -> BatchRequest {
        BatchRequest {
            variant: self.variant,
            initiating_party: self.initiating_party,
            payments: self.payments,
            batch_booking: self.batch_booking,
            generic: self.generic,
            is_salary: self.is_salary,
            message_id: self.message_id,
            account_currency: self.account_currency,
        }
    }
}

/// Builder for [`Party`]. Parties are organisations unless
/// [`individual`](Self::individual) is called.
pub struct PartyBuilder {
    party: Party,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            party: Party {
                name: name.into(),
                ..Party::default()
            },
        }
    }

    pub fn individual(mut self) -> Self {
        self.party.is_company = false;
        self
    }

    pub fn country(mut self, code: impl Into<String>) -> Self {
        self.party.country_code = Some(code.into());
        self
    }

    /// Street, postal code, city and country in one call.
    pub fn address(
        mut self,
        street: impl Into<String>,
        zip: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        self.party.street = Some(street.into());
        self.party.zip = Some(zip.into());
        self.party.city = Some(city.into());
        self.party.country_code = Some(country.into());
        self
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.party.street = Some(street.into());
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.party.zip = Some(zip.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.party.city = Some(city.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.party.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.party.email = Some(email.into());
        self
    }

    pub fn vat(mut self, vat: impl Into<String>) -> Self {
        self.party.vat = Some(vat.into());
        self
    }

    pub fn bic(mut self, bic: impl Into<String>) -> Self {
        self.party.bic = Some(bic.into());
        self
    }

    /// IBAN, or any account number for generic transfers.
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.party.account_number = Some(account.into());
        self
    }

    pub fn account_holder(mut self, holder: impl Into<String>) -> Self {
        self.party.account_holder = Some(holder.into());
        self
    }

    pub fn commercial_name(mut self, name: impl Into<String>) -> Self {
        self.party.commercial_name = Some(name.into());
        self
    }

    pub fn lei(mut self, lei: impl Into<String>) -> Self {
        self.party.lei = Some(lei.into());
        self
    }

    /// Organisation id for `InitgPty`/`Dbtr`, with an optional issuer.
    pub fn organisation_id(mut self, id: impl Into<String>, issuer: Option<&str>) -> Self {
        self.party.initiating_party_id = Some(id.into());
        self.party.initiating_party_issuer = issuer.map(str::to_string);
        self
    }

    pub fn build(self) -> Party {
        self.party
    }
}

/// Builder for [`Payment`]. Currency defaults to EUR.
pub struct PaymentBuilder {
    payment: Payment,
}

impl PaymentBuilder {
    pub fn new(
        end_to_end_id_source: impl Into<String>,
        creditor: Party,
        amount: Decimal,
        execution_date: NaiveDate,
    ) -> Self {
        Self {
            payment: Payment {
                name: None,
                end_to_end_id_source: end_to_end_id_source.into(),
                creditor,
                amount,
                currency: "EUR".to_string(),
                execution_date,
                remittance: None,
                uetr: None,
            },
        }
    }

    /// Instruction id (`InstrId`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.payment.name = Some(name.into());
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.payment.currency = code.into();
        self
    }

    pub fn remittance(mut self, text: impl Into<String>) -> Self {
        self.payment.remittance = Some(text.into());
        self
    }

    pub fn uetr(mut self, uetr: impl Into<String>) -> Self {
        self.payment.uetr = Some(uetr.into());
        self
    }

    pub fn build(self) -> Payment {
        self.payment
    }
}

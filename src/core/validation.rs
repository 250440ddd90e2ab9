use rust_decimal::Decimal;
use uuid::Uuid;

use super::amount::{digit_count, max_digits};
use super::bic::clean_bic;
use super::codes::{is_known_country, is_known_currency};
use super::error::{IssueKind, PreflightIssue};
use super::iban::{is_iban, is_qr_iban};
use super::types::{BatchRequest, Party, Payment};
use super::variant::VariantRules;

/// Largest value `NbOfTxs` can carry (15 digits).
pub const MAX_TRANSACTIONS: u64 = 999_999_999_999_999;

/// Check a batch before any XML is written.
///
/// Returns every problem found, not just the first, so the caller can
/// repair its input in one pass. An empty result means the batch can be
/// serialized.
pub fn preflight(request: &BatchRequest) -> Vec<PreflightIssue> {
    let rules = request.variant.rules();
    let mut issues = Vec::new();

    validate_initiating_party(&request.initiating_party, &rules, &mut issues);

    if let Some(ccy) = request
        .account_currency
        .as_deref()
        .filter(|c| !is_known_currency(c))
    {
        issues.push(PreflightIssue::batch(
            IssueKind::InvalidCurrency,
            request.initiating_party.display_name(),
            format!("account currency '{ccy}' is not an ISO 4217 code"),
        ));
    }

    if request.payments.len() as u64 > MAX_TRANSACTIONS {
        issues.push(PreflightIssue::batch(
            IssueKind::TooManyTransactions,
            request.initiating_party.display_name(),
            format!(
                "{} payments exceed the 15-digit transaction count",
                request.payments.len()
            ),
        ));
    }

    for (index, payment) in request.payments.iter().enumerate() {
        validate_payment(payment, index, request.generic, &rules, &mut issues);
    }

    tracing::debug!(
        variant = %request.variant,
        payments = request.payments.len(),
        issues = issues.len(),
        "preflight finished"
    );
    issues
}

fn validate_initiating_party(
    party: &Party,
    rules: &VariantRules,
    issues: &mut Vec<PreflightIssue>,
) {
    let who = party.display_name();

    if party.name.trim().is_empty() {
        issues.push(PreflightIssue::batch(
            IssueKind::MissingCredentials,
            who,
            "initiating party has no name",
        ));
    }

    match party.account() {
        None => issues.push(PreflightIssue::batch(
            IssueKind::MissingCredentials,
            who,
            "initiating party has no IBAN",
        )),
        Some(account) if !is_iban(account) => issues.push(PreflightIssue::batch(
            IssueKind::MissingCredentials,
            who,
            format!("initiating party account '{account}' is not a valid IBAN"),
        )),
        Some(_) => {}
    }

    if let Some(country) = party.country().filter(|c| !is_known_country(c)) {
        issues.push(PreflightIssue::batch(
            IssueKind::InvalidCountry,
            who,
            format!("country '{country}' is not an ISO 3166-1 code"),
        ));
    }

    match clean_bic(party.bic(), rules.variant, who) {
        Ok(Some(_)) => {}
        Ok(None) if rules.requires_debtor_bic => issues.push(PreflightIssue::batch(
            IssueKind::MissingBic,
            who,
            format!("variant {} requires the BIC of the debtor bank", rules.variant),
        )),
        Ok(None) => {}
        Err(err) => issues.push(PreflightIssue::batch(
            IssueKind::InvalidBic,
            who,
            err.to_string(),
        )),
    }
}

fn validate_payment(
    payment: &Payment,
    index: usize,
    generic: bool,
    rules: &VariantRules,
    issues: &mut Vec<PreflightIssue>,
) {
    let creditor = &payment.creditor;
    let who = creditor.display_name();
    let mut push = |kind: IssueKind, message: String| {
        issues.push(PreflightIssue::payment(kind, index, who, message));
    };

    if payment.amount <= Decimal::ZERO {
        push(
            IssueKind::InvalidAmount,
            format!("amount {} must be positive", payment.amount),
        );
    } else if digit_count(payment.amount) > max_digits(&payment.currency) {
        let message = format!(
            "amount {} {} is too large: more than {} digits",
            payment.amount,
            payment.currency,
            max_digits(&payment.currency)
        );
        push(IssueKind::InvalidAmount, message.clone());
        push(IssueKind::AmountTooLarge, message);
    }

    if !is_known_currency(&payment.currency) {
        push(
            IssueKind::InvalidCurrency,
            format!("currency '{}' is not an ISO 4217 code", payment.currency),
        );
    } else if !generic && payment.currency != "EUR" {
        push(
            IssueKind::InvalidCurrency,
            format!("SEPA transfers must be in EUR, got {}", payment.currency),
        );
    }

    let account = creditor.account();
    match account {
        None => push(IssueKind::MissingIban, "creditor has no bank account".into()),
        Some(acc) if !generic && !is_iban(acc) => push(
            IssueKind::MissingIban,
            format!("account '{acc}' is not an IBAN"),
        ),
        Some(_) => {}
    }

    match creditor.country() {
        None if creditor.is_company => push(
            IssueKind::MissingPartnerCountry,
            "business creditor has no country".into(),
        ),
        Some(country) if !is_known_country(country) => push(
            IssueKind::InvalidCountry,
            format!("country '{country}' is not an ISO 3166-1 code"),
        ),
        _ => {}
    }

    let qr_agent_omitted = rules.omit_agent_for_qr_iban && account.is_some_and(is_qr_iban);
    match clean_bic(creditor.bic(), rules.variant, who) {
        Ok(Some(_)) => {}
        Ok(None) if rules.requires_creditor_bic() && !qr_agent_omitted => push(
            IssueKind::MissingBic,
            format!("variant {} requires the BIC of the creditor bank", rules.variant),
        ),
        Ok(None) => {}
        Err(err) => push(IssueKind::InvalidBic, err.to_string()),
    }

    if rules.requires_uetr {
        match payment.uetr.as_deref() {
            None => push(IssueKind::InvalidUetr, "UETR is required".into()),
            Some(uetr) if !is_valid_uetr(uetr) => push(
                IssueKind::InvalidUetr,
                format!("'{uetr}' is not a lowercase UUIDv4"),
            ),
            Some(_) => {}
        }
    }
}

/// A UETR is a UUIDv4 in lowercase hyphenated form.
pub fn is_valid_uetr(uetr: &str) -> bool {
    match Uuid::try_parse(uetr) {
        Ok(id) => {
            id.get_version_num() == 4
                && id.get_variant() == uuid::Variant::RFC4122
                && id.hyphenated().to_string() == uetr
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{BatchRequestBuilder, PartyBuilder, PaymentBuilder};
    use crate::core::variant::Variant;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const UETR: &str = "3f2504e0-4f89-41d3-9a0c-0305e82c3301";

    fn debtor() -> Party {
        PartyBuilder::new("ACME GmbH")
            .country("DE")
            .account("DE89370400440532013000")
            .bic("COBADEFFXXX")
            .build()
    }

    fn creditor() -> Party {
        PartyBuilder::new("Kunde BV")
            .country("BE")
            .account("BE68539007547034")
            .bic("GKCCBEBB")
            .build()
    }

    fn payment(amount: Decimal) -> Payment {
        PaymentBuilder::new(
            "INV-1",
            creditor(),
            amount,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
        .build()
    }

    fn kinds(issues: &[PreflightIssue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn valid_batch_has_no_issues() {
        let req = BatchRequestBuilder::new(Variant::German03, debtor())
            .payment(payment(dec!(10)))
            .build_unchecked();
        assert!(preflight(&req).is_empty());
    }

    #[test]
    fn collects_every_problem() {
        let mut debtor = debtor();
        debtor.account_number = None;
        let mut bad = payment(dec!(-1));
        bad.currency = "USD".into();
        bad.creditor.country_code = None;
        let req = BatchRequestBuilder::new(Variant::German03, debtor)
            .payment(bad)
            .build_unchecked();
        let issues = preflight(&req);
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::MissingCredentials,
                IssueKind::InvalidAmount,
                IssueKind::InvalidCurrency,
                IssueKind::MissingPartnerCountry,
            ]
        );
        assert_eq!(issues[1].payment, Some(0));
        assert_eq!(issues[1].party, "Kunde BV");
    }

    #[test]
    fn overflow_is_an_amount_problem() {
        let req = BatchRequestBuilder::new(Variant::German03, debtor())
            .payment(payment(dec!(123456789012.34)))
            .build_unchecked();
        let issues = preflight(&req);
        assert_eq!(
            kinds(&issues),
            vec![IssueKind::InvalidAmount, IssueKind::AmountTooLarge]
        );
        assert!(issues.iter().all(|i| i.kind.is_amount_problem()));
        assert!(issues[0].message.contains("too large"));
    }

    #[test]
    fn generic_mode_accepts_foreign_currency_and_accounts() {
        let mut p = payment(dec!(10));
        p.currency = "USD".into();
        p.creditor.account_number = Some("123456789".into());
        let req = BatchRequestBuilder::new(Variant::Generic03, debtor())
            .generic(true)
            .payment(p)
            .build_unchecked();
        assert!(preflight(&req).is_empty());
    }

    #[test]
    fn sepa_requires_creditor_iban() {
        let mut p = payment(dec!(10));
        p.creditor.account_number = Some("123456789".into());
        let req = BatchRequestBuilder::new(Variant::Generic03, debtor())
            .payment(p)
            .build_unchecked();
        assert_eq!(kinds(&preflight(&req)), vec![IssueKind::MissingIban]);
    }

    #[test]
    fn austrian_requires_creditor_bic() {
        let mut p = payment(dec!(10));
        p.creditor.bic = None;
        let req = BatchRequestBuilder::new(Variant::Austrian004, debtor())
            .payment(p)
            .build_unchecked();
        assert_eq!(kinds(&preflight(&req)), vec![IssueKind::MissingBic]);
    }

    #[test]
    fn swiss_qr_iban_needs_no_creditor_bic() {
        let mut p = payment(dec!(10));
        p.creditor.bic = None;
        p.creditor.country_code = Some("CH".into());
        p.creditor.account_number = Some("CH4431999123000889012".into());
        let req = BatchRequestBuilder::new(Variant::SwissCh02, debtor())
            .payment(p.clone())
            .build_unchecked();
        assert!(preflight(&req).is_empty());

        p.creditor.account_number = Some("CH9300762011623852957".into());
        let req = BatchRequestBuilder::new(Variant::SwissCh02, debtor())
            .payment(p)
            .build_unchecked();
        assert_eq!(kinds(&preflight(&req)), vec![IssueKind::MissingBic]);
    }

    #[test]
    fn swedish_requires_debtor_bic() {
        let mut d = debtor();
        d.bic = None;
        let req = BatchRequestBuilder::new(Variant::Swedish03, d)
            .payment(payment(dec!(10)))
            .build_unchecked();
        let issues = preflight(&req);
        assert_eq!(kinds(&issues), vec![IssueKind::MissingBic]);
        assert_eq!(issues[0].payment, None);
    }

    #[test]
    fn malformed_bic_is_reported() {
        let mut p = payment(dec!(10));
        p.creditor.bic = Some("NOTABIC".into());
        let req = BatchRequestBuilder::new(Variant::German03, debtor())
            .payment(p)
            .build_unchecked();
        let issues = preflight(&req);
        assert_eq!(kinds(&issues), vec![IssueKind::InvalidBic]);
        assert!(issues[0].message.contains("NOTABIC"));
    }

    #[test]
    fn individuals_may_omit_country() {
        let mut p = payment(dec!(10));
        p.creditor.is_company = false;
        p.creditor.country_code = None;
        let req = BatchRequestBuilder::new(Variant::German03, debtor())
            .payment(p)
            .build_unchecked();
        assert!(preflight(&req).is_empty());
    }

    #[test]
    fn unknown_country_code() {
        let mut p = payment(dec!(10));
        p.creditor.country_code = Some("XX".into());
        let req = BatchRequestBuilder::new(Variant::German03, debtor())
            .payment(p)
            .build_unchecked();
        assert_eq!(kinds(&preflight(&req)), vec![IssueKind::InvalidCountry]);
    }

    #[test]
    fn uetr_required_for_09() {
        let req = BatchRequestBuilder::new(Variant::Generic09, debtor())
            .payment(payment(dec!(10)))
            .build_unchecked();
        assert_eq!(kinds(&preflight(&req)), vec![IssueKind::InvalidUetr]);

        let mut p = payment(dec!(10));
        p.uetr = Some(UETR.into());
        let req = BatchRequestBuilder::new(Variant::Generic09, debtor())
            .payment(p)
            .build_unchecked();
        assert!(preflight(&req).is_empty());
    }

    #[test]
    fn uetr_format() {
        assert!(is_valid_uetr(UETR));
        assert!(!is_valid_uetr(&UETR.to_uppercase()));
        assert!(!is_valid_uetr("3f2504e04f8941d39a0c0305e82c3301"));
        // Version 1.
        assert!(!is_valid_uetr("3f2504e0-4f89-11d3-9a0c-0305e82c3301"));
        assert!(!is_valid_uetr("not-a-uuid"));
    }

    #[test]
    fn unknown_account_currency() {
        let req = BatchRequestBuilder::new(Variant::German03, debtor())
            .account_currency("EURO")
            .payment(payment(dec!(10)))
            .build_unchecked();
        assert_eq!(kinds(&preflight(&req)), vec![IssueKind::InvalidCurrency]);
    }
}

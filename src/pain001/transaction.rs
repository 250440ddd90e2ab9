use super::party::{write_creditor, write_creditor_account, write_creditor_agent};
use super::remittance::write_remittance;
use super::xml_utils::XmlWriter;
use crate::core::amount::check_amount_digits;
use crate::core::reference::{ReferenceContext, remittance_info};
use crate::core::sanitize::sanitize;
use crate::core::{PainError, Payment, Remittance, VariantRules};

/// Maximum length of `PmtInfId` and `EndToEndId`.
pub(super) const ID_LEN: usize = 30;

/// `EndToEndId`: the last 30 characters of `PmtInfId` followed by the
/// sanitized source string.
pub(super) fn end_to_end_id(pmt_inf_id: &str, source: &str) -> String {
    let combined = format!("{pmt_inf_id}{}", sanitize(Some(source), usize::MAX));
    id_tail(&combined)
}

/// Last [`ID_LEN`] characters of `id`, without a leading slash or blank
/// exposed by the cut.
pub(super) fn id_tail(id: &str) -> String {
    last_chars(id, ID_LEN)
        .trim_start_matches(['/', ' '])
        .trim_end()
        .to_string()
}

/// Suffix of at most `n` characters.
fn last_chars(s: &str, n: usize) -> &str {
    let skip = s.chars().count().saturating_sub(n);
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// One `CdtTrfTxInf`.
pub(super) fn write_transaction(
    w: &mut XmlWriter,
    payment: &Payment,
    index: usize,
    pmt_inf_id: &str,
    rules: &VariantRules,
    generic: bool,
    is_salary: bool,
) -> Result<(), PainError> {
    check_amount_digits(payment.amount, &payment.currency)?;

    w.start_element("CdtTrfTxInf")?;

    w.start_element("PmtId")?;
    w.optional_text_element("InstrId", Some(&sanitize(payment.name.as_deref(), 35)))?;
    w.text_element(
        "EndToEndId",
        &end_to_end_id(pmt_inf_id, &payment.end_to_end_id_source),
    )?;
    if rules.requires_uetr {
        w.optional_text_element("UETR", payment.uetr.as_deref())?;
    }
    w.end_element("PmtId")?;

    w.start_element("Amt")?;
    w.amount_element("InstdAmt", payment.amount, &payment.currency)?;
    w.end_element("Amt")?;

    write_creditor_agent(w, &payment.creditor, rules)?;
    write_creditor(w, &payment.creditor, rules)?;
    write_creditor_account(w, &payment.creditor, generic)?;

    let ctx = ReferenceContext {
        creditor_country: payment.creditor.country(),
        creditor_account: payment.creditor.account(),
    };
    let remittance = remittance_info(payment.remittance.as_deref(), &ctx, is_salary);
    match &remittance {
        Some(Remittance::Structured(reference)) => {
            tracing::trace!(payment = index, family = ?reference.family, "structured reference");
        }
        Some(Remittance::Unstructured(_)) => {
            tracing::trace!(payment = index, "unstructured remittance");
        }
        None => {}
    }
    write_remittance(w, remittance.as_ref())?;

    w.end_element("CdtTrfTxInf")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PartyBuilder, PaymentBuilder, Variant};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn payment() -> Payment {
        let creditor = PartyBuilder::new("Kunde BV")
            .country("BE")
            .account("BE68539007547034")
            .bic("GKCCBEBB")
            .build();
        PaymentBuilder::new(
            "INV-7",
            creditor,
            dec!(1234.5),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
        .name("PAY/2024/0007")
        .remittance("+++090/9337/55493+++")
        .build()
    }

    fn render(payment: &Payment, variant: Variant, salary: bool) -> Result<String, PainError> {
        let mut w = XmlWriter::new(0)?;
        write_transaction(&mut w, payment, 0, "PMT1", &variant.rules(), false, salary)?;
        let xml = String::from_utf8(w.into_bytes()).unwrap();
        Ok(xml.split_once("?>").unwrap().1.to_string())
    }

    #[test]
    fn end_to_end_takes_the_tail() {
        assert_eq!(end_to_end_id("PMT1", "INV-7"), "PMT1INV-7");
        let long_pmt = "20240401120000ABCDEF0123456789ABCD1";
        let id = end_to_end_id(long_pmt, "payment-42");
        assert_eq!(id.chars().count(), 30);
        assert!(id.ends_with("payment-42"));
        assert_eq!(end_to_end_id("PMT1", "/x/"), "PMT1x");
    }

    #[test]
    fn end_to_end_keeps_the_source_suffix() {
        let source = format!("{}{}", "A".repeat(30), "B".repeat(30));
        assert_eq!(end_to_end_id("PMT1", &source), "B".repeat(30));

        let first = end_to_end_id("PMT1", "SERVICE-BATCH-2024-SUPPLIER-REF-INV-0001");
        let second = end_to_end_id("PMT1", "SERVICE-BATCH-2024-SUPPLIER-REF-INV-0002");
        assert_ne!(first, second);
        assert!(first.ends_with("-0001"));
    }

    #[test]
    fn id_tail_drops_exposed_slash() {
        let id = format!("{}/{}", "A".repeat(10), "B".repeat(29));
        assert_eq!(id_tail(&id), "B".repeat(29));
        assert_eq!(id_tail("MSG-11"), "MSG-11");
    }

    #[test]
    fn last_chars_is_char_aware() {
        assert_eq!(last_chars("abcdef", 3), "def");
        assert_eq!(last_chars("ab", 3), "ab");
        assert_eq!(last_chars("äöü", 2), "öü");
    }

    #[test]
    fn full_transaction() {
        let xml = render(&payment(), Variant::German03, false).unwrap();
        assert_eq!(
            xml,
            concat!(
                "<CdtTrfTxInf>",
                "<PmtId><InstrId>PAY/2024/0007</InstrId><EndToEndId>PMT1INV-7</EndToEndId></PmtId>",
                "<Amt><InstdAmt Ccy=\"EUR\">1234.50</InstdAmt></Amt>",
                "<CdtrAgt><FinInstnId><BIC>GKCCBEBB</BIC></FinInstnId></CdtrAgt>",
                "<Cdtr><Nm>Kunde BV</Nm><PstlAdr><Ctry>BE</Ctry></PstlAdr></Cdtr>",
                "<CdtrAcct><Id><IBAN>BE68539007547034</IBAN></Id></CdtrAcct>",
                "<RmtInf><Strd><CdtrRefInf><Tp><CdOrPrtry><Cd>SCOR</Cd></CdOrPrtry><Issr>BBA</Issr></Tp>",
                "<Ref>090933755493</Ref></CdtrRefInf></Strd></RmtInf>",
                "</CdtTrfTxInf>"
            )
        );
    }

    #[test]
    fn uetr_only_in_09() {
        let mut p = payment();
        p.uetr = Some("3f2504e0-4f89-41d3-9a0c-0305e82c3301".into());
        let xml = render(&p, Variant::Generic09, false).unwrap();
        assert!(xml.contains("<UETR>3f2504e0-4f89-41d3-9a0c-0305e82c3301</UETR></PmtId>"));
        let xml = render(&p, Variant::German03, false).unwrap();
        assert!(!xml.contains("UETR"));
    }

    #[test]
    fn salary_remittance_prefix() {
        let mut p = payment();
        p.remittance = Some("May 2024 payroll".into());
        let xml = render(&p, Variant::German03, true).unwrap();
        assert!(xml.contains("<RmtInf><Ustrd>/A/ May 2024 payroll</Ustrd></RmtInf>"));
    }

    #[test]
    fn overflow_is_fatal() {
        let mut p = payment();
        p.amount = dec!(123456789012.34);
        let err = render(&p, Variant::German03, false).unwrap_err();
        assert!(matches!(err, PainError::AmountTooLarge { max_digits: 11, .. }));
    }
}

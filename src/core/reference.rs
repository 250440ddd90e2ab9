//! Structured creditor reference detection.
//!
//! A remittance string is matched against [`REFERENCE_FAMILIES`] in order;
//! the first family whose detector accepts it decides how the `RmtInf`
//! block is written. Adding a family means adding a row, nothing else.

use serde::{Deserialize, Serialize};

use super::iban::{is_qr_iban, mod97};
use super::sanitize::{DEFAULT_MAX_LEN, SALARY_PREFIX, salary_prefixed, sanitize_text};
use super::types::non_blank;

/// Length of a Swiss QR reference.
pub const QRR_LEN: usize = 27;

/// Known structured reference schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFamily {
    /// Belgian OGM/VCS, 12 digits, mod 97.
    BeOgm,
    /// Swiss QR reference, paid to a QR-IBAN.
    ChQrr,
    /// Finnish national reference, 7-3-1 weighted check digit.
    Fi,
    /// Norwegian KID / Swedish OCR, Luhn check digit.
    NoSe,
    /// ISO 11649 creditor reference (`RF..`).
    Iso11649,
}

impl ReferenceFamily {
    /// `CdOrPrtry/Cd` value, if the family uses the coded form.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::ChQrr => None,
            _ => Some("SCOR"),
        }
    }

    /// `CdOrPrtry/Prtry` value, if the family uses the proprietary form.
    pub fn proprietary(&self) -> Option<&'static str> {
        match self {
            Self::ChQrr => Some("QRR"),
            _ => None,
        }
    }

    /// `Tp/Issr` value.
    pub fn issuer(&self) -> Option<&'static str> {
        match self {
            Self::BeOgm => Some("BBA"),
            Self::Iso11649 => Some("ISO"),
            _ => None,
        }
    }
}

/// A reference recognised as structured, ready to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReference {
    pub family: ReferenceFamily,
    /// Text of `CdtrRefInf/Ref`.
    pub reference: String,
}

/// Classified remittance information of one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remittance {
    /// `RmtInf/Strd`.
    Structured(StructuredReference),
    /// `RmtInf/Ustrd`, already sanitized.
    Unstructured(String),
}

/// Creditor facts the detectors depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceContext<'a> {
    /// ISO country code of the creditor.
    pub creditor_country: Option<&'a str>,
    /// Account the payment is credited to.
    pub creditor_account: Option<&'a str>,
}

type Detector = fn(&str, &ReferenceContext<'_>) -> bool;
type Formatter = fn(&str) -> String;

/// One row of the classification table.
pub struct FamilyRule {
    pub family: ReferenceFamily,
    detect: Detector,
    format: Formatter,
}

/// Structured reference families in priority order.
pub static REFERENCE_FAMILIES: &[FamilyRule] = &[
    FamilyRule {
        family: ReferenceFamily::BeOgm,
        detect: |r, ctx| ctx.creditor_country == Some("BE") && is_valid_be_ogm(r),
        format: str::to_string,
    },
    FamilyRule {
        family: ReferenceFamily::ChQrr,
        detect: |r, ctx| {
            ctx.creditor_account.is_some_and(is_qr_iban)
                && !r.is_empty()
                && r.len() <= QRR_LEN
                && r.bytes().all(|b| b.is_ascii_digit())
        },
        format: |r| format!("{r:0>QRR_LEN$}"),
    },
    FamilyRule {
        family: ReferenceFamily::Fi,
        detect: |r, ctx| ctx.creditor_country == Some("FI") && is_valid_fi(r),
        format: str::to_string,
    },
    FamilyRule {
        family: ReferenceFamily::NoSe,
        detect: |r, ctx| matches!(ctx.creditor_country, Some("NO" | "SE")) && is_valid_no_se(r),
        format: str::to_string,
    },
    FamilyRule {
        family: ReferenceFamily::Iso11649,
        detect: |r, _| is_valid_iso11649(r),
        format: str::to_string,
    },
];

/// Drop whitespace and the decoration characters `+`, `*`, `/` and uppercase,
/// so `+++090/9337/55493+++` becomes `090933755493`.
pub fn normalize_reference(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '+' | '*' | '/'))
        .collect::<String>()
        .to_uppercase()
}

/// Classify `raw` as a structured reference, if any family accepts it.
pub fn classify_reference(raw: &str, ctx: &ReferenceContext<'_>) -> Option<StructuredReference> {
    let candidate = normalize_reference(raw);
    REFERENCE_FAMILIES
        .iter()
        .find(|rule| (rule.detect)(&candidate, ctx))
        .map(|rule| StructuredReference {
            family: rule.family,
            reference: (rule.format)(&candidate),
        })
}

/// Build the remittance information of a payment.
///
/// Returns `None` when there is nothing to emit. Salary payments prefix the
/// unstructured text with `/A/ ` and keep the total within 140 characters.
pub fn remittance_info(
    raw: Option<&str>,
    ctx: &ReferenceContext<'_>,
    is_salary: bool,
) -> Option<Remittance> {
    let raw = non_blank(raw)?;
    if let Some(structured) = classify_reference(raw, ctx) {
        return Some(Remittance::Structured(structured));
    }
    let body_len = if is_salary {
        DEFAULT_MAX_LEN - SALARY_PREFIX.len()
    } else {
        DEFAULT_MAX_LEN
    };
    let body = sanitize_text(raw, body_len);
    if body.trim().is_empty() {
        return None;
    }
    Some(Remittance::Unstructured(if is_salary {
        salary_prefixed(&body)
    } else {
        body
    }))
}

/// Belgian structured communication: 10 digits followed by their mod 97.
pub fn is_valid_be_ogm(reference: &str) -> bool {
    if reference.len() != 12 || !reference.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match (reference[..10].parse::<u64>(), reference[10..].parse::<u64>()) {
        (Ok(base), Ok(check)) => base % 97 == check % 97,
        _ => false,
    }
}

/// Finnish reference: 4–20 digits, last one a 7-3-1 weighted check digit.
pub fn is_valid_fi(reference: &str) -> bool {
    if !(4..=20).contains(&reference.len()) || !reference.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (base, check) = reference.split_at(reference.len() - 1);
    let total: u32 = base
        .bytes()
        .rev()
        .zip([7u32, 3, 1].into_iter().cycle())
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    let expected = (10 - total % 10) % 10;
    u32::from(check.as_bytes()[0] - b'0') == expected
}

/// Norwegian KID / Swedish OCR: 2–25 digits passing the Luhn check.
pub fn is_valid_no_se(reference: &str) -> bool {
    if !(2..=25).contains(&reference.len()) || !reference.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    luhn(reference)
}

/// ISO 11649: `RF`, two check digits, 1–21 alphanumerics, MOD 97-10 == 1.
pub fn is_valid_iso11649(reference: &str) -> bool {
    let bytes = reference.as_bytes();
    if !(5..=25).contains(&bytes.len())
        || !reference.starts_with("RF")
        || !bytes[2..4].iter().all(u8::is_ascii_digit)
        || !bytes[4..]
            .iter()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    {
        return false;
    }
    let rearranged = reference[4..].chars().chain(reference[..4].chars());
    mod97(rearranged) == Some(1)
}

fn luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(country: &'a str, account: &'a str) -> ReferenceContext<'a> {
        ReferenceContext {
            creditor_country: Some(country),
            creditor_account: Some(account),
        }
    }

    #[test]
    fn belgian_ogm() {
        assert!(is_valid_be_ogm("090933755493"));
        assert!(!is_valid_be_ogm("090933755494"));
        assert!(!is_valid_be_ogm("09093375549"));

        let r = classify_reference("+++090/9337/55493+++", &ctx("BE", "BE68539007547034")).unwrap();
        assert_eq!(r.family, ReferenceFamily::BeOgm);
        assert_eq!(r.reference, "090933755493");
        assert_eq!(r.family.issuer(), Some("BBA"));
    }

    #[test]
    fn belgian_ogm_needs_belgian_creditor() {
        assert!(classify_reference("+++090/9337/55493+++", &ctx("NL", "NL91ABNA0417164300")).is_none());
    }

    #[test]
    fn swiss_qrr_pads_to_27() {
        let r = classify_reference("21 00000 00003 13947 14300 09017", &ctx("CH", "CH4431999123000889012"))
            .unwrap();
        assert_eq!(r.family, ReferenceFamily::ChQrr);
        assert_eq!(r.reference, "210000000003139471430009017");

        let r = classify_reference("12345", &ctx("CH", "CH4431999123000889012")).unwrap();
        assert_eq!(r.reference, "000000000000000000000012345");
        assert_eq!(r.reference.len(), QRR_LEN);
        assert_eq!(r.family.proprietary(), Some("QRR"));
        assert_eq!(r.family.issuer(), None);
    }

    #[test]
    fn qrr_requires_qr_iban() {
        assert!(classify_reference("12345", &ctx("CH", "CH9300762011623852957")).is_none());
    }

    #[test]
    fn finnish_reference() {
        assert!(is_valid_fi("1232"));
        assert!(is_valid_fi("12345672"));
        assert!(!is_valid_fi("12345678"));
        // Check digit matches, but too short for a Finnish reference.
        assert!(!is_valid_fi("13"));
        assert!(!is_valid_fi("123"));
        let r = classify_reference("1234 5672", &ctx("FI", "FI2112345600000785")).unwrap();
        assert_eq!(r.family, ReferenceFamily::Fi);
        assert_eq!(r.family.code(), Some("SCOR"));
        assert_eq!(r.family.issuer(), None);
    }

    #[test]
    fn norwegian_swedish_luhn() {
        assert!(is_valid_no_se("79927398713"));
        assert!(!is_valid_no_se("79927398710"));
        let r = classify_reference("79927398713", &ctx("SE", "SE4550000000058398257466")).unwrap();
        assert_eq!(r.family, ReferenceFamily::NoSe);
        assert!(classify_reference("79927398713", &ctx("DE", "DE89370400440532013000")).is_none());
    }

    #[test]
    fn iso_11649() {
        assert!(is_valid_iso11649("RF18539007547034"));
        assert!(is_valid_iso11649("RF712348231"));
        assert!(!is_valid_iso11649("RF19539007547034"));
        assert!(!is_valid_iso11649("RF18"));
        let r = classify_reference("rf18 5390 0754 7034", &ctx("DE", "DE89370400440532013000")).unwrap();
        assert_eq!(r.family, ReferenceFamily::Iso11649);
        assert_eq!(r.reference, "RF18539007547034");
        assert_eq!(r.family.issuer(), Some("ISO"));
    }

    #[test]
    fn free_text_is_unstructured() {
        let info = remittance_info(Some("Invoice 2024/0042"), &ctx("DE", "DE89370400440532013000"), false);
        assert_eq!(info, Some(Remittance::Unstructured("Invoice 2024/0042".into())));
    }

    #[test]
    fn salary_prefix_and_length() {
        let long = "x".repeat(200);
        match remittance_info(Some(&long), &ReferenceContext::default(), true) {
            Some(Remittance::Unstructured(text)) => {
                assert!(text.starts_with("/A/ xxx"));
                assert_eq!(text.chars().count(), DEFAULT_MAX_LEN);
            }
            other => panic!("unexpected remittance: {other:?}"),
        }
    }

    #[test]
    fn blank_remittance_is_omitted() {
        assert_eq!(remittance_info(None, &ReferenceContext::default(), false), None);
        assert_eq!(remittance_info(Some("   "), &ReferenceContext::default(), false), None);
        assert_eq!(remittance_info(Some("//"), &ReferenceContext::default(), true), None);
    }

    #[test]
    fn classification_is_idempotent() {
        let samples = [
            ("+++090/9337/55493+++", ctx("BE", "BE68539007547034")),
            ("12345", ctx("CH", "CH4431999123000889012")),
            ("12345672", ctx("FI", "FI2112345600000785")),
            ("79927398713", ctx("NO", "NO9386011117947")),
            ("RF18 5390 0754 7034", ctx("FR", "FR1420041010050500013M02606")),
        ];
        for (raw, c) in samples {
            let first = classify_reference(raw, &c).unwrap();
            let second = classify_reference(&first.reference, &c).unwrap();
            assert_eq!(first, second, "{raw}");
        }
    }
}

//! IBAN checks used to pick the account element and detect Swiss QR-IBANs.

use super::codes::iban_country;

/// Strip whitespace and uppercase an account number.
pub fn normalize_account(account: &str) -> String {
    account
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Validate an IBAN: known country code, two check digits, alphanumeric BBAN,
/// total length 15–34, ISO 7064 MOD 97-10 remainder of 1.
///
/// Spaces and case are ignored.
pub fn is_iban(account: &str) -> bool {
    let iban = normalize_account(account);
    let bytes = iban.as_bytes();
    if !(15..=34).contains(&bytes.len()) {
        return false;
    }
    if iban_country(&iban).is_none()
        || !bytes[2..4].iter().all(u8::is_ascii_digit)
        || !bytes[4..].iter().all(u8::is_ascii_alphanumeric)
    {
        return false;
    }
    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    mod97(rearranged) == Some(1)
}

/// Swiss / Liechtenstein QR-IBAN: institution id (characters 5 to 9) in
/// `30000..=31999`. The length is checked first so malformed input never
/// yields a shifted IID.
pub fn is_qr_iban(account: &str) -> bool {
    let iban = normalize_account(account);
    if !(iban.starts_with("CH") || iban.starts_with("LI")) || iban.len() != 21 {
        return false;
    }
    if !is_iban(&iban) {
        return false;
    }
    let iid = &iban[4..9];
    iid.chars().all(|c| c.is_ascii_digit())
        && iid
            .parse::<u32>()
            .is_ok_and(|n| (30_000..=31_999).contains(&n))
}

/// Remainder mod 97 of the decimal expansion of `chars` (letters count as
/// 10..=35). `None` on characters outside `[0-9A-Z]`.
pub(crate) fn mod97(chars: impl Iterator<Item = char>) -> Option<u32> {
    let mut rem: u32 = 0;
    for c in chars {
        let value = c.to_digit(36)?;
        if value >= 10 {
            rem = (rem * 100 + value) % 97;
        } else {
            rem = (rem * 10 + value) % 97;
        }
    }
    Some(rem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ibans() {
        assert!(is_iban("DE89370400440532013000"));
        assert!(is_iban("DE89 3704 0044 0532 0130 00"));
        assert!(is_iban("BE68539007547034"));
        assert!(is_iban("CH4431999123000889012"));
        assert!(is_iban("GB29 NWBK 6016 1331 9268 19"));
    }

    #[test]
    fn invalid_ibans() {
        assert!(!is_iban("DE89370400440532013001"));
        assert!(!is_iban("12345678"));
        assert!(!is_iban("XX00"));
        assert!(!is_iban(""));
        assert!(!is_iban("DE8937040044053201300$"));
    }

    #[test]
    fn qr_iban_detection() {
        assert!(is_qr_iban("CH44 3199 9123 0008 8901 2"));
        // Regular Swiss IBAN (IID 00762).
        assert!(!is_qr_iban("CH9300762011623852957"));
        assert!(!is_qr_iban("DE89370400440532013000"));
        // Truncated input never matches.
        assert!(!is_qr_iban("CH4431999"));
    }

    #[test]
    fn mod97_handles_letters() {
        assert_eq!(mod97("A".chars()), Some(10));
        assert_eq!(mod97("97".chars()), Some(0));
        assert_eq!(mod97("a-".chars()), None);
    }
}

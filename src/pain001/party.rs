//! Parties, their agents and their accounts.

use std::sync::LazyLock;

use regex::Regex;

use super::xml_utils::XmlWriter;
use crate::core::bic::clean_bic;
use crate::core::iban::{is_iban, is_qr_iban, normalize_account};
use crate::core::sanitize::sanitize;
use crate::core::{AddressStyle, Party, PainError, VariantRules};

const NOT_PROVIDED: &str = "NOTPROVIDED";

static ISO_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{1,3}-[0-9()+\-]{1,30}$").expect("valid phone regex"));

/// `InitgPty`: name and organisation id, never a postal address.
pub(super) fn write_initiating_party(
    w: &mut XmlWriter,
    party: &Party,
    rules: &VariantRules,
    generic: bool,
) -> Result<(), PainError> {
    w.start_element("InitgPty")?;
    w.text_element("Nm", &sanitize(Some(&party.name), rules.name_limit(generic)))?;
    if let Some(id) = org_id(party) {
        write_org_id(
            w,
            &id,
            party.initiating_party_issuer.as_deref(),
            rules.bank_scheme_name.then_some("BANK"),
        )?;
    }
    w.end_element("InitgPty")?;
    Ok(())
}

/// `Dbtr`: name, address and, outside generic mode, the organisation id.
pub(super) fn write_debtor(
    w: &mut XmlWriter,
    party: &Party,
    rules: &VariantRules,
    generic: bool,
) -> Result<(), PainError> {
    w.start_element("Dbtr")?;
    w.text_element("Nm", &sanitize(Some(&party.name), rules.name_limit(generic)))?;
    write_postal_address(w, party, rules)?;
    if !generic {
        if let Some(id) = org_id(party) {
            write_org_id(w, &id, None, rules.bank_scheme_name.then_some("BANK"))?;
        }
    }
    write_contact_details(w, party, rules)?;
    w.end_element("Dbtr")?;
    Ok(())
}

/// `Cdtr`: account holder, else name, else commercial name, else `/`.
pub(super) fn write_creditor(
    w: &mut XmlWriter,
    party: &Party,
    rules: &VariantRules,
) -> Result<(), PainError> {
    w.start_element("Cdtr")?;
    w.text_element("Nm", &creditor_name(party))?;
    write_postal_address(w, party, rules)?;
    if rules.creditor_tax_id && party.is_company {
        if let Some(vat) = crate::core::non_blank(party.vat.as_deref()) {
            write_org_id(w, &sanitize(Some(vat), 35), None, Some("TXID"))?;
        }
    }
    write_contact_details(w, party, rules)?;
    w.end_element("Cdtr")?;
    Ok(())
}

pub(super) fn creditor_name(party: &Party) -> String {
    [
        party.account_holder.as_deref(),
        Some(party.name.as_str()),
        party.commercial_name.as_deref(),
    ]
    .into_iter()
    .map(|candidate| sanitize(candidate, 70))
    .find(|name| !name.trim().is_empty())
    .unwrap_or_else(|| "/".to_string())
}

/// `PstlAdr`, written only when the party has a country.
pub(super) fn write_postal_address(
    w: &mut XmlWriter,
    party: &Party,
    rules: &VariantRules,
) -> Result<(), PainError> {
    let Some(country) = party.country() else {
        return Ok(());
    };
    let country = country.to_uppercase();

    w.start_element("PstlAdr")?;
    if !party.is_company && rules.individual_country_only {
        w.text_element("Ctry", &country)?;
        return w.end_element("PstlAdr").map(|_| ());
    }

    match rules.address_style {
        AddressStyle::Structured => {
            w.optional_text_element("StrtNm", Some(&sanitize(party.street.as_deref(), 70)))?;
            w.optional_text_element("PstCd", Some(&sanitize(party.zip.as_deref(), 16)))?;
            w.optional_text_element("TwnNm", Some(&sanitize(party.city.as_deref(), 35)))?;
            w.text_element("Ctry", &country)?;
        }
        AddressStyle::Lines => {
            w.text_element("Ctry", &country)?;
            w.optional_text_element("AdrLine", Some(&sanitize(party.street.as_deref(), 70)))?;
            let town = [party.zip.as_deref(), party.city.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            w.optional_text_element("AdrLine", Some(&sanitize(Some(&town), 70)))?;
        }
    }
    w.end_element("PstlAdr")?;
    Ok(())
}

/// `CdtrAgt`. Left out for Swiss QR-IBAN creditors; `NOTPROVIDED` when the
/// BIC is unknown and the variant tolerates it.
pub(super) fn write_creditor_agent(
    w: &mut XmlWriter,
    creditor: &Party,
    rules: &VariantRules,
) -> Result<(), PainError> {
    if rules.omit_agent_for_qr_iban && creditor.account().is_some_and(is_qr_iban) {
        return Ok(());
    }
    let who = creditor.display_name();
    let bic = clean_bic(creditor.bic(), rules.variant, who)?;
    if bic.is_none() && rules.requires_creditor_bic() {
        return Err(PainError::MissingBic {
            party: who.to_string(),
        });
    }
    w.start_element("CdtrAgt")?;
    write_fin_instn_id(w, bic.as_deref(), creditor.lei.as_deref(), rules)?;
    w.end_element("CdtrAgt")?;
    Ok(())
}

/// `DbtrAgt`, from the initiating party's bank.
pub(super) fn write_debtor_agent(
    w: &mut XmlWriter,
    debtor: &Party,
    rules: &VariantRules,
) -> Result<(), PainError> {
    let who = debtor.display_name();
    let bic = clean_bic(debtor.bic(), rules.variant, who)?;
    if bic.is_none() && rules.requires_debtor_bic {
        return Err(PainError::MissingBic {
            party: who.to_string(),
        });
    }
    w.start_element("DbtrAgt")?;
    write_fin_instn_id(w, bic.as_deref(), debtor.lei.as_deref(), rules)?;
    w.end_element("DbtrAgt")?;
    Ok(())
}

fn write_fin_instn_id(
    w: &mut XmlWriter,
    bic: Option<&str>,
    lei: Option<&str>,
    rules: &VariantRules,
) -> Result<(), PainError> {
    match bic {
        Some(bic) => {
            w.start_element("FinInstnId")?;
            w.text_element(rules.bic_tag, bic)?;
            if rules.allows_lei {
                w.optional_text_element("LEI", lei.map(str::trim))?;
            }
            w.end_element("FinInstnId")?;
        }
        None => {
            w.nested_text(&["FinInstnId", "Othr", "Id"], NOT_PROVIDED)?;
        }
    }
    Ok(())
}

/// `CdtrAcct`: IBAN, or `Othr/Id` for a non-IBAN account in generic mode.
pub(super) fn write_creditor_account(
    w: &mut XmlWriter,
    creditor: &Party,
    generic: bool,
) -> Result<(), PainError> {
    let non_iban = || PainError::NonIbanAccount {
        party: creditor.display_name().to_string(),
    };
    let account = creditor.account().ok_or_else(non_iban)?;
    w.start_element("CdtrAcct")?;
    if is_iban(account) {
        w.nested_text(&["Id", "IBAN"], &normalize_account(account))?;
    } else if generic {
        w.nested_text(&["Id", "Othr", "Id"], &sanitize(Some(account), 34))?;
    } else {
        return Err(non_iban());
    }
    w.end_element("CdtrAcct")?;
    Ok(())
}

/// `DbtrAcct`: always an IBAN, with the account currency when known.
pub(super) fn write_debtor_account(
    w: &mut XmlWriter,
    debtor: &Party,
    account_currency: Option<&str>,
) -> Result<(), PainError> {
    let account = debtor
        .account()
        .filter(|acc| is_iban(acc))
        .ok_or_else(|| PainError::NonIbanAccount {
            party: debtor.display_name().to_string(),
        })?;
    w.start_element("DbtrAcct")?;
    w.nested_text(&["Id", "IBAN"], &normalize_account(account))?;
    w.optional_text_element("Ccy", account_currency)?;
    w.end_element("DbtrAcct")?;
    Ok(())
}

fn org_id(party: &Party) -> Option<String> {
    let id = sanitize(party.initiating_party_id.as_deref(), 35);
    (!id.trim().is_empty()).then_some(id)
}

/// `Id/OrgId/Othr` with optional scheme code and issuer.
fn write_org_id(
    w: &mut XmlWriter,
    id: &str,
    issuer: Option<&str>,
    scheme: Option<&str>,
) -> Result<(), PainError> {
    w.open_path(&["Id", "OrgId", "Othr"])?;
    w.text_element("Id", id)?;
    if let Some(code) = scheme {
        w.nested_text(&["SchmeNm", "Cd"], code)?;
    }
    w.optional_text_element("Issr", Some(&sanitize(issuer, 35)))?;
    w.close_path(&["Id", "OrgId", "Othr"])?;
    Ok(())
}

/// `CtctDtls` with phone and e-mail, for variants that carry contact data.
fn write_contact_details(
    w: &mut XmlWriter,
    party: &Party,
    rules: &VariantRules,
) -> Result<(), PainError> {
    if !rules.allows_lei {
        return Ok(());
    }
    let phone = party.phone.as_deref().and_then(iso_phone);
    let email = crate::core::non_blank(party.email.as_deref())
        .filter(|e| e.contains('@'))
        .map(|e| sanitize(Some(e), 2048));
    if phone.is_none() && email.is_none() {
        return Ok(());
    }
    w.start_element("CtctDtls")?;
    w.optional_text_element("PhneNb", phone.as_deref())?;
    w.optional_text_element("EmailAdr", email.as_deref())?;
    w.end_element("CtctDtls")?;
    Ok(())
}

/// Bring a phone number into the `+CC-NUMBER` form the schema demands.
/// Numbers without an international prefix are dropped.
pub(super) fn iso_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if ISO_PHONE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    let rest = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix("00"))?;
    let mut parts = rest
        .split([' ', '-', '.', '/'])
        .filter(|p| !p.is_empty());
    let country = parts.next()?;
    if !(1..=3).contains(&country.len()) || !country.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: String = parts
        .flat_map(str::chars)
        .filter(char::is_ascii_digit)
        .collect();
    if number.is_empty() || number.len() > 30 {
        return None;
    }
    Some(format!("+{country}-{number}"))
}

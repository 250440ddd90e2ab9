//! pain.001 flavours and the rule table each one selects.

use serde::{Deserialize, Serialize};

use super::error::PainError;

/// Namespace URIs of the supported pain.001 schemas.
pub mod ns {
    pub const PAIN_001_001_03: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";
    pub const PAIN_001_001_09: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.09";
    pub const SWISS_CH_02: &str =
        "http://www.six-interbank-clearing.com/de/pain.001.001.03.ch.02.xsd";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}

/// Bank-specific flavour of the credit transfer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// pain.001.001.03, EPC guidelines.
    #[serde(rename = "generic_03")]
    Generic03,
    /// pain.001.001.03 with the Austrian 004 bank rules.
    #[serde(rename = "austrian_004")]
    Austrian004,
    /// pain.001.001.03, German DFÜ agreement.
    #[serde(rename = "german_03")]
    German03,
    /// pain.001.001.03, Swedish bank guidelines.
    #[serde(rename = "swedish_03")]
    Swedish03,
    /// Swiss Payment Standards pain.001.001.03.ch.02.
    #[serde(rename = "swiss_ch_02")]
    SwissCh02,
    /// pain.001.001.09.
    #[serde(rename = "generic_09")]
    Generic09,
    /// Generic ISO 20022 for non-SEPA transfers.
    #[serde(rename = "iso_20022")]
    Iso20022,
}

impl Variant {
    pub const ALL: [Variant; 7] = [
        Self::Generic03,
        Self::Austrian004,
        Self::German03,
        Self::Swedish03,
        Self::SwissCh02,
        Self::Generic09,
        Self::Iso20022,
    ];

    /// Stable identifier, e.g. `"swiss_ch_02"`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Generic03 => "generic_03",
            Self::Austrian004 => "austrian_004",
            Self::German03 => "german_03",
            Self::Swedish03 => "swedish_03",
            Self::SwissCh02 => "swiss_ch_02",
            Self::Generic09 => "generic_09",
            Self::Iso20022 => "iso_20022",
        }
    }

    /// Parse from the stable identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.id() == id)
    }

    /// The rule table for this variant.
    pub fn rules(&self) -> VariantRules {
        match self {
            Self::Generic03 => BASE_03,
            Self::German03 => VariantRules {
                variant: Self::German03,
                ..BASE_03
            },
            Self::Austrian004 => VariantRules {
                variant: Self::Austrian004,
                allows_bic_not_provided: false,
                ..BASE_03
            },
            Self::Swedish03 => VariantRules {
                variant: Self::Swedish03,
                requires_debtor_bic: true,
                bank_scheme_name: true,
                ..BASE_03
            },
            Self::SwissCh02 => VariantRules {
                variant: Self::SwissCh02,
                namespace: ns::SWISS_CH_02,
                schema_location: Some(
                    "http://www.six-interbank-clearing.com/de/pain.001.001.03.ch.02.xsd pain.001.001.03.ch.02.xsd",
                ),
                allows_bic_not_provided: false,
                requires_debtor_bic: true,
                omit_agent_for_qr_iban: true,
                individual_country_only: false,
                emits_service_level: false,
                ..BASE_03
            },
            Self::Generic09 => VariantRules {
                variant: Self::Generic09,
                namespace: ns::PAIN_001_001_09,
                bic_tag: "BICFI",
                address_style: AddressStyle::Structured,
                bic_pattern: BicPattern::Relaxed,
                allows_lei: true,
                requires_uetr: true,
                individual_country_only: false,
                dated_execution: true,
                creditor_tax_id: true,
                ..BASE_03
            },
            Self::Iso20022 => VariantRules {
                variant: Self::Iso20022,
                allows_lei: true,
                creditor_tax_id: true,
                ..BASE_03
            },
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Variant {
    type Err = PainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim())
            .ok_or_else(|| PainError::Builder(format!("unknown pain.001 variant '{s}'")))
    }
}

/// Shape of `PstlAdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStyle {
    /// `Ctry` followed by up to two `AdrLine` (street, zip + city).
    Lines,
    /// `StrtNm`, `PstCd`, `TwnNm`, `Ctry` as separate children.
    Structured,
}

/// Which BIC pattern a variant validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BicPattern {
    /// `[A-Z]{6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3})?`
    Strict,
    /// `[A-Z0-9]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?`
    Relaxed,
}

/// Every per-variant difference the document builders consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRules {
    pub variant: Variant,
    /// Default namespace of `Document`.
    pub namespace: &'static str,
    /// `xsi:schemaLocation` value on `Document`, if the banks expect one.
    pub schema_location: Option<&'static str>,
    /// Tag of the BIC inside `FinInstnId`.
    pub bic_tag: &'static str,
    pub address_style: AddressStyle,
    pub bic_pattern: BicPattern,
    /// `LEI` may follow the BIC in `FinInstnId`; contact details may be emitted.
    pub allows_lei: bool,
    /// `PmtId/UETR` is emitted and mandatory.
    pub requires_uetr: bool,
    /// `FinInstnId/Othr/Id = NOTPROVIDED` is accepted when a creditor BIC is missing.
    pub allows_bic_not_provided: bool,
    /// The debtor's bank must be identified by BIC.
    pub requires_debtor_bic: bool,
    /// `CdtrAgt` may be left out when the creditor account is a QR-IBAN.
    pub omit_agent_for_qr_iban: bool,
    /// Individuals get a country-only `PstlAdr`.
    pub individual_country_only: bool,
    /// `ReqdExctnDt` wraps the date in `Dt`.
    pub dated_execution: bool,
    /// `PmtTpInf/SvcLvl` is emitted.
    pub emits_service_level: bool,
    /// Organisation ids carry `SchmeNm/Cd = BANK`.
    pub bank_scheme_name: bool,
    /// A business creditor's VAT number is emitted as `OrgId/Othr` with scheme `TXID`.
    pub creditor_tax_id: bool,
}

const BASE_03: VariantRules = VariantRules {
    variant: Variant::Generic03,
    namespace: ns::PAIN_001_001_03,
    schema_location: None,
    bic_tag: "BIC",
    address_style: AddressStyle::Lines,
    bic_pattern: BicPattern::Strict,
    allows_lei: false,
    requires_uetr: false,
    allows_bic_not_provided: true,
    requires_debtor_bic: false,
    omit_agent_for_qr_iban: false,
    individual_country_only: true,
    dated_execution: false,
    emits_service_level: true,
    bank_scheme_name: false,
    creditor_tax_id: false,
};

impl VariantRules {
    /// Maximum party name length: non-SEPA (generic) transfers travel
    /// through correspondent networks limited to 35 characters.
    pub fn name_limit(&self, generic: bool) -> usize {
        if generic { 35 } else { 70 }
    }

    /// Whether a creditor without BIC must be rejected.
    pub fn requires_creditor_bic(&self) -> bool {
        !self.allows_bic_not_provided
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for v in Variant::ALL {
            assert_eq!(Variant::from_id(v.id()), Some(v));
            assert_eq!(v.id().parse::<Variant>().unwrap(), v);
            assert_eq!(v.rules().variant, v);
        }
        assert!("pain.001".parse::<Variant>().is_err());
    }

    #[test]
    fn namespaces() {
        assert_eq!(Variant::Generic03.rules().namespace, ns::PAIN_001_001_03);
        assert_eq!(Variant::German03.rules().namespace, ns::PAIN_001_001_03);
        assert_eq!(Variant::Swedish03.rules().namespace, ns::PAIN_001_001_03);
        assert_eq!(Variant::Austrian004.rules().namespace, ns::PAIN_001_001_03);
        assert_eq!(Variant::Iso20022.rules().namespace, ns::PAIN_001_001_03);
        assert_eq!(Variant::Generic09.rules().namespace, ns::PAIN_001_001_09);
        assert_eq!(Variant::SwissCh02.rules().namespace, ns::SWISS_CH_02);
    }

    #[test]
    fn only_09_uses_bicfi_and_structured_addresses() {
        for v in Variant::ALL {
            let r = v.rules();
            let is_09 = v == Variant::Generic09;
            assert_eq!(r.bic_tag == "BICFI", is_09);
            assert_eq!(r.address_style == AddressStyle::Structured, is_09);
            assert_eq!(r.requires_uetr, is_09);
            assert_eq!(r.dated_execution, is_09);
        }
    }

    #[test]
    fn bic_required_for_austria_and_switzerland() {
        assert!(Variant::Austrian004.rules().requires_creditor_bic());
        assert!(Variant::SwissCh02.rules().requires_creditor_bic());
        assert!(!Variant::German03.rules().requires_creditor_bic());
        assert!(Variant::Swedish03.rules().requires_debtor_bic);
        assert!(Variant::SwissCh02.rules().requires_debtor_bic);
    }

    #[test]
    fn lei_only_in_09_and_iso() {
        let with_lei: Vec<_> = Variant::ALL
            .into_iter()
            .filter(|v| v.rules().allows_lei)
            .collect();
        assert_eq!(with_lei, vec![Variant::Generic09, Variant::Iso20022]);
    }

    #[test]
    fn name_limit_depends_on_mode() {
        let rules = Variant::German03.rules();
        assert_eq!(rules.name_limit(true), 35);
        assert_eq!(rules.name_limit(false), 70);
    }

    #[test]
    fn serde_uses_stable_ids() {
        let json = serde_json::to_string(&Variant::SwissCh02).unwrap();
        assert_eq!(json, "\"swiss_ch_02\"");
        let v: Variant = serde_json::from_str("\"iso_20022\"").unwrap();
        assert_eq!(v, Variant::Iso20022);
    }
}

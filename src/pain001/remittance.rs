use super::xml_utils::XmlWriter;
use crate::core::{PainError, Remittance, StructuredReference};

/// `RmtInf` holding either one `Ustrd` or one `Strd`, never both.
pub(super) fn write_remittance(
    w: &mut XmlWriter,
    remittance: Option<&Remittance>,
) -> Result<(), PainError> {
    let Some(remittance) = remittance else {
        return Ok(());
    };
    w.start_element("RmtInf")?;
    match remittance {
        Remittance::Unstructured(text) => {
            w.text_element("Ustrd", text)?;
        }
        Remittance::Structured(reference) => write_structured(w, reference)?,
    }
    w.end_element("RmtInf")?;
    Ok(())
}

fn write_structured(w: &mut XmlWriter, reference: &StructuredReference) -> Result<(), PainError> {
    let family = reference.family;
    w.open_path(&["Strd", "CdtrRefInf", "Tp", "CdOrPrtry"])?;
    if let Some(code) = family.code() {
        w.text_element("Cd", code)?;
    }
    if let Some(proprietary) = family.proprietary() {
        w.text_element("Prtry", proprietary)?;
    }
    w.end_element("CdOrPrtry")?;
    w.optional_text_element("Issr", family.issuer())?;
    w.end_element("Tp")?;
    w.text_element("Ref", &reference.reference)?;
    w.close_path(&["Strd", "CdtrRefInf"])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReferenceFamily;

    fn render(remittance: Option<Remittance>) -> String {
        let mut w = XmlWriter::new(0).unwrap();
        write_remittance(&mut w, remittance.as_ref()).unwrap();
        let xml = String::from_utf8(w.into_bytes()).unwrap();
        xml.split_once("?>").unwrap().1.to_string()
    }

    #[test]
    fn unstructured() {
        assert_eq!(
            render(Some(Remittance::Unstructured("Invoice 42".into()))),
            "<RmtInf><Ustrd>Invoice 42</Ustrd></RmtInf>"
        );
    }

    #[test]
    fn belgian_reference_with_issuer() {
        let xml = render(Some(Remittance::Structured(StructuredReference {
            family: ReferenceFamily::BeOgm,
            reference: "090933755493".into(),
        })));
        assert_eq!(
            xml,
            "<RmtInf><Strd><CdtrRefInf><Tp><CdOrPrtry><Cd>SCOR</Cd></CdOrPrtry><Issr>BBA</Issr></Tp><Ref>090933755493</Ref></CdtrRefInf></Strd></RmtInf>"
        );
    }

    #[test]
    fn qr_reference_is_proprietary() {
        let xml = render(Some(Remittance::Structured(StructuredReference {
            family: ReferenceFamily::ChQrr,
            reference: "000000000000000000000012345".into(),
        })));
        assert!(xml.contains("<CdOrPrtry><Prtry>QRR</Prtry></CdOrPrtry></Tp>"));
        assert!(!xml.contains("Issr"));
        assert!(!xml.contains("Ustrd"));
    }

    #[test]
    fn nothing_without_remittance() {
        assert_eq!(render(None), "");
    }
}

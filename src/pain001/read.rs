//! Reading pain.001 documents back, for checking files before they go to
//! the bank, whether this crate wrote them or not.

use std::collections::HashSet;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::PainError;
use crate::core::sanitize::{SALARY_PREFIX, is_sepa_safe};

/// Upper bound on `PmtInfId` and `EndToEndId`.
const MAX_ID_LEN: usize = 30;

/// Header, payment blocks and transactions of a pain.001 document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Default namespace of `Document`.
    pub namespace: Option<String>,
    pub message_id: Option<String>,
    pub created_at: Option<String>,
    pub number_of_transactions: Option<u64>,
    pub control_sum: Option<Decimal>,
    pub initiating_party: Option<String>,
    pub payment_infos: Vec<PaymentInfoSummary>,
    /// Every text node as `(element, text)`, in document order.
    pub texts: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfoSummary {
    pub id: Option<String>,
    pub number_of_transactions: Option<u64>,
    pub control_sum: Option<Decimal>,
    pub execution_date: Option<String>,
    pub service_level: Option<String>,
    pub category_purpose: Option<String>,
    pub transactions: Vec<TransactionSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub end_to_end_id: Option<String>,
    pub uetr: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub creditor_bic: Option<String>,
    pub creditor_name: Option<String>,
    pub creditor_account: Option<String>,
    pub structured_reference: Option<String>,
    pub unstructured: Vec<String>,
}

impl DocumentSummary {
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionSummary> {
        self.payment_infos.iter().flat_map(|p| p.transactions.iter())
    }

    pub fn transaction_count(&self) -> usize {
        self.payment_infos.iter().map(|p| p.transactions.len()).sum()
    }
}

fn xml_err(e: impl std::fmt::Display) -> PainError {
    PainError::Xml(format!("XML read error: {e}"))
}

/// Parse a pain.001 document (any supported namespace).
pub fn read_pain001(xml: &[u8]) -> Result<DocumentSummary, PainError> {
    let text = std::str::from_utf8(xml).map_err(xml_err)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut doc = DocumentSummary::default();
    let mut path: Vec<String> = Vec::new();
    let mut pending_currency: Option<String> = None;
    let mut seen_initiation = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e);
                match name.as_str() {
                    "Document" if path.is_empty() => {
                        doc.namespace = attribute(e, "xmlns")?;
                    }
                    "CstmrCdtTrfInitn" => seen_initiation = true,
                    "PmtInf" => doc.payment_infos.push(PaymentInfoSummary::default()),
                    "CdtTrfTxInf" => {
                        let info = doc
                            .payment_infos
                            .last_mut()
                            .ok_or_else(|| xml_err("CdtTrfTxInf outside PmtInf"))?;
                        info.transactions.push(TransactionSummary::default());
                    }
                    "InstdAmt" => pending_currency = attribute(e, "Ccy")?,
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let value = e.unescape().map_err(xml_err)?.to_string();
                if !value.is_empty() {
                    handle_text(&mut doc, &path, &value, &mut pending_currency)?;
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(xml_err(format!(
                    "at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(xml_err(format!("document ends inside <{open}>")));
    }
    if !seen_initiation {
        return Err(xml_err("no CstmrCdtTrfInitn element, not a pain.001 document"));
    }
    Ok(doc)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, PainError> {
    match e.try_get_attribute(key).map_err(xml_err)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(xml_err)?.into_owned())),
        None => Ok(None),
    }
}

fn parse_count(text: &str) -> Result<u64, PainError> {
    text.parse()
        .map_err(|_| xml_err(format!("'{text}' is not a transaction count")))
}

fn parse_amount(text: &str) -> Result<Decimal, PainError> {
    Decimal::from_str(text).map_err(|_| xml_err(format!("'{text}' is not an amount")))
}

fn handle_text(
    doc: &mut DocumentSummary,
    path: &[String],
    text: &str,
    pending_currency: &mut Option<String>,
) -> Result<(), PainError> {
    let leaf = path.last().map(String::as_str).unwrap_or("");
    let parent = path.len().checked_sub(2).map(|i| path[i].as_str()).unwrap_or("");
    let within = |name: &str| path.iter().any(|p| p == name);
    doc.texts.push((leaf.to_string(), text.to_string()));

    if within("CdtTrfTxInf") {
        let Some(tx) = doc
            .payment_infos
            .last_mut()
            .and_then(|p| p.transactions.last_mut())
        else {
            return Ok(());
        };
        match (parent, leaf) {
            ("PmtId", "EndToEndId") => tx.end_to_end_id = Some(text.to_string()),
            ("PmtId", "UETR") => tx.uetr = Some(text.to_string()),
            (_, "InstdAmt") => {
                tx.amount = Some(parse_amount(text)?);
                tx.currency = pending_currency.take();
            }
            ("FinInstnId", "BIC" | "BICFI") if within("CdtrAgt") => {
                tx.creditor_bic = Some(text.to_string())
            }
            ("Cdtr", "Nm") => tx.creditor_name = Some(text.to_string()),
            ("Id", "IBAN") if within("CdtrAcct") => tx.creditor_account = Some(text.to_string()),
            ("Othr", "Id") if within("CdtrAcct") => tx.creditor_account = Some(text.to_string()),
            ("CdtrRefInf", "Ref") => tx.structured_reference = Some(text.to_string()),
            ("RmtInf", "Ustrd") => tx.unstructured.push(text.to_string()),
            _ => {}
        }
        return Ok(());
    }

    if within("PmtInf") {
        let Some(info) = doc.payment_infos.last_mut() else {
            return Ok(());
        };
        match (parent, leaf) {
            ("PmtInf", "PmtInfId") => info.id = Some(text.to_string()),
            ("PmtInf", "NbOfTxs") => info.number_of_transactions = Some(parse_count(text)?),
            ("PmtInf", "CtrlSum") => info.control_sum = Some(parse_amount(text)?),
            ("PmtInf", "ReqdExctnDt") | ("ReqdExctnDt", "Dt") => {
                info.execution_date = Some(text.to_string())
            }
            ("SvcLvl", "Cd") => info.service_level = Some(text.to_string()),
            ("CtgyPurp", "Cd") => info.category_purpose = Some(text.to_string()),
            _ => {}
        }
        return Ok(());
    }

    match (parent, leaf) {
        ("GrpHdr", "MsgId") => doc.message_id = Some(text.to_string()),
        ("GrpHdr", "CreDtTm") => doc.created_at = Some(text.to_string()),
        ("GrpHdr", "NbOfTxs") => doc.number_of_transactions = Some(parse_count(text)?),
        ("GrpHdr", "CtrlSum") => doc.control_sum = Some(parse_amount(text)?),
        ("InitgPty", "Nm") => doc.initiating_party = Some(text.to_string()),
        _ => {}
    }
    Ok(())
}

/// Check the arithmetic and character-set rules banks enforce. Returns one
/// message per violation; an empty list means the document is consistent.
///
/// - `NbOfTxs` and `CtrlSum` agree with the transactions, in the header
///   and in every `PmtInf`;
/// - `PmtInfId` and `EndToEndId` stay within 30 characters and every
///   `EndToEndId` is unique;
/// - every text uses the SEPA Latin-1 subset and neither starts nor ends
///   with `/`. The salary `/A/ ` prefix and the `/` placeholder name are
///   the only exceptions.
pub fn verify_pain001(doc: &DocumentSummary) -> Vec<String> {
    let mut problems = Vec::new();

    let total_txs = doc.transaction_count() as u64;
    let pmt_inf_txs: u64 = doc
        .payment_infos
        .iter()
        .map(|p| p.number_of_transactions.unwrap_or_default())
        .sum();
    match doc.number_of_transactions {
        Some(n) if n != total_txs => problems.push(format!(
            "GrpHdr/NbOfTxs is {n} but the document holds {total_txs} transactions"
        )),
        None => problems.push("GrpHdr/NbOfTxs is missing".to_string()),
        _ => {}
    }
    if pmt_inf_txs != total_txs {
        problems.push(format!(
            "PmtInf/NbOfTxs add up to {pmt_inf_txs} but the document holds {total_txs} transactions"
        ));
    }

    let total: Decimal = doc.transactions().filter_map(|t| t.amount).sum();
    match doc.control_sum {
        Some(sum) if sum != total => {
            problems.push(format!("GrpHdr/CtrlSum is {sum} but amounts add up to {total}"))
        }
        None => problems.push("GrpHdr/CtrlSum is missing".to_string()),
        _ => {}
    }

    for (i, info) in doc.payment_infos.iter().enumerate() {
        let label = info.id.clone().unwrap_or_else(|| format!("#{}", i + 1));
        let count = info.transactions.len() as u64;
        if info.number_of_transactions != Some(count) {
            problems.push(format!(
                "PmtInf {label}: NbOfTxs {:?} but {count} transactions",
                info.number_of_transactions
            ));
        }
        let sum: Decimal = info.transactions.iter().filter_map(|t| t.amount).sum();
        if info.control_sum != Some(sum) {
            problems.push(format!(
                "PmtInf {label}: CtrlSum {:?} but amounts add up to {sum}",
                info.control_sum
            ));
        }
        if info.id.as_deref().is_some_and(|id| id.chars().count() > MAX_ID_LEN) {
            problems.push(format!("PmtInf {label}: PmtInfId exceeds {MAX_ID_LEN} characters"));
        }
        for (j, tx) in info.transactions.iter().enumerate() {
            if tx.amount.is_none() {
                problems.push(format!("PmtInf {label}: transaction #{} has no amount", j + 1));
            }
        }
    }

    let mut seen = HashSet::new();
    for id in doc.transactions().filter_map(|t| t.end_to_end_id.as_deref()) {
        if id.chars().count() > MAX_ID_LEN {
            problems.push(format!("EndToEndId '{id}' exceeds {MAX_ID_LEN} characters"));
        }
        if !seen.insert(id) {
            problems.push(format!("EndToEndId '{id}' is not unique"));
        }
    }

    for (element, text) in &doc.texts {
        if !is_sepa_safe(text) {
            problems.push(format!("{element}: '{text}' leaves the SEPA character set"));
        }
        let allowed_slash = (element == "Ustrd" && text.starts_with(SALARY_PREFIX))
            || (element == "Nm" && text == "/");
        if !allowed_slash && (text.starts_with('/') || text.ends_with('/')) {
            problems.push(format!("{element}: '{text}' starts or ends with '/'"));
        }
    }

    problems
}

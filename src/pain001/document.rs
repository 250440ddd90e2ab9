use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::party::{write_debtor, write_debtor_account, write_debtor_agent, write_initiating_party};
use super::transaction::{id_tail, write_transaction};
use super::xml_utils::{XmlResult, XmlWriter};
use crate::core::amount::{format_amount, round_amount};
use crate::core::sanitize::sanitize;
use crate::core::{
    BatchRequest, BuildOptions, MAX_TRANSACTIONS, PainError, Payment, VariantRules, ns,
    preflight,
};

/// Payments sharing one execution date and currency, i.e. one `PmtInf`.
#[derive(Debug, Clone)]
pub struct PaymentGroup<'a> {
    pub execution_date: NaiveDate,
    pub currency: &'a str,
    /// Payments with their index in the request, in input order.
    pub payments: Vec<(usize, &'a Payment)>,
}

impl PaymentGroup<'_> {
    /// Sum of the amounts as written, i.e. rounded to cents.
    pub fn control_sum(&self) -> Decimal {
        self.payments
            .iter()
            .map(|(_, p)| round_amount(p.amount))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

/// Group payments by `(max(execution_date, today), currency)`. Groups come
/// out in the order their key is first seen.
pub fn group_payments(payments: &[Payment], today: NaiveDate) -> Vec<PaymentGroup<'_>> {
    let mut groups: Vec<PaymentGroup<'_>> = Vec::new();
    let mut index: HashMap<(NaiveDate, &str), usize> = HashMap::new();

    for (i, payment) in payments.iter().enumerate() {
        let date = payment.execution_date.max(today);
        if date != payment.execution_date {
            tracing::trace!(
                payment = i,
                requested = %payment.execution_date,
                execution = %date,
                "execution date moved to build date"
            );
        }
        let key = (date, payment.currency.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(PaymentGroup {
                execution_date: date,
                currency: &payment.currency,
                payments: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].payments.push((i, payment));
    }
    groups
}

/// Serialize a batch with default [`BuildOptions`] (local clock, indent 2).
pub fn to_pain001_xml(request: &BatchRequest) -> XmlResult {
    to_pain001_xml_with(request, &BuildOptions::default())
}

/// Serialize a batch into a pain.001 document.
///
/// Preflight runs first; any problem aborts with [`PainError::Preflight`]
/// before a single byte is written. With a frozen `created_at` the output
/// is byte-for-byte reproducible.
pub fn to_pain001_xml_with(request: &BatchRequest, options: &BuildOptions) -> XmlResult {
    if request.payments.is_empty() {
        return Err(PainError::Builder("batch has no payments".into()));
    }
    let issues = preflight(request);
    if !issues.is_empty() {
        return Err(issues.into());
    }
    let count = request.payments.len();
    if count as u64 > MAX_TRANSACTIONS {
        return Err(PainError::TooManyTransactions(count));
    }

    let created = options.timestamp();
    let rules = request.variant.rules();
    let msg_id = message_id(request, created);
    let groups = group_payments(&request.payments, created.date());

    tracing::debug!(
        variant = %request.variant,
        groups = groups.len(),
        transactions = count,
        "writing pain.001 document"
    );

    let mut w = XmlWriter::new(options.indent)?;
    let mut attrs = vec![("xmlns", rules.namespace), ("xmlns:xsi", ns::XSI)];
    if let Some(location) = rules.schema_location {
        attrs.push(("xsi:schemaLocation", location));
    }
    w.start_element_with_attrs("Document", &attrs)?;
    w.start_element("CstmrCdtTrfInitn")?;

    let total: Decimal = groups.iter().map(PaymentGroup::control_sum).sum();
    w.start_element("GrpHdr")?;
    w.text_element("MsgId", &msg_id)?;
    w.text_element("CreDtTm", &created.format("%Y-%m-%dT%H:%M:%S").to_string())?;
    w.text_element("NbOfTxs", &count.to_string())?;
    w.text_element("CtrlSum", &format_amount(total))?;
    write_initiating_party(&mut w, &request.initiating_party, &rules, request.generic)?;
    w.end_element("GrpHdr")?;

    for (i, group) in groups.iter().enumerate() {
        let pmt_inf_id = id_tail(&format!("{msg_id}{}", i + 1));
        write_payment_info(&mut w, request, &rules, group, &pmt_inf_id)?;
    }

    w.end_element("CstmrCdtTrfInitn")?;
    w.end_element("Document")?;
    Ok(w.into_bytes())
}

fn write_payment_info(
    w: &mut XmlWriter,
    request: &BatchRequest,
    rules: &VariantRules,
    group: &PaymentGroup<'_>,
    pmt_inf_id: &str,
) -> Result<(), PainError> {
    w.start_element("PmtInf")?;
    w.text_element("PmtInfId", pmt_inf_id)?;
    w.text_element("PmtMtd", "TRF")?;
    w.text_element("BtchBookg", if request.batch_booking { "true" } else { "false" })?;
    w.text_element("NbOfTxs", &group.len().to_string())?;
    w.text_element("CtrlSum", &format_amount(group.control_sum()))?;
    write_payment_type(w, request, rules)?;

    let date = group.execution_date.format("%Y-%m-%d").to_string();
    if rules.dated_execution {
        w.nested_text(&["ReqdExctnDt", "Dt"], &date)?;
    } else {
        w.text_element("ReqdExctnDt", &date)?;
    }

    let debtor = &request.initiating_party;
    write_debtor(w, debtor, rules, request.generic)?;
    write_debtor_account(w, debtor, request.account_currency.as_deref())?;
    write_debtor_agent(w, debtor, rules)?;
    w.text_element("ChrgBr", if request.generic { "SHAR" } else { "SLEV" })?;

    for (index, payment) in &group.payments {
        write_transaction(
            w,
            payment,
            *index,
            pmt_inf_id,
            rules,
            request.generic,
            request.is_salary,
        )?;
    }
    w.end_element("PmtInf")?;
    Ok(())
}

/// `PmtTpInf`: priority, service level and category purpose, skipped when
/// none of them applies.
fn write_payment_type(
    w: &mut XmlWriter,
    request: &BatchRequest,
    rules: &VariantRules,
) -> Result<(), PainError> {
    let service_level = rules
        .emits_service_level
        .then_some(if request.generic { "NURG" } else { "SEPA" });
    if !request.is_salary && service_level.is_none() {
        return Ok(());
    }
    w.start_element("PmtTpInf")?;
    if request.is_salary {
        w.text_element("InstrPrty", "HIGH")?;
    }
    if let Some(code) = service_level {
        w.nested_text(&["SvcLvl", "Cd"], code)?;
    }
    if request.is_salary {
        w.nested_text(&["CtgyPurp", "Cd"], "SALA")?;
    }
    w.end_element("PmtTpInf")?;
    Ok(())
}

/// Caller-supplied id, or the build timestamp followed by 16 hex digits of
/// a name-based UUID over the batch content.
fn message_id(request: &BatchRequest, created: NaiveDateTime) -> String {
    let supplied = sanitize(request.message_id.as_deref(), 35);
    if !supplied.trim().is_empty() {
        return supplied.trim().to_string();
    }
    let mut name = request
        .initiating_party
        .account()
        .unwrap_or_default()
        .to_string();
    for p in &request.payments {
        name.push_str(&format!(
            "\n{}|{}|{}|{}",
            p.end_to_end_id_source,
            format_amount(p.amount),
            p.currency,
            p.execution_date
        ));
    }
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
    let hex = format!("{:X}", digest.simple());
    format!("{}{}", created.format("%Y%m%d%H%M%S"), &hex[..16])
}

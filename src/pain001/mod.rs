//! pain.001 Customer Credit Transfer Initiation XML.
//!
//! # Supported variants
//!
//! | Variant | Namespace |
//! |---------|-----------|
//! | `generic_03`, `german_03`, `swedish_03`, `austrian_004`, `iso_20022` | `pain.001.001.03` |
//! | `generic_09` | `pain.001.001.09` |
//! | `swiss_ch_02` | `pain.001.001.03.ch.02` (SIX) |
//!
//! # Example
//!
//! ```no_run
//! use pain001::core::*;
//! use pain001::pain001::{read_pain001, to_pain001_xml, verify_pain001};
//!
//! let batch: BatchRequest = todo!(); // build via BatchRequestBuilder
//! let xml = to_pain001_xml(&batch).unwrap();
//! let summary = read_pain001(&xml).unwrap();
//! assert!(verify_pain001(&summary).is_empty());
//! ```

mod document;
mod party;
mod read;
mod remittance;
mod transaction;
pub(crate) mod xml_utils;

pub use crate::core::ns;
pub use document::{PaymentGroup, group_payments, to_pain001_xml, to_pain001_xml_with};
pub use read::{
    DocumentSummary, PaymentInfoSummary, TransactionSummary, read_pain001, verify_pain001,
};
pub use xml_utils::XmlResult;

//! # pain001
//!
//! SEPA / ISO 20022 credit transfer files: turns a batch of outgoing
//! payments drawn on one debtor account into a `pain.001` XML document in
//! the flavour the receiving bank expects.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Every input problem is reported at once by preflight validation before a
//! single byte of XML is written.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pain001::core::*;
//! use rust_decimal_macros::dec;
//!
//! let debtor = PartyBuilder::new("ACME GmbH")
//!     .country("DE")
//!     .account("DE89370400440532013000")
//!     .bic("COBADEFFXXX")
//!     .build();
//! let creditor = PartyBuilder::new("Kunde BV")
//!     .country("BE")
//!     .account("BE68539007547034")
//!     .bic("GKCCBEBB")
//!     .build();
//!
//! let batch = BatchRequestBuilder::new(Variant::German03, debtor)
//!     .payment(PaymentBuilder::new("INV-1", creditor, dec!(1234.50),
//!         NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
//!         .remittance("+++090/9337/55493+++")
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! let options = BuildOptions::at(
//!     NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_hms_opt(12, 0, 0).unwrap());
//! let xml = pain001::pain001::to_pain001_xml_with(&batch, &options).unwrap();
//! let xml = String::from_utf8(xml).unwrap();
//! assert!(xml.contains("<Ref>090933755493</Ref>"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Batch types, variant rules, sanitizer, BIC/IBAN/reference checks, preflight |
//! | `pain001` (default) | XML generation, reading and verification |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "pain001")]
pub mod pain001;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

//! Batch model, variant rules and every check that runs before XML is
//! written: text sanitizing, BIC/IBAN validation, structured reference
//! detection, amount limits and preflight.

pub mod amount;
pub mod bic;
mod builder;
pub mod codes;
mod error;
pub mod iban;
pub mod reference;
pub mod sanitize;
mod types;
mod validation;
mod variant;

pub use builder::*;
pub use error::*;
pub use reference::{ReferenceFamily, Remittance, StructuredReference};
pub use types::*;
pub use validation::*;
pub use variant::*;

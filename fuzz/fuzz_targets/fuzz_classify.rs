#![no_main]

use libfuzzer_sys::fuzz_target;
use pain001::core::reference::{ReferenceContext, classify_reference, remittance_info};

const COUNTRIES: [&str; 6] = ["BE", "CH", "FI", "NO", "SE", "DE"];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    if let Ok(s) = std::str::from_utf8(rest) {
        let ctx = ReferenceContext {
            creditor_country: Some(COUNTRIES[usize::from(selector) % COUNTRIES.len()]),
            creditor_account: (selector & 0x80 != 0).then_some("CH4431999123000889012"),
        };
        let _ = classify_reference(s, &ctx);
        let _ = remittance_info(Some(s), &ctx, selector & 0x40 != 0);
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are bugs.
    if let Ok(doc) = pain001::pain001::read_pain001(data) {
        let _ = pain001::pain001::verify_pain001(&doc);
    }
});

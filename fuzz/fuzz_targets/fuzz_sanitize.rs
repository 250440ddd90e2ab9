#![no_main]

use libfuzzer_sys::fuzz_target;
use pain001::core::sanitize::{is_sepa_safe, sanitize_text};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let max = data.first().map_or(140, |b| usize::from(*b));
        let out = sanitize_text(s, max);
        assert!(out.chars().count() <= max);
        assert!(is_sepa_safe(&out));
        assert!(!out.starts_with('/') && !out.ends_with('/'));
    }
});

//! Reduction of free text to the character set banks accept in pain.001.
//!
//! Text is folded through a static translation table (typographic
//! punctuation to ASCII, accented Latin letters to their base letter),
//! printable ASCII and the remaining printable Latin-1 range pass through,
//! and anything else becomes `?`.

/// Default maximum length of a sanitized field (`Ustrd`).
pub const DEFAULT_MAX_LEN: usize = 140;

/// Legally mandated prefix of a Belgian salary payment's free-form remittance.
pub const SALARY_PREFIX: &str = "/A/ ";

/// Sanitize `text` for emission, truncated to `max_len` characters.
///
/// Returns an empty string for `None`.
pub fn sanitize(text: Option<&str>, max_len: usize) -> String {
    match text {
        Some(t) => sanitize_text(t, max_len),
        None => String::new(),
    }
}

/// Sanitize a present string. See [`sanitize`].
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    let mut collapsed = text.to_string();
    while collapsed.contains("//") {
        collapsed = collapsed.replace("//", "/");
    }
    let trimmed = collapsed.strip_prefix('/').unwrap_or(&collapsed);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        fold_char(c, &mut out);
    }

    let mut out: String = out.chars().take(max_len).collect();
    // Truncation may expose a slash that was internal before.
    while out.ends_with('/') {
        out.pop();
    }
    out
}

/// Prefix an already sanitized body with [`SALARY_PREFIX`].
pub fn salary_prefixed(body: &str) -> String {
    format!("{SALARY_PREFIX}{body}")
}

/// Whether every character of `text` is in the emitted character set.
pub fn is_sepa_safe(text: &str) -> bool {
    text.chars().all(is_passthrough)
}

fn is_passthrough(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}') && translation(c).is_none()
}

fn translation(c: char) -> Option<&'static str> {
    TRANSLATIONS
        .binary_search_by_key(&c, |&(k, _)| k)
        .ok()
        .map(|idx| TRANSLATIONS[idx].1)
}

fn fold_char(c: char, out: &mut String) {
    if let Some(replacement) = translation(c) {
        out.push_str(replacement);
    } else if c.is_control() {
        out.push(' ');
    } else if is_passthrough(c) {
        out.push(c);
    } else {
        out.push('?');
    }
}

/// Character translation table. Sorted by code point for binary search.
static TRANSLATIONS: &[(char, &str)] = &[
    ('\u{A0}', " "),
    ('¢', "?"),
    ('£', "?"),
    ('¤', "?"),
    ('¥', "?"),
    ('«', "\""),
    ('\u{AD}', "-"),
    ('´', "'"),
    ('·', "?"),
    ('»', "\""),
    ('À', "A"),
    ('Á', "A"),
    ('Â', "A"),
    ('Ã', "A"),
    ('Ä', "A"),
    ('Å', "A"),
    ('Æ', "AE"),
    ('Ç', "C"),
    ('È', "E"),
    ('É', "E"),
    ('Ê', "E"),
    ('Ë', "E"),
    ('Ì', "I"),
    ('Í', "I"),
    ('Î', "I"),
    ('Ï', "I"),
    ('Ð', "D"),
    ('Ñ', "N"),
    ('Ò', "O"),
    ('Ó', "O"),
    ('Ô', "O"),
    ('Õ', "O"),
    ('Ö', "O"),
    ('Ø', "O"),
    ('Ù', "U"),
    ('Ú', "U"),
    ('Û', "U"),
    ('Ü', "U"),
    ('Ý', "Y"),
    ('Þ', "TH"),
    ('ß', "ss"),
    ('à', "a"),
    ('á', "a"),
    ('â', "a"),
    ('ã', "a"),
    ('ä', "a"),
    ('å', "a"),
    ('æ', "ae"),
    ('ç', "c"),
    ('è', "e"),
    ('é', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('ì', "i"),
    ('í', "i"),
    ('î', "i"),
    ('ï', "i"),
    ('ð', "d"),
    ('ñ', "n"),
    ('ò', "o"),
    ('ó', "o"),
    ('ô', "o"),
    ('õ', "o"),
    ('ö', "o"),
    ('ø', "o"),
    ('ù', "u"),
    ('ú', "u"),
    ('û', "u"),
    ('ü', "u"),
    ('ý', "y"),
    ('þ', "th"),
    ('ÿ', "y"),
    ('Ā', "A"),
    ('ā', "a"),
    ('Ă', "A"),
    ('ă', "a"),
    ('Ą', "A"),
    ('ą', "a"),
    ('Ć', "C"),
    ('ć', "c"),
    ('Ĉ', "C"),
    ('ĉ', "c"),
    ('Ċ', "C"),
    ('ċ', "c"),
    ('Č', "C"),
    ('č', "c"),
    ('Ď', "D"),
    ('ď', "d"),
    ('Đ', "D"),
    ('đ', "d"),
    ('Ē', "E"),
    ('ē', "e"),
    ('Ĕ', "E"),
    ('ĕ', "e"),
    ('Ė', "E"),
    ('ė', "e"),
    ('Ę', "E"),
    ('ę', "e"),
    ('Ě', "E"),
    ('ě', "e"),
    ('Ĝ', "G"),
    ('ĝ', "g"),
    ('Ğ', "G"),
    ('ğ', "g"),
    ('Ġ', "G"),
    ('ġ', "g"),
    ('Ģ', "G"),
    ('ģ', "g"),
    ('Ĥ', "H"),
    ('ĥ', "h"),
    ('Ħ', "H"),
    ('ħ', "h"),
    ('Ĩ', "I"),
    ('ĩ', "i"),
    ('Ī', "I"),
    ('ī', "i"),
    ('Ĭ', "I"),
    ('ĭ', "i"),
    ('Į', "I"),
    ('į', "i"),
    ('İ', "I"),
    ('ı', "i"),
    ('Ĳ', "IJ"),
    ('ĳ', "ij"),
    ('Ĵ', "J"),
    ('ĵ', "j"),
    ('Ķ', "K"),
    ('ķ', "k"),
    ('ĸ', "k"),
    ('Ĺ', "L"),
    ('ĺ', "l"),
    ('Ļ', "L"),
    ('ļ', "l"),
    ('Ľ', "L"),
    ('ľ', "l"),
    ('Ŀ', "L"),
    ('ŀ', "l"),
    ('Ł', "L"),
    ('ł', "l"),
    ('Ń', "N"),
    ('ń', "n"),
    ('Ņ', "N"),
    ('ņ', "n"),
    ('Ň', "N"),
    ('ň', "n"),
    ('ŉ', "n"),
    ('Ŋ', "N"),
    ('ŋ', "n"),
    ('Ō', "O"),
    ('ō', "o"),
    ('Ŏ', "O"),
    ('ŏ', "o"),
    ('Ő', "O"),
    ('ő', "o"),
    ('Œ', "OE"),
    ('œ', "oe"),
    ('Ŕ', "R"),
    ('ŕ', "r"),
    ('Ŗ', "R"),
    ('ŗ', "r"),
    ('Ř', "R"),
    ('ř', "r"),
    ('Ś', "S"),
    ('ś', "s"),
    ('Ŝ', "S"),
    ('ŝ', "s"),
    ('Ş', "S"),
    ('ş', "s"),
    ('Š', "S"),
    ('š', "s"),
    ('Ţ', "T"),
    ('ţ', "t"),
    ('Ť', "T"),
    ('ť', "t"),
    ('Ŧ', "T"),
    ('ŧ', "t"),
    ('Ũ', "U"),
    ('ũ', "u"),
    ('Ū', "U"),
    ('ū', "u"),
    ('Ŭ', "U"),
    ('ŭ', "u"),
    ('Ů', "U"),
    ('ů', "u"),
    ('Ű', "U"),
    ('ű', "u"),
    ('Ų', "U"),
    ('ų', "u"),
    ('Ŵ', "W"),
    ('ŵ', "w"),
    ('Ŷ', "Y"),
    ('ŷ', "y"),
    ('Ÿ', "Y"),
    ('Ź', "Z"),
    ('ź', "z"),
    ('Ż', "Z"),
    ('ż', "z"),
    ('Ž', "Z"),
    ('ž', "z"),
    ('ſ', "s"),
    ('Ș', "S"),
    ('ș', "s"),
    ('Ț', "T"),
    ('ț', "t"),
    ('ẞ', "SS"),
    ('\u{2002}', " "),
    ('\u{2003}', " "),
    ('\u{2004}', " "),
    ('\u{2005}', " "),
    ('\u{2006}', " "),
    ('\u{2007}', " "),
    ('\u{2008}', " "),
    ('\u{2009}', " "),
    ('\u{200A}', " "),
    ('\u{200B}', ""),
    ('‐', "-"),
    ('‑', "-"),
    ('‒', "-"),
    ('–', "-"),
    ('—', "-"),
    ('―', "-"),
    ('‘', "'"),
    ('’', "'"),
    ('‚', "'"),
    ('‛', "'"),
    ('“', "\""),
    ('”', "\""),
    ('„', "\""),
    ('‟', "\""),
    ('†', "?"),
    ('‡', "?"),
    ('•', "?"),
    ('…', "..."),
    ('\u{202F}', " "),
    ('′', "'"),
    ('″', "\""),
    ('‹', "'"),
    ('›', "'"),
    ('₤', "?"),
    ('€', "?"),
    ('₹', "?"),
    ('₽', "?"),
    ('−', "-"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_and_strips_slashes() {
        assert_eq!(sanitize_text("a//b///c", 140), "a/b/c");
        assert_eq!(sanitize_text("/invoice 42/", 140), "invoice 42");
        assert_eq!(sanitize_text("///x///", 140), "x");
    }

    #[test]
    fn folds_typography_and_accents() {
        assert_eq!(sanitize_text("\u{201C}Müller\u{201D} \u{2013} Straße", 140), "\"Muller\" - Strasse");
        assert_eq!(sanitize_text("Łódź Žilina Ærø", 140), "Lodz Zilina AEro");
        assert_eq!(sanitize_text("l\u{2019}avenir", 140), "l'avenir");
        assert_eq!(sanitize_text("wait\u{2026}", 140), "wait...");
    }

    #[test]
    fn currency_and_bullets_become_question_marks() {
        assert_eq!(sanitize_text("100 \u{20AC}", 140), "100 ?");
        assert_eq!(sanitize_text("\u{2022} item", 140), "? item");
        assert_eq!(sanitize_text("£5", 140), "?5");
    }

    #[test]
    fn unknown_characters_become_question_marks() {
        assert_eq!(sanitize_text("日本", 140), "??");
        assert_eq!(sanitize_text("ok \u{1F600}", 140), "ok ?");
    }

    #[test]
    fn control_characters_become_spaces() {
        assert_eq!(sanitize_text("line1\nline2\tx", 140), "line1 line2 x");
    }

    #[test]
    fn truncates_after_substitution() {
        assert_eq!(sanitize_text("ÆÆÆ", 4), "AEAE");
        assert_eq!(sanitize_text("abcdef", 3), "abc");
        assert_eq!(sanitize_text("abc/def", 4), "abc");
    }

    #[test]
    fn missing_input_is_empty() {
        assert_eq!(sanitize(None, 140), "");
        assert_eq!(sanitize(Some("x"), DEFAULT_MAX_LEN), "x");
    }

    #[test]
    fn latin1_symbols_pass_through() {
        assert_eq!(sanitize_text("§ 4 ¿", 140), "§ 4 ¿");
        assert!(is_sepa_safe("§ 4 ¿"));
        assert!(!is_sepa_safe("é"));
    }

    #[test]
    fn salary_prefix_is_added_verbatim() {
        assert_eq!(salary_prefixed("May 2024 payroll"), "/A/ May 2024 payroll");
    }

    #[test]
    fn table_is_sorted() {
        for window in TRANSLATIONS.windows(2) {
            assert!(
                window[0].0 < window[1].0,
                "translations not sorted: {:?} >= {:?}",
                window[0].0,
                window[1].0
            );
        }
    }

    #[test]
    fn table_never_produces_slashes_or_unsafe_text() {
        for (c, replacement) in TRANSLATIONS {
            assert!(!replacement.contains('/'), "{c:?} maps to a slash");
            assert!(is_sepa_safe(replacement), "{c:?} maps to unsafe text");
        }
    }
}

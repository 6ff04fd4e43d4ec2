//! Text canonicalization
//!
//! Query text and cell text go through the same pipeline so that accents,
//! punctuation, spacing and case never decide a comparison:
//! 1. lower-case
//! 2. NFD decomposition, dropping combining marks
//! 3. keep only alphanumerics and whitespace
//! 4. collapse whitespace runs and trim
//!
//! Identifier comparisons use [`digits_only`] instead, which additionally
//! repairs numbers that a spreadsheet rendered in scientific notation.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize arbitrary text for substring comparison.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the decimal digits of an identifier-like value.
///
/// `"123.456.789-09"` becomes `"12345678909"`. A value such as
/// `"7.09809060029098e+14"` is parsed, rounded and re-rendered as
/// `"709809060029098"` first; when that fails the digits are stripped as-is.
pub fn digits_only(text: &str) -> String {
    if let Some(plain) = expand_scientific(text) {
        return plain;
    }
    strip_non_digits(text)
}

#[inline]
fn strip_non_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Largest magnitude that still renders exactly as an integer.
const MAX_EXACT_INTEGER: f64 = 1e21;

fn expand_scientific(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if !trimmed.contains(['e', 'E']) {
        return None;
    }

    // Spreadsheets with a pt-BR locale may render the mantissa with a comma
    let candidate = trimmed.replace(',', ".");
    let value: f64 = candidate.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let rounded = value.round().abs();
    if rounded >= MAX_EXACT_INTEGER {
        return None;
    }

    Some(format!("{:.0}", rounded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize("João Souza"), "joao souza");
        assert_eq!(normalize("PUÉRPERA"), "puerpera");
        assert_eq!(normalize("Conceição"), "conceicao");
    }

    #[test]
    fn test_normalize_strips_punctuation_and_spacing() {
        assert_eq!(normalize("  Maria   da  Silva!! "), "maria da silva");
        assert_eq!(normalize("123.456.789-09"), "12345678909");
        assert_eq!(normalize("Nome\tdo\ncidadão"), "nome do cidadao");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "João Souza",
            "ÁÉÍÓÚ àèìòù ÂÊÔ ãõ ç",
            "İstanbul ǅemal ﬁne",
            "  CPF: 123.456.789-09  ",
            "Cidadã(o) / Gestante #2",
            "e\u{301}",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_normalize_removes_combining_marks() {
        let out = normalize("a\u{300}e\u{301}i\u{302}o\u{303}u\u{308}c\u{327}");
        assert!(out.chars().all(|c| !('\u{300}'..='\u{36f}').contains(&c)));
        assert_eq!(out, "aeiouc");
    }

    #[test]
    fn test_digits_only_formatted_identifier() {
        assert_eq!(digits_only("123.456.789-09"), "12345678909");
        assert_eq!(digits_only("898 0012 3456 7890"), "898001234567890");
        assert_eq!(digits_only("sem documento"), "");
    }

    #[test]
    fn test_digits_only_scientific_notation() {
        assert_eq!(digits_only("7.09809060029098e+14"), "709809060029098");
        assert_eq!(digits_only("7.0980906e+14"), "709809060000000");
        assert_eq!(digits_only("1.2345678909E10"), "12345678909");
        assert_eq!(digits_only("7,09809060029098E+14"), "709809060029098");
    }

    #[test]
    fn test_digits_only_falls_back_when_not_a_number() {
        // Contains an 'e' but is not a float
        assert_eq!(digits_only("Rua 12 casa 3e"), "1233");
        assert_eq!(digits_only("nome 123"), "123");
        // Beyond exact integer range
        assert_eq!(digits_only("1e300"), "1300");
    }
}

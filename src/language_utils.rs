use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the codes used by caption and translation providers
///
/// Providers mix ISO 639-1 codes (`ko`), ISO 639-2 codes (`kor`, `ger`),
/// region-tagged variants (`zh-CN`, `pt_BR`) and a few legacy codes Google
/// still emits (`iw`, `jw`). Everything here reduces a code to its primary
/// language so that these spellings compare equal.
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B bibliographic codes that differ from their 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Withdrawn ISO 639-1 codes still returned by some translation services
const LEGACY_PART1: &[(&str, &str)] = &[
    ("iw", "he"),
    ("jw", "jv"),
    ("in", "id"),
    ("ji", "yi"),
];

/// Lowercase a code and drop any region or script subtag
pub fn primary_subtag(code: &str) -> String {
    let lowered = code.trim().to_lowercase();
    let primary = lowered
        .split(['-', '_'])
        .next()
        .unwrap_or_default();

    LEGACY_PART1
        .iter()
        .find(|(legacy, _)| *legacy == primary)
        .map(|(_, current)| (*current).to_string())
        .unwrap_or_else(|| primary.to_string())
}

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

fn lookup(code: &str) -> Option<Language> {
    let primary = primary_subtag(code);
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary)
            .or_else(|| part2b_to_part2t(&primary).and_then(Language::from_639_3)),
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let primary = primary_subtag(code);

    match primary.len() {
        2 if Language::from_639_1(&primary).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&primary).is_some() => Ok(LanguageCodeType::Part2T),
        3 if part2b_to_part2t(&primary).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
///
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists. This is the form
/// the translation endpoint expects for its `tl` parameter.
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = lookup(code)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang
        .to_639_1()
        .unwrap_or_else(|| lang.to_639_3())
        .to_string())
}

/// Check if two language codes represent the same language
///
/// Codes that are not valid ISO 639 still match when their primary subtags
/// are identical, so provider-specific codes compare sensibly with themselves.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => {
            let a = primary_subtag(code1);
            !a.is_empty() && a == primary_subtag(code2)
        }
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}

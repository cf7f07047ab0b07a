//! Canonical language names: row tag normalization, query language detection
//! and language-filter intent.

use std::collections::BTreeSet;
use whatlang::{Lang, Script};

pub const DEFAULT_LANGUAGE: &str = "English";

/// Catalog language codes. Order matters: intent extraction scans in this order.
const LANGUAGE_CODES: &[(u32, &str)] = &[
    (6, "Hindi"),
    (7, "Kannada"),
    (11, "Malayalam"),
    (20, "Tamil"),
    (21, "Telugu"),
    (24, "English"),
];

/// Fallback needles scanned in order after the canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("en", "English"),
    ("हिंदी", "Hindi"),
    ("हिन्दी", "Hindi"),
    ("ಕನ್ನಡ", "Kannada"),
    ("മലയാളം", "Malayalam"),
    ("தமிழ்", "Tamil"),
    ("తెలుగు", "Telugu"),
];

pub fn canonical_languages() -> impl Iterator<Item = &'static str> {
    LANGUAGE_CODES.iter().map(|(_, name)| *name)
}

pub fn language_for_code(code: u32) -> Option<&'static str> {
    LANGUAGE_CODES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

fn canonical_name(token: &str) -> Option<&'static str> {
    canonical_languages().find(|name| name.eq_ignore_ascii_case(token))
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parse a raw `Released Languages` cell such as `"20,24"` or `"Tamil, English"`
/// into canonical names.
///
/// Unknown numeric codes are skipped; unknown names are kept capitalized.
pub fn normalize_row_languages(raw: Option<&str>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let Some(raw) = raw else { return out };
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.chars().all(|c| c.is_ascii_digit()) {
            if let Some(name) = token.parse().ok().and_then(language_for_code) {
                out.insert(name.to_string());
            }
        } else if let Some(name) = canonical_name(token) {
            out.insert(name.to_string());
        } else {
            out.insert(capitalize(token));
        }
    }
    out
}

fn language_for_lang(lang: Lang) -> Option<&'static str> {
    match lang {
        Lang::Hin => Some("Hindi"),
        Lang::Kan => Some("Kannada"),
        Lang::Mal => Some("Malayalam"),
        Lang::Tam => Some("Tamil"),
        Lang::Tel => Some("Telugu"),
        Lang::Eng => Some("English"),
        _ => None,
    }
}

fn language_for_script(script: Script) -> Option<&'static str> {
    match script {
        Script::Devanagari => Some("Hindi"),
        Script::Kannada => Some("Kannada"),
        Script::Malayalam => Some("Malayalam"),
        Script::Tamil => Some("Tamil"),
        Script::Telugu => Some("Telugu"),
        _ => None,
    }
}

/// Best-effort guess of the language `text` is written in. Only used to pick
/// the reply language, never for ranking.
pub fn detect_query_language(text: &str) -> &'static str {
    let Some(info) = whatlang::detect(text) else {
        return DEFAULT_LANGUAGE;
    };
    language_for_lang(info.lang())
        .or_else(|| language_for_script(info.script()))
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Language the user asks courses to be filtered by, e.g. "Do you have
/// courses in Tamil?". First canonical name found wins, then aliases.
///
/// Both passes are plain substring scans, so `en` also fires inside words such
/// as "recent".
pub fn extract_language_filter_intent(query: &str) -> Option<&'static str> {
    let q = query.to_lowercase();
    if let Some(name) = canonical_languages().find(|name| q.contains(&name.to_lowercase())) {
        return Some(name);
    }
    let q = q.replace("language", "");
    ALIASES
        .iter()
        .find(|(needle, _)| q.contains(*needle))
        .map(|(_, language)| *language)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn codes_resolve_to_names() {
        assert_eq!(normalize_row_languages(Some("20,24")), set(&["Tamil", "English"]));
        assert_eq!(normalize_row_languages(Some(" 6 , 7,,11 ")), set(&["Hindi", "Kannada", "Malayalam"]));
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(normalize_row_languages(Some("tamil, ENGLISH")), set(&["Tamil", "English"]));
    }

    #[test]
    fn unknown_tokens() {
        assert_eq!(normalize_row_languages(Some("99")), BTreeSet::new());
        assert_eq!(normalize_row_languages(Some("bengali, 21")), set(&["Bengali", "Telugu"]));
        assert_eq!(normalize_row_languages(Some("99999999999999999999")), BTreeSet::new());
    }

    #[test]
    fn missing_or_blank() {
        assert!(normalize_row_languages(None).is_empty());
        assert!(normalize_row_languages(Some("")).is_empty());
        assert!(normalize_row_languages(Some(" , ,")).is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(normalize_row_languages(Some("24, English, english")), set(&["English"]));
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = normalize_row_languages(Some("20, hindi, marathi"));
        let joined = first.iter().cloned().collect::<Vec<_>>().join(",");
        assert_eq!(normalize_row_languages(Some(&joined)), first);
    }

    #[test]
    fn intent_prefers_canonical_order() {
        assert_eq!(extract_language_filter_intent("Do you have any courses in Tamil?"), Some("Tamil"));
        assert_eq!(extract_language_filter_intent("english or hindi?"), Some("Hindi"));
        assert_eq!(extract_language_filter_intent("TELUGU courses"), Some("Telugu"));
    }

    #[test]
    fn intent_aliases() {
        assert_eq!(extract_language_filter_intent("courses in en please"), Some("English"));
        assert_eq!(extract_language_filter_intent("தமிழ் பாடங்கள்"), Some("Tamil"));
        assert_eq!(extract_language_filter_intent("हिंदी में कोर्स"), Some("Hindi"));
    }

    #[test]
    fn code_alias_matches_inside_words() {
        assert_eq!(
            extract_language_filter_intent("I am a recent high school graduate, are there any opportunities for me?"),
            Some("English")
        );
        assert_eq!(extract_language_filter_intent("Tell me about honey bee farming"), None);
        assert_eq!(extract_language_filter_intent("poultry farm languages"), None);
    }

    #[test]
    fn detection_falls_back_to_english() {
        assert_eq!(detect_query_language(""), "English");
        assert_eq!(detect_query_language("12345 !!!"), "English");
    }

    #[test]
    fn detection_of_indic_scripts() {
        assert_eq!(detect_query_language("डेयरी फार्म शुरू करने के लिए कितनी गाय चाहिए?"), "Hindi");
        assert_eq!(detect_query_language("இந்தியாவில் சிறிய அளவில் பசு பண்ணை தொடங்க"), "Tamil");
        assert_eq!(detect_query_language("భారతదేశంలో చిన్నపాటి డెయిరీ ఫార్మ్‌ ప్రారంభించడానికి"), "Telugu");
    }

    #[test]
    fn detection_of_english() {
        assert_eq!(
            detect_query_language("I would like to learn how to start a poultry farm in my village"),
            "English"
        );
    }

    #[test]
    fn code_lookup() {
        assert_eq!(language_for_code(24), Some("English"));
        assert_eq!(language_for_code(1), None);
        assert_eq!(canonical_languages().count(), 6);
    }
}

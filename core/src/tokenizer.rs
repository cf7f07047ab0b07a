use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Two or more word characters. `\w` covers Indic vowel signs, so words in
    // Tamil, Hindi etc. stay whole.
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
}

/// Tokenize text using NFKC normalization and lowercasing.
///
/// No stopword removal and no stemming: the catalog mixes several languages and
/// any such list would only ever help the English rows.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

/// Unigrams followed by bigrams of adjacent tokens.
pub fn analyze(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = Vec::with_capacity(tokens.len() * 2);
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    let mut out = tokens;
    out.append(&mut terms);
    out
}

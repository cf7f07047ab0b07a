//! Turns retrieval results into a chat reply.

use coursebot_core::language::{detect_query_language, extract_language_filter_intent, DEFAULT_LANGUAGE};
use coursebot_core::{Hit, RetrievalIndex};
use serde::Serialize;

/// Best score below which a free-text query is treated as out of scope.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.05;
pub const SEARCH_K: usize = 6;
pub const FILTER_K: usize = 100;

const LISTING_LIMIT: usize = 10;
const TOPIC_LIMIT: usize = 5;

const OUT_OF_SCOPE: &[(&str, &str)] = &[
    ("Hindi", "क्षमा करें, यह जानकारी हमारे डेटा में उपलब्ध नहीं है।"),
    ("Kannada", "ಕ್ಷಮಿಸಿ, ಈ ಮಾಹಿತಿ ನಮ್ಮ ಡೇಟಾದಲ್ಲಿ ಲಭ್ಯವಿಲ್ಲ."),
    ("Malayalam", "ക്ഷമിക്കണം, ഈ വിവരം ഞങ്ങളുടെ ഡാറ്റയിൽ ലഭ്യമല്ല."),
    ("Tamil", "மன்னிக்கவும், இந்த தகவல் எங்கள் தரவுகளில் இல்லை."),
    ("Telugu", "క్షమించండి, ఈ సమాచారం మా డేటాలో అందుబాటులో లేదు."),
    ("English", "Sorry, this information is not available in our dataset."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    LanguageListing,
    CourseDetail,
    TopicListing,
    OutOfScope,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub kind: ReplyKind,
    /// Language the query appears to be written in.
    pub language: &'static str,
    pub language_filter: Option<&'static str>,
    pub text: String,
    pub hits: Vec<Hit>,
}

pub fn out_of_scope_message(language: &str) -> &'static str {
    OUT_OF_SCOPE
        .iter()
        .find(|(name, _)| *name == language)
        .or_else(|| OUT_OF_SCOPE.iter().find(|(name, _)| *name == DEFAULT_LANGUAGE))
        .map(|(_, msg)| *msg)
        .unwrap_or_default()
}

/// Answer `query` from the catalog: a language listing when the query names a
/// language, otherwise the best free-text matches.
pub fn compose_reply(index: &RetrievalIndex, query: &str, threshold: f32) -> Reply {
    let query = query.trim();
    let language = detect_query_language(query);
    let language_filter = extract_language_filter_intent(query);
    let hits = match language_filter {
        Some(lang) => index.filter_by_language(lang, FILTER_K),
        None => index.search(query, SEARCH_K),
    };

    let weak = language_filter.is_none() && hits.first().map_or(true, |h| h.score < threshold);
    if hits.is_empty() || weak {
        tracing::debug!(query, language, top = ?hits.first().map(|h| h.score), "out of scope");
        return Reply {
            kind: ReplyKind::OutOfScope,
            language,
            language_filter,
            text: out_of_scope_message(language).to_string(),
            hits: Vec::new(),
        };
    }

    let (kind, text) = match language_filter {
        Some(lang) => (ReplyKind::LanguageListing, language_listing(lang, &hits)),
        None => {
            let q = query.to_lowercase();
            if hits.len() == 1 || q.contains("about") || q.contains("tell me") {
                (ReplyKind::CourseDetail, course_detail(&hits[0]))
            } else {
                (ReplyKind::TopicListing, topic_listing(&hits))
            }
        }
    };
    Reply { kind, language, language_filter, text, hits }
}

fn join_languages(hit: &Hit) -> String {
    hit.languages.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn language_listing(lang: &str, hits: &[Hit]) -> String {
    let mut reply = format!("Yes, here are our courses available in {lang}:\n");
    reply += &hits
        .iter()
        .take(LISTING_LIMIT)
        .map(|h| format!("- {}", h.title))
        .collect::<Vec<_>>()
        .join("\n");
    if hits.len() > LISTING_LIMIT {
        reply += "\n...and more!";
    }
    reply
}

fn course_detail(hit: &Hit) -> String {
    format!(
        "**{}**\n\n{}\n\n*Who this course is for*: {}\n\n*Available in*: {}.",
        hit.title,
        hit.about,
        hit.audience,
        join_languages(hit)
    )
}

fn topic_listing(hits: &[Hit]) -> String {
    let mut reply = String::from("Here are some courses relevant to your question:\n");
    for h in hits.iter().take(TOPIC_LIMIT) {
        reply += &format!("\n**{}**\n{}\n*Languages*: {}\n", h.title, h.about, join_languages(h));
    }
    if hits.len() > TOPIC_LIMIT {
        reply += "\nLet me know if you want more details about any course.";
    }
    reply
}

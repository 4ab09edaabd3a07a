//! Query tokenization and keyword extraction.
//!
//! Queries arrive in English or Arabic. Tokens are whitespace separated,
//! lower-cased and stripped of surrounding punctuation; lengths are counted
//! in characters so Arabic words are measured correctly.

use std::collections::HashSet;

/// Tokens at or below this many characters are never keywords.
const MIN_TOKEN_CHARS: usize = 2;

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "all", "also", "am", "an", "and", "any", "are", "at", "be", "been", "being",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "here", "his", "how", "i", "if", "in", "into", "is", "it", "its", "me", "my", "no",
    "not", "of", "on", "or", "our", "please", "she", "should", "so", "some", "than", "that",
    "the", "their", "them", "there", "these", "they", "this", "those", "to", "too", "very",
    "was", "we", "were", "what", "what's", "whats", "when", "where", "which", "who", "whom",
    "why", "will", "with", "would", "you", "your",
];

pub const ARABIC_STOP_WORDS: &[&str] = &[
    "في", "من", "إلى", "الى", "على", "عن", "مع", "هذا", "هذه", "ذلك", "تلك", "التي", "الذي",
    "الذين", "ما", "ماذا", "هل", "هي", "هو", "كيف", "متى", "أين", "اين", "لماذا", "كم", "أو",
    "او", "ثم", "لا", "لم", "لن", "قد", "كان", "كانت", "يكون", "أن", "ان", "إن", "كل", "بعض",
    "غير", "بين", "عند", "أي", "اي", "هناك", "هنا", "نحن", "أنا", "انا", "أنت", "انت", "هم",
    "لكن", "أيضا", "ايضا", "حول", "لدي", "لديكم",
];

/// Phrasing shared by generated lookup questions. These words say how a
/// question is asked, not what it is about.
pub const QUESTION_FILLER_WORDS: &[&str] = &[
    "tell", "give", "know", "summarize", "content", "overview", "information",
    "ملخص", "المعلومات", "أعطني", "اعطني", "نظرة", "عامة", "أخبرني", "اخبرني", "المتوفرة",
];

/// ASCII punctuation plus the Arabic question mark, comma and semicolon and
/// common typographic quotes.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '؟' | '،' | '؛' | '«' | '»' | '…' | '“' | '”' | '‘' | '’' | '٪' | '۔'
        )
}

/// Strip punctuation from both ends of a token.
pub fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(is_punctuation)
}

/// Whether a lower-cased token is an English or Arabic stop-word.
pub fn is_stop_word(token: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(&token) || ARABIC_STOP_WORDS.contains(&token)
}

/// Whether a lower-cased token is question phrasing rather than a subject.
pub fn is_question_filler(token: &str) -> bool {
    QUESTION_FILLER_WORDS.contains(&token)
}

/// Lower-cased, punctuation-trimmed query words longer than two characters.
///
/// Stop-words are kept; this is the word list used for relevance scoring.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(trim_punctuation)
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Query words minus stop-words, for native text search.
pub fn text_terms(query: &str) -> Vec<String> {
    query_words(query)
        .into_iter()
        .filter(|token| !is_stop_word(token))
        .collect()
}

/// Reduces a query to a few salient search terms.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_keywords: usize,
}

impl KeywordExtractor {
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }

    /// Extract at most `max_keywords` distinct keywords in query order.
    pub fn extract(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();

        query_words(query)
            .into_iter()
            .filter(|token| !is_stop_word(token))
            .filter(|token| seen.insert(token.clone()))
            .take(self.max_keywords)
            .collect()
    }
}

//! Question canonicalization and fuzzy similarity.

use crate::keywords::{is_punctuation, is_question_filler, is_stop_word};

/// Lower-case, replace punctuation with spaces and collapse whitespace.
pub fn canonicalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if is_punctuation(c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokens of a canonical question that carry meaning.
///
/// Stop-words and question phrasing ("tell me about", "أخبرني عن") are
/// dropped so only the subject is compared. Falls back to every token when nothing survives the filter, so questions
/// made only of stop-words can still be compared.
pub fn content_tokens(canonical: &str) -> Vec<&str> {
    let tokens: Vec<&str> = canonical.split_whitespace().collect();
    let content: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| t.chars().count() > 2 && !is_stop_word(t) && !is_question_filler(t))
        .collect();

    if content.is_empty() {
        tokens
    } else {
        content
    }
}

/// Edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / longer length`, in `[0, 1]`.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Soft Dice coefficient between two canonical questions.
///
/// Each token contributes the similarity of its closest partner on the other
/// side when that reaches `token_threshold`; both directions are summed and
/// divided by the total token count.
pub fn question_similarity(a: &str, b: &str, token_threshold: f64) -> f64 {
    let left = content_tokens(a);
    let right = content_tokens(b);
    let total = left.len() + right.len();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let matched = |from: &[&str], to: &[&str]| -> f64 {
        from.iter()
            .map(|token| {
                let best = to
                    .iter()
                    .map(|other| token_similarity(token, other))
                    .fold(0.0, f64::max);
                if best >= token_threshold {
                    best
                } else {
                    0.0
                }
            })
            .sum()
    };

    (matched(&left, &right) + matched(&right, &left)) / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(
            canonicalize("  What's   the Tuition fee?"),
            "what s the tuition fee"
        );
        assert_eq!(canonicalize("ما هي متطلبات القبول؟"), "ما هي متطلبات القبول");
        assert_eq!(canonicalize("?!"), "");
    }

    #[test]
    fn test_content_tokens_fallback() {
        assert_eq!(content_tokens("what s the tuition fee"), vec!["tuition", "fee"]);
        assert_eq!(content_tokens("who is it"), vec!["who", "is", "it"]);
    }

    #[test]
    fn test_content_tokens_drop_question_phrasing() {
        assert_eq!(
            content_tokens("tell me about visitor parking"),
            vec!["visitor", "parking"]
        );
        assert_eq!(content_tokens("أخبرني عن المكتبة"), vec!["المكتبة"]);
        assert_eq!(
            content_tokens("what information do you have about fees"),
            vec!["fees"]
        );
    }

    #[test]
    fn test_shared_phrasing_alone_scores_zero() {
        assert_eq!(
            question_similarity(
                "tell me about visitor parking",
                "tell me about central library",
                0.75
            ),
            0.0
        );
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("fee", "fees"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("قبول", "القبول"), 2);
    }

    #[test]
    fn test_plural_variant_is_close() {
        let score = question_similarity(
            "what s the tuition fee",
            "what are the tuition fees",
            0.75,
        );
        assert!((score - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_questions_score_zero() {
        assert_eq!(
            question_similarity("library opening hours", "tuition fees", 0.75),
            0.0
        );
    }

    #[test]
    fn test_identical_questions_score_one() {
        let q = "tell me about computer science";
        assert!((question_similarity(q, q, 0.75) - 1.0).abs() < 1e-9);
    }
}

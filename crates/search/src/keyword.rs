use once_cell::sync::Lazy;
use regex::Regex;

/// Product names, feature names, and license-tier names carry more signal
/// than ordinary query words and get triple weight.
static IMPORTANT_TERM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Product names
        r"\b(itsm|itom|csx|hrsd|csm|itbm)\b",
        // Feature names
        r"\b(virtual agent|workflow|now assist|ai|chatbot)\b",
        // License tiers
        r"\b(standard|pro|enterprise|pro\+)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid important-term pattern"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordScore {
    /// Unnormalized match count; ranking ties break on this.
    pub raw: u32,
    /// `raw` divided by `|query terms| + |important terms| + 2`, keeping
    /// scores roughly comparable across query lengths. Monotonic in `raw`
    /// for a fixed query, not guaranteed to lie in [0, 1].
    pub normalized: f32,
}

/// Lexical relevance: term frequency, weighted important-term matches, and
/// an exact-phrase bonus.
pub struct KeywordScorer;

impl KeywordScorer {
    /// Important terms occurring in the query, in match order. Duplicated
    /// mentions count twice — repetition is emphasis.
    pub fn important_terms(query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        let mut terms = Vec::new();
        for pattern in IMPORTANT_TERM_PATTERNS.iter() {
            for m in pattern.find_iter(&query) {
                terms.push(m.as_str().to_string());
            }
        }
        terms
    }

    /// Score one slide against the query; `None` when nothing matches at
    /// all (the slide is not a candidate).
    pub fn score(query: &str, text: &str) -> Option<KeywordScore> {
        let query = query.trim().to_lowercase();
        let text = text.to_lowercase();

        let query_terms: Vec<&str> = query.split_whitespace().collect();
        let base: u32 = query_terms
            .iter()
            .filter(|term| text.contains(*term))
            .count() as u32;

        let important = Self::important_terms(&query);
        let important_hits: u32 = important
            .iter()
            .filter(|term| text.contains(term.as_str()))
            .count() as u32;

        let phrase: u32 = if text.contains(&query) { 2 } else { 0 };

        let raw = base + 3 * important_hits + phrase;
        if raw == 0 {
            return None;
        }

        let denominator = (query_terms.len() + important.len() + 2) as f32;
        Some(KeywordScore {
            raw,
            normalized: raw as f32 / denominator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn important_terms_cover_products_features_and_tiers() {
        let terms = KeywordScorer::important_terms("Compare ITSM pro virtual agent");
        assert!(terms.contains(&"itsm".to_string()));
        assert!(terms.contains(&"pro".to_string()));
        assert!(terms.contains(&"virtual agent".to_string()));
    }

    #[test]
    fn unmatched_slides_are_not_candidates() {
        assert_eq!(KeywordScorer::score("virtual agent", "Quarterly revenue"), None);
    }

    #[test]
    fn exact_phrase_strictly_outscores_scattered_terms() {
        // Identical slides except one carries the contiguous phrase.
        let with_phrase = "The virtual agent handles requests";
        let without_phrase = "The virtual assistant is an agent";
        let query = "virtual agent";

        let a = KeywordScorer::score(query, with_phrase).unwrap();
        let b = KeywordScorer::score(query, without_phrase).unwrap();
        assert!(a.raw > b.raw);
        assert!(a.normalized > b.normalized);
    }

    #[test]
    fn important_terms_triple_the_weight() {
        // "workflow" is an important term: one term hit plus 3.
        let score = KeywordScorer::score("workflow", "workflow designer").unwrap();
        // base 1 + important 3 + phrase 2
        assert_eq!(score.raw, 6);
    }

    #[test]
    fn normalization_uses_terms_plus_important_plus_two() {
        let score = KeywordScorer::score("workflow", "workflow designer").unwrap();
        // 1 query term + 1 important term + 2
        assert!((score.normalized - 6.0 / 4.0).abs() < 1e-6);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        let lower = KeywordScorer::score("virtual agent", "VIRTUAL AGENT overview").unwrap();
        let upper = KeywordScorer::score("VIRTUAL AGENT", "virtual agent overview").unwrap();
        assert_eq!(lower.raw, upper.raw);
    }
}

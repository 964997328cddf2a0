// 🧮 Definition Aggregator - merge sense lists across sources
// Definitions similar enough to an already-selected one are folded into it
// (their source joins the contributor set, their wording is dropped);
// everything else is appended. Processing follows source precedence, so the
// principal wording always comes from the highest-precedence source.

use crate::entry::Sense;
use crate::errors::{MergeError, MergeResult};
use crate::normalize::normalize_definition;
use std::collections::HashSet;

/// Default minimum bag-of-words overlap for two definitions to count as
/// the same sense.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

// ============================================================================
// SIMILARITY
// ============================================================================

/// Bag-of-words overlap between two definitions: tokenize on whitespace,
/// take the distinct-word sets A and B, and score
/// `min(|A∩B| / |A|, |A∩B| / |B|)` - 0 is completely dissimilar, 1 is
/// completely similar.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_words: HashSet<&str> = a.split_whitespace().collect();
    let b_words: HashSet<&str> = b.split_whitespace().collect();

    if a_words.is_empty() || b_words.is_empty() {
        return 0.0;
    }

    let both = a_words.intersection(&b_words).count() as f64;
    let a_overlap = both / a_words.len() as f64;
    let b_overlap = both / b_words.len() as f64;

    a_overlap.min(b_overlap)
}

// ============================================================================
// DEFINITION AGGREGATOR
// ============================================================================

/// Merges per-source sense lists into one deduplicated, source-attributed
/// list. Deterministic for a fixed source precedence and per-source sense
/// order.
#[derive(Debug, Clone)]
pub struct DefinitionAggregator {
    /// Similarity threshold τ: definitions scoring at or above it merge
    /// (default: 0.8)
    pub threshold: f64,

    /// Compare normalized definitions instead of raw wording, so that
    /// "A sock" and "Sock." count as the same sense (default: false)
    pub normalize: bool,
}

impl DefinitionAggregator {
    /// Creates an aggregator with the default threshold, comparing raw
    /// wording.
    pub fn new() -> Self {
        DefinitionAggregator {
            threshold: DEFAULT_THRESHOLD,
            normalize: false,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        DefinitionAggregator {
            threshold,
            normalize: false,
        }
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Aggregates senses, each tagged with its originating source as the
    /// sole element of its `sources` set.
    ///
    /// Sources are processed in `precedence` order; when no precedence is
    /// supplied, the first-seen order of distinct sources in the input is
    /// used. A sense from a source missing from an explicit precedence
    /// list is an error - silently dropping it would lose data.
    pub fn aggregate(
        &self,
        senses: &[Sense],
        precedence: Option<&[String]>,
    ) -> MergeResult<Vec<Sense>> {
        let precedence: Vec<String> = match precedence {
            Some(order) => order.to_vec(),
            None => first_seen_sources(senses),
        };

        for sense in senses {
            let source = primary_source(sense)?;
            if !precedence.iter().any(|s| s == source) {
                return Err(MergeError::UnknownSource {
                    source_tag: source.to_string(),
                    definition: sense.definition.clone(),
                });
            }
        }

        let mut merged: Vec<Sense> = Vec::new();

        for source in &precedence {
            let current: Vec<Sense> = senses
                .iter()
                .filter(|sense| sense.sources.first().map(String::as_str) == Some(source.as_str()))
                .cloned()
                .collect();

            // nothing selected yet: this source's senses seed the output
            if merged.is_empty() {
                merged.extend(current);
                continue;
            }

            'senses: for sense in current {
                for existing in merged.iter_mut() {
                    if self.score(&sense.definition, &existing.definition) >= self.threshold {
                        // similar enough: absorb the source, drop the wording
                        existing.add_source(source);
                        continue 'senses;
                    }
                }
                merged.push(sense);
            }
        }

        Ok(merged)
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        if self.normalize {
            similarity(&normalize_definition(a), &normalize_definition(b))
        } else {
            similarity(a, b)
        }
    }
}

impl Default for DefinitionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn primary_source(sense: &Sense) -> MergeResult<&str> {
    sense
        .sources
        .first()
        .map(String::as_str)
        .ok_or_else(|| MergeError::UnknownSource {
            source_tag: "<untagged>".to_string(),
            definition: sense.definition.clone(),
        })
}

fn first_seen_sources(senses: &[Sense]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for sense in senses {
        if let Some(source) = sense.sources.first() {
            if !order.iter().any(|s| s == source) {
                order.push(source.clone());
            }
        }
    }
    order
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_senses() -> Vec<Sense> {
        vec![
            Sense::new("one", "AECD"),
            Sense::new("one two", "CW"),
            Sense::new("one two three", "DLC"),
            Sense::new("one two three four", "MD"),
            Sense::new("one two three four five", "ABCD"),
        ]
    }

    #[test]
    fn test_similarity_score() {
        assert_eq!(similarity("one two", "one two"), 1.0);
        assert_eq!(similarity("one", "two"), 0.0);
        // 4 shared words, |A|=4, |B|=5 -> min(1.0, 0.8)
        let score = similarity("one two three four", "one two three four five");
        assert!((score - 0.8).abs() < 1e-9);
        assert_eq!(similarity("", "one"), 0.0);
    }

    #[test]
    fn test_counting_case_at_default_threshold() {
        let aggregator = DefinitionAggregator::new();
        let result = aggregator.aggregate(&counting_senses(), None).unwrap();

        // only the last two definitions overlap at >= 0.8
        assert_eq!(result.len(), 4);
        let last = result.last().unwrap();
        assert_eq!(last.definition, "one two three four");
        assert_eq!(last.sources, vec!["MD", "ABCD"]);
    }

    #[test]
    fn test_counting_case_at_threshold_one() {
        let aggregator = DefinitionAggregator::with_threshold(1.0);
        let result = aggregator.aggregate(&counting_senses(), None).unwrap();
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_counting_case_at_low_threshold() {
        let aggregator = DefinitionAggregator::with_threshold(0.5);
        let result = aggregator.aggregate(&counting_senses(), None).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_monotonicity_in_threshold() {
        let senses = counting_senses();
        let mut previous = 0;
        for threshold in [0.2, 0.5, 0.8, 0.9, 1.0] {
            let aggregator = DefinitionAggregator::with_threshold(threshold);
            let count = aggregator.aggregate(&senses, None).unwrap().len();
            assert!(
                count >= previous,
                "sense count decreased from {} to {} at τ={}",
                previous,
                count,
                threshold
            );
            previous = count;
        }
    }

    #[test]
    fn test_three_source_scenario() {
        let senses = vec![
            Sense::new("paddle", "X"),
            Sense::new("spade", "X"),
            Sense::new("paddle", "Y"),
            Sense::new("A shovel.", "Z"),
        ];

        let aggregator = DefinitionAggregator::new();
        let result = aggregator.aggregate(&senses, None).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].definition, "paddle");
        assert_eq!(result[0].sources, vec!["X", "Y"]);
        assert_eq!(result[1].definition, "spade");
        assert_eq!(result[1].sources, vec!["X"]);
        assert_eq!(result[2].definition, "A shovel.");
        assert_eq!(result[2].sources, vec!["Z"]);
    }

    #[test]
    fn test_explicit_precedence_reorders_principal_wording() {
        let senses = counting_senses();
        let precedence: Vec<String> = ["CW", "AECD", "ABCD", "MD", "DLC"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let aggregator = DefinitionAggregator::new();
        let result = aggregator.aggregate(&senses, Some(&precedence)).unwrap();

        // CW seeds the list now
        assert_eq!(result[0].definition, "one two");
        assert_eq!(result[0].sources[0], "CW");
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let senses = counting_senses();
        let precedence = vec!["A".to_string()];

        let aggregator = DefinitionAggregator::new();
        let err = aggregator.aggregate(&senses, Some(&precedence)).unwrap_err();
        assert!(err.to_string().contains("Unrecognized source")
            || err.to_string().contains("unrecognized source"));
    }

    #[test]
    fn test_first_source_without_senses_does_not_seed() {
        // CW is highest-precedence but contributes nothing: AE seeds
        let senses = vec![Sense::new("A sock", "AE"), Sense::new("Sock.", "MD")];
        let precedence: Vec<String> = ["CW", "AE", "MD"].iter().map(|s| s.to_string()).collect();

        let aggregator = DefinitionAggregator::new();
        let result = aggregator.aggregate(&senses, Some(&precedence)).unwrap();
        assert_eq!(result[0].sources, vec!["AE"]);
    }

    #[test]
    fn test_normalized_sock_case() {
        let senses = vec![
            Sense::new("sock, stocking", "CW"),
            Sense::new("A sock", "AE"),
            Sense::new("stocking", "AE"),
            Sense::new("Sock.", "MD"),
        ];

        let aggregator = DefinitionAggregator::new().with_normalization(true);
        let result = aggregator.aggregate(&senses, None).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].definition, "sock, stocking");
        assert_eq!(result[0].sources, vec!["CW"]);
        assert_eq!(result[1].definition, "A sock");
        assert_eq!(result[1].sources, vec!["AE", "MD"]);
        assert_eq!(result[2].definition, "stocking");
        assert_eq!(result[2].sources, vec!["AE"]);
    }

    #[test]
    fn test_normalized_hat_case() {
        let senses = vec![
            Sense::new("hat, cap, headgear", "CW"),
            Sense::new("A hat.", "AE"),
            Sense::new("hat", "MD"),
        ];

        let aggregator = DefinitionAggregator::new().with_normalization(true);
        let result = aggregator.aggregate(&senses, None).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].definition, "hat, cap, headgear");
        assert_eq!(result[0].sources, vec!["CW"]);
        assert_eq!(result[1].definition, "A hat.");
        assert_eq!(result[1].sources, vec!["AE", "MD"]);
    }

    #[test]
    fn test_normalized_pronoun_case() {
        let senses = vec![
            Sense::new("s/he works", "CW"),
            Sense::new("He works.", "MD"),
        ];

        let aggregator = DefinitionAggregator::new().with_normalization(true);
        let result = aggregator.aggregate(&senses, None).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].definition, "s/he works");
        assert_eq!(result[0].sources, vec!["CW", "MD"]);
    }

    #[test]
    fn test_raw_comparison_keeps_punctuation_variants_apart() {
        // without normalization, "Sock." and "A sock" share no raw token
        let senses = vec![Sense::new("A sock", "AE"), Sense::new("Sock.", "MD")];

        let aggregator = DefinitionAggregator::new();
        let result = aggregator.aggregate(&senses, None).unwrap();
        assert_eq!(result.len(), 2);
    }
}

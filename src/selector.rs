// 🎯 Analysis Selector - choose one analysis per entry
// Dictionaries conventionally cite the least-marked inflected base form,
// so ties between compatible candidates fall to the lowest tag count.
// A tie that survives every heuristic is surfaced, never guessed.

use crate::analysis::{Analysis, MorphologicalAnalyzer, is_pos_match};
use crate::entry::Entry;
use crate::errors::MergeResult;
use serde::{Deserialize, Serialize};

// ============================================================================
// SELECTION OUTCOME
// ============================================================================

/// Result of selecting an analysis for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// A unique best candidate was found
    Selected(Analysis),

    /// The analyzer produced no candidate compatible with the entry's
    /// category; the entry simply stays bare
    NoCandidates,

    /// Several equally-ranked candidates survived every heuristic
    Unresolved {
        /// The candidates still tied after all filters
        candidates: Vec<Analysis>,
    },
}

/// Diagnostic emitted for entries whose analysis could not be resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedAnalysis {
    /// Key of the affected entry, when already assigned
    pub key: Option<String>,

    /// Lemma the candidates were generated for
    pub lemma: String,

    /// How many candidates remained tied
    pub candidate_count: usize,
}

// ============================================================================
// ANALYSIS SELECTOR
// ============================================================================

/// Chooses one best analysis per entry from analyzer output.
pub struct AnalysisSelector<'a> {
    analyzer: &'a dyn MorphologicalAnalyzer,
}

impl<'a> AnalysisSelector<'a> {
    pub fn new(analyzer: &'a dyn MorphologicalAnalyzer) -> Self {
        AnalysisSelector { analyzer }
    }

    /// The lemma an entry's analysis is expected to cite: the archival
    /// spelling when the sources record one, else the canonical spelling.
    pub fn expected_lemma(entry: &Entry) -> &str {
        entry.lemma.proto.as_deref().unwrap_or(&entry.lemma.text)
    }

    /// Selects an analysis for an entry from the analyzer's canonical-form
    /// candidates.
    pub fn select_for_entry(&self, entry: &Entry) -> MergeResult<SelectionOutcome> {
        let lemma = Self::expected_lemma(entry);
        let candidates = self.analyzer.analyze_lemma_with_affixes(lemma);
        self.select(&entry.category, lemma, candidates)
    }

    /// Cascade: category compatibility -> minimum tag count -> exact-lemma
    /// tie-break. Stops at the first filter that leaves exactly one
    /// candidate.
    pub fn select(
        &self,
        category: &str,
        expected_lemma: &str,
        candidates: Vec<Analysis>,
    ) -> MergeResult<SelectionOutcome> {
        let mut compatible = Vec::new();
        for candidate in candidates {
            if is_pos_match(category, &candidate)? {
                compatible.push(candidate);
            }
        }

        if compatible.is_empty() {
            return Ok(SelectionOutcome::NoCandidates);
        }
        if compatible.len() == 1 {
            return Ok(SelectionOutcome::Selected(take_only(compatible)));
        }

        // keep only the least-marked candidates
        let min_tag_count = compatible
            .iter()
            .map(Analysis::tag_count)
            .min()
            .unwrap_or(0);
        let least_marked: Vec<Analysis> = compatible
            .into_iter()
            .filter(|c| c.tag_count() == min_tag_count)
            .collect();

        if least_marked.len() == 1 {
            return Ok(SelectionOutcome::Selected(take_only(least_marked)));
        }

        // final narrowing: candidates citing exactly the expected lemma
        let exact: Vec<Analysis> = least_marked
            .iter()
            .filter(|c| c.lemma == expected_lemma)
            .cloned()
            .collect();

        if exact.len() == 1 {
            return Ok(SelectionOutcome::Selected(take_only(exact)));
        }

        // still tied (or the lemma filter emptied the tie): report, never guess
        let candidates = if exact.is_empty() { least_marked } else { exact };
        Ok(SelectionOutcome::Unresolved { candidates })
    }

    /// The unique best analysis of a record's own lemma against its own
    /// category, used by the matcher's finer disambiguation test. `None`
    /// when no unique best exists.
    pub fn most_likely(&self, category: &str, lemma: &str) -> MergeResult<Option<Analysis>> {
        let candidates = self.analyzer.analyze_lemma_with_affixes(lemma);
        Ok(match self.select(category, lemma, candidates)? {
            SelectionOutcome::Selected(analysis) => Some(analysis),
            _ => None,
        })
    }

    /// Resolves an entry's stem: an explicit analyzer stem from the
    /// highest-precedence contributing source wins; otherwise the unique
    /// cited stem of the highest-precedence source listing exactly one.
    pub fn resolve_stem(entry: &Entry, precedence: &[String]) -> Option<String> {
        for tag in precedence {
            if let Some(record) = entry.data_sources.get(tag) {
                if let Some(stem) = &record.stem {
                    return Some(stem.clone());
                }
            }
        }

        for tag in precedence {
            if let Some(record) = entry.data_sources.get(tag) {
                if record.stems.len() == 1 {
                    return Some(record.stems[0].clone());
                }
            }
        }

        None
    }
}

fn take_only(mut candidates: Vec<Analysis>) -> Analysis {
    // callers only reach this with exactly one candidate
    candidates.swap_remove(0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TableAnalyzer;
    use crate::record::{SourceRecord, Wordform};

    fn analyzer_with(lemma: &str, analyses: Vec<Analysis>) -> TableAnalyzer {
        let mut analyzer = TableAnalyzer::new();
        analyzer.insert_canonical(lemma, analyses);
        analyzer
    }

    #[test]
    fn test_single_compatible_candidate_selected() {
        // one compatible candidate wins regardless of tag count
        let heavy = Analysis::new(&["PV/e"], "atoskêw", &["V", "AI", "Cnj", "3Sg"]);
        let analyzer = analyzer_with(
            "atoskêw",
            vec![
                heavy.clone(),
                Analysis::new(&[], "atoskêw", &["N", "A", "Sg"]),
            ],
        );
        let selector = AnalysisSelector::new(&analyzer);

        let outcome = selector
            .select(
                "VAI-1",
                "atoskêw",
                analyzer.analyze_lemma_with_affixes("atoskêw"),
            )
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::Selected(heavy));
    }

    #[test]
    fn test_minimum_tag_count_wins() {
        let light = Analysis::new(&[], "nipâw", &["V", "AI"]);
        let heavy = Analysis::new(&[], "nipâw", &["V", "AI", "3Sg"]);
        let analyzer = analyzer_with("nipâw", vec![heavy, light.clone()]);
        let selector = AnalysisSelector::new(&analyzer);

        let outcome = selector
            .select(
                "VAI-1",
                "nipâw",
                analyzer.analyze_lemma_with_affixes("nipâw"),
            )
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::Selected(light));
    }

    #[test]
    fn test_exact_lemma_tie_break() {
        let exact = Analysis::new(&[], "apiw", &["V", "AI"]);
        let other = Analysis::new(&[], "apîw", &["V", "AI"]);
        let analyzer = analyzer_with("apiw", vec![other, exact.clone()]);
        let selector = AnalysisSelector::new(&analyzer);

        let outcome = selector
            .select("VAI-1", "apiw", analyzer.analyze_lemma_with_affixes("apiw"))
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::Selected(exact));
    }

    #[test]
    fn test_surviving_tie_is_unresolved() {
        let a = Analysis::new(&[], "apiw", &["V", "AI"]);
        let b = Analysis::new(&[], "apiw", &["V", "AI"]);
        let analyzer = analyzer_with("apiw", vec![a, b]);
        let selector = AnalysisSelector::new(&analyzer);

        let outcome = selector
            .select("VAI-1", "apiw", analyzer.analyze_lemma_with_affixes("apiw"))
            .unwrap();
        assert!(matches!(
            outcome,
            SelectionOutcome::Unresolved { candidates } if candidates.len() == 2
        ));
    }

    #[test]
    fn test_no_compatible_candidates() {
        let analyzer = analyzer_with("apoy", vec![Analysis::new(&[], "apoy", &["N", "I", "Sg"])]);
        let selector = AnalysisSelector::new(&analyzer);

        let outcome = selector
            .select("VTA-1", "apoy", analyzer.analyze_lemma_with_affixes("apoy"))
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::NoCandidates);
    }

    #[test]
    fn test_most_likely_requires_unique_best() {
        let a = Analysis::new(&[], "apiw", &["V", "AI"]);
        let b = Analysis::new(&[], "apiw", &["V", "AI"]);
        let analyzer = analyzer_with("apiw", vec![a.clone(), b]);
        let selector = AnalysisSelector::new(&analyzer);

        assert_eq!(selector.most_likely("VAI-1", "apiw").unwrap(), None);

        let analyzer = analyzer_with("apiw", vec![a.clone()]);
        let selector = AnalysisSelector::new(&analyzer);
        assert_eq!(selector.most_likely("VAI-1", "apiw").unwrap(), Some(a));
    }

    #[test]
    fn test_stem_resolution_prefers_explicit_stem() {
        let mut entry = Entry::from_record(
            "ALT",
            SourceRecord {
                head: Wordform::new("atoskêw"),
                lemma: Wordform::new("atoskêw"),
                category: "VAI-1".to_string(),
                stem: Some("atoskê-".to_string()),
                ..SourceRecord::default()
            },
        );
        entry.merge_record(
            "CW",
            SourceRecord {
                head: Wordform::new("atoskêw"),
                lemma: Wordform::new("atoskêw"),
                category: "VAI-1".to_string(),
                stems: vec!["atoski-".to_string()],
                ..SourceRecord::default()
            },
            false,
        );

        let precedence = vec!["ALT".to_string(), "CW".to_string()];
        assert_eq!(
            AnalysisSelector::resolve_stem(&entry, &precedence),
            Some("atoskê-".to_string())
        );
    }

    #[test]
    fn test_stem_resolution_unique_cited_stem() {
        let entry = Entry::from_record(
            "CW",
            SourceRecord {
                head: Wordform::new("atoskêw"),
                lemma: Wordform::new("atoskêw"),
                category: "VAI-1".to_string(),
                stems: vec!["atoskê-".to_string()],
                ..SourceRecord::default()
            },
        );

        let precedence = vec!["ALT".to_string(), "CW".to_string()];
        assert_eq!(
            AnalysisSelector::resolve_stem(&entry, &precedence),
            Some("atoskê-".to_string())
        );
    }

    #[test]
    fn test_stem_resolution_ambiguous_stems_left_unset() {
        let entry = Entry::from_record(
            "CW",
            SourceRecord {
                head: Wordform::new("atoskêw"),
                lemma: Wordform::new("atoskêw"),
                category: "VAI-1".to_string(),
                stems: vec!["atoskê-".to_string(), "atoski-".to_string()],
                ..SourceRecord::default()
            },
        );

        let precedence = vec!["CW".to_string()];
        assert_eq!(AnalysisSelector::resolve_stem(&entry, &precedence), None);
    }
}

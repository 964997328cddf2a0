// Morphological Analysis - analyzer seam + analysis parsing
// The analyzer itself is an external collaborator (a finite-state
// transducer); this module consumes its output: ordered triples of
// prefix tags, lemma, and suffix tags.

use crate::category::{CategoryInfo, Pos, parse_category};
use crate::errors::MergeResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// ============================================================================
// ANALYSIS
// ============================================================================

/// One candidate analysis of a wordform: prefix tags, lemma, suffix tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Tags preceding the lemma (preverbs, prenouns)
    #[serde(default)]
    pub prefix_tags: Vec<String>,

    /// Citation form the analysis decomposes to
    pub lemma: String,

    /// Tags following the lemma (part of speech, inflection)
    #[serde(default)]
    pub suffix_tags: Vec<String>,
}

impl Analysis {
    pub fn new(prefix_tags: &[&str], lemma: &str, suffix_tags: &[&str]) -> Self {
        Analysis {
            prefix_tags: prefix_tags.iter().map(|t| t.to_string()).collect(),
            lemma: lemma.to_string(),
            suffix_tags: suffix_tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Total tag count: a proxy for morphological markedness.
    /// Dictionaries conventionally cite the least-marked base form.
    pub fn tag_count(&self) -> usize {
        self.prefix_tags.len() + self.suffix_tags.len()
    }
}

// ============================================================================
// ANALYSIS PARSING
// ============================================================================

/// {pos, wordClass} derived from an analysis's suffix tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisInfo {
    pub pos: Pos,
    pub word_class: String,
}

/// Derives {pos, wordClass} from an analysis. The first suffix tag names
/// the part of speech; subclass tags refine it (V+TA -> VTA, N+D+A -> NDA,
/// Ipc+Interj -> IPJ). Returns `None` for tag sets outside the documented
/// vocabulary - such analyses simply never match any category.
pub fn parse_analysis(analysis: &Analysis) -> Option<AnalysisInfo> {
    let tags: Vec<&str> = analysis
        .suffix_tags
        .iter()
        .map(|t| t.trim_start_matches('+'))
        .collect();

    let pos_tag = *tags.first()?;

    let (pos, word_class) = match pos_tag {
        "V" => (Pos::Verb, format!("V{}", verb_subclass(&tags))),
        "N" => (Pos::Noun, format!("N{}", noun_subclass(&tags))),
        "Pron" => (Pos::Pronoun, format!("Pr{}", noun_subclass(&tags))),
        "Ipc" => {
            let class = if tags.contains(&"Interj") { "IPJ" } else { "IPC" };
            (Pos::Particle, class.to_string())
        }
        _ => return None,
    };

    Some(AnalysisInfo { pos, word_class })
}

fn verb_subclass(tags: &[&str]) -> &'static str {
    for subclass in ["II", "AI", "TI", "TA"] {
        if tags.contains(&subclass) {
            return subclass;
        }
    }
    ""
}

fn noun_subclass(tags: &[&str]) -> String {
    let mut subclass = String::new();
    if tags.contains(&"D") {
        subclass.push('D');
    }
    if tags.contains(&"A") {
        subclass.push('A');
    } else if tags.contains(&"I") {
        subclass.push('I');
    }
    subclass
}

/// Checks whether an analysis is compatible with a category code: both the
/// coarse part of speech and the word class must agree.
pub fn is_pos_match(category: &str, analysis: &Analysis) -> MergeResult<bool> {
    let CategoryInfo {
        pos, word_class, ..
    } = parse_category(category)?;

    Ok(match parse_analysis(analysis) {
        Some(info) => info.pos == pos && info.word_class == word_class,
        None => false,
    })
}

// ============================================================================
// ANALYZER SEAM
// ============================================================================

/// External morphological analyzer. Both lookups are pure: they may return
/// an empty candidate list but never fail for valid string input.
pub trait MorphologicalAnalyzer {
    /// Spelling-relaxed analysis of a surface wordform.
    fn analyze(&self, wordform: &str) -> Vec<Analysis>;

    /// Canonical-form candidate analyses of a citation lemma.
    fn analyze_lemma_with_affixes(&self, lemma: &str) -> Vec<Analysis>;
}

/// Lookup-table analyzer backed by precomputed transducer output.
///
/// Loaded from an NDJSON sidecar, one wordform per line:
/// `{"wordform": "...", "canonical": true, "analyses": [...]}`.
/// Rows flagged `canonical` serve `analyze_lemma_with_affixes`; the rest
/// serve the spelling-relaxed `analyze`.
#[derive(Debug, Default)]
pub struct TableAnalyzer {
    surface: HashMap<String, Vec<Analysis>>,
    canonical: HashMap<String, Vec<Analysis>>,
}

/// One line of the analyzer table file.
#[derive(Debug, Deserialize)]
struct TableRow {
    wordform: String,
    #[serde(default)]
    canonical: bool,
    analyses: Vec<Analysis>,
}

impl TableAnalyzer {
    pub fn new() -> Self {
        TableAnalyzer::default()
    }

    /// Loads the analyzer table from an NDJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open analyzer table: {}", path.display()))?;

        let mut analyzer = TableAnalyzer::new();

        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| {
                format!("Failed to read analyzer table line {}", number + 1)
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let row: TableRow = serde_json::from_str(&line).with_context(|| {
                format!("Invalid analyzer table row on line {}", number + 1)
            })?;
            if row.canonical {
                analyzer.insert_canonical(&row.wordform, row.analyses);
            } else {
                analyzer.insert_surface(&row.wordform, row.analyses);
            }
        }

        Ok(analyzer)
    }

    /// Registers spelling-relaxed analyses for a surface wordform.
    pub fn insert_surface(&mut self, wordform: &str, analyses: Vec<Analysis>) {
        self.surface
            .entry(wordform.to_string())
            .or_default()
            .extend(analyses);
    }

    /// Registers canonical-form analyses for a citation lemma.
    pub fn insert_canonical(&mut self, lemma: &str, analyses: Vec<Analysis>) {
        self.canonical
            .entry(lemma.to_string())
            .or_default()
            .extend(analyses);
    }
}

impl MorphologicalAnalyzer for TableAnalyzer {
    fn analyze(&self, wordform: &str) -> Vec<Analysis> {
        self.surface.get(wordform).cloned().unwrap_or_default()
    }

    fn analyze_lemma_with_affixes(&self, lemma: &str) -> Vec<Analysis> {
        self.canonical.get(lemma).cloned().unwrap_or_default()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_count() {
        let analysis = Analysis::new(&["PV/e"], "atoskêw", &["V", "AI", "Ind"]);
        assert_eq!(analysis.tag_count(), 4);

        let bare = Analysis::new(&[], "apoy", &["N", "I", "Sg"]);
        assert_eq!(bare.tag_count(), 3);
    }

    #[test]
    fn test_parse_verb_analysis() {
        let analysis = Analysis::new(&[], "wâpamêw", &["V", "TA", "Ind"]);
        let info = parse_analysis(&analysis).unwrap();
        assert_eq!(info.pos, Pos::Verb);
        assert_eq!(info.word_class, "VTA");
    }

    #[test]
    fn test_parse_noun_analysis() {
        let analysis = Analysis::new(&[], "mitâs", &["N", "D", "A", "Sg"]);
        let info = parse_analysis(&analysis).unwrap();
        assert_eq!(info.pos, Pos::Noun);
        assert_eq!(info.word_class, "NDA");

        let inanimate = Analysis::new(&[], "apoy", &["N", "I", "Sg"]);
        assert_eq!(parse_analysis(&inanimate).unwrap().word_class, "NI");
    }

    #[test]
    fn test_parse_particle_analysis() {
        let particle = Analysis::new(&[], "mâka", &["Ipc"]);
        assert_eq!(parse_analysis(&particle).unwrap().word_class, "IPC");

        let interjection = Analysis::new(&[], "hâw", &["Ipc", "Interj"]);
        assert_eq!(parse_analysis(&interjection).unwrap().word_class, "IPJ");
    }

    #[test]
    fn test_plus_prefixed_tags_accepted() {
        let analysis = Analysis::new(&[], "apiw", &["+V", "+AI", "+Ind"]);
        assert_eq!(parse_analysis(&analysis).unwrap().word_class, "VAI");
    }

    #[test]
    fn test_unknown_pos_tag() {
        let analysis = Analysis::new(&[], "x", &["Num"]);
        assert!(parse_analysis(&analysis).is_none());

        let empty = Analysis::new(&[], "x", &[]);
        assert!(parse_analysis(&empty).is_none());
    }

    #[test]
    fn test_is_pos_match() {
        let vta = Analysis::new(&[], "wâpamêw", &["V", "TA", "Ind"]);
        assert!(is_pos_match("VTA-1", &vta).unwrap());
        assert!(!is_pos_match("VTI-1", &vta).unwrap());
        assert!(!is_pos_match("NA-1", &vta).unwrap());
    }

    #[test]
    fn test_table_analyzer_lookups() {
        let mut analyzer = TableAnalyzer::new();
        analyzer.insert_surface(
            "achahkos",
            vec![Analysis::new(&[], "acâhkos", &["N", "A", "Sg"])],
        );
        analyzer.insert_canonical(
            "acâhkos",
            vec![Analysis::new(&[], "acâhkos", &["N", "A", "Sg"])],
        );

        assert_eq!(analyzer.analyze("achahkos").len(), 1);
        assert_eq!(analyzer.analyze("unknown").len(), 0);
        assert_eq!(analyzer.analyze_lemma_with_affixes("acâhkos").len(), 1);
        assert_eq!(analyzer.analyze_lemma_with_affixes("achahkos").len(), 0);
    }
}

// Source Records - converter output schema
// Per-source converters (tabular/structured text parsers) are external
// collaborators; this is the minimal record shape they hand over, plus the
// fail-fast validation the engine runs before touching shared index state.

use crate::errors::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// WORDFORM
// ============================================================================

/// One orthographic form: a primary spelling plus optional secondary
/// spellings in other scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wordform {
    /// Primary spelling in the canonical orthography
    pub text: String,

    /// Spelling in the syllabic script, when the source records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllabic: Option<String>,

    /// Archival (proto) spelling, when the source records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
}

impl Wordform {
    pub fn new(text: &str) -> Self {
        Wordform {
            text: text.to_string(),
            syllabic: None,
            proto: None,
        }
    }
}

// ============================================================================
// CROSS-SOURCE MAPPING
// ============================================================================

/// How an upstream editor judged a mapped record to relate to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Broader meaning than the target: senses are worth keeping
    Broad,
    /// Narrower meaning than the target: senses are worth keeping
    Narrow,
    Conjugation,
    Dialect,
    Different,
    Equivalent,
    /// Orthographic error in the source
    #[serde(rename = "Err/Orth")]
    ErrOrth,
    Lemma,
    #[serde(rename = "PV")]
    Preverb,
    Same,
    Similar,
}

impl MatchType {
    /// Whether a record mapped with this type contributes its senses to the
    /// merged entry. Broad and narrow matches add meaning; the rest restate
    /// or misspell the target and would only produce near-duplicate senses.
    pub fn contributes_senses(&self) -> bool {
        matches!(self, MatchType::Broad | MatchType::Narrow)
    }
}

/// Explicit reference from a source record to another source's lemma,
/// recorded by the upstream converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossSourceMapping {
    /// Lemma of the target entry in the canonical orthography
    pub target_lemma: String,

    /// Category code of the target, when the mapping records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_category_hint: Option<String>,

    /// Editorial judgement of the mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
}

// ============================================================================
// SOURCE SENSE
// ============================================================================

/// One sense as delivered by a source converter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSense {
    /// Definition text, verbatim from the source
    pub definition: String,

    /// Literal (etymological) meaning note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_meaning: Option<String>,

    /// Scientific name note (species entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,

    /// Usage note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Cross-reference note ("see ...")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_reference: Option<String>,
}

impl SourceSense {
    pub fn new(definition: &str) -> Self {
        SourceSense {
            definition: definition.to_string(),
            ..SourceSense::default()
        }
    }
}

// ============================================================================
// SOURCE RECORD
// ============================================================================

/// One record from one source dictionary, as produced by its converter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Headword as printed in the source
    pub head: Wordform,

    /// Citation (base) form
    pub lemma: Wordform,

    /// Category code ("NA-1", "VTA", "IPC", ...)
    pub category: String,

    /// Senses listed by the source
    #[serde(default)]
    pub senses: Vec<SourceSense>,

    /// Explicit mapping to another source's lemma, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<CrossSourceMapping>,

    /// Stem supplied explicitly by the source's own analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem: Option<String>,

    /// Stems cited by the source
    #[serde(default)]
    pub stems: Vec<String>,

    /// Grammatical features cited by the source
    #[serde(default)]
    pub features: Vec<String>,

    /// Raw headwords this record cross-references
    #[serde(default)]
    pub cross_references: Vec<String>,

    /// Original raw line from the source file, for review reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

impl SourceRecord {
    /// Fails fast when a required field is absent. Guessing a default here
    /// could merge bad data into canonical entries shared with other
    /// sources, so a malformed record aborts the whole pass.
    pub fn validate(&self, source_tag: &str) -> MergeResult<()> {
        if self.head.text.trim().is_empty() {
            return Err(MergeError::MalformedRecord {
                source_tag: source_tag.to_string(),
                field: "head",
            });
        }
        if self.lemma.text.trim().is_empty() {
            return Err(MergeError::MalformedRecord {
                source_tag: source_tag.to_string(),
                field: "lemma",
            });
        }
        if self.category.trim().is_empty() {
            return Err(MergeError::MalformedRecord {
                source_tag: source_tag.to_string(),
                field: "category",
            });
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

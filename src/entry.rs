// Canonical Entry Model
// The unified database record for one lexeme, plus unique key assignment
// once all sources have settled.

use crate::analysis::Analysis;
use crate::category::parse_category;
use crate::errors::MergeResult;
use crate::index::{MultiValueIndex, Slot};
use crate::record::{SourceRecord, SourceSense, Wordform};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// SENSE
// ============================================================================

/// One consolidated sense with its contributing sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Definition wording, taken from the first source that introduced it
    pub definition: String,

    /// Contributing source tags, deduplicated, in first-contribution order
    #[serde(default)]
    pub sources: Vec<String>,

    /// Literal (etymological) meaning note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_meaning: Option<String>,

    /// Scientific name note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,

    /// Usage note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Cross-reference note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_reference: Option<String>,
}

impl Sense {
    pub fn new(definition: &str, source: &str) -> Self {
        Sense {
            definition: definition.to_string(),
            sources: vec![source.to_string()],
            ..Sense::default()
        }
    }

    /// Builds a sense from a converter sense, tagged with its source.
    pub fn from_source(sense: &SourceSense, source: &str) -> Self {
        Sense {
            definition: sense.definition.clone(),
            sources: vec![source.to_string()],
            literal_meaning: sense.literal_meaning.clone(),
            scientific_name: sense.scientific_name.clone(),
            usage: sense.usage.clone(),
            cross_reference: sense.cross_reference.clone(),
        }
    }

    /// Adds a contributing source, keeping the set deduplicated.
    pub fn add_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }
}

// ============================================================================
// LEXICAL RELATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    /// The owning entry is an inflected form of the target lemma entry
    FormOf,
    /// "See also" reference
    CrossReference,
    /// "Compare" reference
    Compare,
}

/// Link from the owning entry to another entry. Never self-targeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Unique key of the target entry
    pub key: String,

    /// Kind of relation
    pub kind: RelationKind,
}

// ============================================================================
// ENTRY
// ============================================================================

/// One canonical database entry, merged from all contributing sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Transient per-build identity, assigned by the index on insertion.
    /// Never persisted; used for touched-set tracking and self-loop checks.
    #[serde(skip)]
    pub uid: u64,

    /// Unique key, assigned once all sources have settled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Headword
    pub head: Wordform,

    /// Citation form
    pub lemma: Wordform,

    /// Category code
    pub category: String,

    /// Grammatical features
    #[serde(default)]
    pub features: Vec<String>,

    /// Consolidated senses (populated by the aggregation pass)
    #[serde(default)]
    pub senses: Vec<Sense>,

    /// Raw per-source contributions, keyed by source tag
    #[serde(default)]
    pub data_sources: IndexMap<String, SourceRecord>,

    /// Selected morphological analysis, when one could be chosen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,

    /// Resolved stem, when one could be chosen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem: Option<String>,

    /// Lexical relations to other entries
    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Paradigm classification, when the word class has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paradigm: Option<String>,
}

impl Entry {
    /// Creates a new entry seeded from a single source record.
    pub fn from_record(source_tag: &str, record: SourceRecord) -> Self {
        let mut entry = Entry {
            head: record.head.clone(),
            lemma: record.lemma.clone(),
            category: record.category.clone(),
            ..Entry::default()
        };
        entry.data_sources.insert(source_tag.to_string(), record);
        entry
    }

    /// Merges a later source record into this entry. Identity fields are
    /// only overwritten when the merging source is authoritative for them.
    pub fn merge_record(&mut self, source_tag: &str, record: SourceRecord, authoritative: bool) {
        if authoritative {
            self.head = record.head.clone();
            self.lemma = record.lemma.clone();
            self.category = record.category.clone();
        }
        self.data_sources.insert(source_tag.to_string(), record);
    }

    /// The sole contributing source, if there is exactly one.
    pub fn sole_source(&self) -> Option<&str> {
        if self.data_sources.len() == 1 {
            self.data_sources.keys().next().map(String::as_str)
        } else {
            None
        }
    }
}

// ============================================================================
// KEY ASSIGNMENT
// ============================================================================

/// Assigns a unique key to every entry once all sources have settled.
///
/// Entries alone under their index key take it as-is. Colliding entries get
/// a word-class disambiguator (`key@wordclass`); if the keys still collide,
/// a numeric homograph disambiguator (`key@1`, `key@2`, ...) instead.
pub fn assign_keys(index: &mut MultiValueIndex) -> MergeResult<()> {
    for (key, slot) in index.slots_mut() {
        match slot {
            Slot::Single(entry) => {
                entry.key = Some(key.clone());
            }
            Slot::Multiple(entries) => {
                for entry in entries.iter_mut() {
                    let word_class = parse_category(&entry.category)?.word_class;
                    entry.key = Some(format!("{}@{}", key, word_class.to_lowercase()));
                }

                let distinct: HashSet<&Option<String>> =
                    entries.iter().map(|e| &e.key).collect();

                if distinct.len() < entries.len() {
                    for (i, entry) in entries.iter_mut().enumerate() {
                        entry.key = Some(format!("{}@{}", key, i + 1));
                    }
                }
            }
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::head_key;

    fn create_test_record(head: &str, category: &str) -> SourceRecord {
        SourceRecord {
            head: Wordform::new(head),
            lemma: Wordform::new(head),
            category: category.to_string(),
            senses: vec![SourceSense::new("test definition")],
            ..SourceRecord::default()
        }
    }

    #[test]
    fn test_sense_source_deduplication() {
        let mut sense = Sense::new("paddle", "CW");
        sense.add_source("AE");
        sense.add_source("CW");
        sense.add_source("AE");
        assert_eq!(sense.sources, vec!["CW", "AE"]);
    }

    #[test]
    fn test_merge_record_authoritative() {
        let mut entry = Entry::from_record("MD", create_test_record("achahkos", "N"));
        entry.merge_record("CW", create_test_record("acâhkos", "NA-1"), true);

        assert_eq!(entry.head.text, "acâhkos");
        assert_eq!(entry.category, "NA-1");
        assert_eq!(entry.data_sources.len(), 2);
    }

    #[test]
    fn test_merge_record_non_authoritative() {
        let mut entry = Entry::from_record("CW", create_test_record("acâhkos", "NA-1"));
        entry.merge_record("MD", create_test_record("achahkos", "N"), false);

        // identity fields untouched, contribution recorded
        assert_eq!(entry.head.text, "acâhkos");
        assert_eq!(entry.category, "NA-1");
        assert!(entry.data_sources.contains_key("MD"));
    }

    #[test]
    fn test_sole_source() {
        let mut entry = Entry::from_record("CW", create_test_record("apoy", "NI-1"));
        assert_eq!(entry.sole_source(), Some("CW"));

        entry.merge_record("MD", create_test_record("apoy", "NI-1"), false);
        assert_eq!(entry.sole_source(), None);
    }

    #[test]
    fn test_assign_keys_single() {
        let entries = vec![Entry::from_record("CW", create_test_record("apoy", "NI-1"))];
        let mut index = MultiValueIndex::from_entries(entries, head_key);

        assign_keys(&mut index).unwrap();

        let entry = index.values().next().unwrap();
        assert_eq!(entry.key.as_deref(), Some("apoy"));
    }

    #[test]
    fn test_assign_keys_word_class_disambiguator() {
        let entries = vec![
            Entry::from_record("CW", create_test_record("pimiy", "NI-1")),
            Entry::from_record("CW", create_test_record("pimiy", "NA-1")),
        ];
        let mut index = MultiValueIndex::from_entries(entries, head_key);

        assign_keys(&mut index).unwrap();

        let keys: Vec<&str> = index.values().filter_map(|e| e.key.as_deref()).collect();
        assert_eq!(keys, vec!["pimiy@ni", "pimiy@na"]);
    }

    #[test]
    fn test_assign_keys_numeric_fallback() {
        // same word class: the word-class disambiguator cannot separate them
        let entries = vec![
            Entry::from_record("CW", create_test_record("nipiy", "NI-1")),
            Entry::from_record("CW", create_test_record("nipiy", "NI-2")),
        ];
        let mut index = MultiValueIndex::from_entries(entries, head_key);

        assign_keys(&mut index).unwrap();

        let keys: Vec<&str> = index.values().filter_map(|e| e.key.as_deref()).collect();
        assert_eq!(keys, vec!["nipiy@1", "nipiy@2"]);
    }
}

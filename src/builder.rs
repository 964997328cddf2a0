// 🏗️ Database Builder - the full merge pipeline
// Sources are imported one at a time in precedence order against a single
// in-memory index, then the settled entries are aggregated: unique keys,
// identity fields, paradigms, consolidated senses, selected analyses, and
// derived relations. Snapshot I/O stays outside; the pipeline is a pure
// transformation over in-memory structures.

use crate::aggregator::DefinitionAggregator;
use crate::analysis::MorphologicalAnalyzer;
use crate::category::parse_category;
use crate::config::BuildConfig;
use crate::entry::{Entry, Sense, assign_keys};
use crate::errors::MergeResult;
use crate::index::{MultiValueIndex, head_key, lemma_key};
use crate::matcher::{ImportReport, SourceMatcher};
use crate::record::SourceRecord;
use crate::relations::RelationDeriver;
use crate::selector::{AnalysisSelector, SelectionOutcome, UnresolvedAnalysis};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

// ============================================================================
// BUILD REPORT
// ============================================================================

/// Outcome of one full build: per-source import reports plus the
/// aggregation diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// One report per imported source, in pipeline order
    pub imports: Vec<ImportReport>,

    /// Entries in the final database
    pub entry_count: usize,

    /// Entries whose analysis selection ended in a surviving tie
    pub unresolved_analyses: Vec<UnresolvedAnalysis>,

    /// Form-of relations derived in this build
    pub relations_added: usize,

    /// When the build finished
    pub built_at: DateTime<Utc>,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        format!(
            "Build: {} sources imported, {} entries, {} relations, {} unresolved analyses",
            self.imports.len(),
            self.entry_count,
            self.relations_added,
            self.unresolved_analyses.len(),
        )
    }
}

// ============================================================================
// DATABASE BUILDER
// ============================================================================

/// Runs the whole pipeline over in-memory inputs.
pub struct DatabaseBuilder<'a> {
    config: &'a BuildConfig,
    analyzer: &'a dyn MorphologicalAnalyzer,
}

impl<'a> DatabaseBuilder<'a> {
    pub fn new(config: &'a BuildConfig, analyzer: &'a dyn MorphologicalAnalyzer) -> Self {
        DatabaseBuilder { config, analyzer }
    }

    /// Builds the canonical database: imports every source's records (in
    /// config order, parallel to `source_records`) into the existing
    /// entries, then runs the aggregation passes. Returns the final
    /// entries together with the build report.
    pub fn build(
        &self,
        existing: Vec<Entry>,
        source_records: Vec<Vec<SourceRecord>>,
    ) -> MergeResult<(Vec<Entry>, BuildReport)> {
        let precedence = self.config.precedence();

        // import passes: one sequential pass per source
        let mut index = MultiValueIndex::from_entries(existing, lemma_key);
        let matcher = SourceMatcher::new(self.analyzer);
        let mut imports = Vec::new();

        for (source, records) in self.config.sources.iter().zip(source_records) {
            let report = matcher.import_source(&mut index, records, source)?;
            imports.push(report);
        }

        // aggregation: identity fields, paradigms, consolidated senses
        let aggregator = DefinitionAggregator::with_threshold(self.config.similarity_threshold)
            .with_normalization(self.config.normalize_definitions);

        let mut entries = index.into_entries();
        for entry in &mut entries {
            self.aggregate_entry(entry, &precedence, &aggregator)?;
        }

        // keys are assigned over the settled headwords
        let mut index = MultiValueIndex::from_entries(entries, head_key);
        assign_keys(&mut index)?;

        // analysis selection and stem resolution
        let selector = AnalysisSelector::new(self.analyzer);
        let mut unresolved_analyses = Vec::new();

        for entry in index.values_mut() {
            let outcome = selector.select_for_entry(entry)?;
            entry.analysis = match outcome {
                SelectionOutcome::Selected(analysis) => Some(analysis),
                SelectionOutcome::NoCandidates => None,
                SelectionOutcome::Unresolved { candidates } => {
                    unresolved_analyses.push(UnresolvedAnalysis {
                        key: entry.key.clone(),
                        lemma: AnalysisSelector::expected_lemma(entry).to_string(),
                        candidate_count: candidates.len(),
                    });
                    None
                }
            };
            entry.stem = AnalysisSelector::resolve_stem(entry, &precedence);
        }

        // derived relations
        let relations_added = RelationDeriver::new().derive(&mut index);

        let entries = index.into_entries();
        let report = BuildReport {
            imports,
            entry_count: entries.len(),
            unresolved_analyses,
            relations_added,
            built_at: Utc::now(),
        };

        info!("{}", report.summary());
        Ok((entries, report))
    }

    /// Composes one entry from its per-source contributions: identity
    /// fields from the highest-precedence contributing source, paradigm
    /// classification, and the aggregated sense list.
    fn aggregate_entry(
        &self,
        entry: &mut Entry,
        precedence: &[String],
        aggregator: &DefinitionAggregator,
    ) -> MergeResult<()> {
        let identity = precedence
            .iter()
            .find_map(|tag| entry.data_sources.get(tag))
            .map(|record| {
                (
                    record.head.clone(),
                    record.lemma.clone(),
                    record.category.clone(),
                    record.features.clone(),
                )
            });

        if let Some((head, lemma, category, features)) = identity {
            entry.head = head;
            entry.lemma = lemma;
            entry.category = category;
            entry.features = features;
        }

        entry.paradigm = self.classify_paradigm(&entry.category, &entry.head.text)?;

        // collect sense contributions in precedence order; records mapped
        // with a non-sense-bearing match type restate the target and are
        // left out
        let mut contributions: Vec<Sense> = Vec::new();
        for tag in precedence {
            let Some(record) = entry.data_sources.get(tag) else {
                continue;
            };
            let contributes = record
                .mapping
                .as_ref()
                .and_then(|m| m.match_type)
                .map_or(true, |t| t.contributes_senses());
            if !contributes {
                continue;
            }
            for sense in &record.senses {
                contributions.push(Sense::from_source(sense, tag));
            }
        }

        entry.senses = aggregator.aggregate(&contributions, Some(precedence))?;
        Ok(())
    }

    /// Word classes with a full inflectional paradigm map to themselves;
    /// pronoun classes are classified by configured lemma lists.
    fn classify_paradigm(&self, category: &str, head: &str) -> MergeResult<Option<String>> {
        let info = parse_category(category)?;

        Ok(match info.word_class.as_str() {
            "NA" | "NDA" | "NDI" | "NI" | "VAI" | "VII" | "VTA" | "VTI" => Some(info.word_class),
            "PrA" | "PrI" => {
                if self.config.demonstrative_pronouns.iter().any(|p| p == head) {
                    Some("demonstrative-pronouns".to_string())
                } else if self.config.personal_pronouns.iter().any(|p| p == head) {
                    Some("personal-pronouns".to_string())
                } else {
                    None
                }
            }
            _ => None,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

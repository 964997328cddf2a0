// 🔗 Source Matcher - resolve records into canonical entries
// Resolution strategies run in strict priority order, stopping at the
// first lookup hit. Ambiguity is a first-class outcome: records the
// heuristics cannot place are collected for review, never guessed at.

use crate::analysis::MorphologicalAnalyzer;
use crate::category::parse_category;
use crate::config::SourceConfig;
use crate::entry::Entry;
use crate::errors::MergeResult;
use crate::index::{MultiValueIndex, Slot, normalize_key};
use crate::record::SourceRecord;
use crate::selector::AnalysisSelector;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// RESOLUTION STRATEGIES
// ============================================================================

/// A resolution strategy proposes a lookup key for a record, or nothing.
/// Strategies are independent and individually testable; the matcher runs
/// them in priority order.
type StrategyFn = fn(&SourceRecord, &dyn MorphologicalAnalyzer) -> Option<String>;

/// Strategy 1: the record carries an explicit reference to another
/// source's lemma, recorded by the upstream converter.
fn mapping_strategy(record: &SourceRecord, _analyzer: &dyn MorphologicalAnalyzer) -> Option<String> {
    record
        .mapping
        .as_ref()
        .map(|mapping| normalize_key(&mapping.target_lemma))
}

/// Strategy 2: the record's own lemma, normalized.
fn default_key_strategy(
    record: &SourceRecord,
    _analyzer: &dyn MorphologicalAnalyzer,
) -> Option<String> {
    Some(normalize_key(&record.lemma.text))
}

/// Strategy 3: spelling-relaxed analysis of the record's wordform; usable
/// only when the analyzer returns exactly one candidate.
fn analyzer_strategy(record: &SourceRecord, analyzer: &dyn MorphologicalAnalyzer) -> Option<String> {
    let candidates = analyzer.analyze(&record.head.text);
    if candidates.len() == 1 {
        Some(normalize_key(&candidates[0].lemma))
    } else {
        None
    }
}

const STRATEGIES: [(&str, StrategyFn); 3] = [
    ("mapping", mapping_strategy),
    ("default-key", default_key_strategy),
    ("analyzer", analyzer_strategy),
];

// ============================================================================
// IMPORT REPORT
// ============================================================================

/// Per-source import outcome: counts plus the diagnostic record lists.
/// None of these abort the pass; a full run always completes with a
/// best-effort merged result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Tag of the imported source
    pub source: String,

    /// Records received from the converter
    pub records_total: usize,

    /// Records merged into an existing entry
    pub entries_updated: usize,

    /// New entries created by post-pass promotion
    pub entries_added: usize,

    /// Stale sole-provenance entries removed by the sweep
    pub entries_removed: usize,

    /// Entries in the database before / after the pass
    pub db_size_before: usize,
    pub db_size_after: usize,

    /// Records that resolved to no entry
    pub unmatched: Vec<SourceRecord>,

    /// Records for which several candidates survived all disambiguation
    /// heuristics - a finer diagnostic signal than unmatched
    pub ambiguous: Vec<SourceRecord>,

    /// Unmatched records intentionally not promoted to new entries
    pub skipped: Vec<SourceRecord>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "Import {}: {} records, {} updated, {} added, {} removed, {} unmatched ({} skipped), {} ambiguous, database {} -> {}",
            self.source,
            self.records_total,
            self.entries_updated,
            self.entries_added,
            self.entries_removed,
            self.unmatched.len(),
            self.skipped.len(),
            self.ambiguous.len(),
            self.db_size_before,
            self.db_size_after,
        )
    }
}

// ============================================================================
// SOURCE MATCHER
// ============================================================================

/// Resolution outcome for one record.
enum Resolution {
    Matched(u64),
    Ambiguous,
    Unmatched,
}

/// Resolves and merges each incoming per-source record into a canonical
/// entry in the index.
pub struct SourceMatcher<'a> {
    analyzer: &'a dyn MorphologicalAnalyzer,
}

impl<'a> SourceMatcher<'a> {
    pub fn new(analyzer: &'a dyn MorphologicalAnalyzer) -> Self {
        SourceMatcher { analyzer }
    }

    /// Imports one source's records into the index: resolve and merge each
    /// record, promote the safely promotable unmatched ones, then sweep
    /// entries whose backing data vanished upstream.
    ///
    /// A malformed record aborts the pass immediately - continuing could
    /// silently merge bad data into entries shared with other sources.
    pub fn import_source(
        &self,
        index: &mut MultiValueIndex,
        records: Vec<SourceRecord>,
        source: &SourceConfig,
    ) -> MergeResult<ImportReport> {
        let mut report = ImportReport {
            source: source.tag.clone(),
            records_total: records.len(),
            db_size_before: index.entry_count(),
            ..ImportReport::default()
        };

        let mut touched: HashSet<u64> = HashSet::new();
        let mut unmatched: Vec<SourceRecord> = Vec::new();

        for record in records {
            record.validate(&source.tag)?;

            match self.resolve(index, &record)? {
                Resolution::Matched(uid) => match index.find_uid_mut(uid) {
                    Some(entry) => {
                        entry.merge_record(&source.tag, record, source.authoritative);
                        touched.insert(uid);
                        report.entries_updated += 1;
                    }
                    None => unmatched.push(record),
                },
                Resolution::Ambiguous => report.ambiguous.push(record),
                Resolution::Unmatched => unmatched.push(record),
            }
        }

        self.promote_unmatched(index, unmatched, source, &mut touched, &mut report);
        self.sweep_stale(index, &touched, source, &mut report);

        report.db_size_after = index.entry_count();
        info!("{}", report.summary());

        Ok(report)
    }

    /// Runs the strategy cascade. The first strategy whose key is present
    /// in the index settles the record's fate: a single entry matches
    /// outright, a bucket goes through disambiguation.
    fn resolve(&self, index: &MultiValueIndex, record: &SourceRecord) -> MergeResult<Resolution> {
        for (name, strategy) in STRATEGIES {
            let Some(key) = strategy(record, self.analyzer) else {
                continue;
            };

            match index.get(&key) {
                None => continue,
                Some(Slot::Single(entry)) => {
                    debug!("matched `{}` via {} strategy", record.lemma.text, name);
                    return Ok(Resolution::Matched(entry.uid));
                }
                Some(Slot::Multiple(candidates)) => {
                    return self.disambiguate(candidates, record);
                }
            }
        }

        Ok(Resolution::Unmatched)
    }

    /// Disambiguates a multi-entry bucket: coarse POS filter first, then
    /// compatibility with the record's most likely analysis. Anything short
    /// of exactly one survivor fails - zero as unmatched, several as
    /// ambiguous.
    fn disambiguate(&self, candidates: &[Entry], record: &SourceRecord) -> MergeResult<Resolution> {
        let hint = record
            .mapping
            .as_ref()
            .and_then(|m| m.target_category_hint.as_deref())
            .unwrap_or(record.category.as_str());
        let record_pos = parse_category(hint)?.pos;

        let mut coarse: Vec<&Entry> = Vec::new();
        for candidate in candidates {
            if parse_category(&candidate.category)?.pos == record_pos {
                coarse.push(candidate);
            }
        }

        if coarse.len() == 1 {
            return Ok(Resolution::Matched(coarse[0].uid));
        }
        if coarse.is_empty() {
            return Ok(Resolution::Unmatched);
        }

        // finer test: the record's most likely analysis must be compatible
        // with the candidate's category
        let selector = AnalysisSelector::new(self.analyzer);
        if let Some(best) = selector.most_likely(&record.category, &record.lemma.text)? {
            let mut finer: Vec<&Entry> = Vec::new();
            for candidate in coarse {
                if crate::analysis::is_pos_match(&candidate.category, &best)? {
                    finer.push(candidate);
                }
            }

            return Ok(match finer.len() {
                1 => Resolution::Matched(finer[0].uid),
                0 => Resolution::Unmatched,
                _ => Resolution::Ambiguous,
            });
        }

        Ok(Resolution::Ambiguous)
    }

    /// Post-pass promotion: unmatched records are grouped by raw key;
    /// one entry is created per group that has at least one sense-bearing
    /// candidate. The rest are intentionally skipped so noisy input does
    /// not flood the database with near-duplicate stub entries.
    fn promote_unmatched(
        &self,
        index: &mut MultiValueIndex,
        unmatched: Vec<SourceRecord>,
        source: &SourceConfig,
        touched: &mut HashSet<u64>,
        report: &mut ImportReport,
    ) {
        let mut groups: IndexMap<String, Vec<SourceRecord>> = IndexMap::new();
        for record in unmatched {
            groups
                .entry(normalize_key(&record.lemma.text))
                .or_default()
                .push(record);
        }

        for (key, mut group) in groups {
            report.unmatched.extend(group.iter().cloned());

            match group.iter().position(|r| !r.senses.is_empty()) {
                Some(position) => {
                    let promoted = group.remove(position);
                    let uid = index.add(Entry::from_record(&source.tag, promoted));
                    touched.insert(uid);
                    report.entries_added += 1;
                    report.skipped.extend(group);
                }
                None => {
                    debug!("skipping senseless unmatched group `{}`", key);
                    report.skipped.extend(group);
                }
            }
        }
    }

    /// Stale-entry sweep: entries populated solely by this source that
    /// received no match this pass lost their backing data upstream and
    /// are removed. Entries with contributions from other sources are
    /// never touched.
    fn sweep_stale(
        &self,
        index: &mut MultiValueIndex,
        touched: &HashSet<u64>,
        source: &SourceConfig,
        report: &mut ImportReport,
    ) {
        let stale: Vec<u64> = index
            .values()
            .filter(|entry| !touched.contains(&entry.uid))
            .filter(|entry| entry.sole_source() == Some(source.tag.as_str()))
            .map(|entry| entry.uid)
            .collect();

        for uid in stale {
            if index.remove_uid(uid) {
                report.entries_removed += 1;
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

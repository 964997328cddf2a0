// Relation Deriver - links between entries
// An entry whose selected analysis cites a different lemma is an inflected
// form of that lemma's entry; converter-recorded cross-references resolve
// the same way. Collection runs over an immutable view and relations are
// applied afterwards, so lookups never observe a half-updated index.

use crate::entry::{Entry, Relation, RelationKind};
use crate::index::{MultiValueIndex, Slot, normalize_key};
use log::debug;

/// Computes `formOf` and `crossReference` relations across the index.
pub struct RelationDeriver;

impl RelationDeriver {
    pub fn new() -> Self {
        RelationDeriver
    }

    /// Derives relations across the whole index. Returns how many were
    /// added.
    ///
    /// No relation is recorded when a lookup finds nothing, when several
    /// candidates survive category disambiguation, or when the only
    /// candidate is the entry itself.
    pub fn derive(&self, index: &mut MultiValueIndex) -> usize {
        // drop derived relations from a previous build
        for entry in index.values_mut() {
            entry
                .relations
                .retain(|r| !matches!(r.kind, RelationKind::FormOf | RelationKind::CrossReference));
        }

        let mut additions: Vec<(u64, Relation)> = Vec::new();

        for entry in index.values() {
            if let Some(analysis) = &entry.analysis {
                let lemma_key = normalize_key(&analysis.lemma);
                if entry.key.as_deref() != Some(lemma_key.as_str()) {
                    if let Some(target_key) = resolve_target(index, entry, &lemma_key) {
                        additions.push((
                            entry.uid,
                            Relation {
                                key: target_key,
                                kind: RelationKind::FormOf,
                            },
                        ));
                    }
                }
            }

            for record in entry.data_sources.values() {
                for reference in &record.cross_references {
                    let reference_key = normalize_key(reference);
                    if entry.key.as_deref() == Some(reference_key.as_str()) {
                        continue;
                    }
                    let Some(target_key) = resolve_target(index, entry, &reference_key) else {
                        continue;
                    };
                    let relation = Relation {
                        key: target_key,
                        kind: RelationKind::CrossReference,
                    };
                    if !additions.contains(&(entry.uid, relation.clone())) {
                        additions.push((entry.uid, relation));
                    }
                }
            }
        }

        let count = additions.len();
        for (uid, relation) in additions {
            if let Some(entry) = index.find_uid_mut(uid) {
                entry.relations.push(relation);
            }
        }

        debug!("derived {} relations", count);
        count
    }
}

/// Resolves a lookup key to the unique key of a single other entry.
/// Buckets are disambiguated by category equality with the current entry.
fn resolve_target(index: &MultiValueIndex, entry: &Entry, lookup_key: &str) -> Option<String> {
    let target = match index.get(lookup_key)? {
        Slot::Single(target) => target,
        Slot::Multiple(candidates) => {
            let mut matching = candidates.iter().filter(|c| c.category == entry.category);
            match (matching.next(), matching.next()) {
                (Some(target), None) => target,
                _ => return None,
            }
        }
    };

    if target.uid == entry.uid {
        return None;
    }

    target.key.clone()
}

impl Default for RelationDeriver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

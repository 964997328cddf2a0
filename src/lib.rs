// Lexfuse - Cross-Source Entry Resolution & Aggregation Engine
// Merges several independently compiled dictionaries of one language into
// a single canonical lexical database. Exposes all modules for use in the
// CLI and tests.

pub mod errors;     // MergeError taxonomy
pub mod normalize;  // definition normalization helpers
pub mod category;   // category-code parsing ({pos, wordClass})
pub mod analysis;   // analyses + morphological analyzer seam
pub mod record;     // per-source converter record schema
pub mod entry;      // canonical Entry model + key assignment
pub mod index;      // MultiValueIndex with explicit collision buckets
pub mod aggregator; // similarity-based definition aggregation
pub mod selector;   // best-analysis selection heuristic
pub mod matcher;    // cascading entry matching + merge
pub mod relations;  // derived form-of relations
pub mod config;     // build configuration as data
pub mod snapshot;   // NDJSON snapshot store
pub mod builder;    // full pipeline orchestration

// Re-export commonly used types
pub use aggregator::{DEFAULT_THRESHOLD, DefinitionAggregator, similarity};
pub use analysis::{Analysis, MorphologicalAnalyzer, TableAnalyzer, is_pos_match, parse_analysis};
pub use builder::{BuildReport, DatabaseBuilder};
pub use category::{CategoryInfo, Pos, parse_category};
pub use config::{BuildConfig, SourceConfig};
pub use entry::{Entry, Relation, RelationKind, Sense, assign_keys};
pub use errors::{MergeError, MergeResult};
pub use index::{MultiValueIndex, Slot, head_key, lemma_key, normalize_key};
pub use matcher::{ImportReport, SourceMatcher};
pub use normalize::{normalize_definition, remove_parentheticals};
pub use record::{CrossSourceMapping, MatchType, SourceRecord, SourceSense, Wordform};
pub use relations::RelationDeriver;
pub use selector::{AnalysisSelector, SelectionOutcome, UnresolvedAnalysis};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Error Taxonomy - fatal conditions only
// Non-fatal outcomes (unmatched, ambiguous, unresolved analyses) are
// diagnostics carried on reports, not errors.

use thiserror::Error;

/// Errors that abort an import or aggregation pass.
///
/// Anything that would require guessing to continue is fatal: guessing
/// risks merging bad data into canonical entries that are expensive to
/// unwind. Everything recoverable is collected on the pass reports instead.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A required field is absent from an upstream record.
    #[error("malformed record from source {source_tag}: missing required field `{field}`")]
    MalformedRecord {
        /// Tag of the source being imported
        source_tag: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// A category code outside the documented vocabulary.
    /// This is a configuration error, not a runtime condition.
    #[error("unknown category code: `{0}`")]
    UnknownCategory(String),

    /// A sense carries a source tag that is not in the precedence list.
    #[error("unrecognized source: {source_tag} in \"{definition}\"")]
    UnknownSource {
        /// The unrecognized source tag
        source_tag: String,
        /// Definition text of the offending sense
        definition: String,
    },
}

/// Standard result alias for the merge engine.
pub type MergeResult<T> = Result<T, MergeError>;

// Category Parser - part-of-speech codes
// Splits a dictionary category code ("NA-1", "VTA-2", "IPC", "PrA") into
// its coarse part of speech, word class, and inflectional category.

use crate::errors::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// PART OF SPEECH
// ============================================================================

/// Coarse part of speech. The leading letters of a category code determine
/// the part of speech; the full word class refines it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pos {
    Noun,
    Verb,
    Pronoun,
    Particle,
}

impl Pos {
    /// Conventional abbreviation used in category codes and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pos::Noun => "N",
            Pos::Verb => "V",
            Pos::Pronoun => "Pro",
            Pos::Particle => "Part",
        }
    }
}

// ============================================================================
// CATEGORY INFO
// ============================================================================

/// Parsed form of a category code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Coarse part of speech
    pub pos: Pos,

    /// Word class: the category code up to the inflectional suffix
    /// ("NA-1" -> "NA", "VTA" -> "VTA")
    pub word_class: String,

    /// The full code, inflectional class included ("NA-1")
    pub inflectional_category: String,
}

/// Parses a category code into {pos, wordClass, inflectionalCategory}.
///
/// The parser is total over the documented code vocabulary: codes led by
/// `N` (nouns), `V` (verbs), `Pr` (pronouns), or `I` (particles). Any other
/// code is a configuration error upstream, not something to recover from.
pub fn parse_category(code: &str) -> MergeResult<CategoryInfo> {
    let trimmed = code.trim();

    if trimmed.is_empty() {
        return Err(MergeError::UnknownCategory(code.to_string()));
    }

    let word_class = trimmed.split('-').next().unwrap_or(trimmed);

    let pos = if word_class.starts_with("Pr") {
        Pos::Pronoun
    } else if word_class.starts_with('N') {
        Pos::Noun
    } else if word_class.starts_with('V') {
        Pos::Verb
    } else if word_class.starts_with('I') {
        Pos::Particle
    } else {
        return Err(MergeError::UnknownCategory(code.to_string()));
    };

    Ok(CategoryInfo {
        pos,
        word_class: word_class.to_string(),
        inflectional_category: trimmed.to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noun_classes() {
        let info = parse_category("NA-1").unwrap();
        assert_eq!(info.pos, Pos::Noun);
        assert_eq!(info.word_class, "NA");
        assert_eq!(info.inflectional_category, "NA-1");

        let info = parse_category("NDI-2").unwrap();
        assert_eq!(info.pos, Pos::Noun);
        assert_eq!(info.word_class, "NDI");
    }

    #[test]
    fn test_verb_classes() {
        let info = parse_category("VTA-2").unwrap();
        assert_eq!(info.pos, Pos::Verb);
        assert_eq!(info.word_class, "VTA");

        let info = parse_category("VAI").unwrap();
        assert_eq!(info.word_class, "VAI");
        assert_eq!(info.inflectional_category, "VAI");
    }

    #[test]
    fn test_pronouns_before_nouns() {
        // "Pr" codes must not be mistaken for plain particles or nouns
        let info = parse_category("PrA").unwrap();
        assert_eq!(info.pos, Pos::Pronoun);
        assert_eq!(info.word_class, "PrA");
    }

    #[test]
    fn test_particles() {
        let info = parse_category("IPC").unwrap();
        assert_eq!(info.pos, Pos::Particle);
        assert_eq!(info.word_class, "IPC");

        let info = parse_category("IPJ").unwrap();
        assert_eq!(info.pos, Pos::Particle);
    }

    #[test]
    fn test_bare_pos_codes() {
        assert_eq!(parse_category("N").unwrap().pos, Pos::Noun);
        assert_eq!(parse_category("V").unwrap().pos, Pos::Verb);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        assert!(matches!(
            parse_category("XYZ"),
            Err(MergeError::UnknownCategory(_))
        ));
        assert!(matches!(
            parse_category(""),
            Err(MergeError::UnknownCategory(_))
        ));
    }
}

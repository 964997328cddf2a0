// Definition Normalization
// Reduces English definition wording to a comparable core so that
// "A sock" and "Sock." count as the same definition during aggregation.

/// Parentheticals whose text starts with "by " are instrumental phrases
/// ("by hand", "by boat") and are kept in the core definition.
const INSTRUMENTAL_PREFIX: &str = "by ";

/// Pronoun parentheticals that stay in the core definition.
const PRONOUN_PARENTHETICALS: [&str; 15] = [
    "his/her own",
    "him/herself",
    "it as",
    "it/him",
    "it",
    "of it",
    "of something",
    "on s.t.",
    "s.o. as",
    "s.t.",
    "something",
    "that",
    "them",
    "to it/him",
    "to something",
];

/// Pronoun spellings unified before tokenization. Applied in order.
const PRONOUN_REWRITES: [(&str, &str); 9] = [
    ("her/him", "him"),
    ("him/herself", "himself"),
    ("him/her", "him"),
    ("his/her", "his"),
    ("it/him", "him"),
    ("s.o.", "him"),
    ("s.t.", "something"),
    ("s.w.", "somewhere"),
    ("s/he", "he"),
];

/// Removes parentheticals from a definition, except instrumental "by"
/// phrases and pronoun parentheticals.
///
/// Only parentheses preceded by whitespace count. This prevents matches
/// on things like "house(s)".
pub fn remove_parentheticals(definition: &str) -> String {
    let chars: Vec<char> = definition.chars().collect();
    let mut out = String::with_capacity(definition.len());
    let mut i = 0;

    while i < chars.len() {
        let opens_parenthetical =
            chars[i] == '(' && out.chars().next_back().is_some_and(char::is_whitespace);

        if opens_parenthetical {
            if let Some(offset) = chars[i + 1..].iter().position(|&c| c == ')') {
                let close = i + 1 + offset;
                let inner: String = chars[i + 1..close].iter().collect();
                let inner = inner.trim();

                if inner.starts_with(INSTRUMENTAL_PREFIX)
                    || PRONOUN_PARENTHETICALS.contains(&inner)
                {
                    // allowed parenthetical: copy it through verbatim
                    for &c in &chars[i..=close] {
                        out.push(c);
                    }
                } else {
                    // drop the parenthetical along with surrounding whitespace
                    while out.ends_with(char::is_whitespace) {
                        out.pop();
                    }
                    out.push(' ');
                    let mut j = close + 1;
                    while j < chars.len() && chars[j].is_whitespace() {
                        j += 1;
                    }
                    i = j;
                    continue;
                }

                i = close + 1;
                continue;
            }
        }

        out.push(chars[i]);
        i += 1;
    }

    collapse_whitespace(&out).replace(" ,", ",")
}

/// Normalizes a definition for similarity comparison: lowercases, strips
/// disallowed parentheticals, unifies pronoun spellings, removes articles
/// and punctuation, and collapses whitespace.
pub fn normalize_definition(definition: &str) -> String {
    let mut core = remove_parentheticals(&definition.to_lowercase());

    for (from, to) in PRONOUN_REWRITES {
        core = core.replace(from, to);
    }

    core.retain(|c| !matches!(c, '.' | ',' | '?' | '!' | '"' | '\'' | '(' | ')'));

    core.split_whitespace()
        .filter(|word| !matches!(*word, "a" | "an"))
        .map(|word| if word == "them" { "him" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// TESTS
// ============================================================================

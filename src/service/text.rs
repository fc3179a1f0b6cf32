use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase + NFKD accent folding ("Garantía" -> "garantia").
pub fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Word tokens: folded, split on any run of non-alphanumeric characters.
pub fn tokenize(text: &str) -> HashSet<String> {
    fold(text)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_and_case() {
        assert_eq!(fold("Garantía"), "garantia");
        assert_eq!(fold("Ñandú"), "nandu");
        assert_eq!(fold("PLAZO"), "plazo");
    }

    #[test]
    fn tokenizes_on_non_alphanumeric_runs() {
        let tokens = tokenize("Caja de guantes (nitrilo), talla M-8");
        for t in ["caja", "de", "guantes", "nitrilo", "talla", "m", "8"] {
            assert!(tokens.contains(t), "missing token {t}");
        }
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn empty_and_symbol_only_input_yield_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("-- // ??").is_empty());
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(tokenize("Pernos 1/2\""), tokenize("Pernos 1/2\""));
    }
}

//! Per-run session state and name normalisation.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use unicode_normalization::UnicodeNormalization;

use crate::destination::Destination;

/// Which backup strategy the user picked from the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Encrypted, versioned repository via the backup engine.
    Secure,
    /// Plain incremental mirror via the sync tool.
    Simple,
}

impl ActionKind {
    /// Map the action-menu answer (`1` / `2`) to a kind.
    pub fn from_menu(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(Self::Secure),
            "2" => Some(Self::Simple),
            _ => None,
        }
    }
}

/// Everything the orchestrator learns about one run.  Never persisted; the
/// password in particular lives only here and in the final summary.
#[derive(Debug)]
pub struct Session {
    pub action: ActionKind,
    pub source: PathBuf,
    pub normalized: String,
    pub destinations: Vec<Destination>,
    pub password: Option<String>,
    pub started: Instant,
    pub log_path: PathBuf,
}

/// Turn a folder name into a safe directory leaf.
///
/// Unicode is decomposed and folded to ASCII, punctuation other than `_`/`-`
/// is dropped, the result is trimmed and lowercased, and every run of
/// whitespace, `_` or `-` becomes a single `_`.
///
/// `"My Projects!!"` → `"my_projects"`, `"Café Notes"` → `"cafe_notes"`.
pub fn normalize_name(name: &str) -> String {
    let kept: String = name
        .nfkd()
        .filter(char::is_ascii)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(kept.len());
    let mut in_separator = false;
    for c in kept.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !in_separator {
                out.push('_');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

/// Normalised leaf name of `path`'s final component.
pub fn normalized_leaf(path: &Path) -> String {
    path.file_name()
        .map(|n| normalize_name(&n.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_joins_words() {
        assert_eq!(normalize_name("My Projects!!"), "my_projects");
    }

    #[test]
    fn folds_accents_to_ascii() {
        assert_eq!(normalize_name("Café Notes"), "cafe_notes");
        assert_eq!(normalize_name("Ñandú"), "nandu");
    }

    #[test]
    fn collapses_mixed_separator_runs() {
        assert_eq!(normalize_name("a - _ b"), "a_b");
        assert_eq!(normalize_name("photos--2024__raw"), "photos_2024_raw");
    }

    #[test]
    fn trims_outer_whitespace() {
        assert_eq!(normalize_name("   Docs   "), "docs");
    }

    #[test]
    fn drops_non_ascii_without_decomposition() {
        assert_eq!(normalize_name("日本 Docs"), "docs");
    }

    #[test]
    fn is_idempotent() {
        for input in ["My Docs", "Café--Notes!!", "_hidden", "x", "", "a  b  c", "-dash"] {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn output_is_lowercase_word_characters() {
        for input in ["Hello, World!", "ÀÉÎ õü", "tabs\tand\nnewlines", "Q3 Report (final)"] {
            let out = normalize_name(input);
            assert!(
                out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "{input:?} → {out:?}"
            );
        }
    }

    #[test]
    fn leaf_uses_last_component() {
        assert_eq!(normalized_leaf(Path::new("/home/alice/My Docs")), "my_docs");
    }

    #[test]
    fn menu_choices_map_to_actions() {
        assert_eq!(ActionKind::from_menu("1"), Some(ActionKind::Secure));
        assert_eq!(ActionKind::from_menu("2"), Some(ActionKind::Simple));
        assert_eq!(ActionKind::from_menu("3"), None);
        assert_eq!(ActionKind::from_menu(""), None);
    }
}

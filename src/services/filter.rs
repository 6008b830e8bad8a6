// src/services/filter.rs

//! Allow-list scope check.

use crate::models::AllowListConfig;

/// Case-insensitive substring allow-list over institution names.
///
/// Matching is deliberately loose: no tokenization, so punctuation and extra
/// words in upstream names do not cause misses.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    fragments: Vec<String>,
}

impl AllowList {
    /// Build from raw fragments. Blank fragments are dropped since they
    /// would match every name.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments = fragments
            .into_iter()
            .map(|f| f.as_ref().to_lowercase())
            .filter(|f| !f.trim().is_empty())
            .collect();
        Self { fragments }
    }

    pub fn from_config(config: &AllowListConfig) -> Self {
        Self::new(&config.fragments)
    }

    pub fn is_in_scope(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.fragments.iter().any(|f| name.contains(f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_substring() {
        let list = AllowList::new(["bristol public"]);
        assert!(list.is_in_scope("Bristol Public Schools"));
        assert!(list.is_in_scope("BRISTOL PUBLIC"));
        assert!(!list.is_in_scope("Bristol Eastern High"));
    }

    #[test]
    fn test_fragment_case_is_ignored() {
        let list = AllowList::new(["EdAdvance"]);
        assert!(list.is_in_scope("edadvance - all programs"));
    }

    #[test]
    fn test_blank_fragments_match_nothing() {
        let list = AllowList::new(["", "   "]);
        assert!(list.is_empty());
        assert!(!list.is_in_scope("Anything"));
    }

    #[test]
    fn test_default_list_scope() {
        let list = AllowList::from_config(&AllowListConfig::default());
        assert!(list.is_in_scope("Naugatuck Public Schools"));
        assert!(list.is_in_scope("Bridges of ACES"));
        assert!(!list.is_in_scope("Hartford Public Schools"));
    }
}

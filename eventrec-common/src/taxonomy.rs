//! Category / sub-category registry
//!
//! Seeded with the college's default taxonomy and extended at runtime. Entries
//! are only ever added. Every category maps to a non-empty list that always
//! contains the catch-all [`CATCH_ALL`] entry.
//!
//! The registry is an owned value: each server (or test) constructs its own and
//! shares it explicitly. Nothing here is process-global.

use serde::Serialize;

/// Catch-all sub-category present under every category
pub const CATCH_ALL: &str = "Other";

/// Default seed: (category, sub-categories). Every list ends with the catch-all.
const DEFAULT_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Technical",
        &[
            "Hackathon",
            "Workshop",
            "Coding Competition",
            "Project Exhibition",
            "Technical Quiz",
            "Paper Presentation",
            CATCH_ALL,
        ],
    ),
    (
        "Cultural",
        &[
            "Dance",
            "Music",
            "Drama",
            "Fashion Show",
            "Art Exhibition",
            "Photography",
            CATCH_ALL,
        ],
    ),
    (
        "Sports",
        &[
            "Cricket",
            "Football",
            "Basketball",
            "Volleyball",
            "Athletics",
            "Chess",
            CATCH_ALL,
        ],
    ),
    (CATCH_ALL, &[CATCH_ALL]),
];

/// One category and its sub-categories, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub subcategories: Vec<String>,
}

/// Insertion-ordered category registry
///
/// A `Vec` keeps insertion order; the registry is small (tens of entries) so
/// linear lookups are fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyRegistry {
    entries: Vec<CategoryEntry>,
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TaxonomyRegistry {
    /// Registry seeded with the default categories
    pub fn with_defaults() -> Self {
        let entries = DEFAULT_TAXONOMY
            .iter()
            .map(|(name, subs)| CategoryEntry {
                name: name.to_string(),
                subcategories: subs.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { entries }
    }

    /// Registry with no categories at all
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Category names, default set first, then additions in the order made
    pub fn list_categories(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Sub-categories of `category`, or empty when the category is unknown
    pub fn subcategories_of(&self, category: &str) -> Vec<String> {
        self.find(category)
            .map(|e| e.subcategories.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.find(category).is_some()
    }

    /// Add a category seeded with the catch-all entry
    ///
    /// Exact, case-sensitive match; returns `false` (no-op) when already present.
    pub fn add_category(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(CategoryEntry {
            name: name.to_string(),
            subcategories: vec![CATCH_ALL.to_string()],
        });
        true
    }

    /// Append a sub-category under an existing category
    ///
    /// No-op (returns `false`) when the category is unknown or the name is
    /// already listed under it.
    pub fn add_subcategory(&mut self, category: &str, name: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.name == category) {
            Some(entry) if !entry.subcategories.iter().any(|s| s == name) => {
                entry.subcategories.push(name.to_string());
                true
            }
            _ => false,
        }
    }

    /// Full listing for serialization
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    fn find(&self, category: &str) -> Option<&CategoryEntry> {
        self.entries.iter().find(|e| e.name == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_seeded_in_order() {
        let registry = TaxonomyRegistry::with_defaults();
        assert_eq!(
            registry.list_categories(),
            vec!["Technical", "Cultural", "Sports", "Other"]
        );
        let sports = registry.subcategories_of("Sports");
        assert_eq!(sports.first().map(String::as_str), Some("Cricket"));
        assert_eq!(sports.last().map(String::as_str), Some(CATCH_ALL));
    }

    #[test]
    fn test_every_category_has_catch_all() {
        let mut registry = TaxonomyRegistry::with_defaults();
        registry.add_category("Tech");
        for entry in registry.entries() {
            assert!(!entry.subcategories.is_empty(), "{} is empty", entry.name);
            assert!(entry.subcategories.iter().any(|s| s == CATCH_ALL));
        }
    }

    #[test]
    fn test_add_category_twice_is_noop() {
        let mut registry = TaxonomyRegistry::with_defaults();
        assert!(registry.add_category("Tech"));
        assert!(!registry.add_category("Tech"));

        let count = registry
            .list_categories()
            .iter()
            .filter(|c| c.as_str() == "Tech")
            .count();
        assert_eq!(count, 1);
        assert_eq!(registry.subcategories_of("Tech"), vec!["Other"]);
    }

    #[test]
    fn test_add_category_is_case_sensitive() {
        let mut registry = TaxonomyRegistry::with_defaults();
        assert!(registry.add_category("technical"));
        assert!(registry.contains("Technical"));
        assert!(registry.contains("technical"));
        assert_eq!(registry.list_categories().last().map(String::as_str), Some("technical"));
    }

    #[test]
    fn test_add_subcategory() {
        let mut registry = TaxonomyRegistry::with_defaults();
        assert!(registry.add_subcategory("Cultural", "Stand-up"));
        assert!(!registry.add_subcategory("Cultural", "Stand-up"));
        assert!(!registry.add_subcategory("Nonexistent", "Anything"));

        let cultural = registry.subcategories_of("Cultural");
        assert_eq!(cultural.last().map(String::as_str), Some("Stand-up"));
        assert!(registry.subcategories_of("Nonexistent").is_empty());
    }

    #[test]
    fn test_instances_are_isolated() {
        let mut a = TaxonomyRegistry::with_defaults();
        let b = TaxonomyRegistry::with_defaults();
        a.add_category("Seminar");
        assert!(a.contains("Seminar"));
        assert!(!b.contains("Seminar"));
        assert!(TaxonomyRegistry::empty().list_categories().is_empty());
    }
}

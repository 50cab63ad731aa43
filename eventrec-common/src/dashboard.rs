//! Dashboard summary: total events plus a per-category count

use serde::Serialize;

use crate::model::Event;
use crate::taxonomy::{TaxonomyRegistry, CATCH_ALL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub categories: Vec<CategoryCount>,
}

/// Count events per category
///
/// Categories are registry categories first, then any category only seen on
/// events, each listed once. The catch-all and blank categories get no card of
/// their own (their events still count toward `total`).
pub fn summarize(events: &[Event], taxonomy: &TaxonomyRegistry) -> DashboardSummary {
    let mut names: Vec<String> = Vec::new();
    let candidates = taxonomy
        .list_categories()
        .into_iter()
        .chain(events.iter().map(|e| e.category.clone()));

    for name in candidates {
        if name.is_empty() || name == CATCH_ALL || names.contains(&name) {
            continue;
        }
        names.push(name);
    }

    let categories = names
        .into_iter()
        .map(|category| {
            let count = events.iter().filter(|e| e.category == category).count();
            CategoryCount { category, count }
        })
        .collect();

    DashboardSummary {
        total: events.len(),
        categories,
    }
}

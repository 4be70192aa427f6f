//! Search across every category.
//!
//! Selection is case-insensitive: format 0 notes match on their text, titled
//! entries on title or body. Highlighting is case-sensitive. Each body line
//! holding a case-sensitive occurrence becomes one hit; an entry selected only
//! case-insensitively yields its first line, unhighlighted.

use crate::commands::{CmdMessage, CmdResult, TagHits};
use crate::error::{PensiveError, Result};
use crate::highlight::{highlight_pattern, Highlighted};
use crate::model::{Catalog, Entry};
use crate::store::DataStore;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub category: String,
    /// Titled formats only; highlighted where the pattern occurs.
    pub title: Option<Highlighted>,
    pub line: Highlighted,
}

fn selects(entry: &Entry, needle: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(needle);
    hit(entry.body()) || entry.title().is_some_and(hit)
}

fn hits_for(category: &str, entry: &Entry, pattern: &str) -> Vec<SearchHit> {
    let title = entry.title().map(|t| highlight_pattern(t, pattern));
    let mut hits: Vec<SearchHit> = entry
        .body()
        .split('\n')
        .filter(|line| line.contains(pattern))
        .map(|line| SearchHit {
            category: category.to_string(),
            title: title.clone(),
            line: highlight_pattern(line, pattern),
        })
        .collect();
    if hits.is_empty() {
        let first = entry.body().split('\n').next().unwrap_or_default();
        hits.push(SearchHit {
            category: category.to_string(),
            title,
            line: Highlighted::plain(first),
        });
    }
    hits
}

/// Searches all categories for `pattern`, grouping hits by tag.
pub fn run<S: DataStore>(store: &S, catalog: &Catalog, pattern: &str) -> Result<CmdResult> {
    if pattern.is_empty() {
        return Err(PensiveError::Api("Search pattern must not be empty".into()));
    }
    let needle = pattern.to_lowercase();
    let mut by_tag: BTreeMap<String, Vec<SearchHit>> = BTreeMap::new();

    for category in &catalog.categories {
        for entry in store.all_entries(category.id)? {
            if selects(&entry, &needle) {
                by_tag
                    .entry(entry.tag().to_string())
                    .or_default()
                    .extend(hits_for(&category.name, &entry, pattern));
            }
        }
    }
    debug!(pattern, tags = by_tag.len(), "search done");

    let hits: Vec<TagHits> = by_tag
        .into_iter()
        .map(|(tag, hits)| TagHits { tag, hits })
        .collect();
    let mut result = CmdResult::default();
    if hits.is_empty() {
        result.add_message(CmdMessage::info(format!("No entries match '{}'", pattern)));
    }
    Ok(result.with_hits(hits))
}

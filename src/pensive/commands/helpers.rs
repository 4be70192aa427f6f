use crate::error::{PensiveError, Result};
use crate::highlight::{highlight_tags, Highlighted};
use crate::model::{Catalog, Category, Entry};
use crate::store::DataStore;
use std::collections::BTreeSet;

/// Reads the registry and tag set into a fresh catalog.
pub fn load_catalog<S: DataStore>(store: &S) -> Result<Catalog> {
    Ok(Catalog {
        categories: store.list_categories()?,
        tags: store.list_tags()?,
    })
}

/// The entry at display index `index` among a tag's entries in `category`.
pub fn entry_at<S: DataStore>(
    store: &S,
    category: &Category,
    tag: &str,
    index: usize,
) -> Result<Entry> {
    let mut entries = store.entries(category.id, tag)?;
    let count = entries.len();
    if index >= count {
        return Err(PensiveError::IndexOutOfRange { index, count });
    }
    Ok(entries.swap_remove(index))
}

pub fn require_tag(catalog: &Catalog, tag: &str) -> Result<()> {
    if catalog.has_tag(tag) {
        Ok(())
    } else {
        Err(PensiveError::TagNotFound(tag.to_string()))
    }
}

pub fn require_indexed(category: &Category) -> Result<()> {
    if category.format.is_indexed() {
        Ok(())
    } else {
        Err(PensiveError::Api(format!(
            "Category '{}' holds a single note per tag, entries have no index",
            category.name
        )))
    }
}

/// Lines of a stored text, tag-highlighted when asked to.
pub fn text_lines(text: &str, tags: &BTreeSet<String>, highlight: bool) -> Vec<Highlighted> {
    text.split('\n')
        .map(|line| {
            if highlight {
                highlight_tags(line, tags)
            } else {
                Highlighted::plain(line)
            }
        })
        .collect()
}

pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

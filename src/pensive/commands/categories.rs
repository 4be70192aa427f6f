//! Category registry commands.
//!
//! - `list`: All categories in ordinal order
//! - `add`: Append a category bound to a format
//! - `remove`: Drop a category with its entries (renumbers the rest)
//! - `rename`: Change a category's name, keeping its ordinal

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PensiveError, Result};
use crate::model::{Catalog, Format};
use crate::store::DataStore;

pub fn list<S: DataStore>(store: &S) -> Result<CmdResult> {
    let categories = store.list_categories()?;
    let mut result = CmdResult::default();
    if categories.is_empty() {
        result.add_message(CmdMessage::info(
            "No categories defined, add one with 'category add NAME FORMAT'",
        ));
    }
    Ok(result.with_categories(categories))
}

pub fn add<S: DataStore>(store: &mut S, name: &str, format: Format) -> Result<CmdResult> {
    let name = validate_name(name)?;
    let category = store.insert_category(name, format)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added category '{}' with format {}",
        category.name, category.format
    )));
    Ok(result)
}

pub fn remove<S: DataStore>(store: &mut S, catalog: &Catalog, name: &str) -> Result<CmdResult> {
    let category = catalog
        .category(name)
        .ok_or_else(|| PensiveError::CategoryNotFound(name.to_string()))?;
    let dropped = store.delete_category(category.id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Removed category '{}'", name)));
    if dropped > 0 {
        result.add_message(CmdMessage::info(format!(
            "Dropped {} entr{}",
            dropped,
            if dropped == 1 { "y" } else { "ies" }
        )));
    }
    Ok(result)
}

pub fn rename<S: DataStore>(
    store: &mut S,
    catalog: &Catalog,
    old: &str,
    new: &str,
) -> Result<CmdResult> {
    let new = validate_name(new)?;
    let category = catalog
        .category(old)
        .ok_or_else(|| PensiveError::CategoryNotFound(old.to_string()))?;
    if catalog.category(new).is_some() {
        return Err(PensiveError::NameConflict(new.to_string()));
    }
    store.rename_category(category.id, new)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed category '{}' to '{}'",
        old, new
    )));
    Ok(result)
}

/// Category names are single-line and carry no surrounding whitespace.
fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() || name.trim() != name || name.contains(['\n', '\r']) {
        return Err(PensiveError::InvalidName(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Format};
    use crate::store::memory::InMemoryStore;
    use proptest::prelude::*;

    fn catalog<S: DataStore>(store: &S) -> Catalog {
        Catalog {
            categories: store.list_categories().unwrap(),
            tags: store.list_tags().unwrap(),
        }
    }

    #[test]
    fn add_appends_with_next_ordinal() {
        let mut store = InMemoryStore::new();
        add(&mut store, "commands", Format::Note).unwrap();
        add(&mut store, "howtos", Format::Titled).unwrap();

        let result = list(&store).unwrap();
        let names: Vec<(usize, &str)> = result
            .categories
            .iter()
            .map(|c| (c.ordinal, c.name.as_str()))
            .collect();
        assert_eq!(names, vec![(0, "commands"), (1, "howtos")]);
    }

    #[test]
    fn add_duplicate_fails() {
        let mut store = InMemoryStore::new();
        add(&mut store, "commands", Format::Note).unwrap();
        assert!(matches!(
            add(&mut store, "commands", Format::Titled),
            Err(PensiveError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn add_rejects_bad_names() {
        let mut store = InMemoryStore::new();
        assert!(add(&mut store, "", Format::Note).is_err());
        assert!(add(&mut store, " padded", Format::Note).is_err());
    }

    #[test]
    fn empty_registry_hints() {
        let store = InMemoryStore::new();
        let result = list(&store).unwrap();
        assert!(result.categories.is_empty());
        assert!(result.messages[0].content.contains("category add"));
    }

    #[test]
    fn remove_closes_gap_and_reports_dropped() {
        let mut store = InMemoryStore::new();
        add(&mut store, "a", Format::Note).unwrap();
        add(&mut store, "b", Format::Note).unwrap();
        add(&mut store, "c", Format::Note).unwrap();
        store.insert_tag("t").unwrap();
        let b = catalog(&store).category("b").unwrap().id;
        store.insert_entry(b, &Entry::note("t", "x")).unwrap();

        let view = catalog(&store);
        let result = remove(&mut store, &view, "b").unwrap();
        assert!(result.messages[1].content.contains("1 entry"));

        let cats = store.list_categories().unwrap();
        assert_eq!(cats[1].name, "c");
        assert_eq!(cats[1].ordinal, 1);
    }

    #[test]
    fn remove_unknown_fails() {
        let mut store = InMemoryStore::new();
        assert!(matches!(
            remove(&mut store, &Catalog::default(), "nope"),
            Err(PensiveError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn rename_keeps_ordinal_and_rejects_conflicts() {
        let mut store = InMemoryStore::new();
        add(&mut store, "a", Format::Note).unwrap();
        add(&mut store, "b", Format::Titled).unwrap();

        let view = catalog(&store);
        assert!(matches!(
            rename(&mut store, &view, "a", "b"),
            Err(PensiveError::NameConflict(_))
        ));
        rename(&mut store, &view, "b", "links").unwrap();
        let cats = store.list_categories().unwrap();
        assert_eq!(cats[1].name, "links");
        assert_eq!(cats[1].ordinal, 1);
        assert_eq!(cats[1].format, Format::Titled);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Add), (0usize..8).prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn ordinals_stay_dense(ops in proptest::collection::vec(op(), 0..40)) {
            let mut store = InMemoryStore::new();
            let mut next = 0;
            for op in ops {
                match op {
                    Op::Add => {
                        add(&mut store, &format!("cat{}", next), Format::Note).unwrap();
                        next += 1;
                    }
                    Op::Remove(i) => {
                        let cats = store.list_categories().unwrap();
                        if let Some(cat) = cats.get(i) {
                            let name = cat.name.clone();
                            let view = catalog(&store);
                            remove(&mut store, &view, &name).unwrap();
                        }
                    }
                }
                let ordinals: Vec<usize> = store
                    .list_categories()
                    .unwrap()
                    .iter()
                    .map(|c| c.ordinal)
                    .collect();
                let expected: Vec<usize> = (0..ordinals.len()).collect();
                prop_assert_eq!(ordinals, expected);
            }
        }
    }
}

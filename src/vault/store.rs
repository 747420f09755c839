//! The in-memory record collection.
//!
//! `EntryStore` is an ordered, bounded list of `Record`s. Position is the
//! only address a record has, so removal shifts later records down instead
//! of swapping, and listing/search results carry the index alongside the
//! record.

use zeroize::Zeroize;

use super::record::{Record, RecordFields};
use crate::errors::{AcctMgrError, Result};

/// Maximum number of records a vault can hold.
pub const MAX_ENTRIES: usize = 256;

/// Records sharing a category, as shown by `ls`.
#[derive(Debug)]
pub struct CategoryGroup<'a> {
    /// Display label: the category upper-cased.
    pub label: String,
    /// The category as first seen in the store.
    pub category: &'a str,
    /// Matching records with their indices, in store order.
    pub entries: Vec<(usize, &'a Record)>,
}

/// Ordered collection of at most `MAX_ENTRIES` records.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EntryStore {
    records: Vec<Record>,
}

impl EntryStore {
    /// An empty store with room for the full capacity, so adding records
    /// never reallocates (and never leaves moved-from copies behind).
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(MAX_ENTRIES),
        }
    }

    /// Build a store from decoded records.
    pub(crate) fn from_records(records: Vec<Record>) -> Result<Self> {
        if records.len() > MAX_ENTRIES {
            return Err(AcctMgrError::CapacityExceeded {
                requested: records.len(),
                capacity: MAX_ENTRIES,
            });
        }
        let mut store = Self::new();
        store.records.extend(records);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Append a record and return its index.
    pub fn add(&mut self, record: Record) -> Result<usize> {
        if self.records.len() >= MAX_ENTRIES {
            return Err(AcctMgrError::CapacityExceeded {
                requested: self.records.len() + 1,
                capacity: MAX_ENTRIES,
            });
        }
        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    pub fn get(&self, index: usize) -> Result<&Record> {
        self.records.get(index).ok_or(AcctMgrError::IndexOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    /// Edit a record through `mutator`.
    ///
    /// The mutator works on a copy; the record only changes if the edited
    /// fields validate. Returns whether any field actually changed (and so
    /// whether `updated_at` moved).
    pub fn update<F>(&mut self, index: usize, mutator: F) -> Result<bool>
    where
        F: FnOnce(&mut RecordFields),
    {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(AcctMgrError::IndexOutOfRange { index, count })?;

        let mut draft = record.fields().clone();
        mutator(&mut draft);
        record.apply(draft)
    }

    /// Remove the record at `index`, shifting later records down by one.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.records.len() {
            return Err(AcctMgrError::IndexOutOfRange {
                index,
                count: self.records.len(),
            });
        }
        // Records zeroize themselves on drop.
        drop(self.records.remove(index));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All records satisfying `predicate`, with their indices.
    pub fn find<P>(&self, predicate: P) -> Vec<(usize, &Record)>
    where
        P: Fn(&Record) -> bool,
    {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| predicate(r))
            .collect()
    }

    /// Case-insensitive substring search over name, username, url, notes
    /// and category.
    pub fn search(&self, query: &str) -> Vec<(usize, &Record)> {
        let needle = query.to_lowercase();
        self.find(|r| r.matches(&needle))
    }

    /// Group records by category.
    ///
    /// Categories compare case-insensitively and appear in the order they
    /// are first seen. With `filter`, only the matching category is kept.
    pub fn categories(&self, filter: Option<&str>) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();

        for (index, record) in self.records.iter().enumerate() {
            let category = record.category();
            match groups
                .iter_mut()
                .find(|g| same_category(g.category, category))
            {
                Some(group) => group.entries.push((index, record)),
                None => groups.push(CategoryGroup {
                    label: category.to_uppercase(),
                    category,
                    entries: vec![(index, record)],
                }),
            }
        }

        match filter.map(str::trim).filter(|f| !f.is_empty()) {
            Some(wanted) => groups
                .into_iter()
                .filter(|g| same_category(g.category, wanted))
                .collect(),
            None => groups,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Zeroize every record and empty the store.
    pub fn wipe(&mut self) {
        self.records.iter_mut().for_each(Zeroize::zeroize);
        self.records.clear();
    }
}

fn same_category(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: &str) -> Record {
        let mut fields = RecordFields::named(name);
        fields.category = category.to_string();
        Record::new(fields).unwrap()
    }

    fn names(store: &EntryStore) -> Vec<String> {
        store.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn add_returns_sequential_indices() {
        let mut store = EntryStore::new();
        assert_eq!(store.add(record("a", "x")).unwrap(), 0);
        assert_eq!(store.add(record("b", "x")).unwrap(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn add_beyond_capacity_fails_and_keeps_count() {
        let mut store = EntryStore::new();
        for i in 0..MAX_ENTRIES {
            store.add(record(&format!("entry-{i}"), "bulk")).unwrap();
        }
        let result = store.add(record("one-too-many", "bulk"));
        assert!(matches!(
            result,
            Err(AcctMgrError::CapacityExceeded { capacity: 256, .. })
        ));
        assert_eq!(store.len(), MAX_ENTRIES);
    }

    #[test]
    fn get_out_of_range() {
        let store = EntryStore::new();
        assert!(matches!(
            store.get(0),
            Err(AcctMgrError::IndexOutOfRange { index: 0, count: 0 })
        ));
    }

    #[test]
    fn remove_preserves_order() {
        let mut store = EntryStore::new();
        store.add(record("A", "x")).unwrap();
        store.add(record("B", "x")).unwrap();
        store.add(record("C", "x")).unwrap();

        store.remove(1).unwrap();
        assert_eq!(names(&store), vec!["A", "C"]);
        assert_eq!(store.get(1).unwrap().name(), "C");
    }

    #[test]
    fn remove_out_of_range_leaves_store_alone() {
        let mut store = EntryStore::new();
        store.add(record("A", "x")).unwrap();
        assert!(store.remove(1).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_changes_field_and_reports_change() {
        let mut store = EntryStore::new();
        store.add(record("mail", "email")).unwrap();

        let changed = store
            .update(0, |f| f.username = "me@example.com".into())
            .unwrap();
        assert!(changed);
        assert_eq!(store.get(0).unwrap().username(), "me@example.com");
    }

    #[test]
    fn update_without_change_returns_false() {
        let mut store = EntryStore::new();
        store.add(record("mail", "email")).unwrap();
        assert!(!store.update(0, |_| {}).unwrap());
    }

    #[test]
    fn invalid_update_is_rejected_and_record_untouched() {
        let mut store = EntryStore::new();
        store.add(record("mail", "email")).unwrap();

        let result = store.update(0, |f| f.name.clear());
        assert!(matches!(result, Err(AcctMgrError::EmptyName)));
        assert_eq!(store.get(0).unwrap().name(), "mail");
    }

    #[test]
    fn update_out_of_range() {
        let mut store = EntryStore::new();
        assert!(matches!(
            store.update(3, |_| {}),
            Err(AcctMgrError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn search_matches_across_fields_case_insensitively() {
        let mut store = EntryStore::new();
        let mut fields = RecordFields::named("Work VPN");
        fields.notes = "uses the YubiKey".into();
        store.add(Record::new(fields).unwrap()).unwrap();
        store.add(record("Bank", "finance")).unwrap();
        store.add(record("Broker", "Finance")).unwrap();

        let hits: Vec<usize> = store.search("yubikey").iter().map(|(i, _)| *i).collect();
        assert_eq!(hits, vec![0]);

        let hits: Vec<usize> = store.search("FINANCE").iter().map(|(i, _)| *i).collect();
        assert_eq!(hits, vec![1, 2]);
    }

    #[test]
    fn categories_group_case_insensitively_in_first_seen_order() {
        let mut store = EntryStore::new();
        store.add(record("server-1", "Servers")).unwrap();
        store.add(record("gmail", "email")).unwrap();
        store.add(record("server-2", "servers")).unwrap();

        let groups = store.categories(None);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "SERVERS");
        assert_eq!(groups[0].category, "Servers");
        let idx: Vec<usize> = groups[0].entries.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, vec![0, 2]);
        assert_eq!(groups[1].label, "EMAIL");
    }

    #[test]
    fn categories_filter_is_case_insensitive() {
        let mut store = EntryStore::new();
        store.add(record("server-1", "Servers")).unwrap();
        store.add(record("gmail", "email")).unwrap();

        let groups = store.categories(Some("EMAIL"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries[0].1.name(), "gmail");
        assert!(store.categories(Some("nothing")).is_empty());
    }

    #[test]
    fn wipe_empties_store() {
        let mut store = EntryStore::new();
        store.add(record("a", "x")).unwrap();
        store.wipe();
        assert!(store.is_empty());
    }
}

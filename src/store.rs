use std::{path::Path, time::SystemTime};

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    entry::{CollectionKind, EntryId, NewEntry, ReferenceEntry},
    error::Result,
};

const FIXES: TableDefinition<u64, &[u8]> = TableDefinition::new("fixes");
const GUIDES: TableDefinition<u64, &[u8]> = TableDefinition::new("guides");
const NEXT_IDS: TableDefinition<&str, u64> = TableDefinition::new("next_ids");
const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

fn entries_table(
    kind: CollectionKind,
) -> TableDefinition<'static, u64, &'static [u8]> {
    match kind {
        CollectionKind::Fixes => FIXES,
        CollectionKind::Guides => GUIDES,
    }
}

/// Seconds since the Unix epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// On-disk form of an entry. Removal only stamps `removed_at`, so the
/// record and its id stay in the log.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(flatten)]
    entry: ReferenceEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    removed_at: Option<u64>,
}

impl StoredEntry {
    fn is_live(&self) -> bool {
        self.removed_at.is_none()
    }
}

fn decode(kind: CollectionKind, id: u64, bytes: &[u8]) -> Option<StoredEntry> {
    match serde_json::from_slice::<StoredEntry>(bytes) {
        Ok(mut stored) => {
            // The table key is authoritative for the id.
            stored.entry.id = EntryId(id);
            Some(stored)
        }
        Err(e) => {
            warn!(collection = %kind, id, error = %e, "skipping corrupt entry");
            None
        }
    }
}

fn insert_new(
    table: &mut Table<'_, u64, &'static [u8]>,
    id: u64,
    new: NewEntry,
    created_at: u64,
) -> Result<ReferenceEntry> {
    let entry = new.into_entry(EntryId(id), created_at);
    let bytes = serde_json::to_vec(&StoredEntry {
        entry: entry.clone(),
        removed_at: None,
    })?;
    table.insert(id, bytes.as_slice())?;
    Ok(entry)
}

/// Append-only store for quick fixes, quick guides and settings.
pub struct EntryStore {
    db: Database,
}

impl EntryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure all tables exist by opening them in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(FIXES)?;
        txn.open_table(GUIDES)?;
        txn.open_table(NEXT_IDS)?;
        txn.open_table(SETTINGS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    // -- Entries --

    /// Append a new entry, assigning the next id of its collection.
    pub fn append(
        &self,
        kind: CollectionKind,
        new: NewEntry,
    ) -> Result<ReferenceEntry> {
        let txn = self.db.begin_write()?;
        let entry = {
            let mut ids = txn.open_table(NEXT_IDS)?;
            let mut table = txn.open_table(entries_table(kind))?;
            let id = ids.get(kind.as_str())?.map(|v| v.value()).unwrap_or(1);

            let entry = insert_new(&mut table, id, new, now_secs())?;
            ids.insert(kind.as_str(), id + 1)?;
            entry
        };
        txn.commit()?;

        debug!(collection = %kind, id = %entry.id, "appended entry");
        Ok(entry)
    }

    /// Append several entries in a single write transaction. Either all of
    /// them are stored, with consecutive ids, or none are.
    pub fn append_batch(
        &self,
        kind: CollectionKind,
        batch: Vec<(NewEntry, u64)>,
    ) -> Result<Vec<ReferenceEntry>> {
        let txn = self.db.begin_write()?;
        let entries = {
            let mut ids = txn.open_table(NEXT_IDS)?;
            let mut table = txn.open_table(entries_table(kind))?;
            let mut next =
                ids.get(kind.as_str())?.map(|v| v.value()).unwrap_or(1);

            let mut entries = Vec::with_capacity(batch.len());
            for (new, created_at) in batch {
                entries.push(insert_new(&mut table, next, new, created_at)?);
                next += 1;
            }

            ids.insert(kind.as_str(), next)?;
            entries
        };
        txn.commit()?;

        for entry in &entries {
            debug!(collection = %kind, id = %entry.id, "appended entry");
        }
        Ok(entries)
    }

    pub fn get(
        &self,
        kind: CollectionKind,
        id: EntryId,
    ) -> Result<Option<ReferenceEntry>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(entries_table(kind))?;
        Ok(table
            .get(id.0)?
            .and_then(|v| decode(kind, id.0, v.value()))
            .filter(StoredEntry::is_live)
            .map(|stored| stored.entry))
    }

    /// Soft-delete an entry. Returns `false` if it does not exist or was
    /// already removed.
    pub fn remove(&self, kind: CollectionKind, id: EntryId) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(entries_table(kind))?;
            let stored = table
                .get(id.0)?
                .and_then(|v| decode(kind, id.0, v.value()));

            match stored {
                Some(mut stored) if stored.is_live() => {
                    stored.removed_at = Some(now_secs());
                    let bytes = serde_json::to_vec(&stored)?;
                    table.insert(id.0, bytes.as_slice())?;
                    true
                }
                _ => false,
            }
        };
        txn.commit()?;

        if removed {
            debug!(collection = %kind, %id, "removed entry");
        }
        Ok(removed)
    }

    /// All live entries of a collection in id order.
    pub fn list(&self, kind: CollectionKind) -> Result<Vec<ReferenceEntry>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(entries_table(kind))?;
        let mut result = Vec::new();
        for row in table.iter()? {
            let (k, v) = row?;
            if let Some(stored) = decode(kind, k.value(), v.value())
                && stored.is_live()
            {
                result.push(stored.entry);
            }
        }
        Ok(result)
    }

    pub fn count(&self, kind: CollectionKind) -> Result<usize> {
        Ok(self.list(kind)?.len())
    }

    // -- Settings --

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    pub fn clear_setting(&self, key: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(SETTINGS)?;
            table.remove(key)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, EntryStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = EntryStore::open(&tmp.path().join("entries.redb")).unwrap();
        (tmp, store)
    }

    fn fix(title: &str) -> NewEntry {
        NewEntry::new(title, "power cycle the panel")
            .with_tags(["galaxy"])
            .with_author("admin")
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let (_tmp, store) = test_store();

        let a = store.append(CollectionKind::Fixes, fix("First")).unwrap();
        let b = store.append(CollectionKind::Fixes, fix("Second")).unwrap();

        assert_eq!(a.id, EntryId(1));
        assert_eq!(b.id, EntryId(2));
        assert!(a.created_at > 0);
        assert_eq!(a.author, "admin");
    }

    #[test]
    fn collections_have_independent_ids() {
        let (_tmp, store) = test_store();

        store.append(CollectionKind::Fixes, fix("Fix")).unwrap();
        let guide = store
            .append(CollectionKind::Guides, NewEntry::new("Guide", "text"))
            .unwrap();

        assert_eq!(guide.id, EntryId(1));
        assert_eq!(store.count(CollectionKind::Fixes).unwrap(), 1);
        assert_eq!(store.count(CollectionKind::Guides).unwrap(), 1);
    }

    #[test]
    fn get_returns_live_entry() {
        let (_tmp, store) = test_store();
        let added = store.append(CollectionKind::Fixes, fix("Reset")).unwrap();

        let got = store.get(CollectionKind::Fixes, added.id).unwrap();
        assert_eq!(got, Some(added));
        assert_eq!(store.get(CollectionKind::Fixes, EntryId(99)).unwrap(), None);
        assert_eq!(store.get(CollectionKind::Guides, EntryId(1)).unwrap(), None);
    }

    #[test]
    fn remove_is_soft_and_ids_are_not_reused() {
        let (_tmp, store) = test_store();
        let first = store.append(CollectionKind::Fixes, fix("One")).unwrap();
        store.append(CollectionKind::Fixes, fix("Two")).unwrap();

        assert!(store.remove(CollectionKind::Fixes, first.id).unwrap());
        assert!(!store.remove(CollectionKind::Fixes, first.id).unwrap());
        assert!(!store.remove(CollectionKind::Fixes, EntryId(42)).unwrap());

        assert_eq!(store.get(CollectionKind::Fixes, first.id).unwrap(), None);
        let titles: Vec<_> = store
            .list(CollectionKind::Fixes)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Two"]);

        let third = store.append(CollectionKind::Fixes, fix("Three")).unwrap();
        assert_eq!(third.id, EntryId(3));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let (_tmp, store) = test_store();
        for title in ["a", "b", "c"] {
            store.append(CollectionKind::Guides, NewEntry::new(title, "")).unwrap();
        }

        let titles: Vec<_> = store
            .list(CollectionKind::Guides)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn corrupt_records_are_skipped() {
        let (_tmp, store) = test_store();
        store.append(CollectionKind::Fixes, fix("Good")).unwrap();

        let txn = store.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(FIXES).unwrap();
            table.insert(7u64, b"not json".as_slice()).unwrap();
        }
        txn.commit().unwrap();

        let entries = store.list(CollectionKind::Fixes).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.get(CollectionKind::Fixes, EntryId(7)).unwrap(), None);
    }

    #[test]
    fn append_batch_assigns_consecutive_ids() {
        let (_tmp, store) = test_store();
        store
            .append(CollectionKind::Guides, NewEntry::new("First", ""))
            .unwrap();

        let batch = vec![
            (NewEntry::new("Second", ""), 100),
            (NewEntry::new("Third", ""), 200),
        ];
        let appended =
            store.append_batch(CollectionKind::Guides, batch).unwrap();

        let ids: Vec<_> = appended.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EntryId(2), EntryId(3)]);
        assert_eq!(appended[1].created_at, 200);
        assert_eq!(store.count(CollectionKind::Guides).unwrap(), 3);

        let next = store
            .append(CollectionKind::Guides, NewEntry::new("Fourth", ""))
            .unwrap();
        assert_eq!(next.id, EntryId(4));
    }

    #[test]
    fn empty_batch_leaves_counter_alone() {
        let (_tmp, store) = test_store();
        let appended =
            store.append_batch(CollectionKind::Fixes, Vec::new()).unwrap();
        assert!(appended.is_empty());

        let first = store.append(CollectionKind::Fixes, fix("One")).unwrap();
        assert_eq!(first.id, EntryId(1));
    }

    #[test]
    fn settings_crud() {
        let (_tmp, store) = test_store();

        assert_eq!(store.get_setting("tag_bonus").unwrap(), None);

        store.set_setting("tag_bonus", "5").unwrap();
        assert_eq!(store.get_setting("tag_bonus").unwrap(), Some("5".into()));
        assert_eq!(store.get_setting("limit").unwrap(), None);

        assert!(store.clear_setting("tag_bonus").unwrap());
        assert!(!store.clear_setting("tag_bonus").unwrap());
        assert_eq!(store.get_setting("tag_bonus").unwrap(), None);
    }

    #[test]
    fn reopen_preserves_data() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("entries.redb");

        {
            let store = EntryStore::open(&path).unwrap();
            store.append(CollectionKind::Fixes, fix("Kept")).unwrap();
            store.set_setting("limit", "3").unwrap();
        }

        {
            let store = EntryStore::open(&path).unwrap();
            let entries = store.list(CollectionKind::Fixes).unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].title, "Kept");
            assert_eq!(store.get_setting("limit").unwrap(), Some("3".into()));

            let next = store.append(CollectionKind::Fixes, fix("Next")).unwrap();
            assert_eq!(next.id, EntryId(2));
        }
    }
}

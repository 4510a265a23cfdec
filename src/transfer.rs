//! Whole-collection JSON import and export.
//!
//! The export format is a JSON array of entries. Imports accept the same
//! format with any field missing and append every record as a new entry:
//! ids in the file are ignored so that existing ids are never reused.

use std::io::{Read, Write};

use tracing::info;

use crate::{
    entry::{CollectionKind, NewEntry, ReferenceEntry},
    error::Result,
    store::{EntryStore, now_secs},
    tokenize::derive_keywords,
};

/// Write all live entries of a collection as a pretty-printed JSON array.
pub fn export<W: Write>(
    store: &EntryStore,
    kind: CollectionKind,
    mut writer: W,
) -> Result<usize> {
    let entries = store.list(kind)?;
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(entries.len())
}

/// Append every entry of a JSON array to a collection.
///
/// Author and creation time are kept when present. Entries without
/// keywords get keywords derived from their title and body. The whole
/// file is written in one transaction, so a failed import stores nothing.
pub fn import<R: Read>(
    store: &EntryStore,
    kind: CollectionKind,
    reader: R,
) -> Result<Vec<ReferenceEntry>> {
    let records: Vec<ReferenceEntry> = serde_json::from_reader(reader)?;

    let now = now_secs();
    let batch = records
        .into_iter()
        .map(|record| {
            let created_at = if record.created_at > 0 {
                record.created_at
            } else {
                now
            };
            let mut new = NewEntry::from(record);
            if new.keywords.is_empty() {
                new.keywords = derive_keywords(&new.title, &new.body);
            }
            (new, created_at)
        })
        .collect();

    let imported = store.append_batch(kind, batch)?;

    info!(collection = %kind, count = imported.len(), "imported entries");
    Ok(imported)
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A stable entry identifier, unique within one collection.
///
/// Ids are allocated in increasing order and never reused, even after the
/// entry they named has been removed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = Error;

    /// Accepts both the display form (`#12`) and a bare number (`12`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        digits
            .parse()
            .map(EntryId)
            .map_err(|_| Error::InvalidInput(format!("invalid entry id: {s}")))
    }
}

/// Which collection an entry belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Admin-curated fixes, usually tagged with the equipment they apply to.
    Fixes,
    /// Free-text guides submitted by engineers.
    Guides,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] =
        [CollectionKind::Fixes, CollectionKind::Guides];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Fixes => "fixes",
            CollectionKind::Guides => "guides",
        }
    }

    /// Heading used when printing results.
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Fixes => "Quick Fixes",
            CollectionKind::Guides => "Quick Guides",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixes" | "fix" => Ok(CollectionKind::Fixes),
            "guides" | "guide" => Ok(CollectionKind::Guides),
            other => Err(Error::InvalidInput(format!(
                "unknown collection '{other}' (expected 'fixes' or 'guides')"
            ))),
        }
    }
}

/// A short reference answer: a quick fix or a quick guide.
///
/// Every text field defaults to empty when absent from a stored or
/// imported record, so partially written entries still load and match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub author: String,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,
}

impl ReferenceEntry {
    /// The lowercased text searched for query terms: title, body, the
    /// author-listed keywords and the tags.
    pub fn haystack(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len()
                + self.body.len()
                + 16 * (self.keywords.len() + self.tags.len()),
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.body);
        for word in self.keywords.iter().chain(&self.tags) {
            text.push(' ');
            text.push_str(word);
        }
        text.to_lowercase()
    }
}

/// The author-supplied fields of an entry, before the store assigns an id
/// and a creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub author: String,
}

impl NewEntry {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Turn into a full entry with the given identity.
    pub fn into_entry(self, id: EntryId, created_at: u64) -> ReferenceEntry {
        ReferenceEntry {
            id,
            title: self.title,
            body: self.body,
            tags: self.tags,
            keywords: self.keywords,
            author: self.author,
            created_at,
        }
    }
}

impl From<ReferenceEntry> for NewEntry {
    fn from(entry: ReferenceEntry) -> Self {
        Self {
            title: entry.title,
            body: entry.body,
            tags: entry.tags,
            keywords: entry.keywords,
            author: entry.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_display_and_parse() {
        let id = EntryId(42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!("#42".parse::<EntryId>().unwrap(), id);
        assert_eq!("42".parse::<EntryId>().unwrap(), id);
        assert!("#forty".parse::<EntryId>().is_err());
        assert!("".parse::<EntryId>().is_err());
    }

    #[test]
    fn collection_kind_parse() {
        assert_eq!(
            "fixes".parse::<CollectionKind>().unwrap(),
            CollectionKind::Fixes
        );
        assert_eq!(
            "Guide".parse::<CollectionKind>().unwrap(),
            CollectionKind::Guides
        );
        assert!("manuals".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let entry: ReferenceEntry =
            serde_json::from_str(r#"{"id": 3, "title": "Only a title"}"#)
                .unwrap();

        assert_eq!(entry.id, EntryId(3));
        assert_eq!(entry.title, "Only a title");
        assert!(entry.body.is_empty());
        assert!(entry.tags.is_empty());
        assert!(entry.keywords.is_empty());
        assert_eq!(entry.created_at, 0);
    }

    #[test]
    fn haystack_includes_keywords_and_tags_lowercased() {
        let entry = NewEntry::new("Reset Panel", "Power DOWN")
            .with_keywords(["Mains"])
            .with_tags(["Scantronic"])
            .into_entry(EntryId(1), 0);

        assert_eq!(
            entry.haystack(),
            "reset panel power down mains scantronic"
        );
    }

    #[test]
    fn serializes_id_as_plain_number() {
        let entry = NewEntry::new("t", "b").into_entry(EntryId(7), 1);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], 7);
    }
}

//! quickfix - keyword-matched quick fixes and field guides.
//!
//! Field engineers describe a fault in free text; quickfix returns the
//! short, pre-written answers whose text covers enough of the description.
//! Two collections are kept: admin-curated *quick fixes*, tagged with the
//! equipment they apply to, and engineer-submitted *quick guides*.
//!
//! # Quick start
//!
//! ```no_run
//! use quickfix::{CollectionKind, DataDir, EntryStore, NewEntry};
//! use quickfix::search::{self, SearchParams};
//! use quickfix::matcher::MatchConfig;
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let store = EntryStore::open(&data_dir.entries_db()).unwrap();
//!
//! store
//!     .append(
//!         CollectionKind::Fixes,
//!         NewEntry::new("Reset Panel", "power down mains and battery")
//!             .with_tags(["scantronic"]),
//!     )
//!     .unwrap();
//!
//! let params = SearchParams {
//!     query: "scantronic panel reset".to_string(),
//!     collection: CollectionKind::Fixes,
//!     limit: 5,
//!     all: false,
//!     config: MatchConfig::default(),
//! };
//!
//! for r in search::execute_search(&params, &store).unwrap() {
//!     println!("{} {} (score: {})", r.id, r.title, r.score);
//! }
//! ```

pub mod cli;
pub mod data_dir;
pub mod entry;
pub mod error;
pub mod matcher;
pub mod mcp;
pub mod search;
pub mod settings;
pub mod store;
pub mod tokenize;
pub mod transfer;

pub use data_dir::DataDir;
pub use entry::{CollectionKind, EntryId, NewEntry, ReferenceEntry};
pub use error::{Error, Result};
pub use matcher::{MatchConfig, Matcher, ScoredEntry, match_entries};
pub use store::EntryStore;

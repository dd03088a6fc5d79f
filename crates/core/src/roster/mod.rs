//! Character roster acquisition.
//!
//! The roster is assembled from every tracked collection:
//! - **Resolution**: search terms are matched to collections once per session
//! - **Pagination**: one concurrent round of member fetches per "load more"
//! - **Merge**: pages are folded into the running roster, deduplicated by id
//!   and sorted by name, then written through to the cache

mod controller;
mod merge;
mod resolver;
mod types;

pub use controller::PaginationController;
pub use merge::{compare_names, merge_characters, merge_into};
pub use resolver::{match_collection, resolve_collection, CollectionResolver};
pub use types::{AcquisitionError, Cursor, PaginationState, RosterSnapshot, RosterSource};

/// Cache key holding the full merged roster.
pub const ROSTER_CACHE_KEY: &str = "marvel_characters";

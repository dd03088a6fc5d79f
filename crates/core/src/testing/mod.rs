//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the remote character API, allowing the
//! pagination pipeline to be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use comicvault_core::testing::{MockCharacterSource, fixtures};
//!
//! let source = MockCharacterSource::new();
//! source.add_collection(1, "Avengers Disassembled").await;
//! source.set_members(1, fixtures::numbered_characters(1, 45)).await;
//!
//! // Hand Arc::new(source) to a PaginationController...
//! ```

mod mock_character_source;

pub use mock_character_source::{MockCharacterSource, RecordedSourceCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::marvel::{Character, Collection, ResourceItem, ResourceList, Thumbnail};

    /// Create a test character with a thumbnail and description.
    pub fn character(id: u64, name: &str) -> Character {
        let mut character = Character::new(id, name);
        character.description = format!("{} is a test character.", name);
        character.thumbnail = Thumbnail {
            path: format!("http://i.annihil.us/u/prod/marvel/i/mg/{}", id),
            extension: "jpg".to_string(),
        };
        character.resource_uri = Some(format!(
            "http://gateway.marvel.com/v1/public/characters/{}",
            id
        ));
        character
    }

    /// Create `count` characters with consecutive ids starting at `first_id`.
    ///
    /// Names are zero-padded so name order matches id order.
    pub fn numbered_characters(first_id: u64, count: usize) -> Vec<Character> {
        (0..count as u64)
            .map(|i| character(first_id + i, &format!("Character {:03}", first_id + i)))
            .collect()
    }

    /// Create characters from `(id, name)` pairs.
    pub fn named_characters(pairs: &[(u64, &str)]) -> Vec<Character> {
        pairs.iter().map(|(id, name)| character(*id, name)).collect()
    }

    /// Create a test collection.
    pub fn collection(id: u64, title: &str) -> Collection {
        Collection {
            id,
            title: title.to_string(),
        }
    }

    /// Create a comics resource list with the given titles.
    pub fn comics(titles: &[&str]) -> ResourceList {
        ResourceList {
            available: titles.len() as u32,
            collection_uri: "http://gateway.marvel.com/v1/public/characters/1/comics".to_string(),
            items: titles
                .iter()
                .enumerate()
                .map(|(i, title)| ResourceItem {
                    resource_uri: format!("http://gateway.marvel.com/v1/public/comics/{}", i + 1),
                    name: title.to_string(),
                })
                .collect(),
            returned: titles.len() as u32,
        }
    }
}

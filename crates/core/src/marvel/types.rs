//! Types for remote character API responses.

use serde::{Deserialize, Deserializer, Serialize};

/// Image reference; the display URL is `{path}.{extension}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

impl Thumbnail {
    pub fn url(&self) -> String {
        format!("{}.{}", self.path, self.extension)
    }
}

/// A typed link attached to a character (detail page, wiki, comic link).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterUrl {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// One entry of a resource list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceItem {
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub name: String,
}

/// Comics, series, stories or events a character appears in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceList {
    #[serde(default)]
    pub available: u32,
    #[serde(rename = "collectionURI", default)]
    pub collection_uri: String,
    #[serde(default)]
    pub items: Vec<ResourceItem>,
    #[serde(default)]
    pub returned: u32,
}

impl ResourceList {
    /// Items whose name contains `term`, case-insensitively. An empty term keeps everything.
    pub fn filter_items(&self, term: &str) -> Vec<&ResourceItem> {
        let term = term.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&term))
            .collect()
    }
}

/// A comic-book character.
///
/// Identity is `id`. `event` is set by the roster to the title of the
/// collection the character was retrieved through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Character {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Thumbnail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(
        rename = "resourceURI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<CharacterUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comics: Option<ResourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<ResourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stories: Option<ResourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<ResourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl Character {
    /// Minimal character with empty detail fields.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            thumbnail: Thumbnail::default(),
            modified: None,
            resource_uri: None,
            urls: Vec::new(),
            comics: None,
            series: None,
            stories: None,
            events: None,
            event: None,
        }
    }

    pub fn image_url(&self) -> String {
        self.thumbnail.url()
    }

    /// Cache key for the detail view of this character.
    pub fn cache_key(&self) -> String {
        character_cache_key(self.id)
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }
}

/// Cache key under which a single character is stored.
pub fn character_cache_key(id: u64) -> String {
    format!("character_{}", id)
}

/// A named collection ("event") grouping characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    pub id: u64,
    pub title: String,
}

/// One window of a collection's member list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Requested offset.
    pub offset: u32,
    /// Requested limit.
    pub limit: u32,
    /// Total members reported by the API, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    pub results: Vec<Character>,
}

impl Page {
    /// Number of characters returned.
    pub fn count(&self) -> usize {
        self.results.len()
    }

    /// A short page means the collection has no further members.
    pub fn is_last(&self) -> bool {
        self.results.len() < self.limit as usize
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_remote_character() {
        let json = r#"{
            "id": 1009610,
            "name": "Spider-Man (Peter Parker)",
            "description": "Bitten by a radioactive spider...",
            "modified": "2020-07-21T10:30:10-0400",
            "thumbnail": {
                "path": "http://i.annihil.us/u/prod/marvel/i/mg/3/50/526548a343e4b",
                "extension": "jpg"
            },
            "resourceURI": "http://gateway.marvel.com/v1/public/characters/1009610",
            "comics": {
                "available": 2,
                "collectionURI": "http://gateway.marvel.com/v1/public/characters/1009610/comics",
                "items": [
                    {"resourceURI": "http://gateway.marvel.com/v1/public/comics/1", "name": "Amazing Spider-Man (1963) #1"},
                    {"resourceURI": "http://gateway.marvel.com/v1/public/comics/2", "name": "Avengers (1963) #11"}
                ],
                "returned": 2
            },
            "urls": [{"type": "detail", "url": "http://marvel.com/characters/54/spider-man"}]
        }"#;

        let character: Character = serde_json::from_str(json).unwrap();
        assert_eq!(character.id, 1009610);
        assert_eq!(
            character.image_url(),
            "http://i.annihil.us/u/prod/marvel/i/mg/3/50/526548a343e4b.jpg"
        );
        assert_eq!(character.urls[0].kind, "detail");
        assert_eq!(character.comics.as_ref().unwrap().items.len(), 2);
        assert!(character.event.is_none());
        assert_eq!(character.cache_key(), "character_1009610");
    }

    #[test]
    fn test_null_description_is_empty() {
        let json = r#"{"id": 1, "name": "Blank", "description": null, "thumbnail": {"path": "p", "extension": "png"}}"#;
        let character: Character = serde_json::from_str(json).unwrap();
        assert_eq!(character.description, "");
    }

    #[test]
    fn test_event_survives_serialization() {
        let character = Character::new(7, "Wolverine").with_event("X-Men: Days of Future Past");
        let json = serde_json::to_string(&character).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(back, character);
        assert_eq!(back.event.as_deref(), Some("X-Men: Days of Future Past"));
    }

    #[test]
    fn test_filter_items_case_insensitive() {
        let list = ResourceList {
            available: 3,
            collection_uri: String::new(),
            items: vec![
                ResourceItem {
                    resource_uri: "a".to_string(),
                    name: "Avengers (1963) #1".to_string(),
                },
                ResourceItem {
                    resource_uri: "b".to_string(),
                    name: "Uncanny X-Men (1963) #1".to_string(),
                },
                ResourceItem {
                    resource_uri: "c".to_string(),
                    name: "New Avengers (2004) #1".to_string(),
                },
            ],
            returned: 3,
        };

        let found = list.filter_items("AVENGERS");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].resource_uri, "c");
        assert_eq!(list.filter_items("").len(), 3);
    }

    #[test]
    fn test_page_is_last() {
        let page = Page {
            offset: 40,
            limit: 20,
            total: Some(45),
            results: (0..5).map(|i| Character::new(i, format!("C{}", i))).collect(),
        };
        assert_eq!(page.count(), 5);
        assert!(page.is_last());

        let full = Page {
            offset: 0,
            limit: 2,
            total: None,
            results: vec![Character::new(1, "A"), Character::new(2, "B")],
        };
        assert!(!full.is_last());
    }
}

//! Request and response bodies for the account backend.

use serde::{Deserialize, Serialize};

/// `POST /register` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `POST /login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user's favorite character, as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCharacter {
    #[serde(default)]
    pub favorite_character: Option<String>,
    #[serde(default)]
    pub character_image: Option<String>,
}

/// `POST /user/update-favorite-character` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCharacterUpdate {
    pub user_id: u64,
    pub favorite_character: String,
    pub character_image: String,
}

/// Every backend reply carries some subset of these.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BackendReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

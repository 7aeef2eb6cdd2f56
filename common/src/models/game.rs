// common/src/models/game.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A game in the studio catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub game_modes: Vec<String>,
    #[serde(default)]
    pub progression: Option<Value>,
    #[serde(default)]
    pub system_requirements: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    #[serde(default)]
    pub store_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Concept,
    Development,
    Alpha,
    Beta,
    Released,
    Discontinued,
}

impl Game {
    /// Concept-stage games stay off the public site
    pub fn is_publicly_visible(&self) -> bool {
        self.status != GameStatus::Concept
    }
}

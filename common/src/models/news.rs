// common/src/models/news.rs
use serde::{Deserialize, Serialize};

/// A news article or devlog post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl NewsArticle {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_published_articles_count_as_published() {
        let mut article: NewsArticle = serde_json::from_value(serde_json::json!({
            "id": "n1",
            "slug": "alpha-launch",
            "title": "Alpha Launch"
        }))
        .unwrap();

        assert_eq!(article.status, ArticleStatus::Draft);
        assert!(!article.is_published());

        article.status = ArticleStatus::Published;
        assert!(article.is_published());

        article.status = ArticleStatus::Archived;
        assert!(!article.is_published());
    }
}

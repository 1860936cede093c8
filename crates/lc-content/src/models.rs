use lc_core::Tier;
use serde::{Deserialize, Serialize};

/// Author summary embedded in content items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub content_preview: String,
    pub cover_image_url: String,
    pub access_tier: Tier,
    pub author_id: i64,
    pub created_at: String,
    pub author: Author,
    pub views: u64,
    pub read_time: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub access_tier: Tier,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub views: Option<u64>,
    /// Display duration, e.g. `"12:34"`
    #[serde(default)]
    pub duration: Option<String>,
}

/// One page of articles, in backend order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl ArticlePage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of videos, in backend order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl VideoPage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

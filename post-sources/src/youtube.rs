use crate::time::{parse_rfc3339, relative_or_empty};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use trendsift_core::{coerce_engagement, CoreError, Platform, Post, SourceError};

const YOUTUBE_WATCH_BASE: &str = "https://www.youtube.com/watch?v=";

/// `search.list` or `videos.list` response of the YouTube Data API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YouTubeListResponse {
    pub items: Vec<Value>,
}

/// `search.list` returns `{"kind": ..., "videoId": ...}`, `videos.list` a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YouTubeId {
    Plain(String),
    Resource {
        #[serde(rename = "videoId", default)]
        video_id: Option<String>,
    },
}

impl YouTubeId {
    pub fn video_id(&self) -> Option<&str> {
        let id = match self {
            YouTubeId::Plain(id) => Some(id.as_str()),
            YouTubeId::Resource { video_id } => video_id.as_deref(),
        };
        id.filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YouTubeSnippet {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: Option<String>,
}

/// Counts arrive as decimal strings; kept raw and coerced leniently.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YouTubeStatistics {
    pub view_count: Value,
    pub like_count: Value,
    pub comment_count: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeItem {
    pub id: YouTubeId,
    #[serde(default)]
    pub snippet: YouTubeSnippet,
    #[serde(default)]
    pub statistics: Option<YouTubeStatistics>,
}

impl YouTubeItem {
    /// Likes plus comments; zero when statistics were not requested.
    pub fn engagement(&self) -> u64 {
        self.statistics
            .as_ref()
            .map(|s| {
                coerce_engagement(&s.like_count).saturating_add(coerce_engagement(&s.comment_count))
            })
            .unwrap_or(0)
    }

    pub fn to_post(&self, now: DateTime<Utc>) -> Option<Post> {
        let video_id = self.id.video_id()?;
        let title = self.snippet.title.trim();
        let description = self.snippet.description.trim();
        let content = if description.is_empty() {
            title.to_string()
        } else {
            format!("{}\n{}", title, description)
        };

        Some(Post {
            id: video_id.to_string(),
            content,
            platform: Platform::YouTube,
            source: self.snippet.channel_title.clone(),
            engagement: self.engagement(),
            timestamp: relative_or_empty(
                self.snippet.published_at.as_deref().and_then(parse_rfc3339),
                now,
            ),
            url: Some(format!("{}{}", YOUTUBE_WATCH_BASE, video_id)),
        })
    }
}

/// Map a YouTube Data API list response into posts, skipping items without a video id.
pub fn parse_youtube_list(payload: Value, now: DateTime<Utc>) -> Result<Vec<Post>, CoreError> {
    let response: YouTubeListResponse = serde_json::from_value(payload).map_err(|e| {
        CoreError::Source(SourceError::InvalidResponse {
            platform: Platform::YouTube.to_string(),
            details: e.to_string(),
        })
    })?;

    let posts: Vec<Post> = response
        .items
        .iter()
        .filter_map(|item| match YouTubeItem::deserialize(item) {
            Ok(item) => item.to_post(now),
            Err(e) => {
                warn!("Skipping unreadable YouTube item: {}", e);
                None
            }
        })
        .collect();

    debug!("Mapped {} YouTube posts", posts.len());
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        parse_rfc3339("2024-06-01T12:00:00Z").unwrap()
    }

    #[test]
    fn test_videos_list_item() {
        let payload = json!({
            "items": [{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "title": "Rust tutorial for beginners",
                    "description": "Step by step guide",
                    "channelTitle": "Let's Get Rusty",
                    "publishedAt": "2024-05-30T12:00:00Z"
                },
                "statistics": {"viewCount": "100000", "likeCount": "2500", "commentCount": "310"}
            }]
        });

        let posts = parse_youtube_list(payload, now()).unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.id, "dQw4w9WgXcQ");
        assert_eq!(post.content, "Rust tutorial for beginners\nStep by step guide");
        assert_eq!(post.source, "Let's Get Rusty");
        assert_eq!(post.engagement, 2810);
        assert_eq!(post.timestamp, "2d ago");
        assert_eq!(
            post.url.as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_search_list_item_without_statistics() {
        let payload = json!({
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc123"}, "snippet": {"title": "Hot take"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC1"}, "snippet": {"title": "A channel"}},
                {"snippet": {"title": "no id at all"}}
            ]
        });

        let posts = parse_youtube_list(payload, now()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "abc123");
        assert_eq!(posts[0].engagement, 0);
        assert_eq!(posts[0].content, "Hot take");
    }

    #[test]
    fn test_huge_counts_saturate() {
        let payload = json!({
            "items": [{
                "id": "v2",
                "statistics": {"likeCount": "18446744073709551615", "commentCount": "1"}
            }]
        });
        let posts = parse_youtube_list(payload, now()).unwrap();
        assert_eq!(posts[0].engagement, u64::MAX);
    }

    #[test]
    fn test_malformed_counts_default_to_zero() {
        let payload = json!({
            "items": [{
                "id": "v1",
                "statistics": {"likeCount": "n/a", "commentCount": 4}
            }]
        });
        let posts = parse_youtube_list(payload, now()).unwrap();
        assert_eq!(posts[0].engagement, 4);
    }
}

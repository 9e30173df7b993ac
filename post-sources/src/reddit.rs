use crate::time::{from_unix_seconds, relative_or_empty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use trendsift_core::{coerce_engagement, CoreError, Platform, Post, SourceError};
use url::Url;

const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub subreddit_name_prefixed: String,
    pub url: String,
    pub permalink: String,
    /// Counts and timestamps are kept raw: dumps carry nulls, floats and strings.
    pub created_utc: Value,
    pub score: Value,
    pub num_comments: Value,
    pub over_18: bool,
    pub stickied: bool,
}

impl RedditPostData {
    /// Upvote score (floored at zero) plus comment count.
    pub fn engagement(&self) -> u64 {
        coerce_engagement(&self.score).saturating_add(coerce_engagement(&self.num_comments))
    }

    fn created_seconds(&self) -> Option<f64> {
        match &self.created_utc {
            Value::String(s) => s.trim().parse().ok(),
            other => other.as_f64(),
        }
    }

    fn content(&self) -> String {
        let body = self.selftext.trim();
        if body.is_empty() {
            self.title.trim().to_string()
        } else {
            format!("{}\n{}", self.title.trim(), body)
        }
    }

    fn source(&self) -> String {
        if !self.subreddit_name_prefixed.is_empty() {
            self.subreddit_name_prefixed.clone()
        } else if !self.subreddit.is_empty() {
            format!("r/{}", self.subreddit)
        } else {
            String::new()
        }
    }

    fn link(&self) -> Option<String> {
        if !self.permalink.is_empty() {
            if let Ok(link) = Url::parse(REDDIT_WEB_BASE).and_then(|base| base.join(&self.permalink)) {
                return Some(link.to_string());
            }
        }
        Some(self.url.clone()).filter(|url| !url.is_empty())
    }

    /// Convert to a `Post`; `None` when the record has no id.
    pub fn to_post(&self, now: DateTime<Utc>) -> Option<Post> {
        if self.id.trim().is_empty() {
            return None;
        }

        Some(Post {
            id: self.id.clone(),
            content: self.content(),
            platform: Platform::Reddit,
            source: self.source(),
            engagement: self.engagement(),
            timestamp: relative_or_empty(
                self.created_seconds().and_then(from_unix_seconds),
                now,
            ),
            url: self.link(),
        })
    }
}

/// Map a Reddit search/listing response into posts, skipping unreadable children.
pub fn parse_reddit_listing(payload: Value, now: DateTime<Utc>) -> Result<Vec<Post>, CoreError> {
    let listing: RedditListing<Value> = serde_json::from_value(payload).map_err(|e| {
        CoreError::Source(SourceError::InvalidResponse {
            platform: Platform::Reddit.to_string(),
            details: format!("not a listing: {}", e),
        })
    })?;

    let posts: Vec<Post> = listing
        .data
        .children
        .into_iter()
        .filter_map(|child| {
            match serde_json::from_value::<RedditPostData>(child.data) {
                Ok(data) => data.to_post(now),
                Err(e) => {
                    warn!("Skipping unreadable Reddit child ({}): {}", child.kind, e);
                    None
                }
            }
        })
        .collect();

    debug!("Mapped {} Reddit posts", posts.len());
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_rfc3339;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        parse_rfc3339("2024-06-01T12:00:00Z").unwrap()
    }

    #[test]
    fn test_reddit_post_conversion() {
        let post_data = RedditPostData {
            id: "test123".to_string(),
            title: "Test Post".to_string(),
            selftext: "This is test content".to_string(),
            author: "test_user".to_string(),
            subreddit: "test".to_string(),
            subreddit_name_prefixed: "r/test".to_string(),
            url: "https://reddit.com/r/test/comments/test123".to_string(),
            permalink: "/r/test/comments/test123/test_post/".to_string(),
            created_utc: json!(1_717_232_400.0),
            score: json!(42),
            num_comments: json!(5),
            over_18: false,
            stickied: false,
        };

        let post = post_data.to_post(now()).unwrap();
        assert_eq!(post.id, "test123");
        assert_eq!(post.content, "Test Post\nThis is test content");
        assert_eq!(post.source, "r/test");
        assert_eq!(post.engagement, 47);
        assert_eq!(post.timestamp, "3h ago");
        assert_eq!(
            post.url.as_deref(),
            Some("https://www.reddit.com/r/test/comments/test123/test_post/")
        );
    }

    #[test]
    fn test_negative_score_floors_at_zero() {
        let data = RedditPostData {
            id: "neg".to_string(),
            score: json!(-12),
            num_comments: json!(3),
            ..Default::default()
        };
        assert_eq!(data.engagement(), 3);
    }

    #[test]
    fn test_listing_skips_bad_children() {
        let payload = json!({
            "kind": "Listing",
            "data": {
                "after": "t3_next",
                "children": [
                    {"kind": "t3", "data": {"id": "a1", "title": "Export is broken", "subreddit": "SaaS", "score": 10, "num_comments": 2}},
                    {"kind": "t3", "data": {"id": "a2", "title": 7}},
                    {"kind": "t3", "data": {"title": "no id here"}},
                    {"kind": "t3", "data": {"id": "a4", "title": "Link post", "url": "https://example.com/a"}}
                ]
            }
        });

        let posts = parse_reddit_listing(payload, now()).unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a4"]);
        assert_eq!(posts[0].source, "r/SaaS");
        assert_eq!(posts[0].engagement, 12);
        assert_eq!(posts[0].timestamp, "");
        assert_eq!(posts[1].url.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_loose_counts_are_coerced_not_dropped() {
        let payload = json!({
            "kind": "Listing",
            "data": {"children": [
                {"kind": "t3", "data": {"id": "a", "score": 10, "num_comments": null}},
                {"kind": "t3", "data": {"id": "b", "score": 2.0, "num_comments": 1}},
                {"kind": "t3", "data": {"id": "c", "score": "many", "num_comments": "4", "created_utc": "1717232400"}}
            ]}
        });

        let posts = parse_reddit_listing(payload, now()).unwrap();
        let engagement: Vec<(&str, u64)> =
            posts.iter().map(|p| (p.id.as_str(), p.engagement)).collect();
        assert_eq!(engagement, vec![("a", 10), ("b", 3), ("c", 4)]);
        assert_eq!(posts[2].timestamp, "3h ago");
    }

    #[test]
    fn test_huge_counts_saturate() {
        let data = RedditPostData {
            id: "big".to_string(),
            score: json!(u64::MAX),
            num_comments: json!(10),
            ..Default::default()
        };
        assert_eq!(data.engagement(), u64::MAX);
    }

    #[test]
    fn test_non_listing_is_invalid_response() {
        let err = parse_reddit_listing(json!({"error": 403}), now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Source(SourceError::InvalidResponse { .. })
        ));
    }
}

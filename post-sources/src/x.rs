use crate::time::{parse_rfc3339, relative_or_empty};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};
use trendsift_core::{coerce_engagement, CoreError, Platform, Post, SourceError};

const X_WEB_BASE: &str = "https://x.com";

/// Recent-search response body of the X API v2.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XSearchResponse {
    /// Absent when the search matched nothing.
    pub data: Vec<Value>,
    pub includes: XIncludes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XIncludes {
    pub users: Vec<XUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XUser {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XTweet {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<String>,
    pub public_metrics: XPublicMetrics,
}

/// Kept raw and coerced leniently; a bad count must not drop the tweet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XPublicMetrics {
    pub like_count: Value,
    pub retweet_count: Value,
    pub reply_count: Value,
    pub quote_count: Value,
}

impl XTweet {
    /// Likes plus retweets plus replies.
    pub fn engagement(&self) -> u64 {
        let m = &self.public_metrics;
        [&m.like_count, &m.retweet_count, &m.reply_count]
            .into_iter()
            .map(coerce_engagement)
            .fold(0u64, u64::saturating_add)
    }

    pub fn to_post(&self, username: Option<&str>, now: DateTime<Utc>) -> Option<Post> {
        if self.id.trim().is_empty() {
            return None;
        }

        let handle = username
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.author_id.clone());
        let source = handle
            .as_deref()
            .map(|h| format!("@{}", h))
            .unwrap_or_default();
        let url = match username.filter(|name| !name.is_empty()) {
            Some(name) => format!("{}/{}/status/{}", X_WEB_BASE, name, self.id),
            None => format!("{}/i/web/status/{}", X_WEB_BASE, self.id),
        };

        Some(Post {
            id: self.id.clone(),
            content: self.text.trim().to_string(),
            platform: Platform::X,
            source,
            engagement: self.engagement(),
            timestamp: relative_or_empty(
                self.created_at.as_deref().and_then(parse_rfc3339),
                now,
            ),
            url: Some(url),
        })
    }
}

/// Map an X recent-search response into posts, resolving authors from `includes.users`.
pub fn parse_x_search(payload: Value, now: DateTime<Utc>) -> Result<Vec<Post>, CoreError> {
    let response: XSearchResponse = serde_json::from_value(payload).map_err(|e| {
        CoreError::Source(SourceError::InvalidResponse {
            platform: Platform::X.to_string(),
            details: e.to_string(),
        })
    })?;

    let usernames: HashMap<&str, &str> = response
        .includes
        .users
        .iter()
        .map(|user| (user.id.as_str(), user.username.as_str()))
        .collect();

    let posts: Vec<Post> = response
        .data
        .iter()
        .filter_map(|record| match XTweet::deserialize(record) {
            Ok(tweet) => {
                let username = tweet
                    .author_id
                    .as_deref()
                    .and_then(|id| usernames.get(id).copied());
                tweet.to_post(username, now)
            }
            Err(e) => {
                warn!("Skipping unreadable tweet: {}", e);
                None
            }
        })
        .collect();

    debug!("Mapped {} X posts", posts.len());
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
    fn test_tweet_mapping_with_author() {
        let payload = json!({
            "data": [{
                "id": "1790",
                "text": "This new AI tool just dropped and it's insane!",
                "author_id": "42",
                "created_at": "2024-06-01T11:30:00.000Z",
                "public_metrics": {"like_count": 120, "retweet_count": 30, "reply_count": 8, "quote_count": 4}
            }],
            "includes": {"users": [{"id": "42", "username": "builder", "name": "Builder"}]},
            "meta": {"result_count": 1}
        });

        let posts = parse_x_search(payload, now()).unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.platform, Platform::X);
        assert_eq!(post.source, "@builder");
        assert_eq!(post.engagement, 158);
        assert_eq!(post.timestamp, "30m ago");
        assert_eq!(post.url.as_deref(), Some("https://x.com/builder/status/1790"));
    }

    #[test]
    fn test_unknown_author_falls_back_to_id() {
        let payload = json!({
            "data": [{"id": "7", "text": "hello", "author_id": "99"}]
        });
        let posts = parse_x_search(payload, now()).unwrap();
        assert_eq!(posts[0].source, "@99");
        assert_eq!(posts[0].engagement, 0);
        assert_eq!(posts[0].url.as_deref(), Some("https://x.com/i/web/status/7"));
    }

    #[test]
    fn test_empty_search_has_no_data() {
        let posts = parse_x_search(json!({"meta": {"result_count": 0}}), now()).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_tweet_without_id_is_skipped() {
        let payload = json!({
            "data": [
                {"id": "1", "text": "ok"},
                {"text": "no id"},
                {"id": 5, "text": "numeric id"}
            ]
        });
        let posts = parse_x_search(payload, now()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "1");
    }

    #[test]
    fn test_bad_counts_become_zero() {
        let payload = json!({
            "data": [{
                "id": "2",
                "text": "still here",
                "public_metrics": {"like_count": "many", "retweet_count": null, "reply_count": 3.0}
            }]
        });
        let posts = parse_x_search(payload, now()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].engagement, 3);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let tweet = XTweet {
            id: "9".to_string(),
            public_metrics: XPublicMetrics {
                like_count: json!(u64::MAX),
                retweet_count: json!(1),
                reply_count: json!(1),
                quote_count: Value::Null,
            },
            ..Default::default()
        };
        assert_eq!(tweet.engagement(), u64::MAX);
    }
}

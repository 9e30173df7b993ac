use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use tracing::warn;

/// Social platform a post was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    #[serde(alias = "twitter")]
    X,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Reddit, Platform::X, Platform::YouTube];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::X => "x",
            Platform::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reddit" => Ok(Platform::Reddit),
            "x" | "twitter" => Ok(Platform::X),
            "youtube" => Ok(Platform::YouTube),
            other => Err(CoreError::InvalidInput {
                message: format!("unknown platform '{}'", other),
            }),
        }
    }
}

/// Output bucket. `Category::ALL` is the fixed order used for tie-breaks and backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PainPoints,
    TrendingIdeas,
    ContentIdeas,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::PainPoints,
        Category::TrendingIdeas,
        Category::ContentIdeas,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::PainPoints => "Pain Points",
            Category::TrendingIdeas => "Trending Ideas",
            Category::ContentIdeas => "Content Ideas",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::PainPoints => "pain_points",
            Category::TrendingIdeas => "trending_ideas",
            Category::ContentIdeas => "content_ideas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScores<T> {
    pub pain: T,
    pub trending: T,
    pub content: T,
}

impl<T: Copy> CategoryScores<T> {
    pub fn splat(value: T) -> Self {
        Self {
            pain: value,
            trending: value,
            content: value,
        }
    }

    pub fn get(&self, category: Category) -> T {
        self[category]
    }

    pub fn map<U>(self, mut f: impl FnMut(Category, T) -> U) -> CategoryScores<U> {
        CategoryScores {
            pain: f(Category::PainPoints, self.pain),
            trending: f(Category::TrendingIdeas, self.trending),
            content: f(Category::ContentIdeas, self.content),
        }
    }
}

impl<T> Index<Category> for CategoryScores<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        match category {
            Category::PainPoints => &self.pain,
            Category::TrendingIdeas => &self.trending,
            Category::ContentIdeas => &self.content,
        }
    }
}

impl<T> IndexMut<Category> for CategoryScores<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::PainPoints => &mut self.pain,
            Category::TrendingIdeas => &mut self.trending,
            Category::ContentIdeas => &mut self.content,
        }
    }
}

/// A fetched social post. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPost")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub platform: Platform,
    pub source: String,
    pub engagement: u64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Untyped post record as delivered by the fetch layer.
///
/// Every field is optional so one bad record can be defaulted or rejected on its
/// own instead of failing the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPost {
    pub id: Value,
    pub content: Value,
    pub platform: Value,
    pub source: Value,
    pub engagement: Value,
    pub timestamp: Value,
    pub url: Value,
}

impl TryFrom<RawPost> for Post {
    type Error = CoreError;

    fn try_from(raw: RawPost) -> Result<Self, Self::Error> {
        let id = coerce_text(&raw.id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoreError::InvalidInput {
                message: "post is missing an id".to_string(),
            })?;

        let platform = match &raw.platform {
            Value::String(name) => name.parse::<Platform>()?,
            _ => {
                return Err(CoreError::InvalidInput {
                    message: format!("post {} has no platform", id),
                })
            }
        };

        Ok(Self {
            id,
            content: coerce_text(&raw.content).unwrap_or_default(),
            platform,
            source: coerce_text(&raw.source).unwrap_or_default(),
            engagement: coerce_engagement(&raw.engagement),
            timestamp: coerce_text(&raw.timestamp).unwrap_or_default(),
            url: coerce_text(&raw.url).filter(|url| !url.trim().is_empty()),
        })
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce an engagement value to a non-negative count.
///
/// Integers pass through, floats are truncated, numeric strings are parsed.
/// Anything negative, non-finite or non-numeric becomes 0.
pub fn coerce_engagement(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else {
                n.as_f64().map(float_to_count).unwrap_or(0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(float_to_count))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn float_to_count(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.trunc() as u64
    } else {
        0
    }
}

/// Parse a JSON array of post records, skipping records that cannot form a `Post`.
///
/// Only a non-array payload is an error.
pub fn parse_post_batch(payload: Value) -> Result<Vec<Post>, CoreError> {
    let Value::Array(records) = payload else {
        return Err(CoreError::InvalidInput {
            message: "expected a JSON array of posts".to_string(),
        });
    };

    let total = records.len();
    let posts: Vec<Post> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let parsed = serde_json::from_value::<RawPost>(record)
                .map_err(CoreError::from)
                .and_then(Post::try_from);
            match parsed {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("Skipping post record #{}: {}", position, e);
                    None
                }
            }
        })
        .collect();

    if posts.len() < total {
        warn!("Dropped {} of {} post records", total - posts.len(), total);
    }
    Ok(posts)
}

/// The three capped, pairwise-disjoint result lists of one classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPosts {
    pub pain_points: Vec<Post>,
    pub trending_ideas: Vec<Post>,
    pub content_ideas: Vec<Post>,
}

impl ClassifiedPosts {
    pub fn get(&self, category: Category) -> &[Post] {
        match category {
            Category::PainPoints => &self.pain_points,
            Category::TrendingIdeas => &self.trending_ideas,
            Category::ContentIdeas => &self.content_ideas,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Post])> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.pain_points.len() + self.trending_ideas.len() + self.content_ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

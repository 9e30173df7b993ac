use crate::reddit::parse_reddit_listing;
use crate::source::{PostSource, SearchQuery};
use crate::x::parse_x_search;
use crate::youtube::parse_youtube_list;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use trendsift_core::{parse_post_batch, CoreError, Platform, Post, SourceError};

/// Shape of a saved JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// A plain array of post records.
    Posts,
    Reddit,
    X,
    YouTube,
}

impl DumpFormat {
    pub fn label(&self) -> &'static str {
        match self {
            DumpFormat::Posts => "posts",
            DumpFormat::Reddit => Platform::Reddit.as_str(),
            DumpFormat::X => Platform::X.as_str(),
            DumpFormat::YouTube => Platform::YouTube.as_str(),
        }
    }
}

impl From<Platform> for DumpFormat {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Reddit => DumpFormat::Reddit,
            Platform::X => DumpFormat::X,
            Platform::YouTube => DumpFormat::YouTube,
        }
    }
}

/// A `PostSource` backed by a JSON file on disk: a saved platform search
/// response or an already-normalized post array.
#[derive(Debug, Clone)]
pub struct JsonDumpSource {
    path: PathBuf,
    format: DumpFormat,
    name: String,
}

impl JsonDumpSource {
    pub fn new(path: impl Into<PathBuf>, format: DumpFormat) -> Self {
        let path = path.into();
        let name = format!("{}:{}", format.label(), path.display());
        Self { path, format, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DumpFormat {
        self.format
    }

    /// Map an already-loaded payload; `now` anchors relative timestamps.
    pub fn parse(&self, payload: Value, now: DateTime<Utc>) -> Result<Vec<Post>, CoreError> {
        match self.format {
            DumpFormat::Posts => parse_post_batch(payload),
            DumpFormat::Reddit => parse_reddit_listing(payload, now),
            DumpFormat::X => parse_x_search(payload, now),
            DumpFormat::YouTube => parse_youtube_list(payload, now),
        }
    }
}

/// Transient read failures become retryable source errors; the rest stay `Io`.
fn read_error(error: io::Error, platform: &str) -> CoreError {
    match error.kind() {
        io::ErrorKind::TimedOut => CoreError::Source(SourceError::RequestTimeout {
            platform: platform.to_string(),
        }),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => {
            CoreError::Source(SourceError::Unavailable {
                platform: platform.to_string(),
            })
        }
        _ => CoreError::Io(error),
    }
}

#[async_trait]
impl PostSource for JsonDumpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Post>, CoreError> {
        debug!("Reading {} dump from {}", self.format.label(), self.path.display());
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| read_error(e, self.format.label()))?;

        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::Source(SourceError::InvalidResponse {
                platform: self.format.label().to_string(),
                details: format!("{}: {}", self.path.display(), e),
            })
        })?;

        let mut posts = self.parse(payload, Utc::now())?;
        if let Some(limit) = query.limit {
            posts.truncate(limit);
        }

        info!("{} yielded {} posts", self.name, posts.len());
        Ok(posts)
    }
}

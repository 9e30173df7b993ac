use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use trendsift_core::{CoreError, Post};

/// Recency window a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    Day,
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            other => Err(CoreError::InvalidInput {
                message: format!("unknown time filter '{}'", other),
            }),
        }
    }
}

/// What a caller is searching for across platforms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub time_filter: TimeFilter,
    #[serde(default)]
    pub language: Option<String>,
    /// Upper bound on posts returned per source.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_time_filter(mut self, time_filter: TimeFilter) -> Self {
        self.time_filter = time_filter;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Something that can produce posts for a query.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Label used in logs and failure reports.
    fn name(&self) -> &str;

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Post>, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_filter_parsing() {
        assert_eq!("Month".parse::<TimeFilter>().unwrap(), TimeFilter::Month);
        assert_eq!(" all ".parse::<TimeFilter>().unwrap(), TimeFilter::All);
        assert!("fortnight".parse::<TimeFilter>().is_err());
        assert_eq!(TimeFilter::default(), TimeFilter::Week);
    }

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::new("rust tooling")
            .with_time_filter(TimeFilter::Day)
            .with_language("en")
            .with_limit(25);

        assert_eq!(query.query, "rust tooling");
        assert_eq!(query.time_filter, TimeFilter::Day);
        assert_eq!(query.language.as_deref(), Some("en"));
        assert_eq!(query.limit, Some(25));
    }
}

use crate::retry::{execute_with_retry, RetryConfig};
use crate::source::{PostSource, SearchQuery};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};
use trendsift_core::{CoreError, ErrorExt, Post};

/// A source that still failed after its retries.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: CoreError,
}

/// Everything gathered from one fan-out.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Posts in source order, unique by id.
    pub posts: Vec<Post>,
    pub failures: Vec<SourceFailure>,
}

impl FetchOutcome {
    pub fn all_failed(&self) -> bool {
        self.posts.is_empty() && !self.failures.is_empty()
    }
}

/// Query every source concurrently and merge what comes back.
///
/// A failing source is logged and skipped; it never fails the whole fetch.
pub async fn fetch_all(
    sources: &[Box<dyn PostSource>],
    query: &SearchQuery,
    retry: &RetryConfig,
) -> FetchOutcome {
    let fetches = sources.iter().map(|source| async move {
        let result =
            execute_with_retry(source.name(), retry, || source.fetch(query)).await;
        (source.name().to_string(), result)
    });

    let results = join_all(fetches).await;

    let mut outcome = FetchOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;

    for (name, result) in results {
        match result {
            Ok(posts) => {
                for post in posts {
                    if seen.insert(post.id.clone()) {
                        outcome.posts.push(post);
                    } else {
                        duplicates += 1;
                    }
                }
            }
            Err(error) => {
                error.log_warn();
                warn!(source = %name, code = %error.error_code(), "Skipping source");
                outcome.failures.push(SourceFailure {
                    source: name,
                    error,
                });
            }
        }
    }

    if duplicates > 0 {
        warn!("Dropped {} posts with repeated ids across sources", duplicates);
    }
    info!(
        sources = sources.len(),
        failed = outcome.failures.len(),
        posts = outcome.posts.len(),
        "Fetch complete"
    );

    outcome
}

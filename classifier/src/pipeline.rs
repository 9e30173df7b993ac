use crate::allocator::{allocate, Allocation};
use crate::lexicon::LexiconSet;
use crate::scored::ScoredPost;
use crate::signals::SignalWeights;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};
use trendsift_core::{AppConfig, Category, ClassifiedPosts, Post};
use uuid::Uuid;

pub const DEFAULT_CAP: usize = 3;

/// Scores posts against the category lexicons and ranking signals, then
/// assigns them to capped, disjoint category lists.
///
/// Holds only immutable data; one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicons: Arc<LexiconSet>,
    weights: SignalWeights,
    cap: usize,
}

impl Classifier {
    pub fn new(lexicons: Arc<LexiconSet>, weights: SignalWeights, cap: usize) -> Self {
        Self {
            lexicons,
            weights,
            cap,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let lexicons = if config.lexicons.is_empty() {
            LexiconSet::shared()
        } else {
            Arc::new(LexiconSet::with_overrides(&config.lexicons))
        };

        Self::new(
            lexicons,
            SignalWeights::from(&config.signals),
            config.classifier.per_category_cap,
        )
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn lexicons(&self) -> &LexiconSet {
        &self.lexicons
    }

    pub fn weights(&self) -> &SignalWeights {
        &self.weights
    }

    pub fn score_post<'a>(&self, post: &'a Post, position: usize) -> ScoredPost<'a> {
        let lowered = post.content.to_lowercase();
        let raw = self.lexicons.score(&lowered);
        let scores = self.weights.augment(post, &lowered, raw);

        ScoredPost {
            post,
            position,
            raw,
            scores,
        }
    }

    /// Score every post, in input order. A repeated id keeps only its first occurrence.
    pub fn score_posts<'a>(&self, posts: &'a [Post]) -> Vec<ScoredPost<'a>> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(posts.len());

        posts
            .iter()
            .enumerate()
            .filter(|(position, post)| {
                let first = seen.insert(post.id.as_str());
                if !first {
                    warn!("Ignoring duplicate post id {} at position {}", post.id, position);
                }
                first
            })
            .map(|(position, post)| self.score_post(post, position))
            .collect()
    }

    /// Classify one search's posts. `query` is only used for logging.
    pub fn classify(&self, posts: &[Post], query: &str) -> ClassifiedPosts {
        let search_id = Uuid::new_v4();
        let span = info_span!("classify", %search_id, query = %query, posts = posts.len());
        let _guard = span.enter();

        let scored = self.score_posts(posts);
        debug!("Scored {} unique posts", scored.len());

        let allocation = allocate(&scored, self.cap);
        let result = collect_posts(&scored, &allocation);

        info!(
            pain_points = result.pain_points.len(),
            trending_ideas = result.trending_ideas.len(),
            content_ideas = result.content_ideas.len(),
            backfilled = allocation.backfilled.pain
                + allocation.backfilled.trending
                + allocation.backfilled.content,
            "Classification complete"
        );
        result
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            LexiconSet::shared(),
            SignalWeights::default(),
            DEFAULT_CAP,
        )
    }
}

fn collect_posts(scored: &[ScoredPost<'_>], allocation: &Allocation) -> ClassifiedPosts {
    let take = |category: Category| -> Vec<Post> {
        allocation.picks[category]
            .iter()
            .map(|&idx| scored[idx].post.clone())
            .collect()
    };

    ClassifiedPosts {
        pain_points: take(Category::PainPoints),
        trending_ideas: take(Category::TrendingIdeas),
        content_ideas: take(Category::ContentIdeas),
    }
}

/// Classify with the built-in lexicons, default signal weights and a cap of 3.
pub fn classify_posts(posts: &[Post], query: &str) -> ClassifiedPosts {
    Classifier::default().classify(posts, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendsift_core::Platform;

    fn post(id: &str, content: &str, engagement: u64) -> Post {
        Post {
            id: id.to_string(),
            content: content.to_string(),
            platform: Platform::Reddit,
            source: "r/test".to_string(),
            engagement,
            timestamp: "2h ago".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_score_post_uses_lowercased_content() {
        let classifier = Classifier::default();
        let p = post("a", "TERRIBLE Bug", 0);
        let scored = classifier.score_post(&p, 0);
        assert_eq!(scored.raw.pain, 6);
        assert!(scored.scores.pain > 6.0);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let classifier = Classifier::default();
        let posts = vec![
            post("same", "first copy", 1),
            post("other", "another", 2),
            post("same", "second copy", 99),
        ];
        let scored = classifier.score_posts(&posts);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].post.content, "first copy");
        assert_eq!(scored[1].position, 1);

        let result = classifier.classify(&posts, "dupes");
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn test_from_config_applies_cap_and_overrides() {
        let config = AppConfig::from_toml_str(
            r#"
            [classifier]
            per_category_cap = 1

            [lexicons.trending_ideas]
            "sold out" = 3
            "#,
        )
        .unwrap();
        let classifier = Classifier::from_config(&config);
        assert_eq!(classifier.cap(), 1);
        assert_eq!(
            classifier
                .lexicons()
                .get(Category::TrendingIdeas)
                .weight("sold out"),
            Some(3)
        );
    }

    #[test]
    fn test_default_classifiers_share_builtin_lexicons() {
        let first = Classifier::default();
        let second = Classifier::from_config(&AppConfig::default());
        assert!(std::ptr::eq(first.lexicons(), second.lexicons()));
        assert!(std::ptr::eq(first.lexicons(), LexiconSet::builtin()));
    }

    #[test]
    fn test_from_config_clamps_unvalidated_damping() {
        let mut config = AppConfig::default();
        config.signals.engagement_damping = 0.0;
        let classifier = Classifier::from_config(&config);

        let p = post("z", "nothing here", 0);
        let scored = classifier.score_post(&p, 0);
        for category in Category::ALL {
            assert!(scored.scores[category].is_finite());
        }
    }

    #[test]
    fn test_with_cap() {
        let posts: Vec<Post> = (0..10).map(|i| post(&i.to_string(), "", i)).collect();
        let result = Classifier::default().with_cap(2).classify(&posts, "cap");
        for (_, list) in result.iter() {
            assert_eq!(list.len(), 2);
        }
    }
}

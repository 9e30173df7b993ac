//! Top-k assignment of scored posts to the three categories.
//!
//! 1. Rank every post per category by final score (ties: engagement, then
//!    input position) and keep the top `cap` as provisional picks.
//! 2. A post picked by several categories stays only where its final score is
//!    highest; exact ties go to the earlier category in `Category::ALL`.
//! 3. Posts no category picked form the pool, ranked by engagement.
//! 4. Categories are backfilled from the pool in `Category::ALL` order until
//!    each holds `cap` posts or the pool runs dry.
//!
//! No post ends up in more than one category.

use crate::scored::ScoredPost;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use trendsift_core::{Category, CategoryScores};

/// Indices into the scored slice, per category, in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub picks: CategoryScores<Vec<usize>>,
    /// How many of each category's picks came from engagement backfill.
    pub backfilled: CategoryScores<usize>,
}

impl Allocation {
    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.picks[*c].len()).sum()
    }
}

/// Accumulator threaded through the backfill fold.
struct Backfill {
    picks: CategoryScores<Vec<usize>>,
    pool: VecDeque<usize>,
    backfilled: CategoryScores<usize>,
}

fn by_engagement(a: &ScoredPost<'_>, b: &ScoredPost<'_>) -> Ordering {
    b.post
        .engagement
        .cmp(&a.post.engagement)
        .then_with(|| a.position.cmp(&b.position))
}

/// Indices of `scored` ordered best-first for `category`.
pub fn rank_for(scored: &[ScoredPost<'_>], category: Category) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&scored[a], &scored[b]);
        b.scores[category]
            .total_cmp(&a.scores[category])
            .then_with(|| by_engagement(a, b))
    });
    order
}

pub fn allocate(scored: &[ScoredPost<'_>], cap: usize) -> Allocation {
    let mut provisional: CategoryScores<Vec<usize>> = CategoryScores::default();
    for category in Category::ALL {
        let mut ranked = rank_for(scored, category);
        ranked.truncate(cap);
        provisional[category] = ranked;
    }

    // Owner of each provisionally picked post: its strictly best category.
    let mut owners: HashMap<usize, Category> = HashMap::new();
    for category in Category::ALL {
        for &idx in &provisional[category] {
            let score = scored[idx].scores[category];
            owners
                .entry(idx)
                .and_modify(|owner| {
                    if score > scored[idx].scores[*owner] {
                        *owner = category;
                    }
                })
                .or_insert(category);
        }
    }

    let mut picks: CategoryScores<Vec<usize>> = CategoryScores::default();
    for category in Category::ALL {
        picks[category] = provisional[category]
            .iter()
            .copied()
            .filter(|idx| owners.get(idx) == Some(&category))
            .collect();
    }

    let mut pool: Vec<usize> = (0..scored.len())
        .filter(|idx| !owners.contains_key(idx))
        .collect();
    pool.sort_by(|&a, &b| by_engagement(&scored[a], &scored[b]));

    let initial = Backfill {
        picks,
        pool: pool.into(),
        backfilled: CategoryScores::splat(0),
    };

    let Backfill {
        mut picks,
        backfilled,
        ..
    } = Category::ALL
        .into_iter()
        .fold(initial, |mut acc, category| {
            while acc.picks[category].len() < cap {
                let Some(idx) = acc.pool.pop_front() else {
                    break;
                };
                acc.picks[category].push(idx);
                acc.backfilled[category] += 1;
            }
            acc
        });

    for category in Category::ALL {
        picks[category].truncate(cap);
    }

    Allocation { picks, backfilled }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendsift_core::{Platform, Post};

    fn make_posts(engagements: &[u64]) -> Vec<Post> {
        engagements
            .iter()
            .enumerate()
            .map(|(i, &engagement)| Post {
                id: format!("post-{}", i),
                content: String::new(),
                platform: Platform::Reddit,
                source: "r/test".to_string(),
                engagement,
                timestamp: String::new(),
                url: None,
            })
            .collect()
    }

    fn scored<'a>(posts: &'a [Post], scores: &[(f64, f64, f64)]) -> Vec<ScoredPost<'a>> {
        posts
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(position, (post, &(pain, trending, content)))| ScoredPost {
                post,
                position,
                raw: CategoryScores::splat(0),
                scores: CategoryScores {
                    pain,
                    trending,
                    content,
                },
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let allocation = allocate(&[], 3);
        assert_eq!(allocation.total(), 0);
        assert_eq!(allocation, Allocation::default());
    }

    #[test]
    fn test_zero_cap_yields_nothing() {
        let posts = make_posts(&[5, 4]);
        let scored = scored(&posts, &[(1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        assert_eq!(allocate(&scored, 0).total(), 0);
    }

    #[test]
    fn test_rank_ties_break_on_engagement_then_position() {
        let posts = make_posts(&[10, 20, 20, 5]);
        let scored = scored(&posts, &[(1.0, 0.0, 0.0); 4]);
        assert_eq!(rank_for(&scored, Category::PainPoints), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_overlap_goes_to_highest_score() {
        let posts = make_posts(&[5]);
        let scored = scored(&posts, &[(3.0, 0.0, 9.0)]);
        let allocation = allocate(&scored, 3);

        assert!(allocation.picks.pain.is_empty());
        assert!(allocation.picks.trending.is_empty());
        assert_eq!(allocation.picks.content, vec![0]);
    }

    #[test]
    fn test_exact_tie_goes_to_earlier_category() {
        let posts = make_posts(&[5]);
        let scored = scored(&posts, &[(0.0, 2.0, 2.0)]);
        let allocation = allocate(&scored, 3);
        assert_eq!(allocation.picks.trending, vec![0]);
        assert!(allocation.picks.content.is_empty());
    }

    #[test]
    fn test_backfill_in_fixed_order() {
        let posts = make_posts(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        let scored = scored(&posts, &[(0.0, 0.0, 0.0); 10]);
        let allocation = allocate(&scored, 3);

        assert_eq!(allocation.picks.pain, vec![0, 1, 2]);
        assert_eq!(allocation.picks.trending, vec![3, 4, 5]);
        assert_eq!(allocation.picks.content, vec![6, 7, 8]);
        assert_eq!(allocation.backfilled.pain, 0);
        assert_eq!(allocation.backfilled.trending, 3);
        assert_eq!(allocation.backfilled.content, 3);
    }

    #[test]
    fn test_displaced_posts_are_not_reused() {
        // Post 0 tops every category but may only be placed once.
        let posts = make_posts(&[1, 50, 40]);
        let scored = scored(
            &posts,
            &[(9.0, 8.0, 7.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0)],
        );
        let allocation = allocate(&scored, 1);

        assert_eq!(allocation.picks.pain, vec![0]);
        assert_eq!(allocation.picks.trending, vec![1]);
        assert_eq!(allocation.picks.content, vec![2]);
    }

    #[test]
    fn test_short_input_places_every_post_once() {
        let posts = make_posts(&[3, 2, 1, 7]);
        let scored = scored(
            &posts,
            &[
                (4.0, 0.0, 0.0),
                (5.0, 0.0, 0.0),
                (0.0, 0.0, 6.0),
                (0.0, 0.0, 0.0),
            ],
        );
        let allocation = allocate(&scored, 3);

        let mut placed: Vec<usize> = Category::ALL
            .iter()
            .flat_map(|c| allocation.picks[*c].clone())
            .collect();
        placed.sort_unstable();
        assert_eq!(placed, vec![0, 1, 2, 3]);
        for category in Category::ALL {
            assert!(allocation.picks[category].len() <= 3);
        }
    }
}

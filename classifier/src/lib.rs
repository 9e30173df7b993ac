//! Relevance-weighted classification of social posts into Pain Points,
//! Trending Ideas and Content Ideas.
//!
//! The pipeline is `Post[] → ScoredPost[] → ClassifiedPosts`:
//!
//! - [`lexicon`]: weighted keyword matches per category
//! - [`signals`]: engagement, punctuation, emotion and platform bonuses
//! - [`allocator`]: capped top-k per category with deduplication and backfill

pub mod allocator;
pub mod lexicon;
pub mod pipeline;
pub mod scored;
pub mod signals;

pub use allocator::{allocate, Allocation};
pub use lexicon::{Lexicon, LexiconSet};
pub use pipeline::{classify_posts, Classifier, DEFAULT_CAP};
pub use scored::ScoredPost;
pub use signals::SignalWeights;

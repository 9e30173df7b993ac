//! Weighted keyword lexicons, one per output category.
//!
//! A post's raw score for a category is the sum of the weights of every
//! distinct lexicon phrase that occurs as a substring of its lowercased
//! content. Repeating a phrase does not add to the score.
//!
//! Weights come in three tiers: 3 for strong signals, 2 for medium, 1 for weak.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use trendsift_core::{Category, CategoryScores, LexiconOverrides};

pub const PAIN_LEXICON: &[(&str, u32)] = &[
    // Strong
    ("problem", 3),
    ("issue", 3),
    ("frustrated", 3),
    ("hate", 3),
    ("terrible", 3),
    ("awful", 3),
    ("broken", 3),
    ("fail", 3),
    ("worst", 3),
    ("sucks", 3),
    ("disappointed", 3),
    ("angry", 3),
    ("upset", 3),
    ("complaint", 3),
    ("bug", 3),
    ("error", 3),
    ("glitch", 3),
    // Medium
    ("difficult", 2),
    ("hard", 2),
    ("struggle", 2),
    ("annoying", 2),
    ("slow", 2),
    ("expensive", 2),
    ("overpriced", 2),
    ("confused", 2),
    ("lost", 2),
    ("stuck", 2),
    // Weak
    ("can't", 1),
    ("won't", 1),
    ("doesn't work", 1),
    ("help me", 1),
    ("fix this", 1),
];

pub const TRENDING_LEXICON: &[(&str, u32)] = &[
    // Strong
    ("trending", 3),
    ("viral", 3),
    ("breaking", 3),
    ("huge", 3),
    ("massive", 3),
    ("insane", 3),
    ("crazy", 3),
    ("amazing", 3),
    ("incredible", 3),
    ("game changer", 3),
    ("revolutionary", 3),
    // Medium
    ("popular", 2),
    ("hot", 2),
    ("new", 2),
    ("latest", 2),
    ("everyone", 2),
    ("all over", 2),
    ("everywhere", 2),
    ("just dropped", 2),
    ("breakthrough", 2),
    ("innovative", 2),
    // Weak
    ("next level", 1),
    ("cutting edge", 1),
];

pub const CONTENT_LEXICON: &[(&str, u32)] = &[
    // Strong
    ("how to", 3),
    ("tutorial", 3),
    ("learn", 3),
    ("teach", 3),
    ("explain", 3),
    ("guide", 3),
    ("step by step", 3),
    ("tips", 3),
    ("tricks", 3),
    ("advice", 3),
    // Medium
    ("want to know", 2),
    ("help", 2),
    ("recommend", 2),
    ("suggest", 2),
    ("what is", 2),
    ("where to", 2),
    ("when to", 2),
    ("why", 2),
    ("best way", 2),
    // Weak
    ("beginner", 1),
    ("advanced", 1),
    ("pro tip", 1),
    ("expert", 1),
];

/// Phrase → weight table for one category. Phrases are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lexicon {
    entries: BTreeMap<String, u32>,
}

impl Lexicon {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut lexicon = Self::default();
        for (phrase, weight) in entries {
            lexicon.insert(phrase.as_ref(), weight);
        }
        lexicon
    }

    /// Add a phrase, replacing the weight if it is already present.
    pub fn insert(&mut self, phrase: &str, weight: u32) {
        self.entries.insert(phrase.trim().to_lowercase(), weight);
    }

    pub fn weight(&self, phrase: &str) -> Option<u32> {
        self.entries.get(&phrase.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(phrase, weight)| (phrase.as_str(), *weight))
    }

    /// Phrases found in `lowered`, with their weights.
    pub fn matches<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = (&'a str, u32)> + 'a {
        self.iter().filter(move |(phrase, _)| lowered.contains(phrase))
    }

    /// Sum of weights of the distinct phrases present in `lowered`.
    ///
    /// `lowered` must already be lowercase.
    pub fn score(&self, lowered: &str) -> u32 {
        self.matches(lowered).map(|(_, weight)| weight).sum()
    }
}

/// The three category lexicons used by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexiconSet {
    lexicons: CategoryScores<Lexicon>,
}

static BUILTIN: OnceLock<Arc<LexiconSet>> = OnceLock::new();

impl LexiconSet {
    pub fn new(pain: Lexicon, trending: Lexicon, content: Lexicon) -> Self {
        Self {
            lexicons: CategoryScores {
                pain,
                trending,
                content,
            },
        }
    }

    /// Built-in tables, built on first use and shared for the life of the process.
    pub fn builtin() -> &'static LexiconSet {
        Self::shared_builtin()
    }

    /// Handle to the built-in tables; every call returns the same allocation.
    pub fn shared() -> Arc<LexiconSet> {
        Arc::clone(Self::shared_builtin())
    }

    fn shared_builtin() -> &'static Arc<LexiconSet> {
        BUILTIN.get_or_init(|| {
            Arc::new(Self::new(
                Lexicon::from_entries(PAIN_LEXICON.iter().copied()),
                Lexicon::from_entries(TRENDING_LEXICON.iter().copied()),
                Lexicon::from_entries(CONTENT_LEXICON.iter().copied()),
            ))
        })
    }

    /// Built-in tables with configured entries merged on top.
    pub fn with_overrides(overrides: &LexiconOverrides) -> Self {
        let mut set = Self::builtin().clone();
        for category in Category::ALL {
            for (phrase, weight) in overrides.get(category) {
                set.lexicons[category].insert(phrase, *weight);
            }
        }
        set
    }

    pub fn get(&self, category: Category) -> &Lexicon {
        &self.lexicons[category]
    }

    /// Raw lexicon scores for lowercased content.
    pub fn score(&self, lowered: &str) -> CategoryScores<u32> {
        CategoryScores {
            pain: self.lexicons.pain.score(lowered),
            trending: self.lexicons.trending.score(lowered),
            content: self.lexicons.content.score(lowered),
        }
    }
}

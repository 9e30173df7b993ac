//! Non-lexical ranking signals layered on top of raw lexicon scores.
//!
//! ```text
//! shared   = ln(engagement + 1) / damping + platform_bonus
//! pain     = raw.pain     + shared + emotion?
//! trending = raw.trending + shared + exclamations × exclamation_weight + emotion?
//! content  = raw.content  + shared + questions × question_weight + emotion?
//! ```
//!
//! `emotion?` is `distinct emotion words × emotion_weight` for the categories
//! the emotion bonus is configured for (pain only by default). All weights are
//! non-negative, so a final score never drops below its raw score.

use tracing::warn;
use trendsift_core::{Category, CategoryScores, PlatformBonus, Post, SignalSettings};

pub const EMOTION_WORDS: &[&str] = &[
    "love",
    "hate",
    "amazing",
    "terrible",
    "awesome",
    "awful",
    "incredible",
    "horrible",
    "excited",
    "disappointed",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SignalWeights {
    pub engagement_damping: f64,
    pub question_weight: f64,
    pub exclamation_weight: f64,
    pub emotion_weight: f64,
    pub emotion_categories: CategoryScores<bool>,
    pub platform_bonus: PlatformBonus,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self::from(&SignalSettings::default())
    }
}

/// Settings built in code skip `AppConfig::validate`, so out-of-range values
/// are clamped here: bad damping falls back to the default, bad weights to 0.
impl From<&SignalSettings> for SignalWeights {
    fn from(settings: &SignalSettings) -> Self {
        let mut emotion_categories = CategoryScores::splat(false);
        for category in &settings.emotion_categories {
            emotion_categories[*category] = true;
        }

        let engagement_damping = if is_valid_damping(settings.engagement_damping) {
            settings.engagement_damping
        } else {
            let fallback = SignalSettings::default().engagement_damping;
            warn!(
                "engagement_damping {} is not positive, using {}",
                settings.engagement_damping, fallback
            );
            fallback
        };

        let bonus = &settings.platform_bonus;
        Self {
            engagement_damping,
            question_weight: non_negative(settings.question_weight),
            exclamation_weight: non_negative(settings.exclamation_weight),
            emotion_weight: non_negative(settings.emotion_weight),
            emotion_categories,
            platform_bonus: PlatformBonus {
                reddit: non_negative(bonus.reddit),
                x: non_negative(bonus.x),
                youtube: non_negative(bonus.youtube),
            },
        }
    }
}

fn is_valid_damping(damping: f64) -> bool {
    damping.is_finite() && damping > 0.0
}

fn non_negative(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Log-damped engagement: `ln(engagement + 1) / damping`. Zero when the
/// damping is not a positive finite number.
pub fn engagement_bonus(engagement: u64, damping: f64) -> f64 {
    if !is_valid_damping(damping) {
        return 0.0;
    }
    (engagement as f64).ln_1p() / damping
}

/// Number of distinct emotion words present in lowercased text.
pub fn count_emotion_words(lowered: &str) -> usize {
    EMOTION_WORDS
        .iter()
        .filter(|word| lowered.contains(*word))
        .count()
}

impl SignalWeights {
    /// Final per-category scores for a post whose lowercased content is `lowered`.
    pub fn augment(
        &self,
        post: &Post,
        lowered: &str,
        raw: CategoryScores<u32>,
    ) -> CategoryScores<f64> {
        let shared = engagement_bonus(post.engagement, self.engagement_damping)
            + self.platform_bonus.get(post.platform);
        let questions = lowered.matches('?').count() as f64;
        let exclamations = lowered.matches('!').count() as f64;
        let emotion = count_emotion_words(lowered) as f64 * self.emotion_weight;

        raw.map(|category, raw_score| {
            let mut score = f64::from(raw_score) + shared;
            match category {
                Category::ContentIdeas => score += questions * self.question_weight,
                Category::TrendingIdeas => score += exclamations * self.exclamation_weight,
                Category::PainPoints => {}
            }
            if self.emotion_categories[category] {
                score += emotion;
            }
            score
        })
    }
}

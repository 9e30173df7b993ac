//! Application configuration loaded from `trendsift.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock classifier. Example:
//!
//! ```toml
//! [classifier]
//! per_category_cap = 3
//!
//! [signals]
//! engagement_damping = 8.0
//! emotion_categories = ["pain_points"]
//!
//! [signals.platform_bonus]
//! reddit = 0.2
//! youtube = 0.2
//! x = 0.1
//!
//! [lexicons.content_ideas]
//! "walkthrough" = 2
//! ```

use crate::error::ConfigError;
use crate::types::{Category, Platform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable consulted when no config path is given explicitly.
pub const CONFIG_ENV_VAR: &str = "TRENDSIFT_CONFIG";

/// Largest weight accepted for a lexicon entry.
pub const MAX_LEXICON_WEIGHT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierSettings,
    pub signals: SignalSettings,
    pub lexicons: LexiconOverrides,
    pub sources: SourceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Maximum posts per output category.
    pub per_category_cap: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            per_category_cap: 3,
        }
    }
}

/// Tunable bonus magnitudes for the non-lexical ranking signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSettings {
    /// Divisor applied to `ln(engagement + 1)`.
    pub engagement_damping: f64,
    /// Added to the content score per `?`.
    pub question_weight: f64,
    /// Added to the trending score per `!`.
    pub exclamation_weight: f64,
    /// Added per distinct emotion word, to each of `emotion_categories`.
    pub emotion_weight: f64,
    pub emotion_categories: Vec<Category>,
    pub platform_bonus: PlatformBonus,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            engagement_damping: 8.0,
            question_weight: 0.5,
            exclamation_weight: 0.3,
            emotion_weight: 0.3,
            emotion_categories: vec![Category::PainPoints],
            platform_bonus: PlatformBonus::default(),
        }
    }
}

/// Per-platform boost added to every category score. Zero by default, so
/// unmatched posts rank purely by engagement; set it to favour a platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformBonus {
    pub reddit: f64,
    pub x: f64,
    pub youtube: f64,
}

impl PlatformBonus {
    pub fn get(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Reddit => self.reddit,
            Platform::X => self.x,
            Platform::YouTube => self.youtube,
        }
    }
}

/// Extra lexicon entries, merged over the built-in tables. An existing phrase
/// gets its weight replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconOverrides {
    pub pain_points: BTreeMap<String, u32>,
    pub trending_ideas: BTreeMap<String, u32>,
    pub content_ideas: BTreeMap<String, u32>,
}

impl LexiconOverrides {
    pub fn get(&self, category: Category) -> &BTreeMap<String, u32> {
        match category {
            Category::PainPoints => &self.pain_points,
            Category::TrendingIdeas => &self.trending_ideas,
            Category::ContentIdeas => &self.content_ideas,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
    }
}

/// Retry policy for post sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidFormat {
            details: format!("{}: {}", path.display(), e),
        })?;

        let config = Self::from_toml_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `explicit` if given, else from `$TRENDSIFT_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => {
                debug!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let signals = &self.signals;

        if !signals.engagement_damping.is_finite() || signals.engagement_damping <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "signals.engagement_damping".to_string(),
                value: signals.engagement_damping.to_string(),
            });
        }

        let weights = [
            ("signals.question_weight", signals.question_weight),
            ("signals.exclamation_weight", signals.exclamation_weight),
            ("signals.emotion_weight", signals.emotion_weight),
            ("signals.platform_bonus.reddit", signals.platform_bonus.reddit),
            ("signals.platform_bonus.x", signals.platform_bonus.x),
            ("signals.platform_bonus.youtube", signals.platform_bonus.youtube),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for category in Category::ALL {
            for (phrase, weight) in self.lexicons.get(category) {
                if phrase.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed {
                        reason: format!("empty phrase in lexicons.{}", category.key()),
                    });
                }
                if *weight == 0 || *weight > MAX_LEXICON_WEIGHT {
                    return Err(ConfigError::InvalidValue {
                        field: format!("lexicons.{}.\"{}\"", category.key(), phrase),
                        value: weight.to_string(),
                    });
                }
            }
        }

        if self.sources.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "sources.max_attempts must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

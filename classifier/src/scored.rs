use trendsift_core::{CategoryScores, Post};

/// A post with its scores for one classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPost<'a> {
    pub post: &'a Post,
    /// Index of the post in the caller's input.
    pub position: usize,
    /// Lexicon-only scores.
    pub raw: CategoryScores<u32>,
    /// Lexicon scores plus ranking signals.
    pub scores: CategoryScores<f64>,
}

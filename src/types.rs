// src/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One news article as delivered by the fetch collaborator.
/// `text` is the combined "title. summary" string; read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsDocument {
    pub date: NaiveDate, // calendar day, no time component
    pub text: String,
    pub source: Option<String>,
    pub url: Option<String>,
}

/// A news document with both model scores attached, 1:1 with the input row.
/// Transient: lives only for the duration of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub doc: NewsDocument,
    /// Lexicon compound score in [-1, 1].
    pub lexicon_score: f64,
    /// Signed neural score in [-1, 1] (label-mapped confidence).
    pub neural_score: f64,
}

impl ScoredDocument {
    pub fn score(&self, model: SentimentModel) -> f64 {
        match model {
            SentimentModel::Lexicon => self.lexicon_score,
            SentimentModel::Neural => self.neural_score,
        }
    }
}

/// Per-model summary statistics for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelDayStats {
    pub mean: f64,
    /// Sample standard deviation; 0.0 (never NaN) when fewer than 2 samples.
    pub std: f64,
    pub news_count: usize,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub net_sentiment: f64,
}

/// One row of the final daily feature table, keyed by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFeatureRow {
    pub date: NaiveDate,
    pub lexicon: ModelDayStats,
    pub neural: ModelDayStats,
}

/// One bar of the external close-price series (visualizer join input).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// The closed set of scoring strategies. Each carries its own ratio
/// thresholds; the asymmetry (lexicon dead zone vs. neural strict sign) is
/// deliberate and mirrors each scorer's output distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentModel {
    Lexicon,
    Neural,
}

impl SentimentModel {
    /// Scores strictly above this count toward the positive ratio.
    pub fn positive_threshold(self) -> f64 {
        match self {
            SentimentModel::Lexicon => 0.05,
            SentimentModel::Neural => 0.0,
        }
    }

    /// Scores strictly below this count toward the negative ratio.
    pub fn negative_threshold(self) -> f64 {
        match self {
            SentimentModel::Lexicon => -0.05,
            SentimentModel::Neural => 0.0,
        }
    }
}

/// Structural failures that must reach the caller instead of being absorbed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required column is absent from the input table (e.g. a cached file
    /// written by an older build). Fatal to the call.
    #[error("required column '{0}' missing from news table")]
    MissingColumn(&'static str),
}

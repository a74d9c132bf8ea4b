// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod config;
pub mod export;
pub mod fetch;
pub mod lexicon;
pub mod neural;
pub mod normalize;
pub mod pipeline;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::aggregate_daily;
pub use crate::config::PipelineConfig;
pub use crate::neural::{BatchedNeuralScorer, Classification, Classifier, SentimentLabel};
pub use crate::pipeline::SentimentProcessor;
pub use crate::types::{
    DailyFeatureRow, ModelDayStats, NewsDocument, PipelineError, PriceBar, ScoredDocument,
    SentimentModel,
};

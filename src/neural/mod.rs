// src/neural/mod.rs
//! Batched neural sentiment scoring.
//!
//! The classifier is built once (endpoint, model id, auth, timeouts are an
//! init-time decision) and invoked batch-by-batch over the full ordered run.
//! A failing batch degrades to neutral results for exactly its own items;
//! the run never aborts and output order always matches input order.

pub mod finbert;

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ClassifierConfig;

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "neural_batches_total",
            "Inference batches submitted to the classifier."
        );
        describe_counter!(
            "neural_batch_failures_total",
            "Batches degraded to neutral after an inference failure."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// One 3-way classification with model confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl Classification {
    /// The deterministic fallback used when a batch fails.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }

    /// Map the categorical result to a signed scalar in [-1, 1]:
    /// positive → +confidence, negative → −confidence, neutral → 0.
    pub fn signed_score(&self) -> f64 {
        let c = self.confidence.clamp(0.0, 1.0);
        match self.label {
            SentimentLabel::Positive => c,
            SentimentLabel::Negative => -c,
            SentimentLabel::Neutral => 0.0,
        }
    }
}

/// Low-level batch classifier. Separated behind a trait so tests inject
/// scripted or failing doubles.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one batch; must return exactly one result per input text.
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Classification>>;
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;

/// Always-neutral classifier used when no provider is configured.
pub struct DisabledClassifier;

#[async_trait::async_trait]
impl Classifier for DisabledClassifier {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Classification>> {
        Ok(vec![Classification::neutral(); texts.len()])
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Build the classifier once from config. Callers hold the resulting handle
/// by reference for the whole run.
pub fn build_classifier(cfg: &ClassifierConfig) -> DynClassifier {
    match cfg.provider.as_str() {
        "finbert-api" => Arc::new(finbert::FinbertClassifier::from_config(cfg)),
        _ => Arc::new(DisabledClassifier),
    }
}

/// Fixed-size batched scorer over the full ordered input of a run.
pub struct BatchedNeuralScorer {
    classifier: DynClassifier,
    batch_size: usize,
}

impl BatchedNeuralScorer {
    pub fn new(classifier: DynClassifier, batch_size: usize) -> Self {
        Self {
            classifier,
            // A zero batch size would loop forever on chunks().
            batch_size: batch_size.max(1),
        }
    }

    pub fn with_default_batch_size(classifier: DynClassifier) -> Self {
        Self::new(classifier, DEFAULT_BATCH_SIZE)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Classify every text, in order. Batches are submitted sequentially;
    /// results are concatenated so output index i belongs to input index i.
    ///
    /// Failure isolation: an inference error (or a malformed response with
    /// the wrong result count) downgrades that batch to neutral results and
    /// processing continues with the next batch.
    pub async fn classify_all(&self, texts: &[String]) -> Vec<Classification> {
        ensure_metrics_described();

        if texts.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(texts.len());
        for (batch_idx, batch) in texts.chunks(self.batch_size).enumerate() {
            counter!("neural_batches_total").increment(1);
            match self.classifier.classify_batch(batch).await {
                Ok(results) if results.len() == batch.len() => out.extend(results),
                Ok(results) => {
                    tracing::warn!(
                        batch = batch_idx,
                        expected = batch.len(),
                        got = results.len(),
                        classifier = self.classifier.name(),
                        "classifier returned wrong result count; batch degraded to neutral"
                    );
                    counter!("neural_batch_failures_total").increment(1);
                    out.extend(std::iter::repeat(Classification::neutral()).take(batch.len()));
                }
                Err(e) => {
                    tracing::warn!(
                        batch = batch_idx,
                        size = batch.len(),
                        classifier = self.classifier.name(),
                        error = ?e,
                        "batch inference failed; batch degraded to neutral"
                    );
                    counter!("neural_batch_failures_total").increment(1);
                    out.extend(std::iter::repeat(Classification::neutral()).take(batch.len()));
                }
            }
        }
        out
    }

    /// Convenience: signed scalar scores aligned with the input order.
    pub async fn score_all(&self, texts: &[String]) -> Vec<f64> {
        self.classify_all(texts)
            .await
            .iter()
            .map(Classification::signed_score)
            .collect()
    }
}

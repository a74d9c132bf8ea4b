// src/pipeline.rs
//! Scoring stage: normalize once, score with both models, zip 1:1.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::lexicon::LexiconScorer;
use crate::neural::BatchedNeuralScorer;
use crate::normalize::normalize;
use crate::types::{NewsDocument, ScoredDocument};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "documents_scored_total",
            "News documents scored by both models."
        );
    });
}

pub struct SentimentProcessor {
    lexicon: LexiconScorer,
    neural: BatchedNeuralScorer,
}

impl SentimentProcessor {
    pub fn new(neural: BatchedNeuralScorer) -> Self {
        Self {
            lexicon: LexiconScorer::new(),
            neural,
        }
    }

    /// Score every document with both models. Output is 1:1 with the input,
    /// in input order. An empty input is an empty output, not an error.
    pub async fn calculate_sentiments(&self, docs: &[NewsDocument]) -> Vec<ScoredDocument> {
        ensure_metrics_described();

        if docs.is_empty() {
            return Vec::new();
        }

        let normalized: Vec<String> = docs
            .iter()
            .map(|d| normalize(Some(&d.text)))
            .collect();

        let lexicon_scores: Vec<f64> = normalized
            .iter()
            .map(|t| self.lexicon.compound(t))
            .collect();

        info!(
            documents = docs.len(),
            batch_size = self.neural.batch_size(),
            "running batched neural inference"
        );
        let neural_scores = self.neural.score_all(&normalized).await;

        counter!("documents_scored_total").increment(docs.len() as u64);

        docs.iter()
            .zip(lexicon_scores)
            .zip(neural_scores)
            .map(|((doc, lexicon_score), neural_score)| ScoredDocument {
                doc: doc.clone(),
                lexicon_score,
                neural_score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::{BatchedNeuralScorer, Classification, Classifier, SentimentLabel};
    use anyhow::Result;
    use chrono::NaiveDate;
    use std::sync::Arc;

    /// Positive when the text mentions "up", negative on "down", else neutral.
    struct KeywordClassifier;

    #[async_trait::async_trait]
    impl Classifier for KeywordClassifier {
        async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Classification>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("up") {
                        Classification {
                            label: SentimentLabel::Positive,
                            confidence: 0.9,
                        }
                    } else if t.contains("down") {
                        Classification {
                            label: SentimentLabel::Negative,
                            confidence: 0.8,
                        }
                    } else {
                        Classification::neutral()
                    }
                })
                .collect())
        }
        fn name(&self) -> &'static str {
            "keyword"
        }
    }

    fn doc(text: &str) -> NewsDocument {
        NewsDocument {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            text: text.to_string(),
            source: Some("Test".to_string()),
            url: None,
        }
    }

    fn processor() -> SentimentProcessor {
        SentimentProcessor::new(BatchedNeuralScorer::new(Arc::new(KeywordClassifier), 2))
    }

    #[tokio::test]
    async fn empty_input_short_circuits() {
        let out = processor().calculate_sentiments(&[]).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn output_is_one_to_one_and_ordered() {
        let docs = vec![
            doc("Shares UP on strong profit"),
            doc("Index DOWN, heavy losses"),
            doc("Quarterly filing published"),
        ];
        let out = processor().calculate_sentiments(&docs).await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].doc, docs[0]);
        assert_eq!(out[0].neural_score, 0.9);
        assert!(out[0].lexicon_score > 0.0);
        assert_eq!(out[1].neural_score, -0.8);
        assert!(out[1].lexicon_score < 0.0);
        assert_eq!(out[2].neural_score, 0.0);
        assert_eq!(out[2].lexicon_score, 0.0);
    }

    #[tokio::test]
    async fn scorers_see_normalized_text() {
        // "UP" only matches the keyword classifier after lowercasing, and the
        // URL must not leak into scoring.
        let docs = vec![doc("UP https://example.com/down")];
        let out = processor().calculate_sentiments(&docs).await;
        assert_eq!(out[0].neural_score, 0.9);
    }

    #[tokio::test]
    async fn blank_document_scores_neutral_on_both_models() {
        let docs = vec![doc("  \n  ")];
        let out = processor().calculate_sentiments(&docs).await;
        assert_eq!(out[0].lexicon_score, 0.0);
        assert_eq!(out[0].neural_score, 0.0);
    }
}

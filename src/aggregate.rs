// src/aggregate.rs
//! Daily feature aggregation: one row per calendar date, per-model stats.
//!
//! Pure, no I/O. Convention: sample standard deviation (n-1), normalized to
//! 0.0 whenever a date has fewer than 2 documents, so the output table never
//! carries NaN.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{DailyFeatureRow, ModelDayStats, ScoredDocument, SentimentModel};

/// Group scored documents by date and compute per-model summary statistics.
/// Rows come out sorted ascending by date; a date appears only if at least
/// one document maps to it. Empty input is an empty table.
pub fn aggregate_daily(docs: &[ScoredDocument]) -> Vec<DailyFeatureRow> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ScoredDocument>> = BTreeMap::new();
    for d in docs {
        by_date.entry(d.doc.date).or_default().push(d);
    }

    by_date
        .into_iter()
        .map(|(date, day_docs)| DailyFeatureRow {
            date,
            lexicon: day_stats(&day_docs, SentimentModel::Lexicon),
            neural: day_stats(&day_docs, SentimentModel::Neural),
        })
        .collect()
}

fn day_stats(day_docs: &[&ScoredDocument], model: SentimentModel) -> ModelDayStats {
    let scores: Vec<f64> = day_docs.iter().map(|d| d.score(model)).collect();
    let n = scores.len();
    debug_assert!(n > 0, "a date row cannot exist without documents");

    let sum: f64 = scores.iter().sum();
    let mean = sum / n as f64;

    let std = if n < 2 {
        0.0
    } else {
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    };

    let pos = scores
        .iter()
        .filter(|&&s| s > model.positive_threshold())
        .count();
    let neg = scores
        .iter()
        .filter(|&&s| s < model.negative_threshold())
        .count();

    ModelDayStats {
        mean,
        std,
        news_count: n,
        positive_ratio: pos as f64 / n as f64,
        negative_ratio: neg as f64 / n as f64,
        net_sentiment: sum,
    }
}

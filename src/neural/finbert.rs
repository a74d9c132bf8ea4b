// src/neural/finbert.rs
//! Remote FinBERT classifier against a hosted inference endpoint.
//!
//! Requires `HF_API_TOKEN`. The endpoint returns, per input, a list of
//! (label, score) candidates; the top-scoring label is the classification.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ClassifierConfig;

use super::{Classification, Classifier, SentimentLabel};

const TOKEN_ENV: &str = "HF_API_TOKEN";

pub struct FinbertClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl FinbertClassifier {
    /// Build the classifier once from config; the endpoint, model id, auth
    /// and timeouts are fixed for the lifetime of the run.
    pub fn from_config(cfg: &ClassifierConfig) -> Self {
        let api_token = std::env::var(TOKEN_ENV).unwrap_or_default();
        if api_token.is_empty() {
            tracing::warn!(
                "{TOKEN_ENV} is not set; every inference batch will degrade to neutral"
            );
        }
        let http = reqwest::Client::builder()
            .user_agent("news-sentiment-pipeline/0.1")
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .expect("reqwest client");
        let endpoint = cfg
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://api-inference.huggingface.co/models/{}", cfg.model));
        Self {
            http,
            endpoint,
            api_token,
        }
    }

    async fn classify_remote(&self, texts: &[String]) -> Result<Vec<Classification>> {
        #[derive(Serialize)]
        struct Req<'a> {
            inputs: &'a [String],
            parameters: Params,
            options: Options,
        }
        #[derive(Serialize)]
        struct Params {
            truncation: bool,
        }
        #[derive(Serialize)]
        struct Options {
            wait_for_model: bool,
        }
        #[derive(Deserialize)]
        struct Candidate {
            label: String,
            score: f64,
        }

        let req = Req {
            inputs: texts,
            parameters: Params { truncation: true },
            options: Options {
                wait_for_model: true,
            },
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&req)
            .send()
            .await
            .context("sending inference request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("inference endpoint returned {status}");
        }

        let body: Vec<Vec<Candidate>> = resp
            .json()
            .await
            .context("decoding inference response")?;

        let mut out = Vec::with_capacity(body.len());
        for candidates in body {
            let top = candidates
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .context("empty candidate list in inference response")?;
            out.push(Classification {
                label: parse_label(&top.label)?,
                confidence: top.score.clamp(0.0, 1.0),
            });
        }
        Ok(out)
    }
}

fn parse_label(raw: &str) -> Result<SentimentLabel> {
    match raw.to_ascii_lowercase().as_str() {
        "positive" => Ok(SentimentLabel::Positive),
        "negative" => Ok(SentimentLabel::Negative),
        "neutral" => Ok(SentimentLabel::Neutral),
        other => bail!("unknown sentiment label '{other}' in inference response"),
    }
}

#[async_trait::async_trait]
impl Classifier for FinbertClassifier {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Classification>> {
        if self.api_token.is_empty() {
            bail!("{TOKEN_ENV} is not set");
        }

        // Empty strings are neutral by contract; only real text goes over
        // the wire, and results are re-seated at their original positions.
        let mut out = vec![Classification::neutral(); texts.len()];
        let (positions, payload): (Vec<usize>, Vec<String>) = texts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.trim().is_empty())
            .map(|(i, t)| (i, t.clone()))
            .unzip();

        if payload.is_empty() {
            return Ok(out);
        }

        let results = self.classify_remote(&payload).await?;
        if results.len() != payload.len() {
            bail!(
                "inference endpoint returned {} results for {} inputs",
                results.len(),
                payload.len()
            );
        }
        for (pos, res) in positions.into_iter().zip(results) {
            out[pos] = res;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "finbert-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(parse_label("Positive").unwrap(), SentimentLabel::Positive);
        assert_eq!(parse_label("NEGATIVE").unwrap(), SentimentLabel::Negative);
        assert_eq!(parse_label("neutral").unwrap(), SentimentLabel::Neutral);
        assert!(parse_label("mixed").is_err());
    }
}

//! News Sentiment Pipeline — Binary Entrypoint
//! Fetches financial news, scores it with the lexicon and neural models,
//! aggregates daily features, and writes the table for the visualizer.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_sentiment_pipeline::aggregate::aggregate_daily;
use news_sentiment_pipeline::config::PipelineConfig;
use news_sentiment_pipeline::export::write_features_csv;
use news_sentiment_pipeline::fetch::{cache, AlphaVantageClient, NewsQuery};
use news_sentiment_pipeline::neural::{build_classifier, BatchedNeuralScorer};
use news_sentiment_pipeline::pipeline::SentimentProcessor;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_sentiment_pipeline=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the variables come from the shell.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::load_default()?;
    let api_key =
        std::env::var("ALPHA_VANTAGE_API_KEY").context("ALPHA_VANTAGE_API_KEY must be set")?;
    let client = AlphaVantageClient::new(api_key)?;

    let query = NewsQuery {
        tickers: cfg.tickers.clone(),
        topics: cfg.topics.clone(),
        ..Default::default()
    };
    let news = cache::fetch_with_cache(&client, &cfg.cache_dir, &query).await?;
    info!(rows = news.len(), tickers = ?cfg.tickers, "news table ready");

    // Model/endpoint selection happens once, here.
    let classifier = build_classifier(&cfg.classifier);
    let scorer = BatchedNeuralScorer::new(classifier, cfg.batch_size);
    let processor = SentimentProcessor::new(scorer);

    let scored = processor.calculate_sentiments(&news).await;
    let rows = aggregate_daily(&scored);

    let prices = match &cfg.price_ticker {
        Some(ticker) => {
            let bars = client
                .fetch_prices(ticker)
                .await
                .with_context(|| format!("fetching close prices for {ticker}"))?;
            info!(ticker = %ticker, bars = bars.len(), "price series ready");
            Some(bars)
        }
        None => None,
    };

    write_features_csv(&cfg.output_path, &rows, prices.as_deref())?;
    info!(
        rows = rows.len(),
        output = %cfg.output_path.display(),
        "daily sentiment feature table written"
    );

    for row in &rows {
        println!(
            "{}  lexicon mean {:+.4} (n={})  neural mean {:+.4} (n={})",
            row.date,
            row.lexicon.mean,
            row.lexicon.news_count,
            row.neural.mean,
            row.neural.news_count
        );
    }

    Ok(())
}

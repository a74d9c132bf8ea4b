// src/fetch/cache.rs
//! Query-keyed disk cache for fetched news tables.
//!
//! Best-effort on write (a failed write never fails the run), authoritative
//! on hit. Cached records are revalidated on load so a file written by an
//! older build surfaces a shape error instead of scoring garbage.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;

use crate::types::{NewsDocument, PipelineError};

use super::{NewsQuery, NewsSource};

fn cache_key(query: &NewsQuery) -> String {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("news_{key}.json"))
}

/// Load a cached news table for `query`. `Ok(None)` on a miss; a present but
/// malformed file is an error (required column missing → `MissingColumn`).
pub fn lookup(dir: &Path, query: &NewsQuery) -> Result<Option<Vec<NewsDocument>>> {
    let path = cache_path(dir, &cache_key(query));
    let raw = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => return Ok(None),
    };
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing cached news table {}", path.display()))?;

    let mut docs = Vec::with_capacity(records.len());
    for rec in &records {
        docs.push(document_from_record(rec)?);
    }
    Ok(Some(docs))
}

fn document_from_record(rec: &Value) -> Result<NewsDocument> {
    let date_str = rec
        .get("date")
        .and_then(Value::as_str)
        .ok_or(PipelineError::MissingColumn("date"))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("parsing cached date '{date_str}'"))?;
    let text = rec
        .get("text")
        .and_then(Value::as_str)
        .ok_or(PipelineError::MissingColumn("text"))?
        .to_string();
    Ok(NewsDocument {
        date,
        text,
        source: rec.get("source").and_then(Value::as_str).map(str::to_string),
        url: rec.get("url").and_then(Value::as_str).map(str::to_string),
    })
}

/// Write the news table atomically (tmp file, then rename). Best-effort.
pub fn store(dir: &Path, query: &NewsQuery, docs: &[NewsDocument]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let path = cache_path(dir, &cache_key(query));
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(docs).unwrap_or_else(|_| "[]".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Fetch through the cache: return a cached table when present, otherwise
/// hit the source and cache the result.
pub async fn fetch_with_cache(
    source: &dyn NewsSource,
    dir: &Path,
    query: &NewsQuery,
) -> Result<Vec<NewsDocument>> {
    if let Some(docs) = lookup(dir, query)? {
        tracing::info!(rows = docs.len(), "news table served from cache");
        return Ok(docs);
    }

    let docs = source.fetch_news(query).await?;
    if let Err(e) = store(dir, query, &docs) {
        tracing::warn!(error = ?e, dir = %dir.display(), "failed to cache news table");
    }
    Ok(docs)
}

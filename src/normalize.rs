// src/normalize.rs
//! Text normalizer: canonical lowercase form fed to both scorers.
//!
//! Every step is total; the result may be empty and downstream scorers must
//! treat empty input as neutral.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").expect("url regex"));
static RE_TICKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\w+").expect("ticker regex"));
static RE_KEEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s.,]").expect("charset regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalize a raw headline+summary string. Missing input is treated as
/// empty. Steps, in order: lowercase, strip URLs, strip `$ticker` tokens,
/// newlines to spaces, drop anything outside `[a-z0-9 \s . ,]`, collapse
/// whitespace and trim.
pub fn normalize(raw: Option<&str>) -> String {
    let text = match raw {
        Some(t) => t,
        None => return String::new(),
    };

    let text = text.to_lowercase();
    let text = RE_URL.replace_all(&text, "");
    let text = RE_TICKER.replace_all(&text, "");
    let text = text.replace('\n', " ");
    let text = RE_KEEP.replace_all(&text, "");
    let text = RE_WS.replace_all(&text, " ");
    text.trim().to_string()
}

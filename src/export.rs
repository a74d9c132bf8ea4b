// src/export.rs
//! Tabular sink: the daily feature table as CSV, optionally with a
//! close-price column joined by exact date, ready for an external plotter.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::types::{DailyFeatureRow, ModelDayStats, PriceBar};

const HEADER: &str = "date,lexicon_mean,lexicon_std,lexicon_news_count,lexicon_positive_ratio,\
lexicon_negative_ratio,lexicon_net_sentiment,neural_mean,neural_std,neural_news_count,\
neural_positive_ratio,neural_negative_ratio,neural_net_sentiment";

/// Write the feature table to `path` (atomic: tmp file, then rename). When a
/// price series is given, a `close_price` column is appended and filled by
/// exact date equality; dates without a price keep their row with an empty
/// cell. An empty table writes a header-only file.
pub fn write_features_csv(
    path: &Path,
    rows: &[DailyFeatureRow],
    prices: Option<&[PriceBar]>,
) -> Result<()> {
    let by_date: Option<HashMap<NaiveDate, f64>> =
        prices.map(|bars| bars.iter().map(|b| (b.date, b.close)).collect());

    let mut out = String::new();
    out.push_str(HEADER);
    if by_date.is_some() {
        out.push_str(",close_price");
    }
    out.push('\n');

    for row in rows {
        out.push_str(&row.date.format("%Y-%m-%d").to_string());
        push_stats(&mut out, &row.lexicon);
        push_stats(&mut out, &row.neural);
        if let Some(map) = &by_date {
            out.push(',');
            if let Some(close) = map.get(&row.date) {
                out.push_str(&format!("{close}"));
            }
        }
        out.push('\n');
    }

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }
    }
    let tmp = path.with_extension("csv.tmp");
    let mut f = fs::File::create(&tmp)
        .with_context(|| format!("creating output file {}", tmp.display()))?;
    f.write_all(out.as_bytes()).context("writing feature table")?;
    fs::rename(&tmp, path).context("moving feature table into place")?;
    Ok(())
}

fn push_stats(out: &mut String, s: &ModelDayStats) {
    out.push_str(&format!(
        ",{},{},{},{},{},{}",
        s.mean, s.std, s.news_count, s.positive_ratio, s.negative_ratio, s.net_sentiment
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(y: i32, m: u32, d: u32) -> DailyFeatureRow {
        DailyFeatureRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            lexicon: ModelDayStats {
                mean: 0.25,
                std: 0.0,
                news_count: 2,
                positive_ratio: 0.5,
                negative_ratio: 0.0,
                net_sentiment: 0.5,
            },
            neural: ModelDayStats::default(),
        }
    }

    #[test]
    fn empty_table_writes_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("features.csv");
        write_features_csv(&path, &[], None).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("date,lexicon_mean"));
        assert!(!content.contains("close_price"));
    }

    #[test]
    fn joins_close_price_by_exact_date() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("features.csv");
        let rows = vec![row(2024, 1, 2), row(2024, 1, 3)];
        let prices = vec![
            PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                close: 185.1,
            },
            // 2024-01-04 has no feature row and must not appear.
            PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                close: 190.0,
            },
        ];
        write_features_csv(&path, &rows, Some(&prices)).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(",close_price"));
        assert!(lines[1].starts_with("2024-01-02,"));
        assert!(lines[1].ends_with(",185.1"));
        // Row kept, price cell empty.
        assert!(lines[2].starts_with("2024-01-03,"));
        assert!(lines[2].ends_with(','));
        assert!(!content.contains("190"));
    }

    #[test]
    fn stat_columns_line_up_with_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("features.csv");
        write_features_csv(&path, &[row(2024, 1, 2)], None).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0].split(',').count(),
            lines[1].split(',').count(),
        );
        assert_eq!(lines[1].split(',').count(), 13);
    }
}

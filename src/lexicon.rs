// src/lexicon.rs
//! Rule-based compound sentiment scorer.
//!
//! Word valences come from the embedded `sentiment_lexicon.json`; the score
//! combines them with look-back negation, intensifier scaling, and
//! exclamation emphasis, then squashes the sum into [-1, 1] with the usual
//! `x / sqrt(x^2 + 15)` normalization.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

/// Negation multiplier applied when a negator appears within the previous
/// three tokens.
const NEGATION_SCALAR: f64 = -0.74;
/// Base magnitude of an intensifier's contribution.
const BOOST_SCALAR: f64 = 0.293;
/// Per-exclamation emphasis, capped at four marks.
const EXCLAMATION_BOOST: f64 = 0.292;
/// Denominator constant of the compound normalization.
const NORM_ALPHA: f64 = 15.0;

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Compound polarity of a normalized text in [-1, 1]. Pure, no I/O.
    /// Empty input scores 0.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();

        let mut sum = 0.0f64;
        for i in 0..tokens.len() {
            let mut valence = match LEXICON.get(tokens[i].as_str()) {
                Some(v) => *v,
                None => continue,
            };

            // Intensifiers in the 3-token look-back window, scaled down with
            // distance. A booster that is itself a lexicon word contributes
            // its own valence instead.
            for k in 1..=3usize {
                if i < k {
                    break;
                }
                let prev = tokens[i - k].as_str();
                if LEXICON.contains_key(prev) {
                    continue;
                }
                if let Some(boost) = booster_scalar(prev) {
                    let decayed = boost * distance_decay(k);
                    sum_boost(&mut valence, decayed);
                }
            }

            // Negation flips and damps.
            let negated = (1..=3usize).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }

        // Punctuation emphasis on the raw input. Dormant for normalized text
        // (the normalizer strips '!'), kept as part of the scorer contract.
        let bangs = text.chars().filter(|&c| c == '!').count().min(4);
        let emphasis = bangs as f64 * EXCLAMATION_BOOST;
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }

        let compound = sum / (sum * sum + NORM_ALPHA).sqrt();
        compound.clamp(-1.0, 1.0)
    }
}

/// Sign-aligned booster application: intensifying a negative word pushes the
/// valence further negative.
fn sum_boost(valence: &mut f64, boost: f64) {
    if *valence < 0.0 {
        *valence -= boost;
    } else {
        *valence += boost;
    }
}

fn distance_decay(k: usize) -> f64 {
    match k {
        1 => 1.0,
        2 => 0.95,
        _ => 0.9,
    }
}

fn booster_scalar(tok: &str) -> Option<f64> {
    match tok {
        "very" | "really" | "extremely" | "incredibly" | "hugely" | "sharply"
        | "significantly" | "strongly" | "substantially" | "massively" => Some(BOOST_SCALAR),
        "slightly" | "somewhat" | "barely" | "marginally" | "mildly" | "partly" | "modestly" => {
            Some(-BOOST_SCALAR)
        }
        _ => None,
    }
}

/// Negators as they survive normalization (apostrophes are stripped, so
/// "isn't" arrives as "isnt").
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "neither"
            | "nor"
            | "cannot"
            | "cant"
            | "wont"
            | "isnt"
            | "wasnt"
            | "arent"
            | "dont"
            | "doesnt"
            | "didnt"
            | "without"
    )
}

/// Alphanumeric tokens, lower-cased (input is normally lower-case already).
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        let s = LexiconScorer::new();
        assert_eq!(s.compound(""), 0.0);
        assert_eq!(s.compound("   "), 0.0);
    }

    #[test]
    fn unknown_words_are_neutral() {
        let s = LexiconScorer::new();
        assert_eq!(s.compound("the quarterly filing was published"), 0.0);
    }

    #[test]
    fn positive_and_negative_words_have_the_right_sign() {
        let s = LexiconScorer::new();
        assert!(s.compound("shares rally on strong profit growth") > 0.0);
        assert!(s.compound("stock plunges after bankruptcy fears") < 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        let s = LexiconScorer::new();
        let plain = s.compound("profit growth");
        let negated = s.compound("no profit growth");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
        // Damped, not a mirror image.
        assert!(negated.abs() < plain.abs());
    }

    #[test]
    fn intensifier_amplifies() {
        let s = LexiconScorer::new();
        let plain = s.compound("good results");
        let boosted = s.compound("extremely good results");
        assert!(boosted > plain);
    }

    #[test]
    fn dampener_softens() {
        let s = LexiconScorer::new();
        let plain = s.compound("good results");
        let damped = s.compound("slightly good results");
        assert!(damped < plain);
        assert!(damped > 0.0);
    }

    #[test]
    fn exclamation_emphasis_raises_magnitude() {
        let s = LexiconScorer::new();
        // Raw (pre-normalization) text keeps its punctuation.
        let plain = s.compound("great earnings");
        let excited = s.compound("great earnings!!");
        assert!(excited > plain);
    }

    #[test]
    fn always_within_unit_interval() {
        let s = LexiconScorer::new();
        let long_pos = "gain ".repeat(200);
        let long_neg = "loss ".repeat(200);
        assert!(s.compound(&long_pos) <= 1.0);
        assert!(s.compound(&long_neg) >= -1.0);
        assert!(s.compound(&long_pos) > 0.9);
        assert!(s.compound(&long_neg) < -0.9);
    }
}

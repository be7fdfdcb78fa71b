use std::collections::HashMap;
use std::sync::OnceLock;

use crate::data_models::ScrapedPage;

pub const DEFAULT_SCORE: i32 = 50;

const GOVERNMENT_SUFFIXES: &[&str] = &[".gov", ".nic.in"];
const GOVERNMENT_BONUS: i32 = 30;

const ACADEMIC_SUFFIXES: &[&str] = &[".edu", ".ac.in"];
const ACADEMIC_BONUS: i32 = 25;

const SELF_PUBLISHING: &[&str] = &["medium.com", ".blog", "wordpress.com"];
const SELF_PUBLISHING_PENALTY: i32 = 25;

const SOCIAL_PLATFORMS: &[&str] = &["reddit.com", "quora.com", "facebook.com", "twitter.com"];
const SOCIAL_PENALTY: i32 = 35;

const META_BONUS: i32 = 5;

const LONG_TEXT_CHARS: usize = 1200;
const LONG_TEXT_BONUS: i32 = 10;
const SHORT_TEXT_CHARS: usize = 200;
const SHORT_TEXT_PENALTY: i32 = 10;

static TRUSTED_OUTLETS: OnceLock<HashMap<&'static str, i32>> = OnceLock::new();

pub fn trusted_outlets() -> &'static HashMap<&'static str, i32> {
    TRUSTED_OUTLETS.get_or_init(|| {
        HashMap::from([
            // India
            ("thehindu.com", 90),
            ("indianexpress.com", 88),
            ("hindustantimes.com", 85),
            ("timesofindia.indiatimes.com", 85),
            ("ndtv.com", 83),
            ("indiatoday.in", 85),
            ("thewire.in", 82),
            ("scroll.in", 80),
            ("business-standard.com", 82),
            ("livemint.com", 82),
            // International
            ("reuters.com", 95),
            ("bbc.com", 92),
            ("nytimes.com", 90),
            ("theguardian.com", 88),
            ("aljazeera.com", 85),
            ("wikipedia.org", 75),
        ])
    })
}

/// Heuristic trust score in `[0, 100]` for a source, from its domain and what
/// was scraped off the page. Pure: the same inputs always give the same score.
pub fn score(domain: &str, scraped: &ScrapedPage) -> u8 {
    let domain = domain.to_lowercase();
    let mut score = trusted_outlets()
        .get(domain.as_str())
        .copied()
        .unwrap_or(DEFAULT_SCORE);

    if GOVERNMENT_SUFFIXES.iter().any(|s| domain.ends_with(s)) {
        score += GOVERNMENT_BONUS;
    } else if ACADEMIC_SUFFIXES.iter().any(|s| domain.ends_with(s)) {
        score += ACADEMIC_BONUS;
    }

    if SELF_PUBLISHING.iter().any(|s| domain.contains(s)) {
        score -= SELF_PUBLISHING_PENALTY;
    }
    if SOCIAL_PLATFORMS.iter().any(|s| domain.contains(s)) {
        score -= SOCIAL_PENALTY;
    }

    if !scraped.meta.is_empty() {
        score += META_BONUS;
    }

    // An unreachable page has no text, so it always lands in the short bucket.
    let text_len = scraped.text.chars().count();
    if text_len > LONG_TEXT_CHARS {
        score += LONG_TEXT_BONUS;
    } else if text_len < SHORT_TEXT_CHARS {
        score -= SHORT_TEXT_PENALTY;
    }

    score.clamp(0, 100) as u8
}

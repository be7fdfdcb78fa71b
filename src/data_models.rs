use serde::{Deserialize, Serialize};
use std::fmt;

/// One organic result from the search collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// What the scraper could pull out of a single page. All fields are empty when
/// the fetch or the parse failed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub title: String,
    pub meta: String,
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Evidence {
    pub url: String,
    pub title: String,
    pub meta: String,
    pub text: String,
    pub domain: String,
    pub credibility: u8,
}

impl Evidence {
    /// Merges a search hit with its scraped page. Scraped title and meta win;
    /// the hit's title and snippet fill in when the page yielded nothing.
    pub fn new(hit: SearchHit, page: ScrapedPage, domain: String, credibility: u8) -> Evidence {
        let title = if page.title.is_empty() {
            hit.title
        } else {
            page.title
        };
        let meta = if page.meta.is_empty() {
            hit.snippet
        } else {
            page.meta
        };
        Evidence {
            url: hit.url,
            title,
            meta,
            text: page.text,
            domain,
            credibility: credibility.min(100),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Supports,
    Refutes,
    Mixture,
    #[default]
    Insufficient,
}

impl Stance {
    /// Lenient mapping from model output. Anything unrecognised is `Insufficient`.
    pub fn from_label(raw: &str) -> Stance {
        match raw.trim().to_lowercase().as_str() {
            "supports" => Stance::Supports,
            "refutes" => Stance::Refutes,
            "mixture" => Stance::Mixture,
            _ => Stance::Insufficient,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Supports => "supports",
            Stance::Refutes => "refutes",
            Stance::Mixture => "mixture",
            Stance::Insufficient => "insufficient",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Verdict {
    pub stance: Stance,
    pub confidence: u8,
    pub explanation: String,
    pub top_sources: Vec<String>,
}

impl Verdict {
    pub const DEGRADED_CONFIDENCE: u8 = 50;

    /// The verdict used whenever no judgment could be obtained.
    pub fn degraded(explanation: impl Into<String>, sources: &[Evidence]) -> Verdict {
        Verdict {
            stance: Stance::Insufficient,
            confidence: Self::DEGRADED_CONFIDENCE,
            explanation: explanation.into(),
            top_sources: sources.iter().map(|e| e.url.clone()).collect(),
        }
    }
}

/// Result of one pipeline run: the judgment plus the ranked sources it was based on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FactCheckOutcome {
    pub verdict: Verdict,
    pub sources: Vec<Evidence>,
}

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::data_models::{FactCheckOutcome, Stance};

impl Stance {
    /// Label shown to end users.
    pub fn label(&self) -> &'static str {
        match self {
            Stance::Supports => "Reliable",
            Stance::Refutes => "Unreliable",
            Stance::Mixture => "Mixed Evidence",
            Stance::Insufficient => "Not Enough Evidence",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Stance::Supports => "verdict-reliable",
            Stance::Refutes => "verdict-unreliable",
            Stance::Mixture => "verdict-mixed",
            Stance::Insufficient => "verdict-not-enough-evidence",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReportSource {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub credibility: u8,
}

/// Downloadable summary of one analysis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub claim: String,
    pub verdict: String,
    pub verdict_class: String,
    pub stance: Stance,
    pub credibility_score: u8,
    pub explanation: String,
    pub top_sources: Vec<String>,
    pub sources: Vec<ReportSource>,
    pub generated_at: DateTime<Local>,
}

impl Report {
    pub fn from_outcome(claim: &str, outcome: &FactCheckOutcome) -> Report {
        Self::from_outcome_at(claim, outcome, Local::now())
    }

    pub fn from_outcome_at(claim: &str, outcome: &FactCheckOutcome, at: DateTime<Local>) -> Report {
        let verdict = &outcome.verdict;
        Report {
            claim: claim.to_string(),
            verdict: verdict.stance.label().to_string(),
            verdict_class: verdict.stance.css_class().to_string(),
            stance: verdict.stance,
            credibility_score: verdict.confidence,
            explanation: verdict.explanation.clone(),
            top_sources: verdict.top_sources.clone(),
            sources: outcome
                .sources
                .iter()
                .map(|e| ReportSource {
                    title: e.title.clone(),
                    url: e.url.clone(),
                    domain: e.domain.clone(),
                    credibility: e.credibility,
                })
                .collect(),
            generated_at: at,
        }
    }

    /// `analysis_YYYYmmdd_HHMMSS.json`, stamped with the local generation time.
    pub fn file_name(&self) -> String {
        format!("analysis_{}.json", self.generated_at.format("%Y%m%d_%H%M%S"))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

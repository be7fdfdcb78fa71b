use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

use crate::config::{Config, PipelineSettings};
use crate::credibility;
use crate::data_models::{Evidence, FactCheckOutcome, ScrapedPage, SearchHit, Verdict};
use crate::domain::domain_from_url;
use crate::error::Result;
use crate::reasoning::{GeminiModel, ReasoningModel, parse_verdict};
use crate::scrapper::{PageFetcher, Scrapper, truncate_chars};
use crate::search::{GoogleSearch, SearchProvider};

/// Runs claim → search → scrape → score → rank → judge.
///
/// Holds no per-run state, so one instance can serve concurrent runs.
pub struct FactChecker {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    reasoner: Arc<dyn ReasoningModel>,
    settings: PipelineSettings,
}

impl FactChecker {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        reasoner: Arc<dyn ReasoningModel>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            search,
            fetcher,
            reasoner,
            settings,
        }
    }

    /// Wires up the Google search, HTTP scraper and Gemini collaborators.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = GoogleSearch::new(
            &config.google_api_key,
            &config.google_cse_id,
            config.scrape.timeout,
        )?;
        let fetcher = Scrapper::new(&config.scrape)?;
        let reasoner = GeminiModel::new(
            &config.gemini_api_key,
            &config.gemini_model,
            config.reasoning_timeout,
        )?;
        Ok(Self::new(
            Arc::new(search),
            Arc::new(fetcher),
            Arc::new(reasoner),
            config.pipeline.clone(),
        ))
    }

    /// Runs the whole pipeline for `claim`. Never fails: every collaborator error
    /// ends up as a degraded verdict or as missing evidence.
    pub async fn run(&self, claim: &str) -> FactCheckOutcome {
        let started = std::time::Instant::now();

        let evidence = match self.collect_evidence(claim).await {
            Ok(evidence) if !evidence.is_empty() => evidence,
            Ok(_) => return self.without_evidence(NO_EVIDENCE.to_string(), started),
            Err(e) => return self.without_evidence(e.to_string(), started),
        };

        let sources = rank_evidence(evidence, self.settings.digest_size);
        let digest = render_digest(&sources, self.settings.snippet_chars);
        let prompt = build_prompt(claim, &digest);

        let verdict = match self.judge(&prompt).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "judgment unavailable, returning degraded verdict");
                Verdict::degraded(e.to_string(), &sources)
            }
        };

        tracing::info!(
            stance = %verdict.stance,
            confidence = verdict.confidence,
            sources = sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fact check finished"
        );
        FactCheckOutcome { verdict, sources }
    }

    fn without_evidence(&self, explanation: String, started: std::time::Instant) -> FactCheckOutcome {
        tracing::info!(
            reason = %explanation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "no evidence, skipping judgment"
        );
        FactCheckOutcome {
            verdict: Verdict::degraded(explanation, &[]),
            sources: Vec::new(),
        }
    }

    async fn judge(&self, prompt: &str) -> Result<Verdict> {
        let raw = self.reasoner.complete(prompt).await?;
        parse_verdict(&raw)
    }

    /// Searches for `claim` and turns every usable hit into scored evidence, in
    /// search order. A failed search is returned as an error; a failed scrape
    /// still yields evidence, scored on the domain alone.
    pub async fn collect_evidence(&self, claim: &str) -> Result<Vec<Evidence>> {
        let hits = self
            .search
            .search(claim, self.settings.max_search_results)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "search failed"))?;

        let usable: Vec<SearchHit> = hits
            .into_iter()
            .filter(|h| !h.url.trim().is_empty())
            .take(self.settings.max_search_results)
            .collect();
        tracing::debug!(hits = usable.len(), "scraping search hits");

        // each scrape starts at least `delay` after the previous one started
        let delay = self.settings.request_delay;
        let last_start: Mutex<Option<Instant>> = Mutex::new(None);
        let last_start = &last_start;
        let evidence = stream::iter(usable)
            .map(|hit| async move {
                let slot = {
                    let mut last = last_start.lock().await;
                    let now = Instant::now();
                    let slot = last.map_or(now, |prev| (prev + delay).max(now));
                    *last = Some(slot);
                    slot
                };
                sleep_until(slot).await;
                self.build_evidence(hit).await
            })
            .buffered(self.settings.scrape_concurrency.max(1))
            .collect::<Vec<Evidence>>()
            .await;
        Ok(evidence)
    }

    async fn build_evidence(&self, hit: SearchHit) -> Evidence {
        let page = match self.fetcher.fetch(&hit.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %hit.url, error = %e, "scrape failed, scoring on domain only");
                ScrapedPage::default()
            }
        };
        let domain = domain_from_url(&hit.url);
        let credibility = credibility::score(&domain, &page);
        tracing::debug!(url = %hit.url, %domain, credibility, "scored source");
        Evidence::new(hit, page, domain, credibility)
    }
}

/// Explanation used when the search succeeded but produced nothing to judge.
pub const NO_EVIDENCE: &str = "no evidence found for the claim";

/// Highest credibility first, keeping collection order among equal scores.
pub fn rank_evidence(mut evidence: Vec<Evidence>, k: usize) -> Vec<Evidence> {
    // sort_by is stable
    evidence.sort_by(|a, b| b.credibility.cmp(&a.credibility));
    evidence.truncate(k);
    evidence
}

pub fn render_digest(evidence: &[Evidence], snippet_chars: usize) -> String {
    evidence
        .iter()
        .map(|e| {
            let snippet = if e.meta.is_empty() {
                truncate_chars(&e.text, snippet_chars)
            } else {
                e.meta.clone()
            };
            format!(
                "- Title: {}\n  URL: {}\n  Credibility: {}\n  Snippet: {}",
                e.title, e.url, e.credibility, snippet
            )
        })
        .collect::<Vec<String>>()
        .join("\n\n")
}

pub fn build_prompt(claim: &str, digest: &str) -> String {
    format!(
        r#"You are a fact-checking assistant.

Claim: "{claim}"

Evidence collected:
{digest}

Task:
1. Based on the evidence, give a final stance: supports / refutes / mixture / insufficient.
2. Provide a confidence score (0-100).
3. Write a short 3-5 line explanation.
4. Highlight which top 3 sources were most influential.

Output Requirements:
- Respond ONLY with a single valid JSON object.
- Do NOT use Markdown formatting, code blocks, or backticks.
- Do NOT include any text before or after the JSON.
- The response MUST be parseable as JSON without modification.

JSON Keys: stance, confidence, explanation, top_sources
- stance: one of "supports", "refutes", "mixture", "insufficient"
- confidence: integer from 0 to 100
- explanation: string
- top_sources: array of source URLs
"#
    )
}

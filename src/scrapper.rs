use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::config::ScrapeConfig;
use crate::data_models::ScrapedPage;
use crate::error::{FactCheckError, Result};

pub const MAX_TEXT_CHARS: usize = 3000;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static META_DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Turns a URL into a [`ScrapedPage`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ScrapedPage>;
}

pub struct Scrapper {
    client: reqwest::Client,
}

impl Scrapper {
    pub fn new(config: &ScrapeConfig) -> Result<Scrapper> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FactCheckError::ScrapeFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Scrapper { client })
    }

    /// Fetches and parses `url`. The status code and content type are not
    /// checked; whatever body comes back is parsed as HTML.
    pub async fn try_fetch(&self, url: &str) -> Result<ScrapedPage> {
        let body = self.fetch_body(url).await?;
        Ok(Self::parse_html(&body))
    }

    /// Same as [`Scrapper::try_fetch`] but any failure becomes an empty page.
    pub async fn fetch_or_empty(&self, url: &str) -> ScrapedPage {
        match self.try_fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("failed to scrape {url}, error: {:#}", e);
                ScrapedPage::default()
            }
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FactCheckError::ScrapeFailed(format!("request to {url} failed: {e}")))?;
        let body = res
            .text()
            .await
            .map_err(|e| FactCheckError::ScrapeFailed(format!("reading {url} failed: {e}")))?;
        Ok(body)
    }

    /// Extracts title, meta description and paragraph text from raw HTML.
    pub fn parse_html(html: &str) -> ScrapedPage {
        let document = Html::parse_document(html);

        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let meta = document
            .select(&META_DESCRIPTION_SELECTOR)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        let text = document
            .select(&PARAGRAPH_SELECTOR)
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<String>>()
            .join(" ");

        ScrapedPage {
            title,
            meta,
            text: truncate_chars(&text, MAX_TEXT_CHARS),
        }
    }
}

#[async_trait]
impl PageFetcher for Scrapper {
    async fn fetch(&self, url: &str) -> Result<ScrapedPage> {
        self.try_fetch(url).await
    }
}

/// First `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_full_page() {
        let html = r#"<html><head>
            <title>  Breaking: Something Happened  </title>
            <meta name="description" content="  A short summary.  ">
        </head><body>
            <nav>Home | World</nav>
            <p>First paragraph.</p>
            <div><p>Second <b>bold</b> paragraph.</p></div>
        </body></html>"#;
        let page = Scrapper::parse_html(html);
        assert_eq!(page.title, "Breaking: Something Happened");
        assert_eq!(page.meta, "A short summary.");
        assert_eq!(page.text, "First paragraph. Second bold paragraph.");
    }

    #[test]
    fn test_parse_missing_elements() {
        let page = Scrapper::parse_html("<html><body><div>no paragraphs</div></body></html>");
        assert_eq!(page, ScrapedPage::default());
    }

    #[test]
    fn test_meta_without_content() {
        let html = r#"<html><head><meta name="description"></head><body></body></html>"#;
        assert_eq!(Scrapper::parse_html(html).meta, "");
    }

    #[test]
    fn test_other_meta_tags_ignored() {
        let html = r#"<html><head>
            <meta name="keywords" content="a, b">
            <meta property="og:description" content="og text">
        </head></html>"#;
        assert_eq!(Scrapper::parse_html(html).meta, "");
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert_eq!(Scrapper::parse_html(""), ScrapedPage::default());
        assert_eq!(Scrapper::parse_html("<<<>>> not html"), ScrapedPage::default());
    }

    #[test]
    fn test_text_truncated_to_limit() {
        let html = format!("<html><body><p>{}</p></body></html>", "x".repeat(5000));
        let page = Scrapper::parse_html(&html);
        assert_eq!(page.text.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 3), "ééé");
        assert_eq!(truncate_chars(&text, 50), text);
        assert_eq!(truncate_chars("", 5), "");
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_page() {
        // accepts connections but never writes a response
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let scrapper = Scrapper::new(&ScrapeConfig {
            timeout: Duration::from_millis(300),
            ..Default::default()
        })
        .unwrap();
        let url = format!("http://{addr}/slow");

        let started = Instant::now();
        assert!(scrapper.try_fetch(&url).await.is_err());
        let page = scrapper.fetch_or_empty(&url).await;
        assert_eq!(page, ScrapedPage::default());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_empty_page() {
        let scrapper = Scrapper::new(&ScrapeConfig::default()).unwrap();
        let page = scrapper.fetch_or_empty("not a url").await;
        assert_eq!(page, ScrapedPage::default());
    }
}

//! Yahoo Finance stock-market news scraper

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{HeadlineSource, fetch_text, http_client};
use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::Headline;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DashError::Config(format!("Invalid selector '{css}': {e}")))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolute_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{href}", base_url.trim_end_matches('/'))
    }
}

/// Every `h3` heading on the page that wraps a link
pub fn parse_all(html: &str, base_url: &str) -> Result<Vec<Headline>> {
    let document = Html::parse_document(html);
    let heading = selector("h3")?;
    let link = selector("a[href]")?;

    Ok(document
        .select(&heading)
        .filter_map(|h3| {
            let anchor = h3.select(&link).next()?;
            let title = element_text(&h3);
            if title.is_empty() {
                return None;
            }
            let href = anchor.value().attr("href").unwrap_or_default();
            Some(Headline::new(title, absolute_link(base_url, href)))
        })
        .collect())
}

/// Content-viewer anchors whose text mentions `ticker` (case-sensitive)
pub fn parse_for_ticker(html: &str, ticker: &str, base_url: &str) -> Result<Vec<Headline>> {
    let document = Html::parse_document(html);
    let anchors = selector("a.js-content-viewer")?;

    Ok(document
        .select(&anchors)
        .filter_map(|a| {
            let title = element_text(&a);
            if !title.contains(ticker) {
                return None;
            }
            let href = a.value().attr("href")?;
            Some(Headline::new(title, absolute_link(base_url, href)))
        })
        .collect())
}

/// Scrapes the Yahoo Finance stock-market news listing
pub struct YahooNewsScraper {
    client: Client,
    page_url: String,
    base_url: String,
}

impl YahooNewsScraper {
    pub fn new(config: &DashConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            page_url: config.yahoo_news_url.clone(),
            base_url: config.yahoo_base_url.clone(),
        })
    }

    async fn fetch_page(&self) -> Result<String> {
        fetch_text(&self.client, &self.page_url).await
    }

    /// All headlines on the listing page
    pub async fn scrape_all(&self) -> Result<Vec<Headline>> {
        let html = self.fetch_page().await?;
        let headlines = parse_all(&html, &self.base_url)?;
        debug!(count = headlines.len(), "Scraped general market headlines");
        Ok(headlines)
    }

    /// Headlines on the listing page that mention `ticker`
    pub async fn scrape_for_ticker(&self, ticker: &str) -> Result<Vec<Headline>> {
        let html = self.fetch_page().await?;
        let headlines = parse_for_ticker(&html, ticker, &self.base_url)?;
        debug!(ticker, count = headlines.len(), "Scraped ticker headlines");
        Ok(headlines)
    }
}

#[async_trait]
impl HeadlineSource for YahooNewsScraper {
    async fn headlines(&self, query: &str) -> Result<Vec<Headline>> {
        self.scrape_for_ticker(query).await
    }

    async fn market_headlines(&self) -> Result<Vec<Headline>> {
        self.scrape_all().await
    }

    fn name(&self) -> &'static str {
        "Yahoo Finance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://finance.yahoo.com";

    const PAGE: &str = r#"<html><body>
<ul>
  <li><div><h3><a href="/news/apple-aapl-rally.html">Apple (AAPL) extends   rally</a></h3></div>
      <a class="js-content-viewer" href="/news/apple-aapl-rally.html">Apple (AAPL) extends rally</a></li>
  <li><div><h3><a href="https://finance.yahoo.com/news/fed.html">Fed holds rates</a></h3></div>
      <a class="js-content-viewer" href="https://finance.yahoo.com/news/fed.html">Fed holds rates</a></li>
  <li><div><h3>Sponsored content</h3></div></li>
  <li><a class="js-content-viewer other" href="/news/msft.html">MSFT and AAPL lead tech</a></li>
</ul>
</body></html>"#;

    #[test]
    fn test_parse_all_needs_link_in_heading() {
        let headlines = parse_all(PAGE, BASE).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].title, "Apple (AAPL) extends rally");
        assert_eq!(
            headlines[0].link,
            "https://finance.yahoo.com/news/apple-aapl-rally.html"
        );
        assert_eq!(headlines[1].title, "Fed holds rates");
    }

    #[test]
    fn test_parse_for_ticker_filters_and_prefixes() {
        let headlines = parse_for_ticker(PAGE, "AAPL", BASE).unwrap();
        assert_eq!(headlines, vec![
            Headline::new(
                "Apple (AAPL) extends rally",
                "https://finance.yahoo.com/news/apple-aapl-rally.html"
            ),
            Headline::new(
                "MSFT and AAPL lead tech",
                "https://finance.yahoo.com/news/msft.html"
            ),
        ]);
    }

    #[test]
    fn test_parse_for_ticker_without_match_is_empty() {
        assert!(parse_for_ticker(PAGE, "NVDA", BASE).unwrap().is_empty());
        assert!(parse_for_ticker("", "AAPL", BASE).unwrap().is_empty());
    }

    #[test]
    fn test_ticker_filter_is_case_sensitive() {
        assert!(parse_for_ticker(PAGE, "aapl", BASE).unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_scrape_all_live() {
        let scraper = YahooNewsScraper::new(&DashConfig::default()).unwrap();
        let headlines = scraper.scrape_all().await.unwrap();
        assert!(!headlines.is_empty());
    }
}

use tracing::{info, warn};

use super::{NewsRequest, StockDash};
use crate::news::NewsSource;
use crate::tickers;
use crate::view::{PageView, Section};

impl StockDash {
    /// Headlines for one ticker from the chosen source
    pub async fn news(&self, req: &NewsRequest) -> PageView {
        let mut page = PageView::new("Stock News");
        let ticker = match tickers::normalize(&req.ticker) {
            Ok(t) => t,
            Err(e) => {
                super::warn_page(&mut page, "news", &e);
                return page;
            }
        };
        page.heading(format!("Latest news for {ticker}"));
        page.text(format!("Fetching news headlines for {ticker}..."));

        let result = match self.source(req.source) {
            Ok(source) => {
                info!(ticker = %ticker, source = source.name(), "Fetching headlines");
                source.headlines(&ticker).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(headlines) if !headlines.is_empty() => {
                page.success("News fetched successfully!");
                page.push(Section::Links(headlines));
            }
            Ok(_) => {
                page.warning(format!("No news headlines found for {ticker}."));
            }
            Err(e) => {
                warn!(ticker = %ticker, source = %req.source, error = %e, "News fetch failed");
                page.warning(format!("No news headlines found for {ticker}."));
            }
        }
        page
    }

    /// All headlines on the general market listing
    pub async fn general_news(&self, source: NewsSource) -> PageView {
        let mut page = PageView::new("General Stock Market News");
        page.text("Fetching general stock market news...");

        let result = match self.source(source) {
            Ok(s) => {
                info!(source = s.name(), "Fetching market headlines");
                s.market_headlines().await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(headlines) if !headlines.is_empty() => {
                page.success("General stock market news fetched successfully!");
                let rows = headlines.into_iter().map(|h| vec![h.title, h.link]).collect();
                page.table(vec!["Headline".to_string(), "Link".to_string()], rows);
            }
            Ok(_) => {
                page.warning("No general stock market news found.");
            }
            Err(e) => {
                warn!(source = %source, error = %e, "General news fetch failed");
                page.warning("No general stock market news found.");
            }
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::error::DashError;
    use crate::models::Headline;
    use crate::news::MockHeadlineSource;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_news_lists_headlines_in_order() {
        let mut google = MockHeadlineSource::new();
        google.expect_name().return_const("mock");
        google
            .expect_headlines()
            .with(eq("AAPL"))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Headline::new("First", "https://a"),
                    Headline::new("Second", "https://b"),
                ])
            });

        let app = app(provider_with(1), vec![(NewsSource::Google, google)]);
        let page = app
            .news(&NewsRequest {
                ticker: "aapl".to_string(),
                source: NewsSource::Google,
            })
            .await;

        assert!(!page.has_warning());
        let links = page
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Links(l) => Some(l.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(links[0].title, "First");
        assert_eq!(links[1].title, "Second");
    }

    #[tokio::test]
    async fn test_news_empty_result_is_warning_not_error() {
        let mut yahoo = MockHeadlineSource::new();
        yahoo.expect_name().return_const("mock");
        yahoo.expect_headlines().returning(|_| Ok(Vec::new()));

        let app = app(provider_with(1), vec![(NewsSource::Yahoo, yahoo)]);
        let page = app
            .news(&NewsRequest {
                ticker: "MSFT".to_string(),
                source: NewsSource::Yahoo,
            })
            .await;

        assert_eq!(
            page.warnings().collect::<Vec<_>>(),
            vec!["No news headlines found for MSFT."]
        );
    }

    #[tokio::test]
    async fn test_news_fetch_failure_shows_empty_message() {
        let mut google = MockHeadlineSource::new();
        google.expect_name().return_const("mock");
        google
            .expect_headlines()
            .returning(|_| Err(DashError::Fetch("status 503".to_string())));

        let app = app(provider_with(1), vec![(NewsSource::Google, google)]);
        let page = app
            .news(&NewsRequest {
                ticker: "AAPL".to_string(),
                source: NewsSource::Google,
            })
            .await;

        assert_eq!(
            page.warnings().collect::<Vec<_>>(),
            vec!["No news headlines found for AAPL."]
        );
    }

    #[tokio::test]
    async fn test_news_unconfigured_source_warns() {
        let app = app(provider_with(1), Vec::new());
        let page = app
            .news(&NewsRequest {
                ticker: "AAPL".to_string(),
                source: NewsSource::Finnhub,
            })
            .await;
        assert!(page.has_warning());
    }

    #[tokio::test]
    async fn test_general_news_table() {
        let mut yahoo = MockHeadlineSource::new();
        yahoo.expect_name().return_const("mock");
        yahoo
            .expect_market_headlines()
            .times(1)
            .returning(|| Ok(vec![Headline::new("Fed holds rates", "https://f")]));

        let app = app(provider_with(1), vec![(NewsSource::Yahoo, yahoo)]);
        let page = app.general_news(NewsSource::Yahoo).await;

        assert!(!page.has_warning());
        assert!(page.sections.iter().any(|s| matches!(
            s,
            Section::Table { rows, .. } if rows[0][0] == "Fed holds rates"
        )));
    }

    #[tokio::test]
    async fn test_general_news_empty() {
        let mut yahoo = MockHeadlineSource::new();
        yahoo.expect_name().return_const("mock");
        yahoo.expect_market_headlines().returning(|| Ok(Vec::new()));

        let app = app(provider_with(1), vec![(NewsSource::Yahoo, yahoo)]);
        let page = app.general_news(NewsSource::Yahoo).await;
        assert_eq!(
            page.warnings().collect::<Vec<_>>(),
            vec!["No general stock market news found."]
        );
    }
}

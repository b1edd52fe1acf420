use super::{DashboardRequest, StockDash, warn_page};
use crate::chart::returns_chart;
use crate::error::Result;
use crate::models::ReturnSeries;
use crate::returns::cumulative_returns_many;
use crate::view::{PageView, Section};
use tracing::warn;

impl StockDash {
    /// Cumulative returns of the picked tickers over a shared date range
    pub async fn dashboard(&self, req: &DashboardRequest) -> PageView {
        let mut page = PageView::new("My Stock Dashboard");
        if req.tickers.is_empty() {
            page.text("Pick your assets to compare their returns.");
            return page;
        }
        if let Err(e) = self.fill_dashboard(req, &mut page).await {
            warn_page(&mut page, "dashboard", &e);
        }
        page
    }

    async fn fill_dashboard(&self, req: &DashboardRequest, page: &mut PageView) -> Result<()> {
        let range = self.range(req.start, req.end)?;
        let series = self.loader.load_many(&req.tickers, range).await?;
        let returns = cumulative_returns_many(&series);

        let names: Vec<&str> = returns.keys().map(String::as_str).collect();
        if returns.values().all(ReturnSeries::is_empty) {
            warn!(tickers = ?names, start = %range.start, end = %range.end, "No common trading dates");
            page.warning(format!(
                "No common trading dates for {} between {} and {}.",
                names.join(", "),
                range.start,
                range.end
            ));
            return Ok(());
        }
        page.text(format!("Returns for stocks: {}", names.join(", ")));

        let all: Vec<_> = returns.into_values().collect();
        page.push(Section::Chart(returns_chart(&all)));

        let rows = all
            .iter()
            .map(|r| {
                let first = r.points.first().map(|p| p.date.to_string());
                let last = r.points.last().map(|p| p.date.to_string());
                vec![
                    r.ticker.clone(),
                    first.unwrap_or_default(),
                    last.unwrap_or_default(),
                    r.total_return()
                        .map(|v| format!("{:+.2}%", v * 100.0))
                        .unwrap_or_default(),
                ]
            })
            .collect();
        page.table(
            ["Ticker", "From", "To", "Return"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            rows,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::api::MockPriceProvider;
    use crate::error::DashError;
    use crate::models::fixtures::{bar, date};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_dashboard_aligns_and_compounds() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_daily_bars()
            .with(eq("AAPL"), mockall::predicate::always(), mockall::predicate::always())
            .returning(|_, _, _| {
                Ok(vec![
                    bar(date(2020, 1, 2), 100.0),
                    bar(date(2020, 1, 3), 110.0),
                    bar(date(2020, 1, 6), 121.0),
                ])
            });
        mock.expect_daily_bars()
            .with(eq("MSFT"), mockall::predicate::always(), mockall::predicate::always())
            .returning(|_, _, _| {
                Ok(vec![
                    bar(date(2020, 1, 3), 50.0),
                    bar(date(2020, 1, 6), 40.0),
                ])
            });

        let page = app(mock, Vec::new())
            .dashboard(&DashboardRequest {
                tickers: vec!["msft".to_string(), "AAPL".to_string()],
                start: jan(1),
                end: jan(10),
            })
            .await;

        assert!(!page.has_warning());
        let chart = page.charts().next().unwrap();
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.line("AAPL").unwrap().values()[0], 0.0);
        assert_eq!(chart.line("MSFT").unwrap().values()[0], 0.0);
        assert!((chart.line("AAPL").unwrap().values()[1] - 0.1).abs() < 1e-12);

        let rows = page
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Table { rows, .. } => Some(rows.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows[0], vec!["AAPL", "2020-01-03", "2020-01-06", "+10.00%"]);
        assert_eq!(rows[1], vec!["MSFT", "2020-01-03", "2020-01-06", "-20.00%"]);
    }

    #[tokio::test]
    async fn test_dashboard_disjoint_dates_warns() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_daily_bars()
            .with(eq("AAPL"), mockall::predicate::always(), mockall::predicate::always())
            .returning(|_, _, _| Ok(vec![bar(date(2020, 1, 2), 100.0)]));
        mock.expect_daily_bars()
            .with(eq("MSFT"), mockall::predicate::always(), mockall::predicate::always())
            .returning(|_, _, _| Ok(vec![bar(date(2020, 1, 3), 50.0)]));

        let page = app(mock, Vec::new())
            .dashboard(&DashboardRequest {
                tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
                start: jan(1),
                end: jan(10),
            })
            .await;

        let warning = page.warnings().next().unwrap();
        assert!(warning.starts_with("No common trading dates for AAPL, MSFT"));
        assert_eq!(page.charts().count(), 0);
        assert!(!page.sections.iter().any(|s| matches!(s, Section::Table { .. })));
    }

    #[tokio::test]
    async fn test_dashboard_without_tickers_prompts() {
        let page = app(MockPriceProvider::new(), Vec::new())
            .dashboard(&DashboardRequest {
                tickers: Vec::new(),
                start: None,
                end: None,
            })
            .await;
        assert!(!page.has_warning());
        assert_eq!(page.charts().count(), 0);
    }

    #[tokio::test]
    async fn test_dashboard_one_missing_ticker_warns() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_daily_bars().returning(|_, _, _| Ok(Vec::new()));

        let page = app(mock, Vec::new())
            .dashboard(&DashboardRequest {
                tickers: vec!["AAPL".to_string()],
                start: jan(1),
                end: jan(10),
            })
            .await;

        let expected = DashError::unavailable("AAPL", "x").to_string();
        let prefix = expected.trim_end_matches('x');
        assert!(page.warnings().next().unwrap().starts_with(prefix));
    }
}

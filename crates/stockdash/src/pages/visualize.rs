use super::{StockDash, VisualizeRequest, raw_data_table, warn_page};
use crate::chart::price_chart;
use crate::error::Result;
use crate::view::{PageView, Section};

impl StockDash {
    /// Raw data tail and price chart for one ticker
    pub async fn visualize(&self, req: &VisualizeRequest) -> PageView {
        let mut page = PageView::new("Stock Data Visualization");
        if let Err(e) = self.fill_visualize(req, &mut page).await {
            warn_page(&mut page, "visualize", &e);
        }
        page
    }

    async fn fill_visualize(&self, req: &VisualizeRequest, page: &mut PageView) -> Result<()> {
        let range = self.range(req.start, req.end)?;
        let series = self.loader.load(&req.ticker, range).await?;
        page.text(format!(
            "Loading data ... DONE! {} rows for {} ({range})",
            series.len(),
            series.ticker()
        ));

        page.heading("Raw data");
        let (headers, rows) = raw_data_table(series.tail(req.rows));
        page.table(headers, rows);

        page.push(Section::Chart(price_chart(&series, &req.sma)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::api::MockPriceProvider;
    use crate::error::DashError;

    #[tokio::test]
    async fn test_visualize_tail_and_chart() {
        let app = app(provider_with(30), Vec::new());
        let req = VisualizeRequest {
            end: jan(30),
            sma: vec![5],
            ..VisualizeRequest::new("aapl")
        };
        let page = app.visualize(&req).await;

        assert!(!page.has_warning());
        let rows = page
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Table { rows, .. } => Some(rows.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4][0], "2020-01-30");

        let chart = page.charts().next().unwrap();
        assert!(chart.line("SMA_5").is_some());
    }

    #[tokio::test]
    async fn test_visualize_unavailable_becomes_warning() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_daily_bars().returning(|_, _, _| Ok(Vec::new()));

        let page = app(mock, Vec::new())
            .visualize(&VisualizeRequest::new("ZZZZ"))
            .await;

        let expected = DashError::unavailable("ZZZZ", "").to_string();
        let warning = page.warnings().next().unwrap();
        assert!(warning.starts_with(expected.trim_end()));
        assert_eq!(page.charts().count(), 0);
    }

    #[tokio::test]
    async fn test_visualize_reversed_range_warns() {
        let page = app(MockPriceProvider::new(), Vec::new())
            .visualize(&VisualizeRequest {
                start: jan(10),
                end: jan(1),
                ..VisualizeRequest::new("AAPL")
            })
            .await;
        assert!(page.warnings().next().unwrap().contains("Invalid date range"));
    }
}

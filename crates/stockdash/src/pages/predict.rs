use super::{PredictRequest, StockDash, fmt_price, raw_data_table, warn_page};
use crate::chart::{components_chart, forecast_chart, price_chart};
use crate::error::{DashError, Result};
use crate::forecast::{MAX_HORIZON_YEARS, horizon_from_years};
use crate::view::{PageView, Section};

impl StockDash {
    /// Fit the chosen backend and show the forecast tail and chart
    pub async fn predict(&self, req: &PredictRequest) -> PageView {
        let mut page = PageView::new("Stock Prediction");
        if let Err(e) = self.fill_predict(req, &mut page).await {
            warn_page(&mut page, "predict", &e);
        }
        page
    }

    async fn fill_predict(&self, req: &PredictRequest, page: &mut PageView) -> Result<()> {
        if req.years > MAX_HORIZON_YEARS {
            return Err(DashError::Config(format!(
                "Years of prediction must be between 0 and {MAX_HORIZON_YEARS}, got {}",
                req.years
            )));
        }
        let kind = req.model.unwrap_or(self.config.default_model);
        let horizon = horizon_from_years(req.years);

        let range = self.range(req.start, req.end)?;
        let series = self.loader.load(&req.ticker, range).await?;
        page.text(format!(
            "Loading data ... DONE! {} rows for {}",
            series.len(),
            series.ticker()
        ));

        page.heading("Raw data");
        let (headers, rows) = raw_data_table(series.tail(req.rows));
        page.table(headers, rows);
        page.push(Section::Chart(price_chart(&series, &[])));

        page.heading(kind.label());
        let output = self.forecaster.forecast(&series, horizon, kind)?;

        page.heading("Forecast data");
        let headers = ["Date", "Predicted", "Lower", "Upper", "Actual"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let rows = output
            .tail(req.rows)
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    fmt_price(p.predicted),
                    fmt_price(p.lower),
                    fmt_price(p.upper),
                    p.actual.map(fmt_price).unwrap_or_default(),
                ]
            })
            .collect();
        page.table(headers, rows);
        page.push(Section::Chart(forecast_chart(&output)));
        page.heading("Forecast components");
        page.push(Section::Chart(components_chart(&output)));
        page.success(format!(
            "Forecast {} days past {} with the {} model.",
            output.horizon_days, output.last_observed, output.model
        ));
        Ok(())
    }
}

use super::StockDash;
use crate::tickers::DEFAULT_TICKERS;
use crate::view::PageView;

/// Feature list shown on the home page
pub const FEATURES: &[(&str, &str)] = &[
    ("Visualization", "Explore raw stock data with terminal charts."),
    ("Decomposition", "Trend plus seasonality forecasting with changepoints."),
    ("Neural", "Neural network based time-series forecasting."),
    ("Market News", "Get up-to-date news on your desired stock."),
    ("Personal Dashboard", "Compare your preferred stocks."),
];

const TICKER_COLUMNS: usize = 10;

impl StockDash {
    /// Welcome page
    pub fn home(&self) -> PageView {
        let mut page = PageView::new("Welcome to the Stock Prediction App");
        page.text(
            "This app lets you predict stock prices using two models: \
             a decomposition model and a neural network model.",
        );
        page.heading("Features");
        page.table(
            vec!["Feature".to_string(), "Description".to_string()],
            FEATURES
                .iter()
                .map(|(name, desc)| vec![(*name).to_string(), (*desc).to_string()])
                .collect(),
        );
        page.text(format!(
            "Default forecast model: {}. News sources: {}.",
            self.config.default_model,
            self.news_sources()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ));
        page
    }

    /// The ticker universe offered by every selector
    pub fn tickers(&self) -> PageView {
        let mut page = PageView::new("Tickers");
        let rows = DEFAULT_TICKERS
            .chunks(TICKER_COLUMNS)
            .map(|chunk| {
                let mut row: Vec<String> = chunk.iter().map(|t| (*t).to_string()).collect();
                row.resize(TICKER_COLUMNS, String::new());
                row
            })
            .collect();
        page.table(vec![String::new(); TICKER_COLUMNS], rows);
        page.text(format!(
            "{} tickers. Any other valid symbol is accepted too.",
            DEFAULT_TICKERS.len()
        ));
        page
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::view::Section;

    #[test]
    fn test_home_lists_features() {
        let page = app(provider_with(1), Vec::new()).home();
        assert!(!page.has_warning());
        let rows = page
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Table { rows, .. } => Some(rows.len()),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows, super::FEATURES.len());
    }

    #[test]
    fn test_tickers_page_covers_universe() {
        let page = app(provider_with(1), Vec::new()).tickers();
        let cells: usize = page
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::Table { rows, .. } => Some(
                    rows.iter()
                        .flatten()
                        .filter(|c| !c.is_empty())
                        .count(),
                ),
                _ => None,
            })
            .sum();
        assert_eq!(cells, crate::tickers::DEFAULT_TICKERS.len());
    }
}

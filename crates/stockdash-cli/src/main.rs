//! Stock dashboard CLI
//!
//! One subcommand per dashboard page, plus an interactive loop.
//!
//! # Usage
//!
//! ```bash
//! # Optional: enable Finnhub company news
//! export FINNHUB_API_KEY="your-key"
//!
//! stockdash visualize AAPL --start 2020-01-01 --sma 20 --sma 50
//! stockdash predict AAPL --model neural --years 1
//! stockdash news AAPL --source yahoo
//! stockdash dashboard AAPL MSFT GOOGL --start 2015-01-01
//! stockdash repl
//! ```

mod repl;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use stockdash::view::{self, PageView};
use stockdash::{
    DashConfig, DashboardRequest, ModelKind, NewsRequest, NewsSource, PredictRequest, StockDash,
    VisualizeRequest,
};
use stockdash_utils::{LogFormat, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "stockdash", version)]
#[command(about = "Terminal stock dashboard: prices, returns, forecasts and news", long_about = None)]
struct Cli {
    /// Print the page as JSON (sections and chart payloads) instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Price cache lifetime in seconds
    #[arg(long, global = true, value_name = "SECS")]
    cache_ttl: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Page(PageCommand),
    /// Interactive loop with slash commands
    Repl,
}

/// One-shot commands, each rendering a single page
#[derive(Subcommand, Debug)]
enum PageCommand {
    /// Welcome page and feature list
    Home,
    /// List the built-in tickers
    Tickers,
    /// Raw data and price chart for one ticker
    Visualize {
        ticker: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Raw data rows to show
        #[arg(long, default_value_t = stockdash::pages::DEFAULT_TAIL_ROWS)]
        rows: usize,
        /// Simple moving average overlay period (repeatable)
        #[arg(long)]
        sma: Vec<usize>,
    },
    /// Forecast a ticker's close price
    Predict {
        ticker: String,
        /// decomposition or neural
        #[arg(long)]
        model: Option<ModelKind>,
        /// Years of prediction
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=4))]
        years: u32,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = stockdash::pages::DEFAULT_TAIL_ROWS)]
        rows: usize,
    },
    /// News headlines for a ticker, or general market news
    News {
        #[arg(required_unless_present = "general")]
        ticker: Option<String>,
        /// google, yahoo or finnhub
        #[arg(long)]
        source: Option<NewsSource>,
        /// General stock market news
        #[arg(long, conflicts_with = "ticker")]
        general: bool,
    },
    /// Compare cumulative returns of several tickers
    Dashboard {
        #[arg(required = true)]
        tickers: Vec<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

fn build_config(cli: &Cli) -> anyhow::Result<DashConfig> {
    let mut builder = DashConfig::builder().with_env_api_keys();
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = cli.cache_ttl {
        builder = builder.cache_ttl(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Print a page to stdout in the selected format
pub(crate) fn emit(page: &PageView, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
    } else {
        print!("{}", view::render(page));
    }
    Ok(())
}

async fn run_page(app: &StockDash, command: PageCommand) -> PageView {
    match command {
        PageCommand::Home => app.home(),
        PageCommand::Tickers => app.tickers(),
        PageCommand::Visualize {
            ticker,
            start,
            end,
            rows,
            sma,
        } => {
            app.visualize(&VisualizeRequest {
                ticker,
                start,
                end,
                rows,
                sma,
            })
            .await
        }
        PageCommand::Predict {
            ticker,
            model,
            years,
            start,
            end,
            rows,
        } => {
            app.predict(&PredictRequest {
                ticker,
                start,
                end,
                years,
                model,
                rows,
            })
            .await
        }
        PageCommand::News {
            ticker,
            source,
            general,
        } => match ticker {
            Some(ticker) if !general => {
                app.news(&NewsRequest {
                    ticker,
                    source: source.unwrap_or_default(),
                })
                .await
            }
            _ => app.general_news(source.unwrap_or(NewsSource::Yahoo)).await,
        },
        PageCommand::Dashboard {
            tickers,
            start,
            end,
        } => app.dashboard(&DashboardRequest { tickers, start, end }).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = stockdash_utils::Config::from_env();
    let filter = if cli.verbose {
        "debug"
    } else {
        app_config.default_log_filter()
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing(filter, format)?;

    info!(
        app = %app_config.app_name,
        environment = %app_config.environment,
        "Starting stockdash"
    );

    let config = build_config(&cli)?;
    let app = StockDash::new(config)?;

    match cli.command.unwrap_or(Commands::Page(PageCommand::Home)) {
        Commands::Repl => repl::run(&app, cli.json).await?,
        Commands::Page(command) => {
            let page = run_page(&app, command).await;
            emit(&page, cli.json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_predict_args() {
        let cli = Cli::try_parse_from([
            "stockdash", "predict", "AAPL", "--model", "neural", "--years", "2", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Page(PageCommand::Predict {
                ticker,
                model,
                years,
                ..
            })) => {
                assert_eq!(ticker, "AAPL");
                assert_eq!(model, Some(ModelKind::Neural));
                assert_eq!(years, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_predict_years_out_of_range() {
        let result = Cli::try_parse_from(["stockdash", "predict", "AAPL", "--years", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_visualize_dates_and_sma() {
        let cli = Cli::try_parse_from([
            "stockdash", "visualize", "MSFT", "--start", "2020-01-01", "--sma", "20", "--sma", "50",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Page(PageCommand::Visualize { start, sma, rows, .. })) => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2020, 1, 1));
                assert_eq!(sma, vec![20, 50]);
                assert_eq!(rows, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_news_requires_ticker_or_general() {
        assert!(Cli::try_parse_from(["stockdash", "news"]).is_err());
        assert!(Cli::try_parse_from(["stockdash", "news", "--general"]).is_ok());
        assert!(Cli::try_parse_from(["stockdash", "news", "AAPL", "--general"]).is_err());
    }

    #[test]
    fn test_repl_and_default_command() {
        let cli = Cli::try_parse_from(["stockdash", "repl"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Repl)));

        let cli = Cli::try_parse_from(["stockdash", "--json"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["stockdash", "tickers"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Page(PageCommand::Tickers))));
    }

    #[test]
    fn test_run_page_offline_pages() {
        let app = StockDash::new(DashConfig::default()).unwrap();
        let home = tokio_test::block_on(run_page(&app, PageCommand::Home));
        assert!(!home.has_warning());
        let tickers = tokio_test::block_on(run_page(&app, PageCommand::Tickers));
        assert!(!tickers.has_warning());
    }

    #[test]
    fn test_build_config_overrides() {
        let cli = Cli::try_parse_from(["stockdash", "--timeout", "5", "--cache-ttl", "60", "home"])
            .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}

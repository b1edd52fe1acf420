//! Command parsing for the interactive dashboard
//!
//! Every page of the dashboard is reachable as a slash command.

use crate::error::{DashError, Result};
use crate::forecast::{MAX_HORIZON_YEARS, ModelKind};
use crate::news::NewsSource;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Welcome text and feature list
    Home,
    /// List the built-in ticker universe
    Tickers,
    /// Raw data and price chart
    Visualize { symbol: String },
    /// Forecast with the chosen backend
    Predict {
        symbol: String,
        model: Option<ModelKind>,
        years: u32,
    },
    /// Headlines for a ticker
    News {
        symbol: String,
        source: Option<NewsSource>,
    },
    /// General stock-market headlines
    GeneralNews { source: Option<NewsSource> },
    /// Cumulative returns of several tickers
    Dashboard { symbols: Vec<String> },
    /// Show help
    Help,
    /// Exit the loop
    Exit,
}

fn missing(what: &str) -> DashError {
    DashError::Command(format!("Missing symbol for {what} command"))
}

fn parse_years(arg: &str) -> Result<u32> {
    let years: u32 = arg
        .parse()
        .map_err(|_| DashError::Command(format!("Invalid number of years: {arg}")))?;
    if years > MAX_HORIZON_YEARS {
        return Err(DashError::Command(format!(
            "Years of prediction must be between 0 and {MAX_HORIZON_YEARS}"
        )));
    }
    Ok(years)
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(DashError::Command("Empty input".to_string()));
        }

        let Some(body) = input.strip_prefix('/') else {
            return Err(DashError::Command(format!(
                "Commands start with '/', try /help (got '{input}')"
            )));
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(DashError::Command("Empty command".to_string()));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "home" => Ok(Command::Home),
            "tickers" | "list" => Ok(Command::Tickers),
            "visualize" | "viz" | "v" => {
                let symbol = args.first().ok_or_else(|| missing("visualize"))?;
                Ok(Command::Visualize {
                    symbol: symbol.to_uppercase(),
                })
            }
            "predict" | "p" => {
                let symbol = args.first().ok_or_else(|| missing("predict"))?;
                let model = args.get(1).map(|m| m.parse::<ModelKind>()).transpose()?;
                let years = args.get(2).map(|y| parse_years(y)).transpose()?.unwrap_or(1);
                Ok(Command::Predict {
                    symbol: symbol.to_uppercase(),
                    model,
                    years,
                })
            }
            "news" | "n" => {
                let source = args.get(1).map(|s| s.parse::<NewsSource>()).transpose()?;
                match args.first() {
                    None => Ok(Command::GeneralNews { source: None }),
                    Some(first) if first.eq_ignore_ascii_case("general") => {
                        Ok(Command::GeneralNews { source })
                    }
                    Some(symbol) => Ok(Command::News {
                        symbol: symbol.to_uppercase(),
                        source,
                    }),
                }
            }
            "dashboard" | "dash" | "d" => {
                if args.is_empty() {
                    return Err(DashError::Command(
                        "Dashboard requires at least 1 symbol".to_string(),
                    ));
                }
                let symbols = args.iter().map(|s| s.to_uppercase()).collect();
                Ok(Command::Dashboard { symbols })
            }
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(DashError::Command(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r#"
Stock Dashboard Commands
========================

Pages:
  /home                              Welcome page
  /tickers                           List the built-in tickers
  /visualize <symbol>                Raw data and price chart
  /predict <symbol> [model] [years]  Forecast (model: decomposition|neural, years: 0-4)
  /news <symbol> [source]            Headlines (source: google|yahoo|finnhub)
  /news general [source]             General stock market news
  /dashboard <s1> <s2> ...           Compare cumulative returns

Other Commands:
  /help                              Show help
  /exit                              Exit

Command Aliases:
  /v = /visualize   /p = /predict   /n = /news
  /d = /dashboard   /q = /exit
"#
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Command::Home => "Welcome page",
            Command::Tickers => "Ticker list",
            Command::Visualize { .. } => "Stock data visualization",
            Command::Predict { .. } => "Stock prediction",
            Command::News { .. } => "Stock news",
            Command::GeneralNews { .. } => "General stock market news",
            Command::Dashboard { .. } => "Returns dashboard",
            Command::Help => "Show help",
            Command::Exit => "Exit",
        }
    }
}

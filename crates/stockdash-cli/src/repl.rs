//! Interactive slash-command loop

use std::io::{self, BufRead, Write};
use tracing::debug;

use stockdash::view::PageView;
use stockdash::{
    Command, DashboardRequest, NewsRequest, NewsSource, PredictRequest, StockDash,
    VisualizeRequest,
};

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                       Stock Dashboard                        ║
║                                                              ║
║  Commands:                                                   ║
║    /visualize <symbol>               - Price data and chart  ║
║    /predict <symbol> [model] [years] - Forecast              ║
║    /news <symbol> [source]           - Headlines             ║
║    /dashboard <s1> <s2> ...          - Compare returns       ║
║    /help                             - Help                  ║
║    /exit                             - Exit                  ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

/// Run one parsed command; `None` means the loop should stop
pub(crate) async fn dispatch(app: &StockDash, command: Command) -> Option<PageView> {
    debug!(command = command.description(), "Dispatching command");
    let page = match command {
        Command::Home => app.home(),
        Command::Tickers => app.tickers(),
        Command::Visualize { symbol } => app.visualize(&VisualizeRequest::new(symbol)).await,
        Command::Predict {
            symbol,
            model,
            years,
        } => {
            app.predict(&PredictRequest {
                model,
                years,
                ..PredictRequest::new(symbol)
            })
            .await
        }
        Command::News { symbol, source } => {
            app.news(&NewsRequest {
                ticker: symbol,
                source: source.unwrap_or_default(),
            })
            .await
        }
        Command::GeneralNews { source } => {
            app.general_news(source.unwrap_or(NewsSource::Yahoo)).await
        }
        Command::Dashboard { symbols } => {
            app.dashboard(&DashboardRequest {
                tickers: symbols,
                start: None,
                end: None,
            })
            .await
        }
        Command::Help => {
            let mut page = PageView::new("Help");
            page.text(Command::help_text().trim());
            page
        }
        Command::Exit => return None,
    };
    Some(page)
}

/// Read commands from stdin until `/exit` or EOF
pub async fn run(app: &StockDash, json: bool) -> anyhow::Result<()> {
    print_banner();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("stockdash> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("❌ Error: {e}\n");
                continue;
            }
        };

        match dispatch(app, command).await {
            Some(page) => {
                crate::emit(&page, json)?;
                println!();
            }
            None => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}

mod cli;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use hoverquote::config::Config;
use hoverquote::dom::Document;
use hoverquote::gateway::{spawn_background, BoundaryRequest, RequestGateway};
use hoverquote::scanner::TickerScanner;
use hoverquote::tooltip::{render_quote_text, Rect, TooltipController, TooltipState, Viewport};

const TERMINAL_VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
    scroll_x: 0.0,
    scroll_y: 0.0,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Quote { ref symbols, json } => {
            show_quotes(&config, symbols, json).await?;
        }
        Commands::Scan { ref file, html } => {
            scan_text(&config, file.as_deref(), html)?;
        }
    }

    Ok(())
}

async fn show_quotes(config: &Config, symbols: &[String], json: bool) -> Result<()> {
    let gateway = RequestGateway::from_config(config).context("Failed to build quote client")?;
    let background = spawn_background(gateway);
    let client = background.client();

    if json {
        for symbol in symbols {
            let response = client
                .send(BoundaryRequest::GetStockData {
                    symbol: symbol.to_uppercase(),
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    } else {
        cli::show_banner();
        let mut controller = TooltipController::new();
        let anchor = Rect {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };

        for symbol in symbols {
            let symbol = symbol.to_uppercase();
            let state = controller
                .hover(&client, &symbol, anchor, TERMINAL_VIEWPORT)
                .await
                .clone();
            match state {
                TooltipState::Shown { .. } => {
                    if let Some(record) = controller.local_data(&symbol) {
                        println!("{}", render_quote_text(record));
                    }
                }
                TooltipState::Error { message, .. } => {
                    eprintln!("{symbol}: {message}");
                }
                TooltipState::Hidden | TooltipState::Loading { .. } => {}
            }
            controller.hover_leave();
            println!();
        }
    }

    drop(client);
    background.shutdown().await?;
    Ok(())
}

fn scan_text(config: &Config, file: Option<&Path>, html: bool) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let mut document = Document::from_paragraphs(&text);
    let root = document.root();
    let report = TickerScanner::from_config(&config.scanner).scan(&mut document, root);
    log::info!(
        "Found {} tickers in {} text nodes",
        report.markers_created,
        report.text_nodes_rewritten
    );

    if html {
        println!("{}", document.to_html(root));
    } else {
        for (_, symbol) in document.markers(root) {
            println!("{symbol}");
        }
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hoverquote")]
#[command(about = "Detect stock tickers in text and show hover-style quotes for them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file; builtin defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch quotes and print them as the tooltip would show them
    Quote {
        /// Ticker symbols (e.g., AAPL MSFT)
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Print the raw boundary response JSON
        #[arg(long)]
        json: bool,
    },

    /// Find ticker symbols in a text file (stdin when omitted)
    Scan {
        file: Option<PathBuf>,

        /// Print the rewritten document as HTML
        #[arg(long)]
        html: bool,
    },
}

pub fn show_banner() {
    println!("# ------------------------------------------------------------------------ #");
    println!("# hoverquote");
    println!("# Executing date: {}", hoverquote::utils::current_human_timestamp());
    println!("# ------------------------------------------------------------------------ #");
    println!();
}

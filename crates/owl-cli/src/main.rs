//! Owl CLI - Screen Reader Simulator
//!
//! Hear a web page the way a screen reader user does: step through its
//! navigable elements in the terminal, or dump every caption to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owl_core::{ClassifierOptions, Document, FetchConfig, Fetcher, Page, ScreenReader};
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "owl")]
#[command(author, version, about = "A screen reader simulator for web pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// URL or file to open (shortcut for `owl browse <source>`)
    source: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive screen reader
    Browse {
        /// URL or file to open (optional)
        source: Option<String>,
    },

    /// Print the caption of every navigable element
    Describe {
        /// URL or file to describe
        source: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Describe HTML read from stdin
    Render {
        /// Base URL reported for the page
        #[arg(short, long)]
        base_url: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output format: plain, json
    #[arg(short, long, default_value = "plain")]
    format: OutputFormat,

    /// Announce "n of m" for list items
    #[arg(long)]
    list_position: bool,

    /// Separator between role, name and value
    #[arg(long, default_value = ": ")]
    separator: String,
}

impl OutputArgs {
    fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            separator: self.separator.clone(),
            list_position: self.list_position,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(tracing_subscriber::EnvFilter::new("debug"))
            .init();
    }

    match cli.command {
        Some(Commands::Browse { source }) => {
            run_browse(source).await?;
        }
        Some(Commands::Describe { source, output }) => {
            run_describe(&source, &output).await?;
        }
        Some(Commands::Render { base_url, output }) => {
            run_render(base_url, &output)?;
        }
        None => {
            // With or without a source, open the interactive reader
            run_browse(cli.source).await?;
        }
    }

    Ok(())
}

async fn run_browse(source: Option<String>) -> Result<()> {
    owl_tui::run(source).await
}

async fn run_describe(source: &str, output: &OutputArgs) -> Result<()> {
    let fetcher = Fetcher::with_config(FetchConfig::default())?;
    let page = fetcher.load(source).await?;
    println!("{}", describe(&page, output)?);
    Ok(())
}

fn run_render(base_url: Option<String>, output: &OutputArgs) -> Result<()> {
    let mut html = String::new();
    io::stdin().read_to_string(&mut html)?;

    let fetcher = Fetcher::with_config(FetchConfig::default())?;
    let page = fetcher.render_html(&html, base_url.as_deref())?;
    println!("{}", describe(&page, output)?);
    Ok(())
}

/// Captions for every navigable element of a page, formatted for stdout
fn describe(page: &Page, output: &OutputArgs) -> Result<String> {
    let reader = ScreenReader::attach(Document::parse(&page.html), output.classifier_options())?;
    let scan = reader.scan_report();
    info!(
        "{} of {} elements navigable, {} made focusable",
        scan.navigable, scan.scanned, scan.marked_focusable
    );

    let document = reader.document();
    let elements: Vec<(String, String)> = reader
        .describe_all()
        .into_iter()
        .map(|a| (document.tag_name(a.element).unwrap_or_default(), a.text))
        .collect();

    let text = match output.format {
        OutputFormat::Plain => elements
            .iter()
            .map(|(_, caption)| caption.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "url": page.url.to_string(),
                "title": page.title,
                "scan": scan,
                "elements": elements.iter().map(|(tag, caption)| {
                    serde_json::json!({
                        "tag": tag,
                        "caption": caption
                    })
                }).collect::<Vec<_>>()
            });
            serde_json::to_string_pretty(&json)?
        }
    };
    Ok(text)
}

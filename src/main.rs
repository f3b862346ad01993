mod chat;
mod cli;
mod config;
mod fetch;
mod knowledge;
mod llm;
mod markdown;
mod report;
mod research;
mod search;
mod text;

pub const USER_AGENT: &str = concat!("delve/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tokio::io::BufReader;
use tracing::info;

use cli::{Cli, Command};
use llm::GroqClient;
use research::Researcher;
use search::DuckDuckGo;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let directive = if cli.verbose { "delve=debug" } else { "delve=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;

    let mut model = GroqClient::from_env(http.clone())
        .inspect_err(|e| tracing::error!("language model not available: {e}"))?;
    if let Some(name) = &cli.research.model {
        model = model.with_model(name.clone());
    }

    let settings = cli.research.settings();
    let format = cli.research.format;
    let researcher = Researcher::new(
        http.clone(),
        knowledge::default_sources(&http, settings.snippets),
        DuckDuckGo::new(http.clone(), settings.search.clone()),
        model,
        settings,
    );

    match cli.command {
        Command::Ask { question } => {
            let question = question.join(" ");
            let outcome = researcher.research(&question).await?;
            println!("{}", report::render(&outcome, format)?);
        }
        Command::Chat => {
            info!("starting chat session");
            let mut stdout = tokio::io::stdout();
            let history = chat::run(
                &researcher,
                format,
                BufReader::new(tokio::io::stdin()),
                &mut stdout,
            )
            .await?;
            info!(turns = history.turns().len(), "chat session ended");
        }
    }

    Ok(())
}

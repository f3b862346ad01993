use clap::{Args, Parser, Subcommand};

use crate::config::{
    DEFAULT_ARTICLE_CHARS, DEFAULT_MAX_URLS, DEFAULT_REGION, DEFAULT_SNIPPET_CHARS,
    DEFAULT_SNIPPET_RESULTS, ResearchSettings, SafeSearch, SearchOptions, SnippetOptions,
    TimeLimit,
};
use crate::report::OutputFormat;

/// Research assistant: gathers Wikipedia/arXiv snippets and web articles,
/// then asks a language model for a sourced answer.
///
/// Reads GROQ_API_KEY (required), GROQ_MODEL, and GROQ_BASE_URL from the
/// environment or a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "delve", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub research: ResearchArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Research a single question and print the report
    Ask {
        /// The question, used verbatim as the search query
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Ask questions interactively; `/history` shows the session, `/quit` exits
    Chat,
}

#[derive(Debug, Args)]
pub struct ResearchArgs {
    /// Web pages to extract per question
    #[arg(long, default_value_t = DEFAULT_MAX_URLS, global = true)]
    pub max_urls: usize,

    /// Character cap for each extracted article
    #[arg(long, default_value_t = DEFAULT_ARTICLE_CHARS, global = true)]
    pub article_chars: usize,

    /// Results taken from each knowledge source
    #[arg(long, default_value_t = DEFAULT_SNIPPET_RESULTS, global = true)]
    pub snippet_results: usize,

    /// Character cap for each knowledge-source snippet
    #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS, global = true)]
    pub snippet_chars: usize,

    /// Search region (DuckDuckGo `kl` code)
    #[arg(long, default_value = DEFAULT_REGION, global = true)]
    pub region: String,

    /// Safe-search level
    #[arg(long, value_enum, default_value_t = SafeSearch::Off, global = true)]
    pub safe_search: SafeSearch,

    /// Only search pages from this period
    #[arg(long, value_enum, global = true)]
    pub time_limit: Option<TimeLimit>,

    /// Model id, overriding GROQ_MODEL
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown, global = true)]
    pub format: OutputFormat,
}

impl ResearchArgs {
    pub fn settings(&self) -> ResearchSettings {
        ResearchSettings {
            max_urls: self.max_urls,
            article_chars: self.article_chars,
            snippets: SnippetOptions {
                max_results: self.snippet_results,
                max_chars: self.snippet_chars,
            },
            search: SearchOptions {
                region: self.region.clone(),
                safe_search: self.safe_search,
                time_limit: self.time_limit,
            },
        }
    }
}

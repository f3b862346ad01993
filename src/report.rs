use clap::ValueEnum;

use crate::markdown::{as_list_item, escape_md_link};
use crate::research::ResearchOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

pub fn render(outcome: &ResearchOutcome, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Markdown => Ok(format_markdown(outcome)),
        OutputFormat::Json => serde_json::to_string_pretty(outcome),
    }
}

pub fn format_markdown(outcome: &ResearchOutcome) -> String {
    let mut output = String::from("## Reasoning trace\n\n");
    for entry in &outcome.trace {
        output.push_str(&format!("- {}\n", as_list_item(&entry.to_string())));
    }

    output.push_str("\n## Answer\n\n");
    output.push_str(outcome.answer.trim());
    output.push('\n');

    if !outcome.sources.is_empty() {
        output.push_str("\n## Sources\n\n");
        for url in &outcome.sources {
            let escaped = escape_md_link(url);
            output.push_str(&format!("- [{escaped}]({escaped})\n"));
        }
    }

    output
}

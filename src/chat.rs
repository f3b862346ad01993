use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::knowledge::KnowledgeSource;
use crate::llm::ChatModel;
use crate::report::{OutputFormat, render};
use crate::research::Researcher;
use crate::search::SearchProvider;

const PROMPT: &str = "> ";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Turns are only ever appended.
#[derive(Debug, Default)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    fn render(&self) -> String {
        if self.turns.is_empty() {
            return "(no history yet)\n".to_string();
        }
        self.turns
            .iter()
            .map(|t| format!("{}: {}\n", t.role, t.content))
            .collect()
    }
}

/// Read questions line by line until EOF, `/exit`, or `/quit`.
/// A failed research run is reported and the session continues.
pub async fn run<K, S, M, R, W>(
    researcher: &Researcher<K, S, M>,
    format: OutputFormat,
    input: R,
    output: &mut W,
) -> Result<ChatHistory, ChatError>
where
    K: KnowledgeSource,
    S: SearchProvider,
    M: ChatModel,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut history = ChatHistory::default();
    let mut lines = input.lines();

    output.write_all(PROMPT.as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        match question {
            "" => {}
            "/exit" | "/quit" => break,
            "/history" => output.write_all(history.render().as_bytes()).await?,
            _ => {
                history.push(Role::User, question);
                match researcher.research(question).await {
                    Ok(outcome) => {
                        let report = render(&outcome, format)?;
                        output.write_all(report.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                        history.push(Role::Assistant, outcome.answer);
                    }
                    Err(e) => {
                        error!(%e, "research failed");
                        output.write_all(format!("Error: {e}\n").as_bytes()).await?;
                    }
                }
            }
        }
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(history)
}

//! Interactive chat against a single agent on stdin/stdout.

use concierge_agents::Agent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

const EXAMPLES: [&str; 3] = [
    "Hello, how are you?",
    "Can you tell me the current time?",
    "Please perform the backup task",
];

/// Run the read-reply loop until `exit`/`quit` or end of input.
pub async fn run_chat<R, W>(agent: &Agent, input: R, output: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut banner = format!(
        "\n=== Concierge Agent Chat ===\nTalking to: {}\nType 'exit' or 'quit' to end the session\n\nExamples:\n",
        agent.name()
    );
    for example in EXAMPLES {
        banner.push_str(&format!("- '{example}'\n"));
    }
    output.write_all(banner.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        debug!(agent = %agent.name(), "Chat query");
        let reply = agent.respond(line).await;
        output
            .write_all(format!("Agent: {reply}\n").as_bytes())
            .await?;
    }

    output.write_all(b"Goodbye!\n").await?;
    output.flush().await?;
    Ok(())
}

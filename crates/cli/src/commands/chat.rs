//! `tally chat`: Interactive conversation about a dashboard snapshot.

use std::io::Write;
use std::path::Path;

use tally_assistant::{AssistantClient, describe_error};
use tally_core::DashboardSnapshot;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{build_client, interrupts, load_snapshot, run_exchange};

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Exit,
    Clear,
    History,
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "exit" | "quit" => Input::Exit,
        "/clear" => Input::Clear,
        "/history" => Input::History,
        question => Input::Question(question),
    }
}

pub async fn run(snapshot_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(snapshot_path)?;
    let (config, client) = build_client()?;

    println!();
    println!("  Tally Assistant: Interactive Mode");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Snapshot:  {} ({} entries)", snapshot_path.display(), snapshot.len());
    println!();
    println!("  Ask about your expenses and press Enter.");
    println!("  /clear resets the conversation, /history shows its size.");
    println!("  Ctrl+C cancels a pending answer, or quits at the prompt; 'exit' quits too.");
    println!();

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interrupts = interrupts();
    repl(&client, &snapshot, lines, &mut interrupts).await?;

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// The prompt loop. An interrupt cancels the exchange in progress; at the
/// prompt it ends the session.
async fn repl<R>(
    client: &AssistantClient,
    snapshot: &DashboardSnapshot,
    mut lines: Lines<R>,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(()) = interrupts.recv() => {
                info!("Interrupt at the prompt, ending session");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            Input::Skip => {}
            Input::Exit => break,
            Input::Clear => {
                client.clear_conversation().await;
                println!("  Conversation cleared.");
            }
            Input::History => {
                println!("  {} messages in the conversation.", client.history_len().await);
            }
            Input::Question(question) => {
                eprint!("  ...");
                let result = run_exchange(client, question, snapshot, interrupts).await;
                eprint!("\r     \r");

                match result {
                    Ok(reply) => {
                        println!();
                        for line in reply.lines() {
                            println!("  Assistant > {line}");
                        }
                        println!();
                    }
                    Err(e) => {
                        warn!(error = %e, "Question failed");
                        eprintln!("  {}", describe_error(&e));
                        println!();
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tally_assistant::AssistantSettings;
    use tally_core::{CompletionRequest, Provider};
    use tokio::io::AsyncWriteExt;
    use tokio::sync::Notify;

    /// Never answers; tells the test when a request has started.
    #[derive(Default)]
    struct StuckProvider {
        started: Notify,
    }

    #[async_trait::async_trait]
    impl Provider for StuckProvider {
        fn name(&self) -> &str {
            "stuck"
        }

        async fn complete(&self, _request: &CompletionRequest) -> tally_core::Result<String> {
            self.started.notify_one();
            std::future::pending().await
        }
    }

    fn session() -> (Arc<StuckProvider>, AssistantClient, DashboardSnapshot) {
        let provider = Arc::new(StuckProvider::default());
        let client = AssistantClient::with_provider(provider.clone(), AssistantSettings::default());
        let snapshot = DashboardSnapshot::new().with("totalExpenses", "120.00");
        (provider, client, snapshot)
    }

    #[tokio::test]
    async fn interrupt_at_prompt_ends_session() {
        let (_provider, client, snapshot) = session();
        // Keep the writer alive so stdin never reaches EOF.
        let (_writer, reader) = tokio::io::duplex(64);
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(()).unwrap();

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            repl(&client, &snapshot, BufReader::new(reader).lines(), &mut rx),
        )
        .await;
        assert!(outcome.expect("session should end on interrupt").is_ok());
    }

    #[tokio::test]
    async fn interrupt_cancels_pending_question_and_session_continues() {
        let (provider, client, snapshot) = session();
        let (mut writer, reader) = tokio::io::duplex(256);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let driver = async {
            writer.write_all(b"How much did I spend?\n").await.unwrap();
            provider.started.notified().await;
            tx.send(()).unwrap();
            writer.write_all(b"/history\nexit\n").await.unwrap();
        };
        let (outcome, ()) = tokio::time::timeout(
            Duration::from_secs(5),
            async {
                tokio::join!(
                    repl(&client, &snapshot, BufReader::new(reader).lines(), &mut rx),
                    driver
                )
            },
        )
        .await
        .expect("session should finish after the interrupt");

        assert!(outcome.is_ok());
        assert_eq!(client.history_len().await, 1);
    }

    #[tokio::test]
    async fn closed_interrupt_channel_does_not_end_session() {
        let (_provider, client, snapshot) = session();
        let (mut writer, reader) = tokio::io::duplex(64);
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        drop(tx);

        writer.write_all(b"/clear\nexit\n").await.unwrap();
        let outcome = repl(&client, &snapshot, BufReader::new(reader).lines(), &mut rx).await;
        assert!(outcome.is_ok());
        assert_eq!(client.history_len().await, 1);
    }

    #[test]
    fn recognises_commands() {
        assert_eq!(parse_input("  exit "), Input::Exit);
        assert_eq!(parse_input("quit"), Input::Exit);
        assert_eq!(parse_input("/clear"), Input::Clear);
        assert_eq!(parse_input("/history"), Input::History);
        assert_eq!(parse_input("   "), Input::Skip);
    }

    #[test]
    fn anything_else_is_a_question() {
        assert_eq!(
            parse_input(" What's my biggest category? "),
            Input::Question("What's my biggest category?")
        );
        assert_eq!(parse_input("/unknown"), Input::Question("/unknown"));
    }
}

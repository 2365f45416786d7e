//! `tally ask`: One question, one reply.

use std::path::Path;

use tally_assistant::describe_error;
use tracing::warn;

use super::{build_client, interrupts, load_snapshot, run_exchange};

pub async fn run(snapshot_path: &Path, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(snapshot_path)?;
    let (_config, client) = build_client()?;
    let mut interrupts = interrupts();

    eprint!("  Thinking...");
    let result = run_exchange(&client, question, &snapshot, &mut interrupts).await;
    eprint!("\r              \r");

    let reply = into_reply(result)?;
    println!("{reply}");
    Ok(())
}

/// A failed exchange becomes the described error for `main` to report.
fn into_reply(result: tally_core::Result<String>) -> Result<String, Box<dyn std::error::Error>> {
    result.map_err(|e| {
        warn!(error = %e, "Question failed");
        describe_error(&e).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::AssistantError;

    #[test]
    fn reply_passes_through() {
        assert_eq!(into_reply(Ok("You spent $120.".into())).unwrap(), "You spent $120.");
    }

    #[test]
    fn failure_is_returned_as_described_error() {
        let err = into_reply(Err(AssistantError::Interrupted)).unwrap_err();
        assert_eq!(err.to_string(), "Error: Request interrupted");

        let err = into_reply(Err(AssistantError::RetriesExhausted { attempts: 3 })).unwrap_err();
        assert_eq!(err.to_string(), "Error: Max retries exceeded after 3 attempts");
    }
}

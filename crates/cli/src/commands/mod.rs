pub mod ask;
pub mod chat;
pub mod init;
pub mod set_key;
pub mod status;

use std::path::Path;

use tally_assistant::AssistantClient;
use tally_config::AppConfig;
use tally_core::DashboardSnapshot;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Read a dashboard snapshot from a JSON object file.
pub fn load_snapshot(path: &Path) -> Result<DashboardSnapshot, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read snapshot {}: {e}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| format!("Snapshot {} is not valid JSON: {e}", path.display()))?;
    Ok(DashboardSnapshot::from_json(&value)?)
}

/// Load config and build a client, with setup help when no key is set.
pub fn build_client() -> Result<(AppConfig, AssistantClient), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    DEEPSEEK_API_KEY=sk-...");
        eprintln!("    TALLY_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or store it in {}:", AppConfig::config_path().display());
        eprintln!("    tally set-key sk-...");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let client = AssistantClient::from_config(&config)?;
    Ok((config, client))
}

/// Ctrl-C presses, one message each. A single signal listener serves the
/// whole process.
pub fn interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run one exchange. An interrupt arriving meanwhile cancels it, and the
/// call then resolves to `Interrupted`.
pub async fn run_exchange(
    client: &AssistantClient,
    question: &str,
    snapshot: &DashboardSnapshot,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> tally_core::Result<String> {
    let cancel = CancellationToken::new();
    let exchange = client.process_question_with_cancel(question, snapshot, &cancel);
    tokio::pin!(exchange);

    tokio::select! {
        result = &mut exchange => result,
        Some(()) = interrupts.recv() => {
            info!("Interrupt received, cancelling the pending exchange");
            cancel.cancel();
            exchange.await
        }
    }
}

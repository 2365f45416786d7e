//! `tally status`: Show the effective configuration.

use tally_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let config_path = AppConfig::config_path();

    let key = match config.api_key() {
        Ok(key) => key.masked(),
        Err(_) => "(not set)".to_string(),
    };
    let window = match config.history.window() {
        Some(n) => format!("{n} messages"),
        None => "unbounded".to_string(),
    };

    println!("Tally Status");
    println!("============");
    println!("  Config file:  {}", config_path.display());
    println!("  Endpoint:     {}", config.api_url);
    println!("  Model:        {}", config.model);
    println!("  Temperature:  {}", config.temperature);
    println!("  Max tokens:   {}", config.max_tokens);
    println!("  API key:      {key}");
    println!(
        "  Retries:      {} attempts, {}s base delay",
        config.retry.max_attempts, config.retry.base_delay_secs
    );
    println!(
        "  Timeouts:     {}s connect, {}s request",
        config.http.connect_timeout_secs, config.http.read_timeout_secs
    );
    println!("  History:      {window}");

    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `tally init` first");
    }

    Ok(())
}

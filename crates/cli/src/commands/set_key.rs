//! `tally set-key`: Store the API key in the config file.

use tally_config::AppConfig;
use tally_core::ApiKey;

pub async fn run(key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();
    let config = AppConfig::save_api_key(&config_path, key)?;

    match config.api_key.as_deref().map(ApiKey::new) {
        Some(Ok(key)) => println!("✅ Saved API key {} to {}", key.masked(), config_path.display()),
        _ => println!("✅ Removed stored API key from {}", config_path.display()),
    }

    Ok(())
}

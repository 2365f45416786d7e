//! `tally init`: Write a default config file.

use tally_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();

    println!("Tally — First-Time Setup");
    println!("========================\n");

    if AppConfig::init_default_file(&config_path)? {
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   tally set-key sk-...        (or export DEEPSEEK_API_KEY)");
        println!("   tally ask --snapshot dashboard.json \"How much did I spend?\"");
    } else {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.");
    }

    Ok(())
}

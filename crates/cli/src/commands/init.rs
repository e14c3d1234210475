//! `skimmer init`: Write the default config file.

use skimmer_config::AppConfig;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_path);

    if path.exists() {
        println!("Config already exists at: {}", path.display());
        println!("   Edit it manually or delete it and re-run init.");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;

    println!("✅ Created config at: {}", path.display());
    println!("\nNext steps:");
    println!("   1. Set SKIMMER_API_KEY (or api_key in the config)");
    println!("   2. skimmer chat https://example.com");
    println!("   3. skimmer serve");
    Ok(())
}

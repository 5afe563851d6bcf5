//! `voxintent prompt`: Print the system prompt for the configured catalog.

use voxintent_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let classifier = super::build_classifier(&config);
    println!("{}", classifier.system_prompt());
    Ok(())
}

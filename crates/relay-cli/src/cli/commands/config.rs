//! Config command handlers.

use anyhow::{Context, Result};
use relay_core::api::ApiClient;
use relay_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn generate() -> Result<()> {
    let toml = config::Config::generate()?;
    print!("{toml}");
    Ok(())
}

pub fn set_backend(url: &str) -> Result<()> {
    // Reject URLs the client could never use.
    let client = ApiClient::new(url, None).with_context(|| format!("invalid backend URL '{url}'"))?;
    let config_path = config::paths::config_path();
    config::Config::save_backend_url_to(&config_path, url)
        .with_context(|| format!("update config at {}", config_path.display()))?;
    println!(
        "Backend set to {} in {}",
        client.base_url().as_str().trim_end_matches('/'),
        config_path.display()
    );
    Ok(())
}

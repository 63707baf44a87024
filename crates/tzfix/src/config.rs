use std::env;

use anyhow::{Context, Result};
use tzfix_core::ImmichConfig;

pub const URL_VAR: &str = "IMMICH_URL";
pub const API_KEY_VAR: &str = "IMMICH_API_KEY";

/// Reads catalog credentials from the environment (after loading `.env`).
pub fn load() -> Result<ImmichConfig> {
    dotenvy::dotenv().ok();

    let base_url = require(URL_VAR)?;
    let api_key = require(API_KEY_VAR)?;

    Ok(ImmichConfig::new(base_url, api_key))
}

fn require(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("{name} environment variable is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("{name} environment variable is empty");
    }
    Ok(value)
}

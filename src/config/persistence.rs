//! Config file load and save.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::types::AgentConfig;
use crate::system::CONFIG_PATH;

pub async fn load_config(path: Option<&str>) -> Result<AgentConfig> {
    let config_path = PathBuf::from(path.unwrap_or(CONFIG_PATH));

    if config_path.exists() {
        let content = tokio::fs::read_to_string(&config_path).await?;
        let config: AgentConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration at {:?}", config_path))?;

        debug!("Loaded configuration from: {:?}", config_path);
        Ok(config)
    } else {
        debug!("Config file not found at {:?}, using defaults", config_path);
        Ok(AgentConfig::default())
    }
}

pub async fn save_config(config: &AgentConfig, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!("Configuration saved to: {}", path);
    Ok(())
}

//! Agent configuration structs and defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub agent: AgentSettings,
    pub sleep: SleepSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepSettings {
    /// systemd time span handed to HibernateDelaySec and the escalation logic.
    pub hibernate_delay: String,
}

pub fn default_hibernate_delay() -> String {
    "1h".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent: AgentSettings::default(),
            sleep: SleepSettings::default(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
        }
    }
}

impl Default for SleepSettings {
    fn default() -> Self {
        Self {
            hibernate_delay: default_hibernate_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.sleep.hibernate_delay, "1h");
        assert_eq!(config.agent.log_level, "INFO");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"agent":{"log_level":"DEBUG"}}"#).unwrap();
        assert_eq!(config.agent.log_level, "DEBUG");
        assert_eq!(config.sleep.hibernate_delay, "1h");
    }

    #[test]
    fn round_trip() {
        let mut config = AgentConfig::default();
        config.sleep.hibernate_delay = "45min".to_string();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.sleep.hibernate_delay, "45min");
    }
}

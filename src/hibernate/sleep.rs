//! systemd sleep policy fragment and the hibernation memory-check bypass.

use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::hibernate::artifacts::ManagedFile;
use crate::hibernate::Artifact;
use crate::system::{self, executor};

pub fn sleep_conf(delay: &str) -> ManagedFile {
    ManagedFile::new(
        "sleep policy",
        system::SLEEP_CONF_PATH,
        system::SLEEP_CONF_TEMPLATE.replace("{{DELAY}}", delay),
    )
}

pub fn memcheck_dropins() -> Vec<ManagedFile> {
    vec![
        ManagedFile::new(
            "logind memory-check bypass",
            system::LOGIND_MEMCHECK_DROPIN,
            system::MEMCHECK_DROPIN_TEMPLATE.to_string(),
        ),
        ManagedFile::new(
            "hibernate memory-check bypass",
            system::HIBERNATE_MEMCHECK_DROPIN,
            system::MEMCHECK_DROPIN_TEMPLATE.to_string(),
        ),
    ]
}

/// Owned wholesale: any external edit of the policy file is overwritten on
/// the next run.
pub async fn ensure_sleep_conf(delay: &str) -> Result<()> {
    sleep_conf(delay).write_if_changed().await.map(|_| ())
}

pub async fn ensure_memcheck_bypass() -> Result<()> {
    let mut changed = false;
    for dropin in memcheck_dropins() {
        changed |= dropin.write_if_changed().await?;
    }
    if changed {
        executor::daemon_reload().await;
    }
    Ok(())
}

pub async fn memcheck_ready() -> bool {
    for dropin in memcheck_dropins() {
        if !dropin.exists().await {
            return false;
        }
    }
    true
}

pub async fn sleep_conf_ready() -> bool {
    match tokio::fs::read_to_string(system::SLEEP_CONF_PATH).await {
        Ok(contents) => contents.contains("HibernateDelaySec="),
        Err(_) => false,
    }
}

/// Parse the systemd time-span subset the agent accepts: an integer with an
/// s/min/h/d unit, or a bare integer meaning seconds.
pub fn parse_delay(spec: &str) -> Result<Duration> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(anyhow!("empty delay"));
    }

    let split = spec
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(spec.len());
    let (num, unit) = spec.split_at(split);
    let value: u64 = num
        .parse()
        .map_err(|_| anyhow!("invalid delay '{}': expected <number>[s|min|h|d]", spec))?;

    let secs = match unit {
        "" | "s" | "sec" | "seconds" => value,
        "m" | "min" | "minutes" => value * 60,
        "h" | "hr" | "hours" => value * 3600,
        "d" | "day" | "days" => value * 86400,
        _ => return Err(anyhow!("invalid delay unit '{}' in '{}'", unit, spec)),
    };

    if secs == 0 {
        return Err(anyhow!("delay must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_delays() {
        assert_eq!(parse_delay("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_delay("45min").unwrap(), Duration::from_secs(2700));
        assert_eq!(parse_delay("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_delay("2d").unwrap(), Duration::from_secs(172800));
        assert_eq!(parse_delay("300").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_delay(" 30m ").unwrap(), Duration::from_secs(1800));
    }

    #[test]
    fn rejects_bad_delays() {
        assert!(parse_delay("").is_err());
        assert!(parse_delay("0").is_err());
        assert!(parse_delay("0h").is_err());
        assert!(parse_delay("h").is_err());
        assert!(parse_delay("1fortnight").is_err());
        assert!(parse_delay("-5m").is_err());
    }

    #[test]
    fn sleep_conf_carries_the_delay() {
        let contents = system::SLEEP_CONF_TEMPLATE.replace("{{DELAY}}", "45min");
        assert!(contents.contains("HibernateDelaySec=45min"));
        assert!(contents.contains("AllowSuspendThenHibernate=yes"));
        assert!(contents.contains("AllowHibernation=yes"));
        assert!(contents.contains("AllowSuspend=yes"));
    }
}

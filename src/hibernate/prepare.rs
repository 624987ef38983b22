//! Prepare orchestration: provision swap, persist the resume address, then
//! converge the sleep-policy artifacts.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::types::AgentConfig;
use crate::hibernate::resume::{self, ResumeTarget};
use crate::hibernate::{sleep, swap, workarounds};

/// The full provisioning pass. Swap and resume failures abort; everything
/// after that only degrades, and status surfaces the gap on the next poll.
pub async fn run(config: &AgentConfig) -> Result<ResumeTarget> {
    info!("Preparing hibernation support");

    swap::ensure().await?;

    let target = resume::compute().await?;
    let changed = resume::persist(&target).await?;
    if changed {
        resume::regenerate_boot_config().await;
    } else {
        debug!("Resume fragment already current");
    }

    if let Err(e) = sleep::ensure_memcheck_bypass().await {
        warn!("Could not install the memory-check bypass: {}", e);
    }
    if let Err(e) = sleep::ensure_sleep_conf(&config.sleep.hibernate_delay).await {
        warn!("Could not write the sleep policy: {}", e);
    }
    workarounds::install_units().await;
    if let Err(e) = workarounds::install_inject_hook(&target).await {
        warn!("Could not install the resume-inject hook: {}", e);
    }

    info!(
        "Hibernation prepared: UUID={} offset={}",
        target.uuid, target.offset
    );
    Ok(target)
}

//! Hibernation and suspend-then-hibernate entry points.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::persistence::load_config;
use crate::hibernate::{prepare, resume, status};
use crate::system::{self, executor};

/// Push the resume address straight into the kernel controls. Some boot paths
/// drop the persisted cmdline address between wakes, so the trigger re-injects.
async fn inject_resume() -> Result<()> {
    let target = resume::compute().await?;

    tokio::fs::write(system::SYS_POWER_RESUME, &target.device)
        .await
        .with_context(|| format!("write {}", system::SYS_POWER_RESUME))?;
    tokio::fs::write(system::SYS_POWER_RESUME_OFFSET, target.offset.to_string())
        .await
        .with_context(|| format!("write {}", system::SYS_POWER_RESUME_OFFSET))?;

    info!(
        "Injected resume address {} offset {}",
        target.device, target.offset
    );
    Ok(())
}

/// Direct hibernate. On success this call blocks until the system resumes;
/// control never returns to the dispatcher in the normal case.
pub async fn hibernate() -> Result<()> {
    info!("Triggering hibernation");

    if !executor::run_ok("sync", &[]).await {
        warn!("Filesystem sync did not complete cleanly");
    }

    if let Err(e) = inject_resume().await {
        warn!(
            "Resume address injection failed ({}); relying on the persisted boot configuration",
            e
        );
    }

    tokio::fs::write(system::SYS_POWER_STATE, "disk\n")
        .await
        .context("Failed to write the hibernation trigger to /sys/power/state")?;

    // Only reached after wake-up.
    info!("Resumed from hibernation");
    Ok(())
}

/// Suspend now; the sleep manager escalates to hibernate after
/// HibernateDelaySec from the installed policy.
pub async fn suspend_then_hibernate() -> Result<()> {
    info!("Delegating to systemctl suspend-then-hibernate");
    executor::systemctl(&["suspend-then-hibernate"]).await?;
    Ok(())
}

/// Composite workflow: make sure the system is prepared, then hibernate.
pub async fn hibernate_now() -> Result<()> {
    let report = status::evaluate().await;
    if !report.ready() {
        info!(
            "System not ready for hibernation ({}); preparing first",
            report.code
        );
        let config = load_config(None).await?;
        prepare::run(&config).await?;
    } else {
        info!("System already configured for hibernation");
    }

    hibernate().await
}

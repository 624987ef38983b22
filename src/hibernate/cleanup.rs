//! Best-effort reversal of every artifact the agent manages.

use std::future::Future;

use anyhow::Result;

use crate::hibernate::{artifacts, power_button, resume, sleep, swap, workarounds};
use crate::hibernate::Artifact;
use crate::system::{self, executor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Removed,
    AlreadyAbsent,
    Failed(String),
}

#[derive(Debug)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// Attempt one reversal step and record it; failures never propagate.
async fn attempt<F>(name: &'static str, fut: F, report: &mut Vec<StepReport>)
where
    F: Future<Output = Result<bool>>,
{
    let outcome = match fut.await {
        Ok(true) => StepOutcome::Removed,
        Ok(false) => StepOutcome::AlreadyAbsent,
        Err(e) => StepOutcome::Failed(e.to_string()),
    };
    report.push(StepReport { name, outcome });
}

/// Reverse dependency order: newest configuration first, the backing store
/// last. Every step runs no matter what the earlier ones did.
pub async fn run() -> Vec<StepReport> {
    let mut report = Vec::new();

    attempt(
        "power-button override",
        power_button::remove_override(),
        &mut report,
    )
    .await;

    attempt(
        "boot resume fragment",
        artifacts::remove_path(system::GRUB_FRAGMENT_PATH),
        &mut report,
    )
    .await;
    if matches!(
        report.last().map(|r| &r.outcome),
        Some(StepOutcome::Removed)
    ) {
        // Drop resume= from the generated cmdline too.
        resume::regenerate_boot_config().await;
    }

    for dropin in workarounds::inject_dropins() {
        attempt(dropin.name(), dropin.delete(), &mut report).await;
    }
    attempt(
        "resume-inject script",
        artifacts::remove_path(system::INJECT_SCRIPT_PATH),
        &mut report,
    )
    .await;

    for dropin in sleep::memcheck_dropins() {
        attempt(dropin.name(), dropin.delete(), &mut report).await;
    }

    for unit in [workarounds::bluetooth_fix(), workarounds::boot_success()] {
        attempt(unit.name(), unit.remove(), &mut report).await;
    }

    attempt(
        "sleep policy",
        artifacts::remove_path(system::SLEEP_CONF_PATH),
        &mut report,
    )
    .await;

    // The unit cache must drop the removed units and drop-ins.
    executor::daemon_reload().await;

    attempt("swap activation", swap::deactivate(), &mut report).await;
    attempt("swap backing file", swap::delete_file(), &mut report).await;

    report
}

/// Print the aggregate report the way the dispatcher shows it.
pub fn print_report(report: &[StepReport]) {
    for step in report {
        match &step.outcome {
            StepOutcome::Removed => println!("✓ Removed {}", step.name),
            StepOutcome::AlreadyAbsent => println!("✓ {} was not installed", step.name),
            StepOutcome::Failed(e) => println!("⚠ Could not remove {}: {}", step.name, e),
        }
    }
    println!();
    println!("Cleanup complete. A reboot is recommended: the running kernel keeps");
    println!("its resume parameters until the next boot.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn failed_steps_do_not_stop_the_rest() {
        let mut report = Vec::new();

        attempt("first", async { Ok(true) }, &mut report).await;
        attempt("second", async { Err(anyhow!("boom")) }, &mut report).await;
        attempt("third", async { Ok(false) }, &mut report).await;

        assert_eq!(report.len(), 3);
        assert_eq!(report[0].outcome, StepOutcome::Removed);
        assert_eq!(report[1].outcome, StepOutcome::Failed("boom".to_string()));
        assert_eq!(report[2].outcome, StepOutcome::AlreadyAbsent);
    }

    #[tokio::test]
    async fn absence_is_not_a_failure() {
        let mut report = Vec::new();
        attempt("ghost", async { Ok(false) }, &mut report).await;
        assert_eq!(report[0].outcome, StepOutcome::AlreadyAbsent);
    }
}

//! Hardware-resume workaround units and the pre-hibernation resume-inject hook.

use anyhow::Result;
use tracing::warn;

use crate::hibernate::artifacts::{ManagedFile, ManagedUnit};
use crate::hibernate::resume::ResumeTarget;
use crate::hibernate::Artifact;
use crate::system::{self, executor};

pub fn bluetooth_fix() -> ManagedUnit {
    ManagedUnit::new(
        "bluetooth resume fix",
        system::BLUETOOTH_FIX_PATH,
        system::BLUETOOTH_FIX_UNIT,
        system::BLUETOOTH_FIX_UNIT_TEMPLATE.to_string(),
    )
}

pub fn boot_success() -> ManagedUnit {
    ManagedUnit::new(
        "boot-success marker",
        system::BOOT_SUCCESS_PATH,
        system::BOOT_SUCCESS_UNIT,
        system::BOOT_SUCCESS_UNIT_TEMPLATE.to_string(),
    )
}

pub fn inject_script(target: &ResumeTarget) -> ManagedFile {
    ManagedFile::new(
        "resume-inject script",
        system::INJECT_SCRIPT_PATH,
        system::INJECT_SCRIPT_TEMPLATE
            .replace("{{DEVICE}}", &target.device)
            .replace("{{OFFSET}}", &target.offset.to_string()),
    )
    .with_mode(0o700)
}

pub fn inject_dropins() -> Vec<ManagedFile> {
    let contents = system::INJECT_DROPIN_TEMPLATE.replace("{{SCRIPT}}", system::INJECT_SCRIPT_PATH);
    vec![
        ManagedFile::new(
            "hibernate inject drop-in",
            system::HIBERNATE_INJECT_DROPIN,
            contents.clone(),
        ),
        ManagedFile::new(
            "suspend-then-hibernate inject drop-in",
            system::STH_INJECT_DROPIN,
            contents,
        ),
    ]
}

/// Install both workaround units. They are independent; one failing only
/// costs that workaround.
pub async fn install_units() {
    for unit in [bluetooth_fix(), boot_success()] {
        if let Err(e) = unit.ensure().await {
            warn!("Could not install {}: {}", unit.name(), e);
        }
    }
}

/// Install the resume-inject script plus the ExecStartPre drop-ins that run
/// it on systemd-initiated transitions.
pub async fn install_inject_hook(target: &ResumeTarget) -> Result<()> {
    inject_script(target).write_if_changed().await?;

    let mut changed = false;
    for dropin in inject_dropins() {
        changed |= dropin.write_if_changed().await?;
    }
    if changed {
        executor::daemon_reload().await;
    }
    Ok(())
}

pub async fn units_installed() -> bool {
    bluetooth_fix().exists().await && boot_success().exists().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_script_carries_the_address() {
        let target = ResumeTarget {
            uuid: "3c5b9cc1-9f24-4f76-a23c-6f0f2b62a001".to_string(),
            device: "259:8".to_string(),
            offset: 1060864,
        };
        let contents = system::INJECT_SCRIPT_TEMPLATE
            .replace("{{DEVICE}}", &target.device)
            .replace("{{OFFSET}}", &target.offset.to_string());

        assert!(contents.contains("echo 259:8 > /sys/power/resume"));
        assert!(contents.contains("echo 1060864 > /sys/power/resume_offset"));
    }

    #[test]
    fn workaround_units_cover_resume_targets() {
        assert!(system::BLUETOOTH_FIX_UNIT_TEMPLATE.contains("After=suspend.target hibernate.target"));
        assert!(system::BOOT_SUCCESS_UNIT_TEMPLATE.contains("After=hibernate.target"));
        // Failed injection must not block the transition.
        assert!(system::INJECT_DROPIN_TEMPLATE.contains("ExecStartPre=-"));
    }
}

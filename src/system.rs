//! Managed system paths and file templates.

pub mod executor;

/// Swap backing store on the writable /home partition (root is read-only).
pub const SWAPFILE_PATH: &str = "/home/swapfile";
/// Allocation headroom on top of installed RAM.
pub const SWAP_MARGIN_BYTES: u64 = 1024 * 1024 * 1024;
/// swapon priority; higher than the stock zram device so the hibernation
/// image lands in the file the resume address points at.
pub const SWAP_PRIORITY: &str = "100";

pub const GRUB_FRAGMENT_PATH: &str = "/etc/default/grub.d/90-hibernado-resume.cfg";
pub const GRUB_MAIN_PATH: &str = "/etc/default/grub";
pub const KERNEL_CMDLINE_PATH: &str = "/etc/kernel/cmdline";

pub const LOGIND_MEMCHECK_DROPIN: &str =
    "/etc/systemd/system/systemd-logind.service.d/90-hibernado-memcheck.conf";
pub const HIBERNATE_MEMCHECK_DROPIN: &str =
    "/etc/systemd/system/systemd-hibernate.service.d/90-hibernado-memcheck.conf";

pub const SLEEP_CONF_PATH: &str = "/etc/systemd/sleep.conf.d/90-hibernado.conf";

pub const BLUETOOTH_FIX_UNIT: &str = "hibernado-bluetooth-fix.service";
pub const BLUETOOTH_FIX_PATH: &str = "/etc/systemd/system/hibernado-bluetooth-fix.service";
pub const BOOT_SUCCESS_UNIT: &str = "hibernado-boot-success.service";
pub const BOOT_SUCCESS_PATH: &str = "/etc/systemd/system/hibernado-boot-success.service";

pub const POWER_BUTTON_LINK: &str = "/etc/systemd/system/systemd-suspend.service";
pub const HIBERNATE_UNIT_PATH: &str = "/usr/lib/systemd/system/systemd-hibernate.service";
pub const SUSPEND_THEN_HIBERNATE_UNIT_PATH: &str =
    "/usr/lib/systemd/system/systemd-suspend-then-hibernate.service";

pub const INJECT_SCRIPT_PATH: &str = "/home/.hibernado/inject-resume.sh";
pub const HIBERNATE_INJECT_DROPIN: &str =
    "/etc/systemd/system/systemd-hibernate.service.d/90-hibernado-resume-inject.conf";
pub const STH_INJECT_DROPIN: &str =
    "/etc/systemd/system/systemd-suspend-then-hibernate.service.d/90-hibernado-resume-inject.conf";

pub const CONFIG_PATH: &str = "/etc/hibernado/config.json";

pub const SYS_POWER_STATE: &str = "/sys/power/state";
pub const SYS_POWER_RESUME: &str = "/sys/power/resume";
pub const SYS_POWER_RESUME_OFFSET: &str = "/sys/power/resume_offset";

/// Appends to the stock command line; never replaces it, so base image
/// updates to /etc/default/grub survive untouched.
pub const GRUB_FRAGMENT_TEMPLATE: &str = r#"# Managed by hibernado-agent. Removed by `hibernado-agent cleanup`.
GRUB_CMDLINE_LINUX_DEFAULT="$GRUB_CMDLINE_LINUX_DEFAULT resume=UUID={{UUID}} resume_offset={{OFFSET}}"
"#;

pub const MEMCHECK_DROPIN_TEMPLATE: &str = r#"[Service]
Environment=SYSTEMD_BYPASS_HIBERNATION_MEMORY_CHECK=1
"#;

pub const SLEEP_CONF_TEMPLATE: &str = r#"# Managed by hibernado-agent. Rewritten on every prepare run.
[Sleep]
AllowSuspend=yes
AllowHibernation=yes
AllowSuspendThenHibernate=yes
HibernateDelaySec={{DELAY}}
"#;

pub const BLUETOOTH_FIX_UNIT_TEMPLATE: &str = r#"[Unit]
Description=Restart Bluetooth after resume from hibernation
After=suspend.target hibernate.target suspend-then-hibernate.target

[Service]
Type=oneshot
ExecStart=/usr/bin/systemctl restart bluetooth.service

[Install]
WantedBy=suspend.target hibernate.target suspend-then-hibernate.target
"#;

pub const BOOT_SUCCESS_UNIT_TEMPLATE: &str = r#"[Unit]
Description=Mark the boot slot good after resume from hibernation
After=hibernate.target suspend-then-hibernate.target

[Service]
Type=oneshot
ExecStart=/usr/bin/steamos-bootconf set-mode booted

[Install]
WantedBy=hibernate.target suspend-then-hibernate.target
"#;

pub const INJECT_SCRIPT_TEMPLATE: &str = r#"#!/bin/bash
# Managed by hibernado-agent. Re-injects the resume address right before the
# kernel transition; some boot paths drop it between wakes.
echo {{DEVICE}} > /sys/power/resume
echo {{OFFSET}} > /sys/power/resume_offset
"#;

/// The `-` prefix keeps a failed injection from blocking the transition.
pub const INJECT_DROPIN_TEMPLATE: &str = r#"[Service]
ExecStartPre=-{{SCRIPT}}
"#;

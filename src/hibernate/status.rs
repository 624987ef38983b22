//! Readiness classification: an ordered fold over the precondition probes.

use serde_json::json;

use crate::hibernate::power_button::PowerButtonMode;
use crate::hibernate::{power_button, resume, sleep, swap, workarounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    SwapfileMissing,
    SwapfileTooSmall,
    SwapInactive,
    ResumeNotConfigured,
    SystemdNotConfigured,
    BluetoothFixMissing,
    SleepConfNotConfigured,
    Ready,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::SwapfileMissing => "SWAPFILE_MISSING",
            StatusCode::SwapfileTooSmall => "SWAPFILE_TOO_SMALL",
            StatusCode::SwapInactive => "SWAP_INACTIVE",
            StatusCode::ResumeNotConfigured => "RESUME_NOT_CONFIGURED",
            StatusCode::SystemdNotConfigured => "SYSTEMD_NOT_CONFIGURED",
            StatusCode::BluetoothFixMissing => "BLUETOOTH_FIX_MISSING",
            StatusCode::SleepConfNotConfigured => "SLEEP_CONF_NOT_CONFIGURED",
            StatusCode::Ready => "READY",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flag per precondition, plus the derived classification.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub swapfile_exists: bool,
    pub swapfile_size_ok: bool,
    pub swap_active: bool,
    pub resume_configured: bool,
    pub memcheck_bypassed: bool,
    pub workarounds_installed: bool,
    pub sleep_conf_configured: bool,
    pub power_button: Option<PowerButtonMode>,
    pub code: StatusCode,
}

impl StatusReport {
    pub fn ready(&self) -> bool {
        self.code == StatusCode::Ready
    }
}

/// First unmet precondition wins; the order is part of the contract.
fn classify(checks: &[(StatusCode, bool)]) -> StatusCode {
    checks
        .iter()
        .find(|(_, ok)| !ok)
        .map(|(code, _)| *code)
        .unwrap_or(StatusCode::Ready)
}

/// Read-only evaluation. Every probe treats an absent target as
/// "not configured"; nothing here can fail.
pub async fn evaluate() -> StatusReport {
    let swapfile = swap::probe().await;
    let swapfile_exists = swapfile != swap::SwapfileState::Missing;
    let swapfile_size_ok = swapfile_exists && swapfile != swap::SwapfileState::TooSmall;
    let swap_active = swapfile == swap::SwapfileState::Active;
    let resume_configured = resume::is_configured().await;
    let memcheck_bypassed = sleep::memcheck_ready().await;
    let workarounds_installed = workarounds::units_installed().await;
    let sleep_conf_configured = sleep::sleep_conf_ready().await;
    let power_button = power_button::current().await;

    let code = classify(&[
        (StatusCode::SwapfileMissing, swapfile_exists),
        (StatusCode::SwapfileTooSmall, swapfile_size_ok),
        (StatusCode::SwapInactive, swap_active),
        (StatusCode::ResumeNotConfigured, resume_configured),
        (StatusCode::SystemdNotConfigured, memcheck_bypassed),
        (StatusCode::BluetoothFixMissing, workarounds_installed),
        (StatusCode::SleepConfNotConfigured, sleep_conf_configured),
    ]);

    StatusReport {
        swapfile_exists,
        swapfile_size_ok,
        swap_active,
        resume_configured,
        memcheck_bypassed,
        workarounds_installed,
        sleep_conf_configured,
        power_button,
        code,
    }
}

/// Payload shape the plugin front-end consumes.
pub fn payload(report: &StatusReport) -> serde_json::Value {
    json!({
        "success": true,
        "status": report.code.as_str(),
        "swapfileExists": report.swapfile_exists,
        "swapfileSizeOk": report.swapfile_size_ok,
        "swapActive": report.swap_active,
        "resumeConfigured": report.resume_configured,
        "memcheckBypassed": report.memcheck_bypassed,
        "workaroundsInstalled": report.workarounds_installed,
        "sleepConfConfigured": report.sleep_conf_configured,
        "powerButton": report.power_button.map(|m| m.as_str()),
        "ready": report.ready(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checks(flags: [bool; 7]) -> [(StatusCode, bool); 7] {
        [
            (StatusCode::SwapfileMissing, flags[0]),
            (StatusCode::SwapfileTooSmall, flags[1]),
            (StatusCode::SwapInactive, flags[2]),
            (StatusCode::ResumeNotConfigured, flags[3]),
            (StatusCode::SystemdNotConfigured, flags[4]),
            (StatusCode::BluetoothFixMissing, flags[5]),
            (StatusCode::SleepConfNotConfigured, flags[6]),
        ]
    }

    #[test]
    fn all_checks_passing_is_ready() {
        assert_eq!(classify(&checks([true; 7])), StatusCode::Ready);
    }

    #[test]
    fn missing_swapfile_dominates_everything() {
        // Even with every later check failing too, the first miss wins.
        assert_eq!(
            classify(&checks([false, false, false, false, false, false, false])),
            StatusCode::SwapfileMissing
        );
    }

    #[test]
    fn each_check_maps_to_its_code() {
        let expected = [
            StatusCode::SwapfileMissing,
            StatusCode::SwapfileTooSmall,
            StatusCode::SwapInactive,
            StatusCode::ResumeNotConfigured,
            StatusCode::SystemdNotConfigured,
            StatusCode::BluetoothFixMissing,
            StatusCode::SleepConfNotConfigured,
        ];
        for (i, code) in expected.iter().enumerate() {
            let mut flags = [true; 7];
            flags[i] = false;
            assert_eq!(classify(&checks(flags)), *code);
        }
    }

    #[test]
    fn payload_carries_per_check_flags() {
        let report = StatusReport {
            swapfile_exists: true,
            swapfile_size_ok: true,
            swap_active: false,
            resume_configured: false,
            memcheck_bypassed: false,
            workarounds_installed: false,
            sleep_conf_configured: false,
            power_button: Some(PowerButtonMode::Hibernate),
            code: StatusCode::SwapInactive,
        };
        let value = payload(&report);
        assert_eq!(value["status"], "SWAP_INACTIVE");
        assert_eq!(value["swapfileExists"], true);
        assert_eq!(value["swapActive"], false);
        assert_eq!(value["powerButton"], "hibernate");
        assert_eq!(value["ready"], false);
    }
}

//! Privileged subprocess executor for the system utilities the agent drives.

use anyhow::{anyhow, Context, Result};
use tracing::{debug, trace, warn};

/// PATH handed to every child process; matches the dispatcher environment.
const CHILD_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin";

fn build_command(program: &str, args: &[&str]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).env("PATH", CHILD_PATH);
    cmd
}

/// Run a command and return its stdout. A non-zero exit becomes an error
/// carrying the command line and captured stderr.
pub async fn run(program: &str, args: &[&str]) -> Result<String> {
    trace!("Executing: {} {}", program, args.join(" "));

    let output = build_command(program, args)
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", program))?;

    if !output.status.success() {
        return Err(anyhow!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a command for its exit status only. Execution errors count as failure.
pub async fn run_ok(program: &str, args: &[&str]) -> bool {
    trace!("Executing: {} {}", program, args.join(" "));

    build_command(program, args)
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

pub async fn systemctl(args: &[&str]) -> Result<String> {
    run("systemctl", args).await
}

/// Best-effort systemctl; logs instead of failing.
pub async fn try_systemctl(args: &[&str]) -> bool {
    let ok = run_ok("systemctl", args).await;
    if !ok {
        debug!("systemctl {} did not succeed", args.join(" "));
    }
    ok
}

pub async fn daemon_reload() {
    if !try_systemctl(&["daemon-reload"]).await {
        warn!("Failed to reload systemd units (run: systemctl daemon-reload)");
    }
}

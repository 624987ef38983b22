//! Hibernado agent entry point: CLI dispatch, privilege gate, async runtime.
//!
//! The plugin front-end never talks to this binary directly; the privileged
//! dispatcher invokes one subcommand per remote operation and forwards stdout
//! (status codes, `SUCCESS:<uuid>:<offset>`) back to the UI.

mod app;
mod config;
mod hibernate;
mod system;

use anyhow::Result;
use clap::Parser;

use app::cli::{Args, Command, PowerButtonAction, HELP_TEXT};
use app::logging::init_tracing;
use config::persistence::{load_config, save_config};
use hibernate::{cleanup, power_button, prepare, sleep, status, trigger};

/// Mutating commands refuse to run unprivileged instead of failing halfway
/// through with a permissions error.
fn require_root(action: &str) -> Result<()> {
    #[cfg(target_os = "linux")]
    if unsafe { libc::geteuid() } != 0 {
        return Err(anyhow::anyhow!(
            "Root privileges required. Run with: sudo hibernado-agent {}",
            action
        ));
    }
    Ok(())
}

/// Log level priority: --log-level flag, LOG_LEVEL env, config file, info.
fn resolve_log_filter(flag: Option<&str>) -> String {
    let level = flag
        .map(str::to_string)
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .or_else(|| {
            // Tracing is not up yet, so peek at the config without the loader.
            let contents = std::fs::read_to_string(system::CONFIG_PATH).ok()?;
            let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
            Some(value.get("agent")?.get("log_level")?.as_str()?.to_string())
        })
        .unwrap_or_else(|| "info".to_string())
        .to_lowercase();

    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => {
            eprintln!(
                "Invalid log level '{}'. Using INFO. Valid levels: TRACE, DEBUG, INFO, WARN, ERROR",
                level
            );
            "info".to_string()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments with custom error handling
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            if err.kind() == clap::error::ErrorKind::DisplayHelp {
                print!("{}", HELP_TEXT);
                std::process::exit(0);
            }
            // Custom version output with architecture (green)
            if err.kind() == clap::error::ErrorKind::DisplayVersion {
                println!(
                    "\x1b[32mhibernado-agent {} ({})\x1b[0m",
                    env!("CARGO_PKG_VERSION"),
                    std::env::consts::ARCH
                );
                std::process::exit(0);
            }

            eprintln!("{}", err);
            eprintln!();
            print!("{}", HELP_TEXT);
            std::process::exit(1);
        }
    };

    let Some(command) = args.command else {
        eprintln!("ERROR: No command specified.");
        print!("{}", HELP_TEXT);
        std::process::exit(1);
    };

    let filter = resolve_log_filter(args.log_level.as_deref());
    init_tracing(&filter);

    match command {
        Command::Status { json } => {
            let report = status::evaluate().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&status::payload(&report))?);
            } else {
                println!("{}", report.code);
            }
        }

        Command::Prepare => {
            require_root("prepare")?;
            let config = load_config(None).await?;
            let target = prepare::run(&config).await?;
            println!("SUCCESS:{}:{}", target.uuid, target.offset);
        }

        Command::Hibernate => {
            require_root("hibernate")?;
            trigger::hibernate().await?;
        }

        Command::HibernateNow => {
            require_root("hibernate-now")?;
            trigger::hibernate_now().await?;
        }

        Command::SuspendThenHibernate => {
            require_root("suspend-then-hibernate")?;
            trigger::suspend_then_hibernate().await?;
        }

        Command::SetPowerButton { action } => {
            require_root("set-power-button")?;
            match action {
                PowerButtonAction::Enable { mode } => power_button::enable(mode).await?,
                PowerButtonAction::Disable => power_button::disable().await?,
            }
        }

        Command::Cleanup => {
            require_root("cleanup")?;
            let report = cleanup::run().await;
            cleanup::print_report(&report);
        }

        Command::GetDelay => {
            let config = load_config(None).await?;
            println!("{}", config.sleep.hibernate_delay);
        }

        Command::SetDelay { delay } => {
            require_root("set-delay")?;
            sleep::parse_delay(&delay)?;

            let mut config = load_config(None).await?;
            config.sleep.hibernate_delay = delay.clone();
            save_config(&config, system::CONFIG_PATH).await?;

            // Already-installed policy picks the new delay up immediately.
            if sleep::sleep_conf_ready().await {
                sleep::ensure_sleep_conf(&delay).await?;
            }
            println!("✓ Hibernate delay set to {}", delay);
        }
    }

    Ok(())
}

//! Command-line argument definitions (clap) and help text.

use clap::{Parser, Subcommand};

use crate::hibernate::power_button::PowerButtonMode;

pub const HELP_TEXT: &str = "
Hibernado Hibernation Setup Agent
Usage: hibernado-agent [OPTIONS] <COMMAND>

Commands:
  status                  Print the readiness classification (READY, SWAPFILE_MISSING, ...)
  prepare                 Provision swapfile, resume parameters, sleep policy, workarounds
  hibernate               Hibernate immediately (assumes the system is prepared)
  hibernate-now           Prepare if needed, then hibernate
  suspend-then-hibernate  Suspend now, hibernate after the configured delay
  set-power-button        Bind the power button to hibernate or suspend-then-hibernate
  cleanup                 Remove every artifact this agent manages (best effort)
  get-delay               Print the suspend-then-hibernate escalation delay
  set-delay <DELAY>       Set the escalation delay (e.g. 1h, 45min, 90s)

Options:
  -h, --help                Print help
  -V, --version             Print version
      --log-level <LEVEL>   Set log level (TRACE, DEBUG, INFO, WARN, ERROR)
";

#[derive(Parser, Debug)]
#[command(name = "hibernado-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hibernation setup and trigger agent for SteamOS handhelds", long_about = None)]
pub struct Args {
    /// Set log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the readiness classification
    Status {
        /// Emit the structured status payload for the plugin front-end
        #[arg(long)]
        json: bool,
    },

    /// Provision swapfile, resume parameters, sleep policy and workarounds
    Prepare,

    /// Hibernate immediately (assumes the system is prepared)
    Hibernate,

    /// Prepare if needed, then hibernate
    #[command(name = "hibernate-now")]
    HibernateNow,

    /// Suspend now, hibernate after the configured delay
    #[command(name = "suspend-then-hibernate")]
    SuspendThenHibernate,

    /// Bind the hardware power button to a sleep action
    #[command(name = "set-power-button")]
    SetPowerButton {
        #[command(subcommand)]
        action: PowerButtonAction,
    },

    /// Remove every artifact this agent manages (best effort)
    Cleanup,

    /// Print the suspend-then-hibernate escalation delay
    #[command(name = "get-delay")]
    GetDelay,

    /// Set the escalation delay (e.g. 1h, 45min, 90s)
    #[command(name = "set-delay")]
    SetDelay { delay: String },
}

#[derive(Subcommand, Debug)]
pub enum PowerButtonAction {
    /// Point the power button at the given sleep action
    Enable {
        #[arg(value_enum)]
        mode: PowerButtonMode,
    },

    /// Restore the default power button behavior
    Disable,
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Settings;
use crate::executor::FailurePolicy;
use crate::target::TargetDescriptor;

/// firstmate - install and update services on remote hosts over SSH
#[derive(Parser, Debug)]
#[command(name = "firstmate")]
#[command(about = "Install and update applications on remote hosts over SSH")]
#[command(version)]
pub struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON settings file (step delay, failure policy, SSH port/timeout)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install an application on a host
    Install(RunArgs),
    /// Update an installed application on a host
    Update(RunArgs),
    /// List the applications that can be installed
    List,
    /// Validate a settings file
    Validate {
        /// Path to the settings file to validate
        path: PathBuf,
    },
    /// Write a settings file with default values
    Init {
        /// Where to write the settings file
        path: PathBuf,
    },
}

/// Arguments shared by `install` and `update`.
///
/// Required values are optional at the parser level so that missing ones
/// are reported together with their own exit code.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Application name (see `firstmate list`)
    #[arg(short, long)]
    pub app: Option<String>,

    /// Target host, `fqdn` or `fqdn:port`
    #[arg(long)]
    pub host: Option<String>,

    /// SSH user
    #[arg(short, long, env = "SSH_USER")]
    pub user: Option<String>,

    /// SSH password
    #[arg(short, long, env = "SSH_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Secondary user: GitHub user for private clones, and the F5 account
    /// written by `f5exporter` (required to install it)
    #[arg(long = "gh-user", visible_alias = "gh_user", env = "GITHUB_USER")]
    pub gh_user: Option<String>,

    /// Secondary secret: GitHub token for private clones, and the F5
    /// password written by `f5exporter` (required to install it)
    #[arg(
        long = "gh-pass",
        visible_alias = "gh_pass",
        env = "GITHUB_PASS",
        hide_env_values = true
    )]
    pub gh_pass: Option<String>,

    /// Pause between steps in milliseconds (0 disables)
    #[arg(long)]
    pub step_delay_ms: Option<u64>,

    /// Stop at the first failed step
    #[arg(long)]
    pub fail_fast: bool,

    /// Exit with a failure status when any step failed
    #[arg(long)]
    pub strict: bool,

    /// SSH port used when --host carries none
    #[arg(long)]
    pub port: Option<u16>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl RunArgs {
    /// Names of the required flags that were not supplied.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !present(&self.app) {
            missing.push("--app");
        }
        if !present(&self.host) {
            missing.push("--host");
        }
        if !present(&self.user) {
            missing.push("--user");
        }
        if !present(&self.pass) {
            missing.push("--pass");
        }
        missing
    }

    /// Names of the secondary credential flags that were not supplied.
    pub fn missing_secondary(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !present(&self.gh_user) {
            missing.push("--gh-user");
        }
        if !present(&self.gh_pass) {
            missing.push("--gh-pass");
        }
        missing
    }

    pub fn app_name(&self) -> &str {
        self.app.as_deref().unwrap_or_default()
    }

    /// Descriptor for the target host. Absent values become empty strings.
    pub fn target(&self) -> TargetDescriptor {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        TargetDescriptor::new(text(&self.host), text(&self.user), text(&self.pass))
            .with_secondary(text(&self.gh_user), text(&self.gh_pass))
    }

    /// Apply command-line overrides on top of file settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(delay) = self.step_delay_ms {
            settings.step_delay_ms = delay;
        }
        if self.fail_fast {
            settings.failure_policy = FailurePolicy::FailFast;
        }
        if self.strict {
            settings.strict = true;
        }
        if let Some(port) = self.port {
            settings.ssh.port = port;
        }
    }
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    /// Bad command line or unusable settings file
    Usage = 1,
    MissingFlags = 2,
    UnknownApplication = 3,
    /// Connection failure, or failed steps under `--strict`/`--fail-fast`
    RunFailed = 4,
}

impl ExitStatus {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

//! Step executor
//!
//! Runs one [`StepPlan`] against one target over a single session:
//!
//! 1. connect (failure aborts the run before any step)
//! 2. mark the tracker running and log the start
//! 3. for each step in order: log a header, resolve, execute, log the
//!    outcome, pace
//! 4. close the session (drop guard, so every exit path releases it)
//! 5. mark the tracker stopped and log completion
//!
//! Per-step failures are recorded in the returned [`RunResult`]. Under
//! [`FailurePolicy::Continue`] the remaining steps still run; a failing
//! `systemctl stop` on a fresh host must not abort an install.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::plan::StepPlan;
use crate::session::{ConnectError, Connector, ExecError, SessionGuard};
use crate::target::TargetDescriptor;
use crate::template::TemplateTable;
use crate::tracker::{JobTracker, RunningGuard};

/// Default pause between steps.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure and run the next step.
    #[default]
    Continue,
    /// Stop at the first failed step.
    FailFast,
}

/// Tunables for a [`StepExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Pause after every executed step; zero disables pacing.
    pub step_delay: Duration,
    pub policy: FailurePolicy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            policy: FailurePolicy::Continue,
        }
    }
}

/// One step that failed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Zero-based position in the plan.
    pub index: usize,
    /// Redacted step label.
    pub label: String,
    pub error: ExecError,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// Every step executed without error.
    Succeeded { executed: usize },
    /// At least one step failed. `skipped` counts steps never attempted
    /// because of [`FailurePolicy::FailFast`].
    PartialFailure {
        executed: usize,
        skipped: usize,
        failures: Vec<StepFailure>,
    },
    /// No session could be opened; no step was attempted.
    ConnectionFailed { reason: ConnectError },
}

impl RunResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    #[inline]
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Number of steps sent to the remote host.
    pub fn executed(&self) -> usize {
        match self {
            Self::Succeeded { executed } | Self::PartialFailure { executed, .. } => *executed,
            Self::ConnectionFailed { .. } => 0,
        }
    }

    /// Failed steps, empty unless this is a partial failure.
    pub fn failures(&self) -> &[StepFailure] {
        match self {
            Self::PartialFailure { failures, .. } => failures,
            _ => &[],
        }
    }

    /// One-line summary for the status log and the CLI.
    pub fn summary(&self) -> String {
        match self {
            Self::Succeeded { executed } => format!("{} step(s) executed", executed),
            Self::PartialFailure {
                executed,
                skipped,
                failures,
            } => {
                let mut summary = format!(
                    "{} of {} executed step(s) failed",
                    failures.len(),
                    executed
                );
                if *skipped > 0 {
                    summary.push_str(&format!(", {} skipped", skipped));
                }
                summary
            }
            Self::ConnectionFailed { reason } => format!("connection failed: {}", reason),
        }
    }
}

/// Object-safe view of an executor, so components can run plans without
/// knowing the transport.
pub trait PlanRunner {
    fn run(
        &self,
        target: &TargetDescriptor,
        plan: &StepPlan,
        templates: &TemplateTable,
    ) -> RunResult;
}

/// Executes step plans over sessions opened by `C`.
pub struct StepExecutor<C: Connector> {
    connector: C,
    tracker: JobTracker,
    config: ExecutorConfig,
}

impl<C: Connector> StepExecutor<C> {
    pub fn new(connector: C, tracker: JobTracker) -> Self {
        Self::with_config(connector, tracker, ExecutorConfig::default())
    }

    pub fn with_config(connector: C, tracker: JobTracker, config: ExecutorConfig) -> Self {
        Self {
            connector,
            tracker,
            config,
        }
    }

    #[inline]
    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    #[inline]
    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    #[inline]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Execute `plan` against `target`, resolving custom steps with
    /// `templates`.
    pub fn run(
        &self,
        target: &TargetDescriptor,
        plan: &StepPlan,
        templates: &TemplateTable,
    ) -> RunResult {
        let session = match self
            .connector
            .connect(target.fqdn(), target.user(), target.secret())
        {
            Ok(session) => session,
            Err(reason) => {
                warn!("SSH connection to {} failed: {}", target.fqdn(), reason);
                self.tracker
                    .append(format!("Connection to {} failed: {}", target.fqdn(), reason));
                return RunResult::ConnectionFailed { reason };
            }
        };
        let mut session = SessionGuard::new(session);

        let running = RunningGuard::start(&self.tracker);
        info!(
            "Starting {} of {} on {}",
            plan.operation(),
            plan.app(),
            target.fqdn()
        );
        self.tracker.append(format!(
            "Firstmate job started: {} {} on {}",
            plan.operation(),
            plan.app(),
            target.fqdn()
        ));

        let total = plan.len();
        let mut executed = 0;
        let mut failures = Vec::new();

        for (index, step) in plan.steps().iter().enumerate() {
            let label = target.redact(&step.label());
            self.tracker
                .append(format!("[{}/{}] {}", index + 1, total, label));

            let command = templates.resolve(step, target);
            debug!("Executing: {}", target.redact(&command));

            executed += 1;
            match session.exec(&command) {
                Ok(output) => {
                    let output = output.trim();
                    if !output.is_empty() {
                        debug!("Output: {}", target.redact(output));
                        self.tracker.append(target.redact(output));
                    }
                }
                Err(error) => {
                    let message = target.redact(&error.to_string());
                    warn!("Step {}/{} failed: {}: {}", index + 1, total, label, message);
                    self.tracker.append(format!(
                        "WARNING: step {}/{} failed: {}",
                        index + 1,
                        total,
                        message
                    ));
                    failures.push(StepFailure {
                        index,
                        label,
                        error,
                    });

                    if self.config.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }

            if !self.config.step_delay.is_zero() {
                thread::sleep(self.config.step_delay);
            }
        }

        drop(session);
        drop(running);

        let result = if failures.is_empty() {
            RunResult::Succeeded { executed }
        } else {
            RunResult::PartialFailure {
                executed,
                skipped: total - executed,
                failures,
            }
        };

        info!(
            "Finished {} of {} on {}: {}",
            plan.operation(),
            plan.app(),
            target.fqdn(),
            result.summary()
        );
        self.tracker.append(format!(
            "Firstmate job completed: {} {} ({})",
            plan.operation(),
            plan.app(),
            result.summary()
        ));
        result
    }
}

impl<C: Connector> PlanRunner for StepExecutor<C> {
    fn run(
        &self,
        target: &TargetDescriptor,
        plan: &StepPlan,
        templates: &TemplateTable,
    ) -> RunResult {
        StepExecutor::run(self, target, plan, templates)
    }
}

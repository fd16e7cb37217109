//! firstmate library
//!
//! Remote step execution for installing and updating applications on
//! Linux hosts over SSH: step plans, template resolution, the sequential
//! executor, the job status tracker and the built-in application catalogue.

pub mod apps;
pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod executor;
pub mod plan;
pub mod progress;
pub mod registry;
pub mod session;
pub mod ssh;
pub mod target;
pub mod template;
pub mod tracker;

// Re-export main types for convenience
pub use component::{CatalogueApp, Component};
pub use config::{Settings, SshSettings};
pub use error::{FirstmateError, Result};
pub use executor::{
    ExecutorConfig, FailurePolicy, PlanRunner, RunResult, StepExecutor, StepFailure,
};
pub use plan::{Operation, Step, StepPlan};
pub use progress::ProgressPrinter;
pub use registry::{ComponentFactory, Registry, RegistryError};
pub use session::{ConnectError, Connector, ExecError, RemoteSession, SessionGuard};
pub use ssh::{SshConnector, SshSession};
pub use target::TargetDescriptor;
pub use template::{
    CustomAction, Renderer, TemplateTable, UnitFile, write_file, write_file_verbatim,
};
pub use tracker::JobTracker;

//! Deployable components.
//!
//! A component supplies the step plans for one application and the template
//! table that resolves its custom actions. Running a plan is delegated to a
//! [`PlanRunner`], so the same component works against the SSH executor and
//! against test doubles.

use tracing::debug;

use crate::executor::{PlanRunner, RunResult};
use crate::plan::{Operation, Step, StepPlan};
use crate::target::TargetDescriptor;
use crate::template::TemplateTable;

/// Capability shared by every deployable application.
pub trait Component: Send + Sync {
    /// Registry key, e.g. `"prometheus"`.
    fn name(&self) -> &'static str;

    /// Short human-readable description.
    fn description(&self) -> &'static str;

    /// Steps for a fresh install. May depend on the target (credentials
    /// embedded in clone URLs).
    fn install_plan(&self, target: &TargetDescriptor) -> StepPlan;

    /// Steps for updating an existing install.
    fn update_plan(&self) -> StepPlan;

    /// Renderers for the custom actions this component emits.
    fn templates(&self) -> TemplateTable;

    /// Returns true if `operation` cannot run without the target's
    /// secondary credentials.
    fn requires_secondary(&self, _operation: Operation) -> bool {
        false
    }

    fn plan(&self, operation: Operation, target: &TargetDescriptor) -> StepPlan {
        match operation {
            Operation::Install => self.install_plan(target),
            Operation::Update => self.update_plan(),
        }
    }

    /// Resolve one step with this component's templates.
    fn resolve(&self, step: &Step, target: &TargetDescriptor) -> String {
        self.templates().resolve(step, target)
    }

    fn execute(
        &self,
        operation: Operation,
        runner: &dyn PlanRunner,
        target: &TargetDescriptor,
    ) -> RunResult {
        debug!("Planning {} {} for {}", self.name(), operation, target.fqdn());
        let plan = self.plan(operation, target);
        runner.run(target, &plan, &self.templates())
    }

    /// Install the application on `target`.
    fn deploy(&self, runner: &dyn PlanRunner, target: &TargetDescriptor) -> RunResult {
        self.execute(Operation::Install, runner, target)
    }

    /// Update the application on `target`.
    fn update(&self, runner: &dyn PlanRunner, target: &TargetDescriptor) -> RunResult {
        self.execute(Operation::Update, runner, target)
    }
}

/// Component whose plans are fixed catalogue strings.
#[derive(Debug, Clone, Copy)]
pub struct CatalogueApp {
    pub name: &'static str,
    pub description: &'static str,
    pub install: &'static [&'static str],
    pub update: &'static [&'static str],
    /// The install plan writes the secondary credentials to the host.
    pub secondary_on_install: bool,
    pub templates: TemplateTable,
}

impl Component for CatalogueApp {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn requires_secondary(&self, operation: Operation) -> bool {
        self.secondary_on_install && operation == Operation::Install
    }

    fn install_plan(&self, _target: &TargetDescriptor) -> StepPlan {
        StepPlan::from_entries(self.name, Operation::Install, self.install)
    }

    fn update_plan(&self) -> StepPlan {
        StepPlan::from_entries(self.name, Operation::Update, self.update)
    }

    fn templates(&self) -> TemplateTable {
        self.templates
    }
}

//! Property-based tests for firstmate
//!
//! These tests verify:
//! - Execution order equals plan order, with or without failures
//! - Template resolution is pure
//! - Catalogue string parsing and step labels

mod common;

use std::time::Duration;

use proptest::prelude::*;

use common::MockConnector;
use firstmate::{
    CustomAction, ExecutorConfig, FailurePolicy, JobTracker, Operation, Step, StepExecutor,
    StepPlan, TargetDescriptor, TemplateTable, UnitFile,
};

fn unit(_: &TargetDescriptor) -> String {
    UnitFile::service("app", "App Service", "/opt/app/app").render()
}

const TEMPLATES: TemplateTable = TemplateTable::new(&[(CustomAction::CreateUnitFile, unit)]);

/// Shell-ish command text that is never a custom action.
fn command_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 /._-]{0,30}"
}

// =============================================================================
// Executor ordering
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every step is executed exactly once, in plan order, even when some fail.
    #[test]
    fn execution_order_matches_plan(
        commands in prop::collection::vec(command_strategy(), 0..12),
        failing in prop::collection::vec(any::<bool>(), 12),
    ) {
        // Tag failing commands so the mock can recognise them.
        let entries: Vec<String> = commands
            .iter()
            .zip(&failing)
            .enumerate()
            .map(|(i, (cmd, fail))| {
                if *fail { format!("{cmd} #fail{i}") } else { format!("{cmd} #{i}") }
            })
            .collect();

        let mock = MockConnector::new().fail_when("#fail");
        let config = ExecutorConfig { step_delay: Duration::ZERO, policy: FailurePolicy::Continue };
        let executor = StepExecutor::with_config(mock.clone(), JobTracker::new(), config);
        let plan = StepPlan::from_entries("app", Operation::Install, &entries);
        let target = TargetDescriptor::new("h", "u", "s3cret");

        let result = executor.run(&target, &plan, &TemplateTable::EMPTY);

        prop_assert_eq!(mock.commands(), entries.clone());
        prop_assert_eq!(result.executed(), entries.len());
        let expected_failures = entries.iter().filter(|e| e.contains("#fail")).count();
        prop_assert_eq!(result.failures().len(), expected_failures);
        prop_assert_eq!(mock.recorded().closes, 1);
    }
}

// =============================================================================
// Template resolution
// =============================================================================

proptest! {
    /// Resolving the same step twice yields byte-identical commands.
    #[test]
    fn resolve_is_pure(
        host in "[a-z]{1,10}",
        user in "[a-z]{1,10}",
        secret in "[a-zA-Z0-9]{1,16}",
    ) {
        let target = TargetDescriptor::new(host, user, secret);
        let step = Step::custom("CreateUnitFile");
        let first = TEMPLATES.resolve(&step, &target);
        let second = TEMPLATES.resolve(&step, &target);
        prop_assert_eq!(first, second);
    }

    /// Literal steps pass through unchanged.
    #[test]
    fn literal_resolves_to_itself(cmd in command_strategy()) {
        let target = TargetDescriptor::new("h", "u", "p");
        prop_assert_eq!(TEMPLATES.resolve(&Step::literal(cmd.clone()), &target), cmd);
    }
}

// =============================================================================
// Step parsing
// =============================================================================

proptest! {
    /// `CUSTOM:` entries parse to the trimmed tag regardless of spacing.
    #[test]
    fn custom_entries_parse_to_tag(tag in "[A-Za-z]{1,20}", pad in " {0,3}") {
        let entry = format!("CUSTOM:{pad}{tag}{pad}");
        prop_assert_eq!(Step::parse(&entry), Step::custom(tag.clone()));
        prop_assert!(Step::parse(&entry).is_custom());
    }

    /// Anything without the prefix is a literal, kept verbatim.
    #[test]
    fn other_entries_are_literal(cmd in command_strategy()) {
        prop_assert_eq!(Step::parse(&cmd), Step::literal(cmd.clone()));
    }

    /// A parsed custom step displays back as its catalogue form.
    #[test]
    fn custom_display_is_catalogue_form(tag in "[A-Za-z]{1,20}") {
        let step = Step::custom(tag.clone());
        prop_assert_eq!(step.to_string(), format!("CUSTOM: {tag}"));
        prop_assert_eq!(Step::parse(&step.to_string()), step);
    }
}

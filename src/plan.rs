//! Step plans: the ordered remote actions for one application/operation pair.
//!
//! Catalogue entries are plain strings. A string of the form
//! `CUSTOM: <Tag>` is a custom action that the template resolver turns into
//! a literal command at execution time; every other string is run verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Prefix marking a catalogue entry as a custom action.
pub const CUSTOM_PREFIX: &str = "CUSTOM:";

/// Operation a plan performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Install,
    Update,
}

impl Operation {
    /// Capitalised verb for user-facing messages ("Install failed: ...").
    pub const fn title(self) -> &'static str {
        match self {
            Self::Install => "Install",
            Self::Update => "Update",
        }
    }
}

/// One remote action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Shell command executed as-is.
    Literal(String),
    /// Symbolic tag resolved through the component's template table.
    Custom(String),
}

impl Step {
    pub fn literal(command: impl Into<String>) -> Self {
        Self::Literal(command.into())
    }

    pub fn custom(tag: impl Into<String>) -> Self {
        Self::Custom(tag.into())
    }

    /// Parse a catalogue entry.
    pub fn parse(entry: &str) -> Self {
        match entry.trim_start().strip_prefix(CUSTOM_PREFIX) {
            Some(tag) => Self::Custom(tag.trim().to_string()),
            None => Self::Literal(entry.to_string()),
        }
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Human-readable label used in progress output. Custom actions are
    /// shown by tag, never by their rendered body.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(command) => f.write_str(command),
            Self::Custom(tag) => write!(f, "{} {}", CUSTOM_PREFIX, tag),
        }
    }
}

impl FromStr for Step {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Step {
    fn from(entry: &str) -> Self {
        Self::parse(entry)
    }
}

/// Ordered, immutable sequence of steps for one application and operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    app: String,
    operation: Operation,
    steps: Vec<Step>,
}

impl StepPlan {
    pub fn new(app: impl Into<String>, operation: Operation, steps: Vec<Step>) -> Self {
        Self {
            app: app.into(),
            operation,
            steps,
        }
    }

    /// Build a plan from catalogue strings, preserving their order.
    pub fn from_entries<I, S>(app: impl Into<String>, operation: Operation, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let steps = entries
            .into_iter()
            .map(|entry| Step::parse(entry.as_ref()))
            .collect();
        Self::new(app, operation, steps)
    }

    #[inline]
    pub fn app(&self) -> &str {
        &self.app
    }

    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over the custom-action tags the plan emits.
    pub fn custom_tags(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            Step::Custom(tag) => Some(tag.as_str()),
            Step::Literal(_) => None,
        })
    }
}

impl<'a> IntoIterator for &'a StepPlan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(
            Step::parse("systemctl daemon-reload"),
            Step::Literal("systemctl daemon-reload".to_string())
        );
    }

    #[test]
    fn test_parse_custom_trims_tag() {
        assert_eq!(
            Step::parse("CUSTOM: CreateUnitFile"),
            Step::Custom("CreateUnitFile".to_string())
        );
        assert_eq!(
            Step::parse("CUSTOM:CreateConfigFile "),
            Step::Custom("CreateConfigFile".to_string())
        );
    }

    #[test]
    fn test_custom_must_be_prefix() {
        // A literal that merely mentions the marker stays literal
        let step = Step::parse("echo CUSTOM: nothing");
        assert!(!step.is_custom());
    }

    #[test]
    fn test_label_round_trips_through_parse() {
        let step = Step::custom("CreateNTPFile");
        assert_eq!(step.label(), "CUSTOM: CreateNTPFile");
        assert_eq!(Step::parse(&step.label()), step);
    }

    #[test]
    fn test_plan_preserves_order() {
        let plan = StepPlan::from_entries(
            "glec",
            Operation::Install,
            ["git clone x", "CUSTOM: CreateUnitFile", "systemctl start glec"],
        );
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.steps()[0], Step::literal("git clone x"));
        assert_eq!(plan.steps()[1], Step::custom("CreateUnitFile"));
        assert_eq!(plan.steps()[2], Step::literal("systemctl start glec"));
        assert_eq!(plan.custom_tags().collect::<Vec<_>>(), vec!["CreateUnitFile"]);
    }

    #[test]
    fn test_operation_strings() {
        assert_eq!(Operation::Install.to_string(), "install");
        assert_eq!("update".parse::<Operation>().unwrap(), Operation::Update);
        assert!("deploy".parse::<Operation>().is_err());
        assert_eq!(Operation::Update.title(), "Update");
    }
}

//! Template resolution for custom-action steps.
//!
//! Each component owns a closed table mapping [`CustomAction`] to a pure
//! renderer. A renderer takes the target descriptor and returns one shell
//! command, typically a heredoc that writes a file on the remote host:
//!
//! ```text
//! sudo bash -c 'cat > /etc/systemd/system/app.service <<EOF
//! [Unit]
//! ...
//! EOF'
//! ```
//!
//! Rendering has no local side effects. Tags that are not a known
//! `CustomAction`, or that the component has no renderer for, resolve to the
//! tag text itself; the remote shell then reports the failure as an ordinary
//! step error.

use std::fmt::Write as _;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::warn;

use crate::plan::Step;
use crate::target::TargetDescriptor;

/// Closed set of custom-action tags understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
pub enum CustomAction {
    /// Write the component's systemd unit file.
    CreateUnitFile,
    /// Write the component's main configuration file.
    CreateConfigFile,
    /// Write a systemd-timesyncd drop-in.
    #[strum(serialize = "CreateNTPFile")]
    CreateNtpFile,
    /// Write an environment file consumed by the service.
    CreateEnvFile,
}

/// Pure function producing a literal command for one target.
pub type Renderer = fn(&TargetDescriptor) -> String;

/// Explicit, per-component mapping from custom action to renderer.
#[derive(Debug, Clone, Copy)]
pub struct TemplateTable {
    entries: &'static [(CustomAction, Renderer)],
}

impl TemplateTable {
    /// Table with no renderers; every custom step passes through as text.
    pub const EMPTY: Self = Self { entries: &[] };

    pub const fn new(entries: &'static [(CustomAction, Renderer)]) -> Self {
        Self { entries }
    }

    /// Look up the renderer registered for `action`.
    pub fn renderer(&self, action: CustomAction) -> Option<Renderer> {
        self.entries
            .iter()
            .find(|(registered, _)| *registered == action)
            .map(|(_, renderer)| *renderer)
    }

    /// Actions this table can render, in table order.
    pub fn actions(&self) -> impl Iterator<Item = CustomAction> + '_ {
        self.entries.iter().map(|(action, _)| *action)
    }

    /// Returns true if `tag` names an action with a renderer in this table.
    pub fn supports(&self, tag: &str) -> bool {
        tag.parse::<CustomAction>()
            .ok()
            .and_then(|action| self.renderer(action))
            .is_some()
    }

    /// Turn a step into the literal command to execute.
    pub fn resolve(&self, step: &Step, target: &TargetDescriptor) -> String {
        match step {
            Step::Literal(command) => command.clone(),
            Step::Custom(tag) => {
                let renderer = tag
                    .parse::<CustomAction>()
                    .ok()
                    .and_then(|action| self.renderer(action));
                match renderer {
                    Some(render) => render(target),
                    None => {
                        warn!("No renderer for custom action '{}', passing it through", tag);
                        tag.clone()
                    }
                }
            }
        }
    }
}

/// Build a command that writes `body` to `path` on the remote host.
///
/// Single quotes in the body are escaped so they survive the outer
/// `bash -c '...'` quoting.
pub fn write_file(path: &str, body: &str) -> String {
    let body = body.replace('\'', r"'\''");
    let newline = if body.ends_with('\n') { "" } else { "\n" };
    format!("sudo bash -c 'cat > {path} <<EOF\n{body}{newline}EOF'")
}

/// Like [`write_file`], but the remote shell writes `body` byte for byte.
///
/// The heredoc delimiter is quoted (`<<\EOF`), so `$`, backticks and
/// backslashes are not expanded. Use this for bodies that carry
/// target-supplied values such as passwords. The delimiter is extended
/// until no line of the body equals it.
pub fn write_file_verbatim(path: &str, body: &str) -> String {
    let mut delimiter = String::from("EOF");
    while body.lines().any(|line| line == delimiter) {
        delimiter.push('_');
    }
    let body = body.replace('\'', r"'\''");
    let newline = if body.ends_with('\n') { "" } else { "\n" };
    format!("sudo bash -c 'cat > {path} <<\\{delimiter}\n{body}{newline}{delimiter}'")
}

/// Typed description of a systemd service unit.
///
/// Built with `const` methods so components can declare their unit as a
/// constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitFile {
    pub name: &'static str,
    pub description: &'static str,
    pub exec_start: &'static str,
    /// `Wants=`/`After=network-online.target` instead of `After=network.target`.
    pub network_online: bool,
    pub start_limit_interval: Option<&'static str>,
    pub start_limit_burst: Option<u32>,
    pub restart: &'static str,
    pub restart_sec: Option<&'static str>,
    pub user: Option<&'static str>,
    pub group: Option<&'static str>,
    pub working_directory: Option<&'static str>,
    /// Optional `EnvironmentFile=`; a leading `-` tolerates a missing file.
    pub environment_file: Option<&'static str>,
}

impl UnitFile {
    /// A `Type=simple` service restarted on any exit.
    pub const fn service(
        name: &'static str,
        description: &'static str,
        exec_start: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            exec_start,
            network_online: false,
            start_limit_interval: None,
            start_limit_burst: None,
            restart: "always",
            restart_sec: None,
            user: None,
            group: None,
            working_directory: None,
            environment_file: None,
        }
    }

    pub const fn network_online(self) -> Self {
        Self {
            network_online: true,
            ..self
        }
    }

    pub const fn start_limit(self, interval: &'static str, burst: Option<u32>) -> Self {
        Self {
            start_limit_interval: Some(interval),
            start_limit_burst: burst,
            ..self
        }
    }

    pub const fn restart(self, policy: &'static str, delay: Option<&'static str>) -> Self {
        Self {
            restart: policy,
            restart_sec: delay,
            ..self
        }
    }

    pub const fn user(self, user: &'static str) -> Self {
        Self {
            user: Some(user),
            ..self
        }
    }

    pub const fn group(self, group: &'static str) -> Self {
        Self {
            group: Some(group),
            ..self
        }
    }

    pub const fn working_directory(self, dir: &'static str) -> Self {
        Self {
            working_directory: Some(dir),
            ..self
        }
    }

    pub const fn environment_file(self, path: &'static str) -> Self {
        Self {
            environment_file: Some(path),
            ..self
        }
    }

    /// Remote path of the unit file.
    pub fn path(&self) -> String {
        format!("/etc/systemd/system/{}.service", self.name)
    }

    /// Unit file contents.
    pub fn body(&self) -> String {
        // Writing to a String cannot fail
        let mut out = String::new();
        let _ = writeln!(out, "[Unit]");
        let _ = writeln!(out, "Description={}", self.description);
        if self.network_online {
            let _ = writeln!(out, "Wants=network-online.target");
            let _ = writeln!(out, "After=network-online.target");
        } else {
            let _ = writeln!(out, "After=network.target");
        }
        if let Some(interval) = self.start_limit_interval {
            let _ = writeln!(out, "StartLimitIntervalSec={}", interval);
        }
        if let Some(burst) = self.start_limit_burst {
            let _ = writeln!(out, "StartLimitBurst={}", burst);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "[Service]");
        let _ = writeln!(out, "Type=simple");
        let _ = writeln!(out, "Restart={}", self.restart);
        if let Some(delay) = self.restart_sec {
            let _ = writeln!(out, "RestartSec={}", delay);
        }
        if let Some(user) = self.user {
            let _ = writeln!(out, "User={}", user);
        }
        if let Some(group) = self.group {
            let _ = writeln!(out, "Group={}", group);
        }
        if let Some(dir) = self.working_directory {
            let _ = writeln!(out, "WorkingDirectory={}", dir);
        }
        if let Some(path) = self.environment_file {
            let _ = writeln!(out, "EnvironmentFile={}", path);
        }
        let _ = writeln!(out, "ExecStart={}", self.exec_start);

        let _ = writeln!(out);
        let _ = writeln!(out, "[Install]");
        let _ = writeln!(out, "WantedBy=multi-user.target");
        out
    }

    /// Command writing this unit to the remote host.
    pub fn render(&self) -> String {
        write_file(&self.path(), &self.body())
    }
}

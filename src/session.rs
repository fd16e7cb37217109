//! Remote execution boundary.
//!
//! The executor depends only on these two traits. `ssh.rs` provides the
//! libssh2-backed implementation; tests supply recording mocks.

use thiserror::Error;

/// Failure to establish a session. Fatal for a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Host name could not be resolved or the TCP connection failed
    #[error("cannot reach {host}: {reason}")]
    Unreachable { host: String, reason: String },

    /// SSH handshake failed
    #[error("handshake with {host} failed: {reason}")]
    Handshake { host: String, reason: String },

    /// Server rejected the credentials
    #[error("authentication failed for {user}@{host}: {reason}")]
    Authentication {
        host: String,
        user: String,
        reason: String,
    },
}

/// Failure of one remote command. Non-fatal under the default policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The command could not be started or its output could not be read
    #[error("channel error: {0}")]
    Channel(String),

    /// The command ran and exited with a non-zero status
    #[error("exited with status {status}{}", format_output(.output))]
    NonZeroExit { status: i32, output: String },
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// A live connection able to run shell commands.
pub trait RemoteSession {
    /// Run `command` and return its combined output.
    fn exec(&mut self, command: &str) -> Result<String, ExecError>;

    /// Release the connection. Called exactly once per session.
    fn close(&mut self);
}

/// Opens sessions to remote hosts with password authentication.
pub trait Connector {
    type Session: RemoteSession;

    fn connect(&self, host: &str, user: &str, secret: &str) -> Result<Self::Session, ConnectError>;
}

/// Owns a session for the duration of a run and closes it on drop, so the
/// connection is released on every exit path including unwinding.
pub struct SessionGuard<S: RemoteSession> {
    session: S,
}

impl<S: RemoteSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn exec(&mut self, command: &str) -> Result<String, ExecError> {
        self.session.exec(command)
    }
}

impl<S: RemoteSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.close();
    }
}

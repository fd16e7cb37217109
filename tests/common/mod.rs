//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use firstmate::{ConnectError, Connector, ExecError, RemoteSession};

/// Everything the mock transport observed.
#[derive(Debug, Default)]
pub struct Recorded {
    pub connects: Vec<(String, String, String)>,
    pub commands: Vec<String>,
    pub closes: usize,
}

#[derive(Debug, Default)]
struct Behaviour {
    refuse_connect: bool,
    /// Commands containing one of these substrings exit with status 1.
    failing: Vec<String>,
    /// Commands containing one of these substrings panic inside `exec`.
    panicking: Vec<String>,
    /// (substring, output) pairs; the first match supplies the output.
    outputs: Vec<(String, String)>,
}

/// In-memory `Connector` that records every call.
#[derive(Clone, Default)]
pub struct MockConnector {
    behaviour: Arc<Mutex<Behaviour>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connect attempt fails with `ConnectError::Unreachable`.
    pub fn refusing() -> Self {
        let mock = Self::default();
        mock.behaviour.lock().unwrap().refuse_connect = true;
        mock
    }

    pub fn fail_when(self, needle: &str) -> Self {
        self.behaviour.lock().unwrap().failing.push(needle.to_string());
        self
    }

    pub fn panic_when(self, needle: &str) -> Self {
        self.behaviour.lock().unwrap().panicking.push(needle.to_string());
        self
    }

    pub fn output_when(self, needle: &str, output: &str) -> Self {
        self.behaviour
            .lock()
            .unwrap()
            .outputs
            .push((needle.to_string(), output.to_string()));
        self
    }

    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    pub fn commands(&self) -> Vec<String> {
        self.recorded().commands.clone()
    }
}

pub struct MockSession {
    behaviour: Arc<Mutex<Behaviour>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl RemoteSession for MockSession {
    fn exec(&mut self, command: &str) -> Result<String, ExecError> {
        self.recorded.lock().unwrap().commands.push(command.to_string());

        let panics = self
            .behaviour
            .lock()
            .unwrap()
            .panicking
            .iter()
            .any(|needle| command.contains(needle.as_str()));
        if panics {
            panic!("session died while running {}", command);
        }

        let behaviour = self.behaviour.lock().unwrap();
        if behaviour.failing.iter().any(|needle| command.contains(needle.as_str())) {
            return Err(ExecError::NonZeroExit {
                status: 1,
                output: format!("{}: failed", command),
            });
        }
        let output = behaviour
            .outputs
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default();
        Ok(output)
    }

    fn close(&mut self) {
        self.recorded.lock().unwrap().closes += 1;
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    fn connect(&self, host: &str, user: &str, secret: &str) -> Result<MockSession, ConnectError> {
        self.recorded
            .lock()
            .unwrap()
            .connects
            .push((host.to_string(), user.to_string(), secret.to_string()));

        if self.behaviour.lock().unwrap().refuse_connect {
            return Err(ConnectError::Unreachable {
                host: host.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(MockSession {
            behaviour: Arc::clone(&self.behaviour),
            recorded: Arc::clone(&self.recorded),
        })
    }
}

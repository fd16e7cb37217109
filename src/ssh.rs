//! SSH transport built on libssh2.
//!
//! Implements the [`Connector`]/[`RemoteSession`] contract with password
//! authentication. Each `exec` opens a fresh channel on the shared session,
//! merges stderr into stdout, and treats a non-zero exit status as an error.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{ExtendedData, Session};
use tracing::debug;

use crate::session::{ConnectError, Connector, ExecError, RemoteSession};

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens password-authenticated SSH sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SshConnector {
    port: u16,
    connect_timeout: Duration,
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_CONNECT_TIMEOUT)
    }
}

impl SshConnector {
    pub fn new(port: u16, connect_timeout: Duration) -> Self {
        Self {
            port,
            connect_timeout,
        }
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host` or `host:port`; the connector's port is used when none is given.
    fn socket_address(&self, host: &str) -> String {
        match host.rsplit_once(':') {
            Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => {
                host.to_string()
            }
            _ => format!("{}:{}", host, self.port),
        }
    }
}

impl Connector for SshConnector {
    type Session = SshSession;

    fn connect(&self, host: &str, user: &str, secret: &str) -> Result<SshSession, ConnectError> {
        let address = self.socket_address(host);
        let unreachable = |reason: String| ConnectError::Unreachable {
            host: host.to_string(),
            reason,
        };

        let resolved = address
            .to_socket_addrs()
            .map_err(|e| unreachable(e.to_string()))?
            .next()
            .ok_or_else(|| unreachable(format!("no address found for {}", address)))?;

        debug!("Connecting to {} ({})", address, resolved);
        let tcp = TcpStream::connect_timeout(&resolved, self.connect_timeout)
            .map_err(|e| unreachable(e.to_string()))?;

        let mut session = Session::new().map_err(|e| ConnectError::Handshake {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| ConnectError::Handshake {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

        session
            .userauth_password(user, secret)
            .map_err(|e| ConnectError::Authentication {
                host: host.to_string(),
                user: user.to_string(),
                reason: e.to_string(),
            })?;
        if !session.authenticated() {
            return Err(ConnectError::Authentication {
                host: host.to_string(),
                user: user.to_string(),
                reason: "server did not accept the password".to_string(),
            });
        }

        debug!("Authenticated as {} on {}", user, host);
        Ok(SshSession {
            session,
            host: host.to_string(),
        })
    }
}

/// One authenticated SSH connection.
pub struct SshSession {
    session: Session,
    host: String,
}

impl RemoteSession for SshSession {
    fn exec(&mut self, command: &str) -> Result<String, ExecError> {
        let channel_err = |e: ssh2::Error| ExecError::Channel(e.to_string());

        let mut channel = self.session.channel_session().map_err(channel_err)?;
        channel
            .handle_extended_data(ExtendedData::Merge)
            .map_err(channel_err)?;
        channel.exec(command).map_err(channel_err)?;

        let mut raw = Vec::new();
        channel
            .read_to_end(&mut raw)
            .map_err(|e| ExecError::Channel(e.to_string()))?;
        channel.wait_close().map_err(channel_err)?;
        let status = channel.exit_status().map_err(channel_err)?;

        let output = String::from_utf8_lossy(&raw).into_owned();
        if status == 0 {
            Ok(output)
        } else {
            Err(ExecError::NonZeroExit { status, output })
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.session.disconnect(None, "firstmate run finished", None) {
            debug!("Disconnect from {} failed: {}", self.host, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_address_appends_default_port() {
        let connector = SshConnector::default();
        assert_eq!(connector.socket_address("db1.example.com"), "db1.example.com:22");
    }

    #[test]
    fn test_socket_address_keeps_explicit_port() {
        let connector = SshConnector::new(2222, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(connector.socket_address("h:2200"), "h:2200");
        assert_eq!(connector.socket_address("h"), "h:2222");
    }

    #[test]
    fn test_socket_address_ignores_bad_port_suffix() {
        let connector = SshConnector::default();
        assert_eq!(connector.socket_address("h:ssh"), "h:ssh:22");
    }

    #[test]
    fn test_unresolvable_host_is_unreachable() {
        let connector = SshConnector::new(22, Duration::from_millis(200));
        let err = connector
            .connect("host.invalid", "u", "p")
            .err()
            .expect("connect to .invalid must fail");
        assert!(matches!(err, ConnectError::Unreachable { .. }));
    }
}

//! Blocking SSH session over libssh2: one TCP connection, key-based auth,
//! one channel per command.

use std::io::Read;
use std::net::TcpStream;
use std::path::Path;

use ssh2::Session;
use tracing::debug;

use super::{CommandRunner, RemoteOutput};
use crate::utils::{CheckError, Result};

pub struct SshSession {
    session: Session,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession").finish_non_exhaustive()
    }
}

impl SshSession {
    /// Connect and authenticate with the given private key. Any failure
    /// along the way (TCP, handshake, auth) is a connection error; no
    /// retries.
    pub fn connect(
        hostname: &str,
        port: u16,
        user: &str,
        key_file: &Path,
        passphrase: Option<&str>,
    ) -> Result<Self> {
        debug!("connecting to {}:{} as {}", hostname, port, user);
        let tcp = TcpStream::connect((hostname, port)).map_err(|e| {
            CheckError::Connection(format!("cannot reach {}:{}: {}", hostname, port, e))
        })?;

        let mut session = Session::new()
            .map_err(|e| CheckError::Connection(format!("libssh2 init: {}", e)))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| CheckError::Connection(format!("SSH handshake: {}", e)))?;

        session
            .userauth_pubkey_file(user, None, key_file, passphrase)
            .map_err(|e| {
                CheckError::Connection(format!(
                    "key authentication failed for {}@{} with {}: {}",
                    user,
                    hostname,
                    key_file.display(),
                    e
                ))
            })?;
        if !session.authenticated() {
            return Err(CheckError::Connection(format!(
                "authentication incomplete for {}@{}",
                user, hostname
            )));
        }

        debug!("authenticated to {}:{}", hostname, port);
        Ok(SshSession { session })
    }

    /// Best-effort disconnect. Called on every path before the process
    /// decides its exit code; errors at teardown are irrelevant to the
    /// check result.
    pub fn close(self) {
        let _ = self.session.disconnect(None, "check finished", None);
    }
}

impl CommandRunner for SshSession {
    fn run(&self, command: &str) -> Result<RemoteOutput> {
        debug!("running remote command: {}", command);
        let conn = |what: &str, e: String| CheckError::Connection(format!("{}: {}", what, e));

        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| conn("opening channel", e.to_string()))?;
        channel
            .exec(command)
            .map_err(|e| conn("dispatching command", e.to_string()))?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|e| conn("reading command output", e.to_string()))?;
        channel
            .wait_close()
            .map_err(|e| conn("closing channel", e.to_string()))?;
        let exit_code = channel
            .exit_status()
            .map_err(|e| conn("reading exit status", e.to_string()))?;

        debug!("remote command exited {}", exit_code);
        Ok(RemoteOutput {
            lines: stdout.lines().map(|l| l.to_string()).collect(),
            exit_code,
        })
    }
}

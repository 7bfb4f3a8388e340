//! Remote side of a check: an authenticated SSH session and the commands
//! run over it. Everything the parsers consume comes through the
//! [`CommandRunner`] seam so they can be exercised without a live host.

pub mod detect;
pub mod session;

pub use session::SshSession;

use crate::utils::Result;

/// Captured output of one remote command.
#[derive(Debug, Clone)]
pub struct RemoteOutput {
    pub lines: Vec<String>,
    pub exit_code: i32,
}

impl RemoteOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// One blocking remote command round trip. A transport failure is a
/// `CheckError::Connection`; tool absence is only ever judged from the
/// exit code, never from a failed transport.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<RemoteOutput>;
}

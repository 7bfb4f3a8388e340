pub mod disks;
pub mod output;
pub mod report;
pub mod threshold;
pub mod updates;

use std::path::Path;

use crate::cli::SshOpts;
use crate::remote::SshSession;
use crate::utils::{CheckError, Result};
use disks::{MountFilter, Unit};
use report::CheckReport;
use threshold::Thresholds;

pub fn run_updates(
    ssh: &SshOpts,
    warning: &str,
    critical: &str,
    security: bool,
) -> Result<CheckReport> {
    let thresholds = Thresholds::parse(warning, critical)?;
    let session = connect(ssh)?;
    let result = updates::check(&session, &thresholds, security);
    session.close();
    result
}

pub fn run_disks(
    ssh: &SshOpts,
    warning: &str,
    critical: &str,
    unit: &str,
    mounts: Option<&str>,
    exclude: Option<&str>,
) -> Result<CheckReport> {
    let thresholds = Thresholds::parse(warning, critical)?;
    let unit = Unit::from_name(unit)?;
    let filter = MountFilter::new(mounts, exclude)?;
    let session = connect(ssh)?;
    let result = disks::check(&session, &thresholds, unit, &filter);
    session.close();
    result
}

/// Flag validation happens before the TCP connection: a missing hostname
/// must exit 3 without touching the network. The session is opened once,
/// passed explicitly to every remote call, and closed on success and
/// error paths alike before the result reaches `main`.
fn connect(ssh: &SshOpts) -> Result<SshSession> {
    let hostname = ssh
        .hostname
        .as_deref()
        .ok_or_else(|| CheckError::Usage("hostname parameter (-H) is mandatory".to_string()))?;
    let key_file = shellexpand::tilde(&ssh.ssh_key).into_owned();
    SshSession::connect(
        hostname,
        ssh.port,
        &ssh.user,
        Path::new(&key_file),
        ssh.passphrase.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts_without_hostname() -> SshOpts {
        SshOpts {
            hostname: None,
            ssh_key: "~/.ssh/id_rsa".to_string(),
            port: 22,
            user: "shinken".to_string(),
            passphrase: None,
            verbose: false,
        }
    }

    #[test]
    fn missing_hostname_fails_before_connecting() {
        let err = connect(&opts_without_hostname()).unwrap_err();
        assert!(matches!(err, CheckError::Usage(_)));
        assert!(err.to_string().contains("-H"));
    }

    #[test]
    fn run_updates_rejects_bad_thresholds_before_connecting() {
        // Inverted thresholds must fail without reaching the network even
        // though no hostname is set either.
        let err = run_updates(&opts_without_hostname(), "10", "1", false).unwrap_err();
        assert!(matches!(err, CheckError::Usage(_)));
        assert!(err.to_string().contains("critical"));
    }

    #[test]
    fn run_disks_rejects_bad_unit_before_connecting() {
        let err =
            run_disks(&opts_without_hostname(), "75%", "90%", "XB", None, None).unwrap_err();
        assert!(matches!(err, CheckError::Usage(_)));
    }
}

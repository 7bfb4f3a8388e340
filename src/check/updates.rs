//! Pending-update counting per package manager.
//!
//! The remote command strings are an external contract shared with the
//! monitoring side; parser compatibility depends on them verbatim.

use std::fmt;

use tracing::debug;

use super::report::{CheckReport, PerfMetric};
use super::threshold::Thresholds;
use crate::remote::{detect::detect, CommandRunner};
use crate::utils::{CheckError, Result};

/// Listing lines are only counted after one of these yum marker lines.
const YUM_MARKERS: [&str; 2] = ["Available Upgrades", "Updated Packages"];
const PORTMASTER_MARKER: &str = "New version available";

/// The package managers we know how to interrogate, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yum,
    Apt,
    Portmaster,
    Pkg,
}

impl PackageManager {
    pub const DETECTION_ORDER: [PackageManager; 4] = [
        PackageManager::Yum,
        PackageManager::Apt,
        PackageManager::Portmaster,
        PackageManager::Pkg,
    ];

    /// Binary name used for the `which` probe.
    pub fn binary(self) -> &'static str {
        match self {
            PackageManager::Yum => "yum",
            PackageManager::Apt => "apt",
            PackageManager::Portmaster => "portmaster",
            PackageManager::Pkg => "pkg",
        }
    }

    pub fn from_binary(name: &str) -> Option<PackageManager> {
        Self::DETECTION_ORDER
            .iter()
            .copied()
            .find(|m| m.binary() == name)
    }

    /// Count pending updates on the remote host. Parse failures and
    /// unsupported modes are errors, never a silent zero.
    pub fn count_updates(
        self,
        session: &dyn CommandRunner,
        security_only: bool,
    ) -> Result<u64> {
        match self {
            PackageManager::Yum => count_yum(session, security_only),
            PackageManager::Apt => count_apt(session, security_only),
            PackageManager::Portmaster => count_portmaster(session, security_only),
            PackageManager::Pkg => Err(CheckError::Unsupported(
                "pkg update counting".to_string(),
            )),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

fn count_yum(session: &dyn CommandRunner, security_only: bool) -> Result<u64> {
    // `yum check-update` exits 0 when nothing is pending and 100 when
    // updates exist; exit 0 means the listing step can be skipped.
    let precheck = if security_only {
        "yum --security check-update"
    } else {
        "yum check-update"
    };
    if session.run(precheck)?.succeeded() {
        debug!("yum pre-check clean, no listing needed");
        return Ok(0);
    }

    let listing = if security_only {
        "yum --security list updates"
    } else {
        "yum list updates"
    };
    parse_yum_listing(&session.run(listing)?.lines)
}

/// Count non-empty lines strictly after the first marker line. A listing
/// with no marker means the output format (or locale) changed under us:
/// that is a parse failure, not an empty update set.
fn parse_yum_listing(lines: &[String]) -> Result<u64> {
    let mut counting = false;
    let mut count = 0;
    for line in lines {
        if counting {
            if !line.trim().is_empty() {
                count += 1;
            }
        } else if YUM_MARKERS.iter().any(|m| line.starts_with(m)) {
            counting = true;
        }
    }
    if !counting {
        return Err(CheckError::Parse(
            "yum listing contained none of the expected marker lines".to_string(),
        ));
    }
    Ok(count)
}

fn count_apt(session: &dyn CommandRunner, security_only: bool) -> Result<u64> {
    // Security filtering happens on the remote side; the grep stays part
    // of the command string.
    let command = if security_only {
        r#"aptitude search "~U" | grep -i security"#
    } else {
        r#"aptitude search "~U""#
    };
    let output = session.run(command)?;
    Ok(output
        .lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .count() as u64)
}

fn count_portmaster(session: &dyn CommandRunner, security_only: bool) -> Result<u64> {
    if security_only {
        return Err(CheckError::Unsupported(
            "portmaster security-only filtering".to_string(),
        ));
    }
    let output = session.run("portmaster -L -P")?;
    Ok(output
        .lines
        .iter()
        .filter(|l| l.contains(PORTMASTER_MARKER))
        .count() as u64)
}

/// Full updates check: detect the package manager, count, evaluate,
/// build the report.
pub fn check(
    session: &dyn CommandRunner,
    thresholds: &Thresholds,
    security_only: bool,
) -> Result<CheckReport> {
    let candidates: Vec<&str> = PackageManager::DETECTION_ORDER
        .iter()
        .map(|m| m.binary())
        .collect();
    let manager = detect(session, &candidates)?
        .and_then(PackageManager::from_binary)
        .ok_or(CheckError::NoPackageManager)?;

    let count = manager.count_updates(session, security_only)?;
    let severity = thresholds.evaluate(count as f64);

    let kind = if security_only { "security update" } else { "update" };
    let summary = if count == 0 {
        format!("no pending {}s ({})", kind, manager)
    } else if count == 1 {
        format!("1 pending {} ({})", kind, manager)
    } else {
        format!("{} pending {}s ({})", count, kind, manager)
    };

    let mut report = CheckReport::new(severity, summary);
    report.push_metric(PerfMetric {
        name: "updates".to_string(),
        value: count.to_string(),
        unit: String::new(),
        warn: format!("{}", thresholds.warning),
        crit: format!("{}", thresholds.critical),
        min: "0".to_string(),
        max: String::new(),
    });
    Ok(report)
}

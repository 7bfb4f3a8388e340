//! Severity levels and warning/critical threshold evaluation.

use std::fmt;

use crate::utils::{CheckError, Result};

/// Check outcome, ordered by badness. The numeric exit codes are the
/// monitoring-plugin convention and must stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Warning/critical bounds for a measured value. Values may be counts or
/// percentages; a trailing `%` on the flag value is stripped before
/// comparison, so `-w 75%` and `-w 75` are equivalent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Thresholds {
    /// Parse the raw `-w`/`-c` flag values. Rejects `critical < warning`
    /// up front instead of letting the pair silently misbehave later.
    pub fn parse(warning: &str, critical: &str) -> Result<Self> {
        let warning = parse_bound("warning", warning)?;
        let critical = parse_bound("critical", critical)?;
        if critical < warning {
            return Err(CheckError::Usage(format!(
                "critical threshold ({}) must not be below warning threshold ({})",
                critical, warning
            )));
        }
        Ok(Thresholds { warning, critical })
    }

    /// Pure tri-state comparison: CRITICAL at or above `critical`,
    /// WARNING at or above `warning`, OK below both.
    pub fn evaluate(&self, value: f64) -> Severity {
        if value >= self.critical {
            Severity::Critical
        } else if value >= self.warning {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| CheckError::Usage(format!("invalid {} threshold: {:?}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_boundaries() {
        let t = Thresholds { warning: 75.0, critical: 90.0 };
        assert_eq!(t.evaluate(0.0), Severity::Ok);
        assert_eq!(t.evaluate(74.9), Severity::Ok);
        assert_eq!(t.evaluate(75.0), Severity::Warning);
        assert_eq!(t.evaluate(89.9), Severity::Warning);
        assert_eq!(t.evaluate(90.0), Severity::Critical);
        assert_eq!(t.evaluate(150.0), Severity::Critical);
    }

    #[test]
    fn parse_strips_percent_suffix() {
        let t = Thresholds::parse("75%", "90%").unwrap();
        assert_eq!(t.warning, 75.0);
        assert_eq!(t.critical, 90.0);
    }

    #[test]
    fn parse_plain_counts() {
        let t = Thresholds::parse("1", "10").unwrap();
        assert_eq!(t.warning, 1.0);
        assert_eq!(t.critical, 10.0);
    }

    #[test]
    fn parse_rejects_inverted_pair() {
        assert!(matches!(
            Thresholds::parse("90", "75"),
            Err(CheckError::Usage(_))
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            Thresholds::parse("lots", "90"),
            Err(CheckError::Usage(_))
        ));
    }

    #[test]
    fn equal_thresholds_allowed() {
        let t = Thresholds::parse("90", "90").unwrap();
        assert_eq!(t.evaluate(89.0), Severity::Ok);
        assert_eq!(t.evaluate(90.0), Severity::Critical);
    }

    #[test]
    fn exit_codes_match_plugin_convention() {
        assert_eq!(Severity::Ok.exit_code(), 0);
        assert_eq!(Severity::Warning.exit_code(), 1);
        assert_eq!(Severity::Critical.exit_code(), 2);
        assert_eq!(Severity::Unknown.exit_code(), 3);
    }

    #[test]
    fn severity_orders_by_badness() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!(
            std::cmp::max(Severity::Warning, Severity::Critical),
            Severity::Critical
        );
    }
}

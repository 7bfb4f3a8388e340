//! Final result of a check: severity, human-readable text, and the
//! perfdata metrics the poller graphs.

use std::fmt;

use super::threshold::Severity;

/// One perfdata token: `"<name>"=<value><unit>;<warn>;<crit>;<min>;<max>`.
/// Fields are pre-formatted strings because units ride along with some of
/// them (`75%`, `12.5GB`) and absent bounds render as empty slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfMetric {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub warn: String,
    pub crit: String,
    pub min: String,
    pub max: String,
}

impl fmt::Display for PerfMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\"={}{};{};{};{};{}",
            self.name, self.value, self.unit, self.warn, self.crit, self.min, self.max
        )
    }
}

/// Immutable once the orchestrator has built it; the renderer in
/// `output.rs` is its only consumer.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub severity: Severity,
    pub summary: String,
    pub details: Vec<String>,
    pub perfdata: Vec<PerfMetric>,
}

impl CheckReport {
    pub fn new(severity: Severity, summary: String) -> Self {
        CheckReport {
            severity,
            summary,
            details: Vec::new(),
            perfdata: Vec::new(),
        }
    }

    pub fn push_detail(&mut self, line: String) {
        self.details.push(line);
    }

    pub fn push_metric(&mut self, metric: PerfMetric) {
        self.perfdata.push(metric);
    }
}

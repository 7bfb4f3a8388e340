//! Disk usage check over a remote POSIX `df` listing.

use std::cmp::Ordering;

use regex::Regex;
use tracing::debug;

use super::report::{CheckReport, PerfMetric};
use super::threshold::{Severity, Thresholds};
use crate::remote::CommandRunner;
use crate::utils::{CheckError, Result};

/// POSIX output, 1024-byte blocks. Part of the external contract.
pub const DF_COMMAND: &str = "df -Pk";

/// Display unit for byte magnitudes, powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    B,
    Kb,
    Mb,
    Gb,
    Tb,
}

impl Unit {
    pub fn from_name(name: &str) -> Result<Unit> {
        match name.to_ascii_uppercase().as_str() {
            "B" => Ok(Unit::B),
            "KB" => Ok(Unit::Kb),
            "MB" => Ok(Unit::Mb),
            "GB" => Ok(Unit::Gb),
            "TB" => Ok(Unit::Tb),
            _ => Err(CheckError::Usage(format!(
                "unknown unit {:?} (expected B, KB, MB, GB or TB)",
                name
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::B => "B",
            Unit::Kb => "KB",
            Unit::Mb => "MB",
            Unit::Gb => "GB",
            Unit::Tb => "TB",
        }
    }

    fn power(self) -> i32 {
        match self {
            Unit::B => 0,
            Unit::Kb => 1,
            Unit::Mb => 2,
            Unit::Gb => 3,
            Unit::Tb => 4,
        }
    }
}

pub fn convert_to(unit: Unit, bytes: f64) -> f64 {
    bytes / 1024f64.powi(unit.power())
}

/// One mounted filesystem as reported by `df -Pk`.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub filesystem: String,
    pub mount: String,
    pub used_pct: f64,
    pub used_bytes: u64,
    pub size_bytes: u64,
}

/// Optional include/exclude regexes over mount points.
pub struct MountFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl MountFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(MountFilter {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn matches(&self, mount: &str) -> bool {
        self.include.as_ref().map_or(true, |re| re.is_match(mount))
            && self.exclude.as_ref().map_or(true, |re| !re.is_match(mount))
    }
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| CheckError::Usage(format!("invalid mount filter {:?}: {}", p, e))),
        None => Ok(None),
    }
}

/// Parse POSIX `df -Pk` output. The header line must be present; a record
/// with missing or non-numeric fields is a parse failure, not a zero,
/// since a fabricated 0% would read as OK downstream.
pub fn parse_df(lines: &[String]) -> Result<Vec<Volume>> {
    let mut iter = lines.iter();
    let header = iter
        .next()
        .ok_or_else(|| CheckError::Parse("df returned no output".to_string()))?;
    if !header.starts_with("Filesystem") {
        return Err(CheckError::Parse(format!(
            "unexpected df header line: {:?}",
            header
        )));
    }

    let mut volumes = Vec::new();
    for line in iter {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(CheckError::Parse(format!("short df record: {:?}", line)));
        }
        let size_kb: u64 = parse_field(fields[1], line)?;
        let used_kb: u64 = parse_field(fields[2], line)?;
        let used_pct: f64 = fields[4]
            .trim_end_matches('%')
            .parse()
            .map_err(|_| CheckError::Parse(format!("bad capacity field in {:?}", line)))?;

        volumes.push(Volume {
            filesystem: fields[0].to_string(),
            mount: fields[5].to_string(),
            used_pct,
            used_bytes: used_kb * 1024,
            size_bytes: size_kb * 1024,
        });
    }
    Ok(volumes)
}

fn parse_field(raw: &str, line: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| CheckError::Parse(format!("bad numeric field {:?} in {:?}", raw, line)))
}

/// Display order: descending by (filesystem, mount, used%, used, size),
/// so the busiest instance of a device sorts first within its name group.
fn sort_for_display(volumes: &mut [Volume]) {
    volumes.sort_by(|a, b| {
        (b.filesystem.as_str(), b.mount.as_str())
            .cmp(&(a.filesystem.as_str(), a.mount.as_str()))
            .then(b.used_pct.partial_cmp(&a.used_pct).unwrap_or(Ordering::Equal))
            .then(b.used_bytes.cmp(&a.used_bytes))
            .then(b.size_bytes.cmp(&a.size_bytes))
    });
}

/// Full disks check: fetch the listing, filter, evaluate every volume,
/// build the tabular report and per-volume perfdata.
pub fn check(
    session: &dyn CommandRunner,
    thresholds: &Thresholds,
    unit: Unit,
    filter: &MountFilter,
) -> Result<CheckReport> {
    let output = session.run(DF_COMMAND)?;
    if !output.succeeded() {
        return Err(CheckError::Parse(format!(
            "`{}` exited with status {}",
            DF_COMMAND, output.exit_code
        )));
    }

    let mut volumes: Vec<Volume> = parse_df(&output.lines)?
        .into_iter()
        .filter(|v| filter.matches(&v.mount))
        .collect();
    if volumes.is_empty() {
        return Err(CheckError::Parse(
            "no filesystems left to check after filtering".to_string(),
        ));
    }
    sort_for_display(&mut volumes);
    debug!("checking {} volumes", volumes.len());

    let mut severity = Severity::Ok;
    let mut warning_nb = 0usize;
    let mut critical_nb = 0usize;
    let mut bad: Vec<Volume> = Vec::new();
    for v in &volumes {
        match thresholds.evaluate(v.used_pct) {
            Severity::Critical => {
                critical_nb += 1;
                severity = Severity::Critical;
                bad.push(v.clone());
            }
            Severity::Warning => {
                warning_nb += 1;
                severity = std::cmp::max(severity, Severity::Warning);
                bad.push(v.clone());
            }
            _ => {}
        }
    }

    let summary = match severity {
        Severity::Critical => {
            let mut s = format!(
                "{} disk{} above {}% usage",
                critical_nb,
                plural(critical_nb),
                thresholds.critical
            );
            if warning_nb > 0 {
                s.push_str(&format!(", {} above {}%", warning_nb, thresholds.warning));
            }
            s
        }
        Severity::Warning => format!(
            "{} disk{} above {}% usage",
            warning_nb,
            plural(warning_nb),
            thresholds.warning
        ),
        _ => format!(
            "all {} disk{} within limits",
            volumes.len(),
            plural(volumes.len())
        ),
    };

    let mut report = CheckReport::new(severity, summary);
    report.push_detail("Disks details:".to_string());
    for line in table(&volumes, unit) {
        report.push_detail(line);
    }
    if !bad.is_empty() {
        report.push_detail(format!("Volumes above {}% usage:", thresholds.warning));
        for line in table(&bad, unit) {
            report.push_detail(line);
        }
    }

    for v in &volumes {
        push_volume_metrics(&mut report, v, thresholds, unit);
    }
    Ok(report)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn table(volumes: &[Volume], unit: Unit) -> Vec<String> {
    let mut lines = vec![format!(
        "  {:<24} {:<20} {:>6} {:>10} {:>10}",
        "Filesystem", "Mounted on", "Usage", "Used", "Total"
    )];
    for v in volumes {
        lines.push(format!(
            "  {:<24} {:<20} {:>5}% {:>10} {:>10}",
            v.filesystem,
            v.mount,
            v.used_pct,
            format!("{:.1}{}", convert_to(unit, v.used_bytes as f64), unit.label()),
            format!("{:.1}{}", convert_to(unit, v.size_bytes as f64), unit.label()),
        ));
    }
    lines
}

fn push_volume_metrics(
    report: &mut CheckReport,
    v: &Volume,
    thresholds: &Thresholds,
    unit: Unit,
) {
    let label = unit.label();
    let size = convert_to(unit, v.size_bytes as f64);
    let used = convert_to(unit, v.used_bytes as f64);
    let warn_size = convert_to(unit, v.size_bytes as f64 * thresholds.warning / 100.0);
    let crit_size = convert_to(unit, v.size_bytes as f64 * thresholds.critical / 100.0);

    report.push_metric(PerfMetric {
        name: format!("{}_used_pct", v.mount),
        value: format!("{}", v.used_pct),
        unit: "%".to_string(),
        warn: format!("{}%", thresholds.warning),
        crit: format!("{}%", thresholds.critical),
        min: "0%".to_string(),
        max: "100%".to_string(),
    });
    report.push_metric(PerfMetric {
        name: format!("{}_used", v.mount),
        value: format!("{:.2}", used),
        unit: label.to_string(),
        warn: format!("{:.2}", warn_size),
        crit: format!("{:.2}", crit_size),
        min: "0".to_string(),
        max: format!("{:.2}", size),
    });
    report.push_metric(PerfMetric {
        name: format!("{}_total", v.mount),
        value: format!("{:.2}", size),
        unit: label.to_string(),
        warn: String::new(),
        crit: String::new(),
        min: String::new(),
        max: String::new(),
    });
}

//! Renders a [`CheckReport`] into the line-oriented plugin format the
//! poller parses: `[TAG] summary`, optional detail block, then ` | ` and
//! the space-joined perfdata tokens.

use super::report::CheckReport;

pub fn render(report: &CheckReport) -> String {
    let mut out = format!("[{}] {}", report.severity, report.summary);
    for line in &report.details {
        out.push('\n');
        out.push_str(line);
    }
    if !report.perfdata.is_empty() {
        let tokens: Vec<String> = report.perfdata.iter().map(|m| m.to_string()).collect();
        out.push_str(" | ");
        out.push_str(&tokens.join(" "));
    }
    out
}

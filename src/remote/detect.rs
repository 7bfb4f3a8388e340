//! Probe-based tool detection: `which <tool>` for each candidate, first
//! exit-0 wins.

use tracing::debug;

use super::CommandRunner;
use crate::utils::Result;

/// Returns the first candidate whose `which` probe succeeds, or `None` if
/// every probe exits nonzero. Candidate order matters: hosts with several
/// package managers installed get the first match. A transport failure
/// aborts the loop and propagates; it must never read as "tool absent".
pub fn detect<'a>(
    session: &dyn CommandRunner,
    candidates: &[&'a str],
) -> Result<Option<&'a str>> {
    for &candidate in candidates {
        let probe = session.run(&format!("which {}", candidate))?;
        if probe.succeeded() {
            debug!("detected {}", candidate);
            return Ok(Some(candidate));
        }
        debug!("{} not present (exit {})", candidate, probe.exit_code);
    }
    Ok(None)
}

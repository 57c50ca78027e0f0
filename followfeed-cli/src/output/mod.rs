//! Output formatting for CLI.

use anyhow::Result;
use followfeed_core::ActivityRecord;
use std::io::Write;

/// Renders matched records as a 2-space pretty JSON array, or a sentence
/// when there are none.
pub fn render_activities(records: &[ActivityRecord], target: &str) -> Result<String> {
    if records.is_empty() {
        return Ok(no_activity_message(target));
    }
    Ok(serde_json::to_string_pretty(records)?)
}

/// The message printed when nothing matched.
pub fn no_activity_message(target: &str) -> String {
    format!("There is no recent activity for {target} now.")
}

/// Writes the rendered output to stdout.
pub fn print_activities(records: &[ActivityRecord], target: &str) -> Result<()> {
    let rendered = render_activities(records, target)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;
    Ok(())
}

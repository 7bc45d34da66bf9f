//! Human-readable output: pretty JSON and one-line task summaries.

use std::time::Duration;

use crate::ledger::TaskRecord;
use crate::research::Task;

/// Instructions longer than this are truncated in one-line summaries.
const SUMMARY_WIDTH: usize = 60;

/// Pretty-print a JSON value: two-space indent, non-ASCII preserved
/// unescaped. Formatting is idempotent: parse then print is a fixed point.
pub fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// One line per task for `list` output.
pub fn task_line(task: &Task) -> String {
    format!(
        "{:<12} {:<10} {}",
        task.id,
        task.status,
        truncate(&task.instructions, SUMMARY_WIDTH)
    )
}

/// One line per ledger record for `history` output.
pub fn record_line(record: &TaskRecord) -> String {
    format!(
        "{:<20} {:<12} {:<10} {}",
        record.created_at,
        record.id,
        record.status,
        truncate(&record.instructions, SUMMARY_WIDTH)
    )
}

/// Elapsed time as `12s` or `1m 05s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let minutes = total / 60;
    let seconds = total % 60;
    if minutes == 0 {
        format!("{seconds}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

/// Truncate on a character boundary, appending an ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

//! Count formatting for log summaries.

/// `"1 file"`, `"0 files"`, `"4 data files"`.
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

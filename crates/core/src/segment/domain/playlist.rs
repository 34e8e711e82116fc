use std::path::PathBuf;

/// Builds a concat-demuxer playlist from `(cached frame path, timestamp)`
/// pairs in stream order.
///
/// Each entry becomes a `file` line followed by a `duration` line holding
/// the gap to the previous entry (zero for the first). The final file is
/// then listed once more with no duration, which the demuxer requires for
/// the last item's display time to be well-defined.
pub fn build(entries: &[(PathBuf, f64)]) -> String {
    let Some((last_path, first_time)) = entries.last().map(|e| (&e.0, entries[0].1)) else {
        return String::new();
    };

    let mut lines = Vec::with_capacity(entries.len() * 2 + 1);
    let mut prev = first_time;
    for (path, t) in entries {
        lines.push(format!("file '{}'", path.display()));
        lines.push(format!("duration {}", t - prev));
        prev = *t;
    }
    lines.push(format!("file '{}'", last_path.display()));
    lines.join("\n")
}

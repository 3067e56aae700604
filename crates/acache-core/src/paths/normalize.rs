//! Lexical normalization that keeps a caller-supplied relative path inside
//! its category directory.

use std::path::{Component, Path};

/// Splits `relative` into plain path segments.
///
/// - `/` and `\` both separate segments
/// - empty and `.` segments are dropped
/// - `..` pops the previous segment but never climbs above the start
/// - anything that is not a single normal component (drive prefixes, roots) is dropped
pub(crate) fn contained_segments(relative: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for seg in relative.split(['/', '\\']) {
        match seg {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s if is_plain_segment(s) => out.push(s),
            s => tracing::debug!(segment = s, "dropping non-plain asset path segment"),
        }
    }
    out
}

fn is_plain_segment(seg: &str) -> bool {
    if seg.contains('\0') {
        return false;
    }
    let mut components = Path::new(seg).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

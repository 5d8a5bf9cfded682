use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

const PARENT_SEGMENT: &str = "..";
const CURRENT_SEGMENT: &str = ".";

/// Relative path from `from` (the path a link will live at) to `to` (what it should resolve to).
///
/// The common leading segments are dropped, stopping at the first mismatch. Every remaining
/// segment of `from` except its last one becomes a `..` hop in front of what is left of `to`.
/// `from`'s last segment is the link's own name and adds no traversal. When nothing remains
/// (`to` is `from`'s directory) the result is `.`.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let segments = relative_segments(from, to);
    let mut joined = OsString::new();
    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            joined.push(MAIN_SEPARATOR_STR);
        }
        joined.push(segment);
    }
    PathBuf::from(joined)
}

/// Same as [`relative_path`], joined with an explicit separator. Used when the path ends up
/// inside generated source rather than on the filesystem.
pub fn relative_path_with_separator(from: &Path, to: &Path, separator: &str) -> String {
    relative_segments(from, to)
        .iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join(separator)
}

fn relative_segments(from: &Path, to: &Path) -> Vec<OsString> {
    let from = path_segments(from);
    let to = path_segments(to);

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(left, right)| left == right)
        .count();
    let hops = from.len().saturating_sub(shared).saturating_sub(1);

    let segments: Vec<OsString> = std::iter::repeat(OsString::from(PARENT_SEGMENT))
        .take(hops)
        .chain(to[shared..].iter().cloned())
        .collect();
    if segments.is_empty() {
        return vec![OsString::from(CURRENT_SEGMENT)];
    }
    segments
}

fn path_segments(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => Some(prefix.as_os_str().to_os_string()),
            Component::Normal(segment) => Some(segment.to_os_string()),
            Component::ParentDir => Some(OsStr::new(PARENT_SEGMENT).to_os_string()),
            Component::RootDir | Component::CurDir => None,
        })
        .collect()
}

// Path helper utilities shared by the OpenDAL transport
use std::path::Path;

/// Map an absolute remote path onto an operator rooted at `/`.
pub fn operator_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Return a new String that guarantees a trailing '/'.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Parent directory of an operator path, with a trailing '/'.
///
/// Returns `None` for entries directly under the root.
pub fn parent_dir(path: &str) -> Option<String> {
    let parent = Path::new(path.trim_matches('/')).parent()?;
    let parent = parent.to_string_lossy();
    if parent.is_empty() {
        None
    } else {
        Some(format!("{parent}/"))
    }
}

/// Whether an entry path names the directory being listed.
pub fn is_same_dir(entry_path: &str, dir: &str) -> bool {
    entry_path.trim_matches('/') == dir.trim_matches('/')
}

/// Absolute form of an operator path, as reported to callers.
pub fn absolute_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

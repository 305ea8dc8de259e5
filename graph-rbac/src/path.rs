//! # Paths
//!
//! Every node carries a denormalized copy of its position in the tree as a
//! slash-delimited string starting with the synthetic `/root/` segment and
//! ending with a slash, e.g. `/root/admin/editor/`.

/// Title of the synthetic root segment.
pub const ROOT_TITLE: &str = "root";

/// Path of every kind's root node.
pub const ROOT_PATH: &str = "/root/";

/// Turn a user-supplied path reference into a stored path.
///
/// References already starting with the root segment are kept, everything
/// else is placed under it. A trailing slash is always present.
///
/// # Example
///
/// ```
/// use graph_rbac::path::normalize;
///
/// assert_eq!(normalize("/admin/editor"), "/root/admin/editor/");
/// assert_eq!(normalize("/root/admin/"), "/root/admin/");
/// assert_eq!(normalize("/"), "/root/");
/// ```
pub fn normalize(reference: &str) -> String {
    let inner = reference.trim_matches('/');
    let inner = match inner.strip_prefix(ROOT_TITLE) {
        Some("") => "",
        Some(rest) if rest.starts_with('/') && reference.starts_with('/') => {
            rest.trim_start_matches('/')
        }
        _ => inner,
    };

    if inner.is_empty() {
        ROOT_PATH.to_string()
    } else {
        format!("{}{}/", ROOT_PATH, inner)
    }
}

/// Path of a node titled `title` placed under `parent_path`.
pub fn child(parent_path: &str, title: &str) -> String {
    format!("{}{}/", parent_path, title)
}

/// Remove the synthetic root segment for display (`/root/a/` reads `/a/`).
pub fn strip_root(path: &str) -> String {
    match path.strip_prefix(ROOT_PATH) {
        Some(rest) => format!("/{}", rest),
        None => path.to_string(),
    }
}

/// Non-empty segments of a path reference, without the synthetic root.
pub fn segments(reference: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = reference.split('/').filter(|s| !s.is_empty()).collect();
    if reference.starts_with('/') && segments.first() == Some(&ROOT_TITLE) {
        segments.remove(0);
    }
    segments
}

/// Move a path from under `old_prefix` to under `new_prefix`.
///
/// Only a match at a segment boundary at the start of the path counts, so a
/// sibling whose title merely contains the removed title is never touched.
/// Returns `None` when `path` is not below `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if !old_prefix.ends_with('/') {
        return None;
    }
    path.strip_prefix(old_prefix)
        .map(|rest| format!("{}{}", new_prefix, rest))
}

use std::path::{Component, Path};

/// Render a path with forward slashes regardless of platform.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalize a slash-separated relative path.
///
/// Empty and `.` segments are dropped, `..` cancels the preceding segment,
/// and leading or trailing separators are removed.
///
/// ```
/// use notelink_core::utils::normalize_posix;
///
/// assert_eq!(normalize_posix("./a//b/"), "a/b");
/// assert_eq!(normalize_posix("a/../b"), "b");
/// assert_eq!(normalize_posix("../x"), "../x");
/// assert_eq!(normalize_posix("sub\\deep"), "sub/deep");
/// ```
pub fn normalize_posix(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative path from `from` to `to`, slash-separated. Empty when equal.
pub fn relative_posix(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let to: Vec<Component> = to
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = Vec::with_capacity(from.len() - common + to.len() - common);
    parts.extend(std::iter::repeat("..".to_string()).take(from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_relative_posix() {
        let root = Path::new("/tmp/ws");
        assert_eq!(relative_posix(root, Path::new("/tmp/ws")), "");
        assert_eq!(relative_posix(root, Path::new("/tmp/ws/sub")), "sub");
        assert_eq!(relative_posix(root, Path::new("/tmp/ws/a/b/")), "a/b");
        assert_eq!(relative_posix(root, Path::new("/tmp/other")), "../other");
        assert_eq!(relative_posix(Path::new("/tmp/ws/a"), root), "..");
    }

    #[test]
    fn test_normalize_posix_keeps_leading_parent_segments() {
        assert_eq!(normalize_posix("../../a/./b"), "../../a/b");
        assert_eq!(normalize_posix("a/b/../../.."), "..");
        assert_eq!(normalize_posix("/"), "");
    }
}

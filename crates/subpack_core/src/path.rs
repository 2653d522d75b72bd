//! Helpers for the forward-slash paths used to name emitted assets and bundles.
use std::path::Path;

use path_slash::PathExt;

/// Converts a platform path into a forward-slash path.
pub fn to_slash(path: &Path) -> String {
  path.to_slash_lossy().into_owned()
}

/// Directory part of a slash path, or `""` when the path has no directory.
pub fn dirname(path: &str) -> &str {
  match path.rfind('/') {
    Some(idx) => &path[..idx],
    None => "",
  }
}

pub fn join(dir: &str, path: &str) -> String {
  if dir.is_empty() {
    path.to_string()
  } else {
    format!("{dir}/{path}")
  }
}

/// Resolves `.` and `..` segments lexically.
///
/// Leading `..` segments that climb above the start are kept, matching posix normalization.
pub fn normalize(path: &str) -> String {
  let mut segments: Vec<&str> = Vec::new();

  for segment in path.split('/') {
    match segment {
      "" | "." => {}
      ".." => match segments.last() {
        Some(last) if *last != ".." => {
          segments.pop();
        }
        _ => segments.push(".."),
      },
      segment => segments.push(segment),
    }
  }

  segments.join("/")
}

/// True when `name` lives under the directory `root`.
pub fn is_under(name: &str, root: &str) -> bool {
  let root = root.trim_end_matches('/');
  !root.is_empty()
    && name.len() > root.len()
    && name.starts_with(root)
    && name.as_bytes()[root.len()] == b'/'
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_relative_segments() {
    assert_eq!(normalize("pages/home/./../detail/x"), "pages/detail/x");
    assert_eq!(normalize("a/../../b"), "../b");
    assert_eq!(normalize("/components/a/"), "components/a");
  }

  #[test]
  fn splits_dirname() {
    assert_eq!(dirname("pages/home/index"), "pages/home");
    assert_eq!(dirname("index"), "");
  }

  #[test]
  fn checks_directory_prefix() {
    assert!(is_under("subA/page.js", "subA"));
    assert!(is_under("subA/page.js", "subA/"));
    assert!(!is_under("subAB/page.js", "subA"));
    assert!(!is_under("subA", "subA"));
    assert!(!is_under("x/subA/page.js", "subA"));
  }
}

use std::collections::BTreeMap;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::FileSystem;

#[cfg(not(target_os = "windows"))]
fn root_dir() -> PathBuf {
  PathBuf::from("/")
}

#[cfg(target_os = "windows")]
fn root_dir() -> PathBuf {
  PathBuf::from("C:/")
}

/// In memory implementation of a file-system entry
#[derive(Debug)]
enum InMemoryFileSystemEntry {
  File { contents: Vec<u8> },
  Directory,
}

/// In memory implementation of the `FileSystem` trait, for testing purposes.
#[derive(Debug)]
pub struct InMemoryFileSystem {
  files: RwLock<BTreeMap<PathBuf, InMemoryFileSystemEntry>>,
  current_working_directory: RwLock<PathBuf>,
}

impl Default for InMemoryFileSystem {
  fn default() -> Self {
    Self {
      files: Default::default(),
      current_working_directory: RwLock::new(root_dir()),
    }
  }
}

impl InMemoryFileSystem {
  /// Change the current working directory. Used for resolving relative paths.
  pub fn set_current_working_directory(&self, cwd: &Path) {
    let cwd = self.canonicalize_impl(cwd);
    let mut state = self.current_working_directory.write();
    *state = cwd;
  }

  pub fn write_file(&self, path: &Path, contents: String) {
    // Writes cannot fail for the in-memory implementation
    let _ = self.write(path, contents.as_bytes());
  }

  fn canonicalize_impl(&self, path: &Path) -> PathBuf {
    let cwd = self.current_working_directory.read();
    let mut result = if path.is_absolute() {
      vec![]
    } else {
      cwd.components().collect()
    };

    for component in path.components() {
      match component {
        Component::Prefix(prefix) => {
          result = vec![Component::Prefix(prefix)];
        }
        Component::RootDir => {
          result.push(Component::RootDir);
        }
        Component::CurDir => {}
        Component::ParentDir => {
          result.pop();
        }
        Component::Normal(path) => {
          result.push(Component::Normal(path));
        }
      }
    }

    PathBuf::from_iter(result)
  }
}

impl FileSystem for InMemoryFileSystem {
  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    let path = self.canonicalize_impl(path);
    let mut files = self.files.write();
    let mut dir = Some(path.as_path());
    while let Some(path) = dir {
      files.insert(path.to_path_buf(), InMemoryFileSystemEntry::Directory);
      dir = path.parent();
    }
    Ok(())
  }

  fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
    let root = self.canonicalize_impl(root);
    let files = self.files.read();

    if !matches!(files.get(&root), Some(InMemoryFileSystemEntry::Directory)) {
      return Err(io::Error::new(
        io::ErrorKind::NotFound,
        "Directory not found",
      ));
    }

    Ok(
      files
        .iter()
        .filter(|(path, entry)| {
          matches!(entry, InMemoryFileSystemEntry::File { .. }) && path.starts_with(&root)
        })
        .map(|(path, _)| path.clone())
        .collect(),
    )
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let path = self.canonicalize_impl(path);
    let files = self.files.read();
    match files.get(&path) {
      None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
      Some(InMemoryFileSystemEntry::File { contents }) => Ok(contents.clone()),
      Some(InMemoryFileSystemEntry::Directory) => Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "Path is a directory",
      )),
    }
  }

  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
    let path = self.canonicalize_impl(path);
    let mut files = self.files.write();

    files.insert(
      path.clone(),
      InMemoryFileSystemEntry::File {
        contents: contents.to_vec(),
      },
    );

    let mut dir = path.parent();
    while let Some(path) = dir {
      files.insert(path.to_path_buf(), InMemoryFileSystemEntry::Directory);
      dir = path.parent();
    }

    Ok(())
  }

  fn is_file(&self, path: &Path) -> bool {
    let path = self.canonicalize_impl(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::File { .. })
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_remove_relative_parent_dots() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&root_dir().join("foo/baz"), String::from("x"));
    let result = fs
      .read_to_string(&root_dir().join("foo/./bar/../baz"))
      .unwrap();
    assert_eq!(result, "x");
  }

  #[test]
  fn test_with_cwd() {
    let fs = InMemoryFileSystem::default();
    fs.set_current_working_directory(Path::new("/other"));
    fs.write_file(Path::new("./foo/bar"), String::from("contents"));
    assert!(fs.is_file(&root_dir().join("other/foo/bar")));
  }

  #[test]
  fn test_read_file_not_found() {
    let fs = InMemoryFileSystem::default();
    let result = fs.read_to_string(Path::new("/foo/bar"));
    assert!(result.is_err());
  }

  #[test]
  fn test_is_file() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&PathBuf::from("/foo/bar"), String::default());

    assert!(fs.is_file(Path::new("/foo/bar")));
    assert!(!fs.is_file(Path::new("/foo")));
  }

  #[test]
  fn test_walk_files_lists_nested_files() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/src/pages/a/async.component.json"), String::new());
    fs.write_file(Path::new("/src/main.js"), String::new());
    fs.write_file(Path::new("/srcx/y.js"), String::new());
    fs.write_file(Path::new("/other/x.js"), String::new());

    assert_eq!(
      fs.walk_files(Path::new("/src")).unwrap(),
      vec![
        PathBuf::from("/src/main.js"),
        PathBuf::from("/src/pages/a/async.component.json"),
      ]
    );
    assert!(fs.walk_files(Path::new("/missing")).is_err());
  }
}

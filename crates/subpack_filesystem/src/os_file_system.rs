use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use jwalk::WalkDir;

use crate::FileSystem;

#[derive(Default, Debug)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).skip_hidden(false).sort(true) {
      let entry = entry.map_err(io::Error::other)?;
      if entry.file_type().is_file() {
        files.push(entry.path());
      }
    }

    files.sort();
    Ok(files)
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
  }

  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_and_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let fs = OsFileSystem;

    fs.write(&dir.path().join("b/c.json"), b"{}").unwrap();
    fs.write(&dir.path().join("a.js"), b"1").unwrap();

    assert!(fs.is_file(&dir.path().join("a.js")));
    assert!(!fs.is_file(&dir.path().join("b")));
    assert_eq!(fs.read_to_string(&dir.path().join("b/c.json")).unwrap(), "{}");
  }

  #[test]
  fn walks_nested_files_including_hidden_ones() {
    let dir = tempfile::tempdir().unwrap();
    let fs = OsFileSystem;

    fs.write(&dir.path().join("pages/a/async.component.json"), b"{}").unwrap();
    fs.write(&dir.path().join("main.js"), b"1").unwrap();
    fs.write(&dir.path().join(".hidden/x.js"), b"1").unwrap();
    fs.create_dir_all(&dir.path().join("empty")).unwrap();

    assert_eq!(
      fs.walk_files(dir.path()).unwrap(),
      vec![
        dir.path().join(".hidden/x.js"),
        dir.path().join("main.js"),
        dir.path().join("pages/a/async.component.json"),
      ]
    );
    assert!(fs.walk_files(&dir.path().join("missing")).is_err());
  }
}

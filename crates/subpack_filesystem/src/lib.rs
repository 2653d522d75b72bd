use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

/// In-memory file-system for testing
pub mod in_memory_file_system;

/// File-system implementation using std::fs
pub mod os_file_system;

/// FileSystem abstraction instance
///
/// This should be `OsFileSystem` for non-testing environments and `InMemoryFileSystem` for testing.
pub type FileSystemRef = Arc<dyn FileSystem + Send + Sync>;

/// Trait abstracting the file-system operations the build stages need.
#[mockall::automock]
pub trait FileSystem: std::fmt::Debug {
  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Recursively lists every file under `root`, sorted by path.
  fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;

  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let bytes = self.read(path)?;
    String::from_utf8(bytes).map_err(|_| io::Error::other("Unable to read file as string"))
  }

  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

  fn is_file(&self, path: &Path) -> bool;
}

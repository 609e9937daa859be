use std::{io, path::Path};

/// File access used by the resolver, the module loader and `Bundler::write`.
pub trait FileSystem: Send + Sync {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  fn is_file(&self, path: &Path) -> bool;

  fn is_dir(&self, path: &Path) -> bool;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

  fn remove_file(&self, path: &Path) -> io::Result<()>;

  /// Replaces `to` when it exists.
  fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

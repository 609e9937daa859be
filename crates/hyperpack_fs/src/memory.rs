use std::{
  io::{self, Write},
  path::Path,
};

use sugar_path::SugarPath;
use vfs::{MemoryFS, VfsPath};

use crate::FileSystem;

/// In-memory file system backed by `vfs::MemoryFS`. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
  root: VfsPath,
}

impl Default for MemoryFileSystem {
  fn default() -> Self {
    Self { root: VfsPath::new(MemoryFS::new()) }
  }
}

impl MemoryFileSystem {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates `path` (and its parent directories) with `content`.
  pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      self.create_dir_all(parent)?;
    }
    self.write(path, content.as_ref())
  }

  fn vfs_path(&self, path: &Path) -> io::Result<VfsPath> {
    let normalized = path.normalize();
    let slash = normalized.to_slash_lossy();
    let relative = slash.trim_start_matches('/');
    if relative.is_empty() || relative == "." {
      return Ok(self.root.clone());
    }
    self.root.join(relative).map_err(io::Error::other)
  }
}

impl FileSystem for MemoryFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let mut file = self.vfs_path(path)?.open_file().map_err(into_io_error)?;
    let mut buf = vec![];
    io::Read::read_to_end(&mut file, &mut buf)?;
    Ok(buf)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    self.vfs_path(path)?.read_to_string().map_err(into_io_error)
  }

  fn is_file(&self, path: &Path) -> bool {
    self.vfs_path(path).is_ok_and(|path| path.is_file().unwrap_or(false))
  }

  fn is_dir(&self, path: &Path) -> bool {
    self.vfs_path(path).is_ok_and(|path| path.is_dir().unwrap_or(false))
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    self.vfs_path(path)?.create_dir_all().map_err(into_io_error)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = self.vfs_path(path)?.create_file().map_err(into_io_error)?;
    file.write_all(content)?;
    file.flush()
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    self.vfs_path(path)?.remove_file().map_err(into_io_error)
  }

  fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
    let content = self.read(from)?;
    self.write(to, &content)?;
    self.remove_file(from)
  }
}

fn into_io_error(err: vfs::VfsError) -> io::Error {
  if matches!(err.kind(), vfs::error::VfsErrorKind::FileNotFound) {
    io::Error::new(io::ErrorKind::NotFound, err)
  } else {
    io::Error::other(err)
  }
}

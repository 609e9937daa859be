mod common;

use std::{
  io,
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use common::bundler;
use hyperpack::{
  BuildDiagnostic, BundlerOptions, CancellationToken, FileSystem, MANIFEST_FILENAME, Manifest,
  MemoryFileSystem,
};

#[tokio::test]
async fn write_puts_every_asset_in_the_output_dir() {
  let (mut bundler, fs) = bundler(
    &[
      ("src/main.js", "import { greet } from './greet.js';\ngreet();\nimport('./lazy.js');"),
      ("src/greet.js", "export const greet = () => console.log('hi');"),
      ("src/lazy.js", "console.log('lazy');"),
    ],
    BundlerOptions { dir: Some("build/out".to_string()), ..BundlerOptions::default() },
  );

  let output = bundler.write().await.unwrap();
  assert_eq!(output.assets.len(), 3);
  for asset in &output.assets {
    let path = Path::new("/project/build/out").join(&asset.filename);
    assert_eq!(fs.read_to_string(&path).unwrap(), asset.content, "{}", path.display());
  }

  let manifest = fs.read_to_string(&Path::new("/project/build/out").join(MANIFEST_FILENAME)).unwrap();
  let manifest: Manifest = serde_json::from_str(&manifest).unwrap();
  assert_eq!(manifest.entries["main"], "main.js");
  assert!(fs.read_to_string(Path::new("/project/build/out/main.js")).unwrap().contains("__hyperpack__"));
}

#[tokio::test]
async fn rebuild_after_an_edit_overwrites_the_chunks() {
  let (mut bundler, fs) =
    bundler(&[("src/main.js", "console.log('first');")], BundlerOptions::default());
  bundler.write().await.unwrap();

  fs.add_file("/project/src/main.js", "console.log('second');").unwrap();
  bundler.write().await.unwrap();

  let main = fs.read_to_string(Path::new("/project/dist/main.js")).unwrap();
  assert!(main.contains("'second'"), "{main}");
  assert!(!main.contains("'first'"), "{main}");
  assert_eq!(bundler.generation(), 2);
}

/// Delegates to a `MemoryFileSystem`. Writing the manifest fails, and the token is cancelled
/// after `cancel_after` writes.
struct FlakyFileSystem {
  inner: MemoryFileSystem,
  writes: AtomicUsize,
  cancel_after: Option<(usize, CancellationToken)>,
}

impl FlakyFileSystem {
  fn new(inner: MemoryFileSystem) -> Self {
    Self { inner, writes: AtomicUsize::new(0), cancel_after: None }
  }
}

impl FileSystem for FlakyFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    self.inner.read(path)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    self.inner.read_to_string(path)
  }

  fn is_file(&self, path: &Path) -> bool {
    self.inner.is_file(path)
  }

  fn is_dir(&self, path: &Path) -> bool {
    self.inner.is_dir(path)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    self.inner.create_dir_all(path)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    if path.to_string_lossy().contains(MANIFEST_FILENAME) {
      return Err(io::Error::other("disk full"));
    }
    self.inner.write(path, content)?;
    let writes = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some((after, token)) = &self.cancel_after {
      if writes >= *after {
        token.cancel();
      }
    }
    Ok(())
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    self.inner.remove_file(path)
  }

  fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
    self.inner.rename(from, to)
  }
}

const LAZY_APP: &[(&str, &str)] = &[
  ("src/main.js", "console.log('second');\nimport('./lazy.js');"),
  ("src/lazy.js", "console.log('lazy');"),
];

fn files_under(fs: &MemoryFileSystem, dir: &str, names: &[&str]) -> Vec<String> {
  names
    .iter()
    .filter(|name| fs.is_file(&Path::new(dir).join(name)))
    .map(|name| (*name).to_string())
    .collect()
}

#[tokio::test]
async fn failed_write_keeps_the_previous_output() {
  let (mut bundler, fs) = bundler(LAZY_APP, BundlerOptions::default());
  fs.add_file("/project/dist/main.js", "previous").unwrap();
  let mut bundler = bundler.with_file_system(Arc::new(FlakyFileSystem::new(fs.clone())));

  let err = bundler.write().await.unwrap_err();
  let message = err.to_string();
  assert!(message.starts_with("Failed to write") && message.contains(MANIFEST_FILENAME), "{message}");

  assert_eq!(fs.read_to_string(Path::new("/project/dist/main.js")).unwrap(), "previous");
  assert!(!fs.is_file(Path::new("/project/dist/main.js.staging")));
}

#[tokio::test]
async fn cancelling_during_write_removes_staged_assets() {
  let (bundler, fs) = bundler(LAZY_APP, BundlerOptions::default());
  let token = bundler.cancellation_token();
  let flaky = FlakyFileSystem { cancel_after: Some((1, token)), ..FlakyFileSystem::new(fs.clone()) };
  let mut bundler = bundler.with_file_system(Arc::new(flaky));

  let err = bundler.write().await.unwrap_err();
  assert!(matches!(err[0], BuildDiagnostic::Cancelled), "{err}");
  assert!(files_under(&fs, "/project/dist", &["main.js", "main.js.staging"]).is_empty());
}

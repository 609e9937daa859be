use std::sync::atomic::{AtomicU32, Ordering};

use arcstr::ArcStr;
use dashmap::{DashMap, mapref::entry::Entry};
use hyperpack_common::{ModuleIdx, ModuleLoaderMsg, SharedWasmProvider};
use hyperpack_fs::SharedFileSystem;
use tokio_util::sync::CancellationToken;

use crate::types::{SharedOptions, SharedPluginDriver, SharedResolver};

/// Used to store common data shared between all tasks.
pub struct TaskContext {
  pub fs: SharedFileSystem,
  pub options: SharedOptions,
  pub resolver: SharedResolver,
  pub plugin_driver: SharedPluginDriver,
  pub wasm_provider: Option<SharedWasmProvider>,
  pub tx: tokio::sync::mpsc::Sender<ModuleLoaderMsg>,
  /// Cancelled by the loader on the first error, and by the build generation.
  pub cancel: CancellationToken,
  claims: DashMap<ArcStr, ModuleIdx>,
  next_idx: AtomicU32,
}

impl TaskContext {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    plugin_driver: SharedPluginDriver,
    wasm_provider: Option<SharedWasmProvider>,
    tx: tokio::sync::mpsc::Sender<ModuleLoaderMsg>,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      fs,
      options,
      resolver,
      plugin_driver,
      wasm_provider,
      tx,
      cancel,
      claims: DashMap::default(),
      next_idx: AtomicU32::new(0),
    }
  }

  /// Returns the index owned by `id` and whether this call claimed it. Exactly one caller
  /// observes `true` per identity, and that caller is responsible for loading the module.
  pub fn claim(&self, id: &ArcStr) -> (ModuleIdx, bool) {
    match self.claims.entry(ArcStr::clone(id)) {
      Entry::Occupied(occupied) => (*occupied.get(), false),
      Entry::Vacant(vacant) => {
        let idx = ModuleIdx::from_raw(self.next_idx.fetch_add(1, Ordering::Relaxed));
        vacant.insert(idx);
        (idx, true)
      }
    }
  }

  pub fn claimed_count(&self) -> usize {
    self.next_idx.load(Ordering::Acquire) as usize
  }
}

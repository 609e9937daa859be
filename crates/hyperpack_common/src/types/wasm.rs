use std::sync::Arc;

/// A compiled WebAssembly module and the names it exports.
#[derive(Debug, Clone)]
pub struct WasmBinary {
  pub bytes: Arc<[u8]>,
  pub exports: Vec<String>,
}

/// Supplies compiled WebAssembly for `wasm:<package>` imports. Compiling is left to the caller.
pub trait WasmProvider: Send + Sync {
  fn provide(&self, package: &str) -> anyhow::Result<WasmBinary>;
}

pub type SharedWasmProvider = Arc<dyn WasmProvider>;

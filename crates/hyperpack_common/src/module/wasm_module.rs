use std::sync::Arc;

use arcstr::ArcStr;
use hyperpack_utils::rstr::Rstr;

use crate::ModuleIdx;

/// Opaque WebAssembly module. Its exports come from the provider's descriptor.
#[derive(Debug, Clone)]
pub struct WasmModule {
  pub idx: ModuleIdx,
  pub id: ArcStr,
  pub bytes: Arc<[u8]>,
  pub exports: Vec<Rstr>,
  pub used_exports: Vec<Rstr>,
  pub is_included: bool,
}

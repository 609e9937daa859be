use arcstr::ArcStr;

use crate::ModuleIdx;

/// Excluded from bundling and looked up by `name` through the runtime registry.
#[derive(Debug, Clone)]
pub struct ExternalModule {
  pub idx: ModuleIdx,
  pub name: ArcStr,
  pub is_included: bool,
}

impl ExternalModule {
  pub fn new(idx: ModuleIdx, name: ArcStr) -> Self {
    Self { idx, name, is_included: false }
  }
}

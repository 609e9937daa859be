use std::path::Path;

use arcstr::ArcStr;

use crate::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
  Normal,
  /// Left out of the bundle and looked up by name at runtime.
  External,
  /// Supplied by the `WasmProvider`.
  Wasm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
  pub id: ArcStr,
  pub kind: ResolvedKind,
}

impl ResolvedId {
  pub fn normal(id: impl Into<ArcStr>) -> Self {
    Self { id: id.into(), kind: ResolvedKind::Normal }
  }

  pub fn external(id: impl Into<ArcStr>) -> Self {
    Self { id: id.into(), kind: ResolvedKind::External }
  }

  pub fn wasm(id: impl Into<ArcStr>) -> Self {
    Self { id: id.into(), kind: ResolvedKind::Wasm }
  }

  pub fn is_external(&self) -> bool {
    matches!(self.kind, ResolvedKind::External)
  }

  pub fn debug_id(&self, cwd: &Path) -> String {
    ModuleId::new(ArcStr::clone(&self.id)).stabilize(cwd)
  }
}

pub mod external_module;
pub mod normal_module;
pub mod wasm_module;

use oxc_index::IndexVec;

use crate::{
  ExternalModule, ImportRecordIdx, ModuleIdx, NormalModule, ResolvedImportRecord, WasmModule,
};

#[derive(Debug, Clone)]
pub enum Module {
  Normal(Box<NormalModule>),
  External(Box<ExternalModule>),
  Wasm(Box<WasmModule>),
}

impl Module {
  pub fn idx(&self) -> ModuleIdx {
    match self {
      Self::Normal(v) => v.idx,
      Self::External(v) => v.idx,
      Self::Wasm(v) => v.idx,
    }
  }

  pub fn set_idx(&mut self, idx: ModuleIdx) {
    match self {
      Self::Normal(v) => v.idx = idx,
      Self::External(v) => v.idx = idx,
      Self::Wasm(v) => v.idx = idx,
    }
  }

  pub fn id(&self) -> &str {
    match self {
      Self::Normal(v) => &v.id,
      Self::External(v) => &v.name,
      Self::Wasm(v) => &v.id,
    }
  }

  /// The registry slot of the module.
  pub fn stable_id(&self) -> &str {
    match self {
      Self::Normal(v) => &v.stable_id,
      Self::External(v) => &v.name,
      Self::Wasm(v) => &v.id,
    }
  }

  pub fn is_included(&self) -> bool {
    match self {
      Self::Normal(v) => v.ecma_view.meta.is_included(),
      Self::External(v) => v.is_included,
      Self::Wasm(v) => v.is_included,
    }
  }

  pub fn set_included(&mut self, value: bool) {
    match self {
      Self::Normal(v) => v.ecma_view.meta.set(crate::EcmaViewMeta::INCLUDED, value),
      Self::External(v) => v.is_included = value,
      Self::Wasm(v) => v.is_included = value,
    }
  }

  /// Source bytes counted against `minChunkSize`.
  pub fn size(&self) -> usize {
    match self {
      Self::Normal(v) => v.ecma_view.source.len(),
      Self::External(_) => 0,
      Self::Wasm(v) => v.bytes.len(),
    }
  }

  pub fn as_normal(&self) -> Option<&NormalModule> {
    match self {
      Self::Normal(v) => Some(v),
      Self::External(_) | Self::Wasm(_) => None,
    }
  }

  pub fn as_normal_mut(&mut self) -> Option<&mut NormalModule> {
    match self {
      Self::Normal(v) => Some(v),
      Self::External(_) | Self::Wasm(_) => None,
    }
  }

  pub fn as_external(&self) -> Option<&ExternalModule> {
    match self {
      Self::External(v) => Some(v),
      Self::Normal(_) | Self::Wasm(_) => None,
    }
  }

  pub fn as_wasm(&self) -> Option<&WasmModule> {
    match self {
      Self::Wasm(v) => Some(v),
      Self::Normal(_) | Self::External(_) => None,
    }
  }

  /// Positions match `ImportRecordIdx`. Externals and WebAssembly modules import nothing.
  pub fn import_records(&self) -> &[ResolvedImportRecord] {
    match self {
      Self::Normal(v) => &v.ecma_view.import_records.raw,
      Self::External(_) | Self::Wasm(_) => &[],
    }
  }

  pub fn import_records_mut(
    &mut self,
  ) -> Option<&mut IndexVec<ImportRecordIdx, ResolvedImportRecord>> {
    self.as_normal_mut().map(|module| &mut module.ecma_view.import_records)
  }

  pub fn is_normal(&self) -> bool {
    matches!(self, Self::Normal(..))
  }

  pub fn is_external(&self) -> bool {
    matches!(self, Self::External(..))
  }
}

impl From<NormalModule> for Module {
  fn from(module: NormalModule) -> Self {
    Self::Normal(Box::new(module))
  }
}

impl From<ExternalModule> for Module {
  fn from(module: ExternalModule) -> Self {
    Self::External(Box::new(module))
  }
}

impl From<WasmModule> for Module {
  fn from(module: WasmModule) -> Self {
    Self::Wasm(Box::new(module))
  }
}

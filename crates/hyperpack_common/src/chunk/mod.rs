use arcstr::ArcStr;
use hyperpack_utils::bitset::BitSet;
use oxc_index::IndexVec;

use crate::{ChunkIdx, FilenameTemplate, Module, ModuleIdx, NormalModule, NormalizedBundlerOptions};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ChunkKind {
  EntryPoint { is_user_defined: bool, bit: u32, module: ModuleIdx },
  /// Holds modules shared by several anchors.
  #[default]
  Common,
}

#[derive(Debug, Default, Clone)]
pub struct Chunk {
  pub kind: ChunkKind,
  /// Sorted by `ModuleIdx`, which is the first-discovery order.
  pub modules: Vec<ModuleIdx>,
  /// Anchors that reach the modules of this chunk.
  pub bits: BitSet,
  pub name: Option<ArcStr>,
  pub filename: Option<ArcStr>,
  /// Stand-ins for the `[hash]` parts of `filename` until the content is final.
  pub hash_placeholders: Vec<String>,
  /// Chunks that must be loaded before this one runs, sorted.
  pub cross_chunk_imports: Vec<ChunkIdx>,
  /// Chunks loaded lazily by `import()` in this chunk, sorted.
  pub cross_chunk_dynamic_imports: Vec<ChunkIdx>,
}

impl Chunk {
  pub fn new(name: Option<ArcStr>, bits: BitSet, modules: Vec<ModuleIdx>, kind: ChunkKind) -> Self {
    Self { kind, modules, bits, name, ..Self::default() }
  }

  pub fn is_user_defined_entry(&self) -> bool {
    matches!(self.kind, ChunkKind::EntryPoint { is_user_defined: true, .. })
  }

  pub fn filename_template(&self, options: &NormalizedBundlerOptions) -> FilenameTemplate {
    let ret = if self.is_user_defined_entry() {
      options.entry_filenames.clone()
    } else {
      options.chunk_filenames.clone()
    };

    FilenameTemplate::new(ret)
  }

  pub fn user_defined_entry_module_idx(&self) -> Option<ModuleIdx> {
    match &self.kind {
      ChunkKind::EntryPoint { module, is_user_defined, .. } if *is_user_defined => Some(*module),
      _ => None,
    }
  }

  pub fn entry_module_idx(&self) -> Option<ModuleIdx> {
    match &self.kind {
      ChunkKind::EntryPoint { module, .. } => Some(*module),
      ChunkKind::Common => None,
    }
  }

  pub fn entry_module<'module>(
    &self,
    modules: &'module IndexVec<ModuleIdx, Module>,
  ) -> Option<&'module NormalModule> {
    self.entry_module_idx().and_then(|idx| modules[idx].as_normal())
  }

  /// Filename relative to the output directory. Holds hash placeholders until the assets are
  /// finalized.
  pub fn filename(&self) -> &str {
    self.filename.as_deref().unwrap_or_default()
  }
}

use std::path::PathBuf;

use hyperpack_utils::indexmap::FxIndexMap;

use crate::{Dialect, DynamicImportBoundary, InputItem, SharedChunkTieBreak};

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub input: Vec<InputItem>,
  pub cwd: PathBuf,
  pub dialect: Dialect,

  // --- Resolve
  pub aliases: FxIndexMap<String, String>,
  pub extensions: Vec<String>,

  // --- Tree shaking
  pub retain_side_effect_modules: bool,
  pub retain_exports: FxIndexMap<String, Vec<String>>,

  // --- Chunking
  pub min_chunk_size: usize,
  pub max_shared_chunks: Option<usize>,
  pub duplication_threshold: usize,
  pub dynamic_import_boundary: DynamicImportBoundary,
  pub shared_chunk_tie_break: SharedChunkTieBreak,

  // --- Output
  pub dir: String,
  pub entry_filenames: String,
  pub chunk_filenames: String,
  pub minify: bool,
  pub sourcemap: bool,
}

impl NormalizedBundlerOptions {
  pub fn splits_dynamic_imports(&self) -> bool {
    matches!(self.dynamic_import_boundary, DynamicImportBoundary::Always)
  }

  pub fn out_dir(&self) -> PathBuf {
    self.cwd.join(&self.dir)
  }
}

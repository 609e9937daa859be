pub mod filename_template;
pub mod input_item;
pub mod normalized_bundler_options;

use std::path::{Path, PathBuf};

use anyhow::Context;
use hyperpack_utils::indexmap::FxIndexMap;
use serde::{Deserialize, Serialize};

use crate::InputItem;

/// Whether dynamic imports start a separately loaded chunk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DynamicImportBoundary {
  #[default]
  Always,
  /// Dynamic imports are bundled like static ones.
  Never,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
  #[default]
  Plain,
  /// TypeScript, lowered to plain ECMAScript before scanning.
  TypedSuperset,
}

/// Order of shared-chunk candidates that are imported by the same number of chunks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SharedChunkTieBreak {
  /// The group whose first module was discovered first wins.
  #[default]
  DiscoveryOrder,
  /// The group with more source bytes wins, then discovery order.
  LargerFirst,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Input
  pub entry_points: Option<Vec<InputItem>>,
  pub cwd: Option<PathBuf>,
  pub dialect: Option<Dialect>,

  // --- Resolve
  /// Specifier prefix to replacement, tried longest prefix first.
  pub aliases: Option<FxIndexMap<String, String>>,
  pub extensions: Option<Vec<String>>,

  // --- Tree shaking
  pub retain_side_effect_modules: Option<bool>,
  /// Module path relative to `cwd` to export names kept alive in addition to entry exports.
  pub retain_exports: Option<FxIndexMap<String, Vec<String>>>,

  // --- Chunking
  pub min_chunk_size: Option<usize>,
  pub max_shared_chunks: Option<usize>,
  pub duplication_threshold: Option<usize>,
  pub dynamic_import_boundary: Option<DynamicImportBoundary>,
  pub shared_chunk_tie_break: Option<SharedChunkTieBreak>,

  // --- Output
  pub dir: Option<String>,
  pub entry_filenames: Option<String>,
  pub chunk_filenames: Option<String>,
  pub minify: Option<bool>,
  /// Emits a `<chunk>.map` asset next to every chunk. Ignored when `minify` is on.
  pub sourcemap: Option<bool>,
}

impl BundlerOptions {
  pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
    serde_json::from_str(json).context("Invalid bundler options")
  }

  pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read bundler options from {}", path.display()))?;
    Self::from_json_str(&json)
  }
}

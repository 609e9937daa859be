use std::path::PathBuf;

use hyperpack_common::{BundlerOptions, NormalizedBundlerOptions};

const DEFAULT_EXTENSIONS: [&str; 4] = [".js", ".mjs", ".ts", ".mts"];
const MIN_DUPLICATION_THRESHOLD: usize = 2;

pub fn normalize_options(raw_options: BundlerOptions) -> NormalizedBundlerOptions {
  let cwd = raw_options
    .cwd
    .or_else(|| std::env::current_dir().ok())
    .unwrap_or_else(|| PathBuf::from("."));

  NormalizedBundlerOptions {
    input: raw_options.entry_points.unwrap_or_default(),
    cwd,
    dialect: raw_options.dialect.unwrap_or_default(),
    aliases: raw_options.aliases.unwrap_or_default(),
    extensions: raw_options
      .extensions
      .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()),
    retain_side_effect_modules: raw_options.retain_side_effect_modules.unwrap_or(true),
    retain_exports: raw_options.retain_exports.unwrap_or_default(),
    min_chunk_size: raw_options.min_chunk_size.unwrap_or(0),
    max_shared_chunks: raw_options.max_shared_chunks,
    // A group reached by a single anchor is never shared.
    duplication_threshold: raw_options
      .duplication_threshold
      .unwrap_or(MIN_DUPLICATION_THRESHOLD)
      .max(MIN_DUPLICATION_THRESHOLD),
    dynamic_import_boundary: raw_options.dynamic_import_boundary.unwrap_or_default(),
    shared_chunk_tie_break: raw_options.shared_chunk_tie_break.unwrap_or_default(),
    dir: raw_options.dir.unwrap_or_else(|| "dist".to_string()),
    entry_filenames: raw_options.entry_filenames.unwrap_or_else(|| "[name].js".to_string()),
    chunk_filenames: raw_options.chunk_filenames.unwrap_or_else(|| "[name]-[hash].js".to_string()),
    minify: raw_options.minify.unwrap_or(false),
    sourcemap: raw_options.sourcemap.unwrap_or(false),
  }
}

#[cfg(test)]
mod tests {
  use hyperpack_common::{Dialect, DynamicImportBoundary, SharedChunkTieBreak};

  use super::*;

  #[test]
  fn defaults() {
    let options = normalize_options(BundlerOptions {
      cwd: Some(PathBuf::from("/project")),
      ..BundlerOptions::default()
    });
    assert_eq!(options.extensions, vec![".js", ".mjs", ".ts", ".mts"]);
    assert_eq!(options.dir, "dist");
    assert_eq!(options.dynamic_import_boundary, DynamicImportBoundary::Always);
    assert_eq!(options.dialect, Dialect::Plain);
    assert_eq!(options.shared_chunk_tie_break, SharedChunkTieBreak::DiscoveryOrder);
    assert_eq!(options.duplication_threshold, 2);
    assert_eq!(options.max_shared_chunks, None);
    assert!(options.retain_side_effect_modules);
    assert!(!options.minify);
    assert!(!options.sourcemap);
    assert_eq!(options.out_dir(), PathBuf::from("/project/dist"));
  }

  #[test]
  fn duplication_threshold_is_clamped() {
    let options = normalize_options(BundlerOptions {
      duplication_threshold: Some(0),
      ..BundlerOptions::default()
    });
    assert_eq!(options.duplication_threshold, 2);

    let options = normalize_options(BundlerOptions {
      duplication_threshold: Some(3),
      ..BundlerOptions::default()
    });
    assert_eq!(options.duplication_threshold, 3);
  }
}

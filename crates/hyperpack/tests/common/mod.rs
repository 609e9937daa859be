#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use hyperpack::{BundleOutput, Bundler, BundlerOptions, InputItem, MemoryFileSystem};

pub const CWD: &str = "/project";

pub fn memory_fs(files: &[(&str, &str)]) -> MemoryFileSystem {
  let fs = MemoryFileSystem::new();
  for (path, source) in files {
    fs.add_file(Path::new(CWD).join(path), source).unwrap();
  }
  fs
}

/// A bundler over an in-memory project rooted at `/project`, with `src/main.js` as the entry
/// unless `options` names entries.
pub fn bundler(files: &[(&str, &str)], options: BundlerOptions) -> (Bundler, MemoryFileSystem) {
  let fs = memory_fs(files);
  let options = BundlerOptions {
    cwd: Some(CWD.into()),
    entry_points: options.entry_points.clone().or_else(|| Some(vec![InputItem::from("src/main.js")])),
    ..options
  };
  (Bundler::new(options).with_file_system(Arc::new(fs.clone())), fs)
}

pub async fn generate(files: &[(&str, &str)], options: BundlerOptions) -> BundleOutput {
  let (mut bundler, _) = bundler(files, options);
  bundler.generate().await.unwrap()
}

pub fn code<'a>(output: &'a BundleOutput, filename: &str) -> &'a str {
  &output.asset(filename).unwrap_or_else(|| panic!("{filename} was not emitted")).content
}

/// Chunk assets that register `slot`.
pub fn chunks_registering(output: &BundleOutput, slot: &str) -> Vec<String> {
  let needle = format!("__hp.register({slot:?}");
  output
    .assets
    .iter()
    .filter(|asset| asset.content.contains(&needle))
    .map(|asset| asset.filename.clone())
    .collect()
}

/// Edge of a generated module graph: `(importer, target, is_dynamic, is_used)`.
pub type GraphEdge = (usize, usize, bool, bool);

/// Module `m{i}` exports `v{i}`, an array built from the values of its used static imports,
/// one lazy loader `l{k}` per dynamic edge and `unused{i}`. Every initializer is pure, so a
/// module is only kept when one of its exports is used.
pub fn graph_files(n: usize, edges: &[GraphEdge]) -> Vec<(String, String)> {
  (0..n)
    .map(|i| {
      let mut source = String::new();
      let mut values = vec![format!("'m{i}'")];
      for (k, (_, target, is_dynamic, is_used)) in
        edges.iter().enumerate().filter(|(_, edge)| edge.0 == i)
      {
        if *is_dynamic {
          source.push_str(&format!("export const l{k} = () => import('./m{target}.js');\n"));
        } else {
          source.push_str(&format!("import {{ v{target} as d{k} }} from './m{target}.js';\n"));
          if *is_used {
            values.push(format!("d{k}"));
          }
        }
      }
      source.push_str(&format!(
        "export const v{i} = [{}];\nexport const unused{i} = 'u';\n",
        values.join(", ")
      ));
      (format!("src/m{i}.js"), source)
    })
    .collect()
}

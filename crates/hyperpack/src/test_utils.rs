use std::{path::Path, sync::Arc};

use hyperpack_common::{BundlerOptions, InputItem, Module};
use hyperpack_error::BuildResult;
use hyperpack_fs::{MemoryFileSystem, SharedFileSystem};
use hyperpack_plugin::PluginDriver;
use hyperpack_resolver::{ResolveOptions, Resolver};
use tokio_util::sync::CancellationToken;

use crate::{
  link_stage::{LinkStage, LinkStageOutput},
  scan_stage::{ScanStage, ScanStageOutput},
  types::{IndexModules, SharedOptions, build_context::BuildContext},
  utils::normalize_options::normalize_options,
};

pub const CWD: &str = "/project";

/// Loads `files` (paths relative to `/project`) with `src/main.js` as the entry unless
/// `options` names entries.
pub async fn scan(
  files: &[(&str, &str)],
  options: BundlerOptions,
) -> BuildResult<(ScanStageOutput, SharedOptions)> {
  let fs = MemoryFileSystem::new();
  for (path, source) in files {
    fs.add_file(Path::new(CWD).join(path), source).unwrap();
  }
  let fs: SharedFileSystem = Arc::new(fs);

  let options = Arc::new(normalize_options(BundlerOptions {
    cwd: Some(CWD.into()),
    entry_points: options.entry_points.clone().or_else(|| Some(vec![InputItem::from("src/main.js")])),
    ..options
  }));
  let resolver = Arc::new(Resolver::new(ResolveOptions::from(&*options), Arc::clone(&fs)));
  let ctx = BuildContext::new(0, CancellationToken::new());
  let output = ScanStage::new(
    fs,
    Arc::clone(&options),
    resolver,
    Arc::new(PluginDriver::default()),
    None,
    &ctx,
  )
  .scan()
  .await?;
  Ok((output, options))
}

pub async fn link(
  files: &[(&str, &str)],
  options: BundlerOptions,
) -> BuildResult<(LinkStageOutput, SharedOptions)> {
  let (output, options) = scan(files, options).await?;
  let output = LinkStage::new(output, &options).link()?;
  Ok((output, options))
}

pub fn find_module<'a>(modules: &'a IndexModules, stable_id: &str) -> &'a Module {
  modules
    .iter()
    .find(|module| module.stable_id() == stable_id)
    .unwrap_or_else(|| panic!("{stable_id} is not in the graph"))
}

/// Edge of a generated module graph: `(importer, target, is_dynamic, is_used)`.
pub type GraphEdge = (usize, usize, bool, bool);

/// Sources of modules `src/m0.js` .. `src/m{n-1}.js` wired by `edges`. Every module exports
/// `v{i}` and an export nobody imports.
pub fn graph_files(n: usize, edges: &[GraphEdge]) -> Vec<(String, String)> {
  (0..n)
    .map(|i| {
      let mut source = String::new();
      let mut value = format!("'m{i}'");
      for (k, (_, target, is_dynamic, is_used)) in
        edges.iter().enumerate().filter(|(_, edge)| edge.0 == i)
      {
        if *is_dynamic {
          source.push_str(&format!("export const l{k} = () => import('./m{target}.js');\n"));
        } else {
          source.push_str(&format!("import {{ v{target} as d{k} }} from './m{target}.js';\n"));
          if *is_used {
            value.push_str(&format!(" + d{k}"));
          }
        }
      }
      source.push_str(&format!("export const v{i} = {value};\nexport const unused{i} = 'u';\n"));
      (format!("src/m{i}.js"), source)
    })
    .collect()
}

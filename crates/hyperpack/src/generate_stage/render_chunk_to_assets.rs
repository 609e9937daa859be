use futures::future::try_join_all;
use hyperpack_common::{ChunkIdx, MANIFEST_FILENAME, Module, ModuleIdx, OutputAsset};
use hyperpack_ecmascript::EcmaCompiler;
use hyperpack_error::{BuildError, BuildResult};
use hyperpack_plugin::RenderedChunk;
use hyperpack_sourcemap::SourceJoiner;
use hyperpack_utils::{
  base64::to_standard_base64,
  concat_string,
  ecmascript::js_string_literal,
  rayon::{IntoParallelRefMutIterator, ParallelIterator},
};
use oxc_index::IndexVec;

use crate::{
  graph::ChunkGraph,
  types::{bundle_output::BundleOutput, instantiated_chunk::InstantiatedChunk},
  utils::chunk::finalize_chunks::finalize_assets,
};

use super::{GenerateStage, runtime::RUNTIME};

impl GenerateStage<'_> {
  fn render_chunk(
    &self,
    chunk_graph: &ChunkGraph,
    chunk_idx: ChunkIdx,
  ) -> BuildResult<InstantiatedChunk> {
    let chunk = &chunk_graph.chunk_table[chunk_idx];
    let mut joiner = SourceJoiner::new(self.options.sourcemap && !self.options.minify);
    joiner.append_raw("(function () {\n\"use strict\";\n");
    if chunk.is_user_defined_entry() {
      joiner.append_raw(&concat_string!(
        "var __hp = globalThis.__hyperpack__ || (globalThis.__hyperpack__ = ",
        RUNTIME,
        ");\n"
      ));
    } else {
      joiner.append_raw("var __hp = globalThis.__hyperpack__;\n");
    }

    for &module_idx in &chunk.modules {
      match &self.link_output.modules[module_idx] {
        Module::Normal(module) => self.render_module(chunk_graph, chunk_idx, module, &mut joiner)?,
        Module::Wasm(module) => joiner.append_raw(&concat_string!(
          "__hp.wasm(",
          js_string_literal(&module.id),
          ", ",
          js_string_literal(&to_standard_base64(&module.bytes)),
          ");\n"
        )),
        Module::External(_) => {}
      }
    }

    if let Some(entry) = chunk.user_defined_entry_module_idx() {
      let require =
        concat_string!("__hp.require(", js_string_literal(self.link_output.modules[entry].stable_id()), ")");
      let deps = chunk_graph.static_load_order(chunk_idx);
      if deps.is_empty() {
        joiner.append_raw(&concat_string!(require, ";\n"));
      } else {
        let files = deps
          .iter()
          .map(|idx| js_string_literal(chunk_graph.chunk_table[*idx].filename()))
          .collect::<Vec<_>>();
        joiner.append_raw(&concat_string!(
          "__hp.load([",
          files.join(", "),
          "]).then(() => ",
          require,
          ");\n"
        ));
      }
    }

    joiner.append_raw("})();\n");
    let filename = chunk.filename();
    let basename = filename.rsplit('/').next().unwrap_or(filename);
    let (mut content, map) = joiner.join(basename);
    if map.is_some() {
      content.push_str(&concat_string!("//# sourceMappingURL=", basename, ".map\n"));
    }
    Ok(InstantiatedChunk { preliminary_filename: filename.to_string(), content, map })
  }

  /// Registry slots of `modules`, externals excluded.
  pub(super) fn module_slots(&self, modules: &[ModuleIdx]) -> Vec<String> {
    modules
      .iter()
      .map(|idx| &self.link_output.modules[*idx])
      .filter(|module| !module.is_external())
      .map(|module| module.stable_id().to_string())
      .collect()
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub async fn render_chunk_to_assets(
    &self,
    chunk_graph: &mut ChunkGraph,
  ) -> BuildResult<BundleOutput> {
    let mut warnings = vec![];
    let mut instantiated_chunks = {
      let chunk_graph = &*chunk_graph;
      let tasks = chunk_graph.chunk_table.iter_enumerated().map(|(chunk_idx, chunk)| async move {
        let instantiated = self.render_chunk(chunk_graph, chunk_idx)?;
        tracing::debug!(chunk = chunk.filename(), modules = chunk.modules.len(), "chunk rendered");
        Ok::<_, BuildError>(instantiated)
      });
      try_join_all(tasks).await?
    };

    if self.options.minify {
      if self.options.sourcemap {
        warnings.push(anyhow::anyhow!("Source maps are not generated for minified output."));
      }
      instantiated_chunks.par_iter_mut().try_for_each(|chunk| -> BuildResult<()> {
        chunk.content = EcmaCompiler::minify(&chunk.preliminary_filename, &chunk.content)?;
        Ok(())
      })?;
    }

    for (instantiated, chunk) in instantiated_chunks.iter_mut().zip(chunk_graph.chunk_table.iter()) {
      let modules = self.module_slots(&chunk.modules);
      let outcome = self.plugin_driver.chunk_emit(&RenderedChunk {
        name: chunk.name.as_deref().unwrap_or_default(),
        filename: &instantiated.preliminary_filename,
        code: &instantiated.content,
        is_entry: chunk.is_user_defined_entry(),
        modules: &modules,
      })?;
      if let Some(code) = outcome.into_override() {
        instantiated.content = code;
        if instantiated.map.take().is_some() {
          warnings.push(anyhow::anyhow!(
            "A plugin replaced the code of chunk {:?}; its source map was dropped.",
            chunk.name.as_deref().unwrap_or_default()
          ));
        }
      }
    }

    let mut assets = finalize_assets(chunk_graph, IndexVec::from_vec(instantiated_chunks));

    let manifest = self.generate_manifest(chunk_graph);
    assets.push(OutputAsset { filename: MANIFEST_FILENAME.to_string(), content: manifest.to_json()? });

    Ok(BundleOutput { assets, manifest, warnings })
  }
}

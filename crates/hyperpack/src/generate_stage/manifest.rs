use std::collections::BTreeMap;

use hyperpack_common::{ChunkIdx, ChunkKind, Manifest, ManifestChunk, ManifestChunkKind, Module};

use crate::graph::ChunkGraph;

use super::GenerateStage;

impl GenerateStage<'_> {
  pub fn generate_manifest(&self, chunk_graph: &ChunkGraph) -> Manifest {
    let modules = &self.link_output.modules;
    let filenames = |chunks: &[ChunkIdx]| {
      chunks.iter().map(|idx| chunk_graph.chunk_table[*idx].filename().to_string()).collect::<Vec<_>>()
    };

    let mut manifest = Manifest::default();
    for chunk in chunk_graph.chunk_table.iter() {
      let name = chunk.name.as_deref().unwrap_or_default().to_string();
      let kind = match chunk.kind {
        ChunkKind::EntryPoint { is_user_defined: true, .. } => ManifestChunkKind::Entry,
        ChunkKind::EntryPoint { .. } => ManifestChunkKind::DynamicEntry,
        ChunkKind::Common => ManifestChunkKind::Common,
      };
      if kind == ManifestChunkKind::Entry {
        manifest.entries.insert(name.clone(), chunk.filename().to_string());
      }
      manifest.chunks.push(ManifestChunk {
        file: chunk.filename().to_string(),
        name,
        kind,
        modules: self.module_slots(&chunk.modules),
        imports: filenames(&chunk.cross_chunk_imports),
        dynamic_imports: filenames(&chunk.cross_chunk_dynamic_imports),
      });
    }

    for module in modules.iter().filter(|module| module.is_included()) {
      let Module::Normal(module) = module else {
        continue;
      };
      let table = module
        .import_records
        .iter()
        .filter(|record| record.is_live())
        .map(|record| {
          (record.specifier.to_string(), modules[record.resolved_module()].stable_id().to_string())
        })
        .collect::<BTreeMap<_, _>>();
      if !table.is_empty() {
        manifest.registry.insert(module.stable_id.clone(), table);
      }
    }

    manifest
  }
}

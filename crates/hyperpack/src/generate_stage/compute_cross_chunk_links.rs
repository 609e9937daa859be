use hyperpack_common::{ChunkIdx, ModuleIdx};
use hyperpack_error::{BuildResult, EmitError};
use itertools::multizip;
use oxc_index::{IndexVec, index_vec};

use crate::graph::ChunkGraph;

use super::GenerateStage;

impl GenerateStage<'_> {
  /// Chunk that provides `target` to modules of `importer_chunk`. `None` when the importer
  /// chunk contains it, or when it is duplicated into every anchor chunk that can load the
  /// importer chunk.
  pub(super) fn providing_chunk(
    &self,
    chunk_graph: &ChunkGraph,
    importer_chunk: ChunkIdx,
    importer: ModuleIdx,
    target: ModuleIdx,
  ) -> BuildResult<Option<ChunkIdx>> {
    if chunk_graph.chunk_contains(importer_chunk, target) {
      return Ok(None);
    }
    if let Some(entry_chunk) = chunk_graph.entry_module_to_entry_chunk.get(&target) {
      return Ok(Some(*entry_chunk));
    }
    match chunk_graph.module_to_chunks[target].as_slice() {
      [] => Err(
        EmitError {
          module: self.link_output.modules[importer].stable_id().to_string(),
          message: format!(
            "{} is imported but not placed in any chunk",
            self.link_output.modules[target].stable_id()
          ),
        }
        .into(),
      ),
      [chunk] => Ok(Some(*chunk)),
      _ => Ok(None),
    }
  }

  pub fn compute_cross_chunk_links(&self, chunk_graph: &mut ChunkGraph) -> BuildResult<()> {
    let modules = &self.link_output.modules;
    let mut cross_chunk_imports: IndexVec<ChunkIdx, Vec<ChunkIdx>> =
      index_vec![vec![]; chunk_graph.chunk_table.len()];
    let mut cross_chunk_dynamic_imports: IndexVec<ChunkIdx, Vec<ChunkIdx>> =
      index_vec![vec![]; chunk_graph.chunk_table.len()];

    for (chunk_idx, chunk) in chunk_graph.chunk_table.iter_enumerated() {
      for &importer in &chunk.modules {
        for record in modules[importer].import_records().iter().filter(|rec| rec.is_live()) {
          let target = record.resolved_module();
          if modules[target].is_external() {
            continue;
          }
          let Some(provider) = self.providing_chunk(chunk_graph, chunk_idx, importer, target)?
          else {
            continue;
          };
          if record.kind.is_static() {
            cross_chunk_imports[chunk_idx].push(provider);
          } else {
            cross_chunk_dynamic_imports[chunk_idx].push(provider);
          }
        }
      }
    }

    for ((chunk_idx, chunk), mut imports, mut dynamic_imports) in multizip((
      chunk_graph.chunk_table.iter_mut_enumerated(),
      cross_chunk_imports,
      cross_chunk_dynamic_imports,
    )) {
      imports.sort_unstable();
      imports.dedup();
      imports.retain(|idx| *idx != chunk_idx);
      dynamic_imports.sort_unstable();
      dynamic_imports.dedup();
      dynamic_imports.retain(|idx| *idx != chunk_idx);
      chunk.cross_chunk_imports = imports;
      chunk.cross_chunk_dynamic_imports = dynamic_imports;
    }

    Ok(())
  }
}

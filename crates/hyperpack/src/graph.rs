use hyperpack_common::{Chunk, ChunkIdx, ModuleIdx};
use oxc_index::{IndexVec, index_vec};
use rustc_hash::FxHashMap;

use crate::types::IndexModules;

#[derive(Debug)]
pub struct ChunkGraph {
  pub chunk_table: IndexVec<ChunkIdx, Chunk>,
  /// More than one chunk when a shared module is duplicated instead of hoisted.
  pub module_to_chunks: IndexVec<ModuleIdx, Vec<ChunkIdx>>,
  pub entry_module_to_entry_chunk: FxHashMap<ModuleIdx, ChunkIdx>,
}

impl ChunkGraph {
  pub fn new(modules: &IndexModules) -> Self {
    Self {
      chunk_table: IndexVec::default(),
      module_to_chunks: index_vec![vec![]; modules.len()],
      entry_module_to_entry_chunk: FxHashMap::default(),
    }
  }

  pub fn add_chunk(&mut self, chunk: Chunk) -> ChunkIdx {
    self.chunk_table.push(chunk)
  }

  pub fn add_module_to_chunk(&mut self, module_idx: ModuleIdx, chunk_idx: ChunkIdx) {
    self.chunk_table[chunk_idx].modules.push(module_idx);
    self.module_to_chunks[module_idx].push(chunk_idx);
  }

  pub fn chunk_contains(&self, chunk_idx: ChunkIdx, module_idx: ModuleIdx) -> bool {
    self.module_to_chunks[module_idx].contains(&chunk_idx)
  }

  /// Chunks that must be loaded before `chunk_idx` runs, dependencies first. `chunk_idx`
  /// itself is not included.
  pub fn static_load_order(&self, chunk_idx: ChunkIdx) -> Vec<ChunkIdx> {
    fn visit(graph: &ChunkGraph, idx: ChunkIdx, seen: &mut Vec<ChunkIdx>, ret: &mut Vec<ChunkIdx>) {
      if seen.contains(&idx) {
        return;
      }
      seen.push(idx);
      for dep in &graph.chunk_table[idx].cross_chunk_imports {
        visit(graph, *dep, seen, ret);
      }
      ret.push(idx);
    }

    let mut seen = vec![chunk_idx];
    let mut ret = vec![];
    for dep in &self.chunk_table[chunk_idx].cross_chunk_imports {
      visit(self, *dep, &mut seen, &mut ret);
    }
    ret
  }
}

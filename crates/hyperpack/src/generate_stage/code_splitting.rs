use std::cmp::Ordering;

use hyperpack_common::{
  Chunk, ChunkIdx, ChunkKind, EntryPoint, EntryPointKind, ModuleIdx, SharedChunkTieBreak,
};
use hyperpack_error::{BuildResult, GraphError};
use hyperpack_utils::{bitset::BitSet, indexmap::FxIndexMap};
use oxc_index::{IndexVec, index_vec};
use rustc_hash::FxHashSet;

use crate::graph::ChunkGraph;

use super::GenerateStage;

/// Modules reached by the same set of anchors.
#[derive(Debug)]
struct ModuleGroup {
  bits: BitSet,
  /// Sorted by `ModuleIdx`.
  modules: Vec<ModuleIdx>,
  size: usize,
}

impl GenerateStage<'_> {
  /// Chunk anchors: user-defined entries in declared order, then live dynamic-import
  /// targets in discovery order when dynamic imports are split. A target imported from
  /// one anchor always gets its own chunk. A target imported from several anchors gets one
  /// when the importer count reaches `duplicationThreshold` and it is at least
  /// `minChunkSize` bytes. Otherwise it is inlined into every importer's chunk.
  ///
  /// Returns the anchors and the inlined targets.
  fn collect_chunk_anchors(&self) -> (Vec<EntryPoint>, FxHashSet<ModuleIdx>) {
    let modules = &self.link_output.modules;
    let mut anchors = self.link_output.entry_points.clone();
    let mut inlined = FxHashSet::default();
    if !self.options.splits_dynamic_imports() {
      return (anchors, inlined);
    }

    // Targets reached only through a newly anchored chunk are decided in a later round.
    loop {
      let reachability = self.compute_reachability(&anchors, &inlined);
      #[allow(clippy::cast_possible_truncation)]
      let bit_count = anchors.len() as u32;
      let mut pending: FxIndexMap<ModuleIdx, BitSet> = FxIndexMap::default();
      for module in modules.iter().filter(|module| module.is_included()) {
        let importer_bits = &reachability[module.idx()];
        if importer_bits.is_empty() {
          continue;
        }
        for record in module.import_records() {
          let target = record.resolved_module();
          if record.kind.is_static()
            || !record.is_live()
            || modules[target].is_external()
            || inlined.contains(&target)
            || anchors.iter().any(|anchor| anchor.idx == target)
          {
            continue;
          }
          pending
            .entry(target)
            .or_insert_with(|| BitSet::new(bit_count))
            .union(importer_bits);
        }
      }
      if pending.is_empty() {
        break;
      }

      pending.sort_unstable_keys();
      for (target, importers) in pending {
        let importer_count = importers.count_ones() as usize;
        if importer_count < 2
          || (importer_count >= self.options.duplication_threshold
            && modules[target].size() >= self.options.min_chunk_size)
        {
          anchors.push(EntryPoint { idx: target, name: None, kind: EntryPointKind::DynamicImport });
        } else {
          tracing::debug!(
            module = modules[target].stable_id(),
            importers = importer_count,
            "dynamic import inlined"
          );
          inlined.insert(target);
        }
      }
    }
    (anchors, inlined)
  }

  /// For every module, the set of anchors that reach it.
  fn compute_reachability(
    &self,
    anchors: &[EntryPoint],
    inlined: &FxHashSet<ModuleIdx>,
  ) -> IndexVec<ModuleIdx, BitSet> {
    let modules = &self.link_output.modules;
    #[allow(clippy::cast_possible_truncation)]
    let bit_count = anchors.len() as u32;
    let mut index_splitting_info = index_vec![BitSet::new(bit_count); modules.len()];
    for (bit, anchor) in (0..bit_count).zip(anchors) {
      self.determine_reachable_modules_for_entry(anchor.idx, bit, inlined, &mut index_splitting_info);
    }
    index_splitting_info
  }

  fn determine_reachable_modules_for_entry(
    &self,
    entry: ModuleIdx,
    bit: u32,
    inlined: &FxHashSet<ModuleIdx>,
    index_splitting_info: &mut IndexVec<ModuleIdx, BitSet>,
  ) {
    let modules = &self.link_output.modules;
    let splits_dynamic_imports = self.options.splits_dynamic_imports();

    let mut stack = vec![entry];
    while let Some(idx) = stack.pop() {
      let module = &modules[idx];
      if index_splitting_info[idx].has_bit(bit) || module.is_external() || !module.is_included() {
        continue;
      }
      index_splitting_info[idx].set_bit(bit);

      for record in module.import_records().iter().rev() {
        let target = record.resolved_module();
        let follow = if record.kind.is_static() {
          modules[target].is_included()
        } else {
          record.is_live() && (!splits_dynamic_imports || inlined.contains(&target))
        };
        if follow {
          stack.push(target);
        }
      }
    }
  }

  fn is_hoistable(&self, group: &ModuleGroup) -> bool {
    self.options.max_shared_chunks != Some(0)
      && group.bits.count_ones() as usize >= self.options.duplication_threshold
      && group.size >= self.options.min_chunk_size
  }

  fn compare_shared_candidates(&self, a: &ModuleGroup, b: &ModuleGroup) -> Ordering {
    let discovery_order = || a.modules.first().cmp(&b.modules.first());
    b.bits.count_ones().cmp(&a.bits.count_ones()).then_with(|| {
      match self.options.shared_chunk_tie_break {
        SharedChunkTieBreak::DiscoveryOrder => discovery_order(),
        SharedChunkTieBreak::LargerFirst => b.size.cmp(&a.size).then_with(discovery_order),
      }
    })
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn generate_chunks(&self) -> BuildResult<ChunkGraph> {
    let modules = &self.link_output.modules;
    let mut chunk_graph = ChunkGraph::new(modules);

    let (anchors, inlined) = self.collect_chunk_anchors();
    let bit_count = u32::try_from(anchors.len())
      .map_err(|_| anyhow::anyhow!("Too many chunk anchors: {}", anchors.len()))?;
    let index_splitting_info = self.compute_reachability(&anchors, &inlined);

    // Anchor chunks come first, so the chunk of anchor `bit` is `ChunkIdx(bit)`.
    for (bit, anchor) in (0..bit_count).zip(&anchors) {
      let mut bits = BitSet::new(bit_count);
      bits.set_bit(bit);
      let chunk = Chunk::new(
        anchor.name.clone(),
        bits,
        vec![],
        ChunkKind::EntryPoint {
          is_user_defined: anchor.kind.is_user_defined(),
          bit,
          module: anchor.idx,
        },
      );
      let chunk_idx = chunk_graph.add_chunk(chunk);
      chunk_graph.entry_module_to_entry_chunk.insert(anchor.idx, chunk_idx);
      chunk_graph.add_module_to_chunk(anchor.idx, chunk_idx);
    }

    let mut groups: FxIndexMap<BitSet, ModuleGroup> = FxIndexMap::default();
    for module in modules.iter() {
      let idx = module.idx();
      if !module.is_included()
        || module.is_external()
        || chunk_graph.entry_module_to_entry_chunk.contains_key(&idx)
      {
        continue;
      }
      let bits = &index_splitting_info[idx];
      if bits.is_empty() {
        return Err(
          GraphError {
            module: module.stable_id().to_string(),
            message: "module is included but no chunk anchor reaches it".to_string(),
          }
          .into(),
        );
      }
      let group = groups.entry(bits.clone()).or_insert_with(|| ModuleGroup {
        bits: bits.clone(),
        modules: vec![],
        size: 0,
      });
      group.modules.push(idx);
      group.size += module.size();
    }

    let mut shared_candidates = vec![];
    for group in groups.into_values() {
      let anchor_bits = group.bits.index_of_one();
      if anchor_bits.len() == 1 {
        for idx in &group.modules {
          chunk_graph.add_module_to_chunk(*idx, ChunkIdx::from_raw(anchor_bits[0]));
        }
      } else if self.is_hoistable(&group) {
        shared_candidates.push(group);
      } else {
        // Duplicated into every anchor that reaches it.
        for bit in anchor_bits {
          for idx in &group.modules {
            chunk_graph.add_module_to_chunk(*idx, ChunkIdx::from_raw(bit));
          }
        }
      }
    }

    shared_candidates.sort_by(|a, b| self.compare_shared_candidates(a, b));
    let limit = self.options.max_shared_chunks.unwrap_or(usize::MAX);
    let mut shared_chunks: Vec<ModuleGroup> = Vec::with_capacity(shared_candidates.len());
    for group in shared_candidates {
      // Lower-ranked groups are merged into the last permitted shared chunk.
      if shared_chunks.len() >= limit {
        if let Some(last) = shared_chunks.last_mut() {
          for bit in group.bits.index_of_one() {
            last.bits.set_bit(bit);
          }
          last.modules.extend(group.modules);
          last.size += group.size;
          continue;
        }
      }
      shared_chunks.push(group);
    }
    for group in &mut shared_chunks {
      group.modules.sort_unstable();
    }
    shared_chunks.sort_by_key(|group| group.modules.first().copied());

    for group in shared_chunks {
      let chunk_idx = chunk_graph.add_chunk(Chunk::new(None, group.bits, vec![], ChunkKind::Common));
      for idx in group.modules {
        chunk_graph.add_module_to_chunk(idx, chunk_idx);
      }
    }

    for chunk in chunk_graph.chunk_table.iter_mut() {
      chunk.modules.sort_unstable();
    }
    for chunks in chunk_graph.module_to_chunks.iter_mut() {
      chunks.sort_unstable();
    }

    tracing::debug!(chunks = chunk_graph.chunk_table.len(), "chunks planned");
    Ok(chunk_graph)
  }
}

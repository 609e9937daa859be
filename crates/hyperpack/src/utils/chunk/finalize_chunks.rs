use std::hash::Hash;

use hyperpack_common::{ChunkIdx, OutputAsset};
use hyperpack_utils::{
  base64::to_url_safe_base64,
  concat_string,
  hash_placeholder::{extract_hash_placeholders, replace_placeholder_with_hash},
  indexmap::FxIndexSet,
  rayon::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator},
  xxhash::xxhash_base64_url,
};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::{graph::ChunkGraph, types::instantiated_chunk::InstantiatedChunk};

struct PreliminaryAsset {
  filename: String,
  content: String,
  map: Option<String>,
}

/// Swaps every hash placeholder for a digest of the chunk, its source map and everything it
/// loads, then records the final filenames on `chunk_graph`. A chunk's map follows it.
pub fn finalize_assets(
  chunk_graph: &mut ChunkGraph,
  instantiated_chunks: IndexVec<ChunkIdx, InstantiatedChunk>,
) -> Vec<OutputAsset> {
  let preliminary_assets: IndexVec<ChunkIdx, PreliminaryAsset> = instantiated_chunks
    .into_iter()
    .map(|chunk| PreliminaryAsset {
      filename: chunk.preliminary_filename,
      content: chunk.content,
      map: chunk.map.map(|map| map.to_json_string()),
    })
    .collect::<Vec<_>>()
    .into();

  let chunk_idx_by_placeholder = chunk_graph
    .chunk_table
    .iter_enumerated()
    .flat_map(|(chunk_idx, chunk)| {
      chunk.hash_placeholders.iter().map(move |placeholder| (placeholder.as_str(), chunk_idx))
    })
    .collect::<FxHashMap<_, _>>();

  let index_direct_dependencies: IndexVec<ChunkIdx, Vec<ChunkIdx>> = preliminary_assets
    .par_iter()
    .map(|asset| {
      extract_hash_placeholders(&asset.content)
        .iter()
        .filter_map(|placeholder| chunk_idx_by_placeholder.get(placeholder).copied())
        .collect::<Vec<_>>()
    })
    .collect::<Vec<_>>()
    .into();

  // `a` loads `b` loads `c`: a change in `c` must reach the hash of `a` too.
  let index_transitive_dependencies = collect_transitive_dependencies(&index_direct_dependencies);

  let index_standalone_content_hashes: IndexVec<ChunkIdx, String> = preliminary_assets
    .par_iter()
    .map(|asset| xxhash_base64_url(asset.content.as_bytes()))
    .collect::<Vec<_>>()
    .into();

  let index_final_hashes: IndexVec<ChunkIdx, String> = (0..preliminary_assets.len())
    .into_par_iter()
    .map(|chunk_idx| {
      let chunk_idx = ChunkIdx::from_usize(chunk_idx);
      let asset = &preliminary_assets[chunk_idx];
      let mut hasher = Xxh3::default();
      index_standalone_content_hashes[chunk_idx].hash(&mut hasher);
      asset.map.hash(&mut hasher);
      // Chunks with the same content still get different hashes.
      asset.filename.hash(&mut hasher);
      for dep in &index_transitive_dependencies[chunk_idx] {
        index_standalone_content_hashes[*dep].hash(&mut hasher);
      }
      to_url_safe_base64(hasher.digest128().to_le_bytes())
    })
    .collect::<Vec<_>>()
    .into();

  let final_hashes_by_placeholder = chunk_graph
    .chunk_table
    .iter_enumerated()
    .flat_map(|(chunk_idx, chunk)| {
      let hash = &index_final_hashes[chunk_idx];
      chunk
        .hash_placeholders
        .iter()
        .map(move |placeholder| (placeholder.clone(), hash[..placeholder.len()].to_string()))
    })
    .collect::<FxHashMap<_, _>>();

  let mut assets = Vec::with_capacity(preliminary_assets.len());
  for (chunk, asset) in chunk_graph.chunk_table.iter_mut().zip(preliminary_assets) {
    let filename =
      replace_placeholder_with_hash(&asset.filename, &final_hashes_by_placeholder).into_owned();
    let content =
      replace_placeholder_with_hash(&asset.content, &final_hashes_by_placeholder).into_owned();
    chunk.filename = Some(filename.as_str().into());
    if let Some(map) = asset.map {
      let map = replace_placeholder_with_hash(&map, &final_hashes_by_placeholder).into_owned();
      assets.push(OutputAsset { filename: filename.clone(), content });
      assets.push(OutputAsset { filename: concat_string!(filename, ".map"), content: map });
    } else {
      assets.push(OutputAsset { filename, content });
    }
  }
  assets
}

fn collect_transitive_dependencies(
  index_direct_dependencies: &IndexVec<ChunkIdx, Vec<ChunkIdx>>,
) -> IndexVec<ChunkIdx, FxIndexSet<ChunkIdx>> {
  fn traverse(
    index: ChunkIdx,
    dep_map: &IndexVec<ChunkIdx, Vec<ChunkIdx>>,
    visited: &mut FxIndexSet<ChunkIdx>,
  ) {
    for dep_index in &dep_map[index] {
      if visited.insert(*dep_index) {
        traverse(*dep_index, dep_map, visited);
      }
    }
  }

  index_direct_dependencies
    .indices()
    .map(|idx| {
      let mut visited_deps = FxIndexSet::default();
      traverse(idx, index_direct_dependencies, &mut visited_deps);
      visited_deps
    })
    .collect::<Vec<_>>()
    .into()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transitive_dependencies_follow_chains_and_cycles() {
    let deps: IndexVec<ChunkIdx, Vec<ChunkIdx>> = vec![
      vec![ChunkIdx::from_raw(1)],
      vec![ChunkIdx::from_raw(2)],
      vec![ChunkIdx::from_raw(1)],
      vec![],
    ]
    .into();
    let transitive = collect_transitive_dependencies(&deps);
    let as_raw = |idx: usize| {
      transitive[ChunkIdx::from_usize(idx)].iter().map(|dep| dep.raw()).collect::<Vec<_>>()
    };
    assert_eq!(as_raw(0), vec![1, 2]);
    assert_eq!(as_raw(1), vec![2, 1]);
    assert_eq!(as_raw(3), Vec::<u32>::new());
  }
}

use std::{collections::hash_map::Entry, path::Path};

use arcstr::ArcStr;
use hyperpack_common::{Chunk, ChunkKind, Module};
use hyperpack_error::BuildResult;
use hyperpack_utils::{
  concat_string,
  hash_placeholder::{HashPlaceholderGenerator, MAX_HASH_LEN, MIN_HASH_LEN},
  path_ext::PathExt,
  sanitize_file_name::sanitize_file_name,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::ChunkGraph;

use super::GenerateStage;

fn module_repr_name(module: &Module) -> String {
  match module {
    Module::Normal(module) => module.repr_name.clone(),
    Module::Wasm(module) => sanitize_file_name(module.id.strip_prefix("wasm:").unwrap_or(&module.id)),
    Module::External(module) => sanitize_file_name(&module.name),
  }
}

impl GenerateStage<'_> {
  fn pre_generate_chunk_name(&self, chunk: &Chunk) -> ArcStr {
    if let Some(name) = &chunk.name {
      return ArcStr::clone(name);
    }
    let modules = &self.link_output.modules;
    match chunk.kind {
      ChunkKind::EntryPoint { module, is_user_defined: true, .. } => Path::new(modules[module].id())
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map_or(arcstr::literal!("input"), |stem| sanitize_file_name(stem).into()),
      ChunkKind::EntryPoint { module, .. } => module_repr_name(&modules[module]).into(),
      ChunkKind::Common => chunk.modules.first().map_or(arcstr::literal!("chunk"), |idx| {
        let module = &modules[*idx];
        match module {
          Module::Normal(normal) => {
            sanitize_file_name(&Path::new(&*normal.id).representative_file_name()).into()
          }
          _ => module_repr_name(module).into(),
        }
      }),
    }
  }

  /// Notices:
  /// - Should generate filenames that are stable cross builds and os.
  pub fn generate_chunk_filenames(&self, chunk_graph: &mut ChunkGraph) -> BuildResult<()> {
    let create_make_unique_name = |mut used_name_counts: FxHashMap<ArcStr, u32>| {
      move |name: &ArcStr| {
        let mut candidate = ArcStr::clone(name);
        loop {
          match used_name_counts.entry(ArcStr::clone(&candidate)) {
            Entry::Occupied(mut occ) => {
              // This name is already used
              let next_count = *occ.get();
              occ.insert(next_count + 1);
              candidate =
                ArcStr::from(concat_string!(name, itoa::Buffer::new().format(next_count)).as_str());
            }
            Entry::Vacant(vac) => {
              // This is the first time we see this name
              let name = ArcStr::clone(vac.key());
              vac.insert(2);
              break name;
            }
          }
        }
      }
    };
    let mut make_unique_name = create_make_unique_name(FxHashMap::default());

    let mut hash_placeholder_generator = HashPlaceholderGenerator::default();
    let mut used_filenames = FxHashSet::default();
    let names =
      chunk_graph.chunk_table.iter().map(|chunk| self.pre_generate_chunk_name(chunk)).collect::<Vec<_>>();
    for (chunk, name) in chunk_graph.chunk_table.iter_mut().zip(names) {
      let name = make_unique_name(&name);
      let template = chunk.filename_template(self.options);
      let mut hash_placeholders = vec![];
      let mut invalid_hash_len = None;
      let filename: ArcStr = template
        .render(&name, |len| match hash_placeholder_generator.generate(len) {
          Some(placeholder) => {
            hash_placeholders.push(placeholder.clone());
            placeholder
          }
          None => {
            invalid_hash_len.get_or_insert(len);
            String::new()
          }
        })
        .into();

      if let Some(len) = invalid_hash_len {
        let message = if (MIN_HASH_LEN..=MAX_HASH_LEN).contains(&len) {
          format!("Too many chunks for a {len} character [hash] in {:?}", template.template())
        } else {
          format!(
            "Hash length {len} in {:?} is out of range {MIN_HASH_LEN}..={MAX_HASH_LEN}",
            template.template()
          )
        };
        return Err(anyhow::anyhow!(message).into());
      }

      if !used_filenames.insert(ArcStr::clone(&filename)) {
        return Err(
          anyhow::anyhow!(
            "Several chunks would be written to {filename}. Add [name] or [hash] to {:?}",
            template.template()
          )
          .into(),
        );
      }
      chunk.name = Some(name);
      chunk.filename = Some(filename);
      chunk.hash_placeholders = hash_placeholders;
    }

    Ok(())
  }
}

use std::collections::VecDeque;

use hyperpack_common::{Module, ModuleIdx};
use oxc_index::{IndexVec, index_vec};

use crate::types::IndexModules;

/// A module has side effects when its own top-level code does or when anything it
/// statically imports does. External modules are assumed to have side effects,
/// WebAssembly modules are not.
pub fn determine_side_effects(modules: &IndexModules) -> IndexVec<ModuleIdx, bool> {
  let mut importers: IndexVec<ModuleIdx, Vec<ModuleIdx>> = index_vec![vec![]; modules.len()];
  for module in modules {
    for record in module.import_records().iter().filter(|rec| rec.kind.is_static()) {
      importers[record.resolved_module()].push(module.idx());
    }
  }

  let mut side_effects = modules
    .iter()
    .map(|module| match module {
      Module::Normal(module) => module.meta.has_side_effects(),
      Module::External(_) => true,
      Module::Wasm(_) => false,
    })
    .collect::<IndexVec<ModuleIdx, _>>();

  let mut queue = side_effects
    .iter_enumerated()
    .filter_map(|(idx, has_side_effects)| has_side_effects.then_some(idx))
    .collect::<VecDeque<_>>();
  while let Some(idx) = queue.pop_front() {
    for importer in &importers[idx] {
      if !side_effects[*importer] {
        side_effects[*importer] = true;
        queue.push_back(*importer);
      }
    }
  }

  side_effects
}

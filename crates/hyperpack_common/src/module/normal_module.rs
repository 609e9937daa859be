use std::ops::{Deref, DerefMut};

use hyperpack_utils::rstr::Rstr;
use rustc_hash::FxHashSet;

use oxc_index::IndexVec;

use crate::{EcmaView, ImportRecordIdx, Module, ModuleId, ModuleIdx};

#[derive(Debug, Clone)]
pub struct NormalModule {
  pub idx: ModuleIdx,
  pub is_user_defined_entry: bool,
  pub id: ModuleId,
  /// `stable_id` is calculated based on `id` to be stable across machine and os.
  pub stable_id: String,
  pub repr_name: String,
  pub ecma_view: EcmaView,
}

impl NormalModule {
  pub fn star_export_records(&self) -> impl Iterator<Item = (ImportRecordIdx, ModuleIdx)> + '_ {
    self
      .ecma_view
      .import_records
      .iter_enumerated()
      .filter(|(_, rec)| rec.is_export_star())
      .map(|(rec_id, rec)| (rec_id, rec.resolved_module()))
  }

  // https://tc39.es/ecma262/#sec-getexportednames
  pub fn get_exported_names<'modules>(
    &'modules self,
    export_star_set: &mut FxHashSet<ModuleIdx>,
    modules: &'modules IndexVec<ModuleIdx, Module>,
    include_default: bool,
    ret: &mut Vec<&'modules Rstr>,
  ) {
    if !export_star_set.insert(self.idx) {
      return;
    }

    for name in self.ecma_view.named_exports.keys() {
      if (include_default || name.as_str() != "default") && !ret.contains(&name) {
        ret.push(name);
      }
    }

    for (_, importee) in self.star_export_records() {
      match &modules[importee] {
        Module::Normal(module) => {
          module.get_exported_names(export_star_set, modules, false, ret);
        }
        Module::Wasm(module) => {
          for name in &module.exports {
            if name.as_str() != "default" && !ret.contains(&name) {
              ret.push(name);
            }
          }
        }
        Module::External(_) => {}
      }
    }
  }

  /// All names this module provides, `export *` included, in discovery order.
  pub fn exported_names<'modules>(
    &'modules self,
    modules: &'modules IndexVec<ModuleIdx, Module>,
  ) -> Vec<&'modules Rstr> {
    let mut ret = vec![];
    self.get_exported_names(&mut FxHashSet::default(), modules, true, &mut ret);
    ret
  }

  pub fn is_included(&self) -> bool {
    self.ecma_view.meta.is_included()
  }
}

impl Deref for NormalModule {
  type Target = EcmaView;

  fn deref(&self) -> &Self::Target {
    &self.ecma_view
  }
}

impl DerefMut for NormalModule {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.ecma_view
  }
}

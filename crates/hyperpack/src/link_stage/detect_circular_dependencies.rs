use std::iter;

use hyperpack_common::ModuleIdx;
use hyperpack_utils::indexmap::FxIndexSet;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use super::LinkStage;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Status {
  ToBeExecuted(ModuleIdx),
  WaitForExit(ModuleIdx),
}

impl LinkStage<'_> {
  /// Walks static imports in execution order from the entries and reports every cycle it
  /// closes. Cycles are valid, so they only produce warnings.
  pub(crate) fn detect_circular_dependencies(&mut self) {
    let mut execution_stack = self
      .entry_points
      .iter()
      .rev()
      .map(|entry| Status::ToBeExecuted(entry.idx))
      .collect::<Vec<_>>();

    let mut executed_ids = FxHashSet::default();
    let mut stack_indexes_of_executing_id = FxHashMap::default();
    let mut circular_dependencies = FxIndexSet::default();

    while let Some(status) = execution_stack.pop() {
      match status {
        Status::ToBeExecuted(id) => {
          if executed_ids.contains(&id) {
            if let Some(index) = stack_indexes_of_executing_id.get(&id).copied() {
              // Only modules with `Status::WaitForExit` are on the execution chain
              let cycle = execution_stack[index..]
                .iter()
                .filter_map(|action| match action {
                  Status::ToBeExecuted(_) => None,
                  Status::WaitForExit(id) => Some(*id),
                })
                .chain(iter::once(id))
                .collect::<Box<[_]>>();
              circular_dependencies.insert(cycle);
            }
          } else {
            executed_ids.insert(id);
            execution_stack.push(Status::WaitForExit(id));
            stack_indexes_of_executing_id.insert(id, execution_stack.len() - 1);

            execution_stack.extend(
              self.modules[id]
                .import_records()
                .iter()
                .filter(|rec| rec.kind.is_static())
                .map(|rec| rec.resolved_module())
                .rev()
                .map(Status::ToBeExecuted),
            );
          }
        }
        Status::WaitForExit(id) => {
          stack_indexes_of_executing_id.remove(&id);
        }
      }
    }

    for cycle in circular_dependencies {
      let message = cycle.iter().map(|id| self.modules[*id].stable_id()).join(" -> ");
      tracing::warn!(cycle = %message, "circular dependency");
      self.warnings.push(anyhow::anyhow!("Circular dependency: {message}."));
    }
  }
}

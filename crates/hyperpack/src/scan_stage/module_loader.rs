use std::sync::Arc;

use arcstr::ArcStr;
use hyperpack_common::{
  EntryPoint, EntryPointKind, Module, ModuleIdx, ModuleLoaderMsg, NormalModuleTaskResult,
  ResolvedId, SharedWasmProvider,
};
use hyperpack_error::{BuildDiagnostic, BuildResult, GraphError, ImportChain};
use hyperpack_fs::SharedFileSystem;
use oxc_index::{IndexVec, index_vec};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use super::{module_task::ModuleTask, task_context::TaskContext};
use crate::types::{IndexModules, SharedOptions, SharedPluginDriver, SharedResolver};

pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  ctx: Arc<TaskContext>,
  modules: IndexVec<ModuleIdx, Option<Module>>,
}

#[derive(Debug)]
pub struct ModuleLoaderOutput {
  /// Indexed in first-discovery order: breadth first from the entries, import records in
  /// source order.
  pub modules: IndexModules,
  /// User-defined entries only. Dynamic entries depend on tree-shaking.
  pub entry_points: Vec<EntryPoint>,
  pub warnings: Vec<anyhow::Error>,
}

impl ModuleLoader {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    plugin_driver: SharedPluginDriver,
    wasm_provider: Option<SharedWasmProvider>,
    cancel: &CancellationToken,
  ) -> Self {
    // 1024 should be enough for most cases
    // over 1024 pending tasks are insane
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    let ctx = Arc::new(TaskContext::new(
      fs,
      options,
      resolver,
      plugin_driver,
      wasm_provider,
      tx,
      cancel.child_token(),
    ));

    Self { rx, remaining: 0, ctx, modules: IndexVec::new() }
  }

  fn store_module(&mut self, module: Module) {
    let idx = module.idx();
    if self.modules.len() <= idx.index() {
      self.modules.resize_with(idx.index() + 1, || None);
    }
    self.modules[idx] = Some(module);
  }

  pub async fn fetch_all_modules(
    mut self,
    user_defined_entries: Vec<(Option<ArcStr>, ResolvedId)>,
  ) -> BuildResult<ModuleLoaderOutput> {
    let mut warnings: Vec<anyhow::Error> = vec![];
    let mut entry_points: Vec<EntryPoint> = Vec::with_capacity(user_defined_entries.len());

    for (name, resolved_id) in user_defined_entries {
      let (idx, is_new) = self.ctx.claim(&resolved_id.id);
      if is_new {
        self.remaining += 1;
        let task = ModuleTask::new(Arc::clone(&self.ctx), idx, resolved_id, true, ImportChain::default());
        tokio::spawn(task.run());
      }

      if entry_points.iter().any(|entry| entry.idx == idx) {
        warnings.push(anyhow::anyhow!(
          "Entry {} points to the same module as an earlier entry and is ignored",
          name.as_deref().unwrap_or("<unnamed>")
        ));
        continue;
      }
      entry_points.push(EntryPoint { idx, name, kind: EntryPointKind::UserDefined });
    }

    while self.remaining > 0 {
      let msg = tokio::select! {
        () = self.ctx.cancel.cancelled() => return Err(BuildDiagnostic::Cancelled.into()),
        msg = self.rx.recv() => msg,
      };
      let Some(msg) = msg else {
        break;
      };

      match msg {
        ModuleLoaderMsg::NormalModuleDone(task_result) => {
          let NormalModuleTaskResult { module, externals, spawned, warnings: task_warnings } =
            task_result;
          warnings.extend(task_warnings);
          self.store_module(module);
          for external in externals {
            self.store_module(external);
          }
          self.remaining += spawned;
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildErrors(errors) => {
          // Stops tasks that are still in flight. Nothing partial leaves the loader.
          self.ctx.cancel.cancel();
          return Err(errors.into());
        }
      }
    }

    let claimed = self.ctx.claimed_count();
    let mut modules = IndexVec::with_capacity(claimed);
    for idx in 0..claimed {
      match self.modules.get_mut(ModuleIdx::new(idx)).and_then(Option::take) {
        Some(module) => {
          modules.push(module);
        }
        None => {
          return Err(
            GraphError {
              module: format!("#{idx}"),
              message: "module was claimed but never loaded".to_string(),
            }
            .into(),
          );
        }
      }
    }

    let modules = sort_by_discovery_order(modules, &mut entry_points)?;
    tracing::debug!(modules = modules.len(), "module graph loaded");

    Ok(ModuleLoaderOutput { modules, entry_points, warnings })
  }
}

/// Validates that every import record targets a loaded module and re-indexes the modules
/// breadth first from the entries, so indices don't depend on task scheduling.
fn sort_by_discovery_order(
  modules: IndexModules,
  entry_points: &mut [EntryPoint],
) -> BuildResult<IndexModules> {
  for module in &modules {
    if let Some(record) =
      module.import_records().iter().find(|record| record.resolved_module().index() >= modules.len())
    {
      return Err(
        GraphError {
          module: module.stable_id().to_string(),
          message: format!("import of {:?} targets a module that was never loaded", record.specifier),
        }
        .into(),
      );
    }
  }

  let mut seen = index_vec![false; modules.len()];
  let mut order: Vec<ModuleIdx> = Vec::with_capacity(modules.len());
  for entry in entry_points.iter() {
    if !seen[entry.idx] {
      seen[entry.idx] = true;
      order.push(entry.idx);
    }
  }
  let mut cursor = 0;
  while let Some(&idx) = order.get(cursor) {
    cursor += 1;
    for record in modules[idx].import_records() {
      let target = record.resolved_module();
      if !seen[target] {
        seen[target] = true;
        order.push(target);
      }
    }
  }

  if let Some((idx, _)) = seen.iter_enumerated().find(|(_, seen)| !**seen) {
    return Err(
      GraphError {
        module: modules[idx].stable_id().to_string(),
        message: "module is not reachable from any entry".to_string(),
      }
      .into(),
    );
  }

  let mut new_indices = index_vec![ModuleIdx::new(0); modules.len()];
  for (new_idx, old_idx) in order.iter().enumerate() {
    new_indices[*old_idx] = ModuleIdx::new(new_idx);
  }

  let mut slots = modules.into_iter().map(Some).collect::<IndexVec<ModuleIdx, _>>();
  let mut sorted = IndexVec::with_capacity(order.len());
  for old_idx in order {
    let Some(mut module) = slots[old_idx].take() else {
      continue;
    };
    module.set_idx(new_indices[old_idx]);
    if let Some(records) = module.import_records_mut() {
      for record in records.iter_mut() {
        record.state = new_indices[record.state];
      }
    }
    sorted.push(module);
  }

  for entry in entry_points {
    entry.idx = new_indices[entry.idx];
  }

  Ok(sorted)
}

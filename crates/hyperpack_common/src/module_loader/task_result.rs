use crate::Module;

pub struct NormalModuleTaskResult {
  pub module: Module,
  /// External modules first claimed by this task.
  pub externals: Vec<Module>,
  /// Tasks spawned for newly claimed dependencies. They start after this result is sent.
  pub spawned: u32,
  pub warnings: Vec<anyhow::Error>,
}

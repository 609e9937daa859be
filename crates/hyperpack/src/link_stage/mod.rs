pub mod tree_shaking;

mod determine_side_effects;
mod detect_circular_dependencies;

use hyperpack_common::EntryPoint;
use hyperpack_error::{BuildResult, GraphError};

use crate::{
  scan_stage::ScanStageOutput,
  types::{IndexModules, SharedOptions},
};

#[derive(Debug)]
pub struct LinkStageOutput {
  pub modules: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub warnings: Vec<anyhow::Error>,
}

#[derive(Debug)]
pub struct LinkStage<'a> {
  pub modules: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub warnings: Vec<anyhow::Error>,
  pub options: &'a SharedOptions,
}

impl<'a> LinkStage<'a> {
  pub fn new(scan_stage_output: ScanStageOutput, options: &'a SharedOptions) -> Self {
    let ScanStageOutput { modules, entry_points, warnings } = scan_stage_output;
    Self { modules, entry_points, warnings, options }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn link(mut self) -> BuildResult<LinkStageOutput> {
    self.detect_circular_dependencies();
    self.check_retained_exports();
    self.include_statements();
    self.validate_usage()?;

    Ok(LinkStageOutput {
      modules: self.modules,
      entry_points: self.entry_points,
      warnings: self.warnings,
    })
  }

  fn include_statements(&mut self) {
    let marks = tree_shaking::compute_usage_marks(&self.modules, &self.entry_points, self.options);
    tree_shaking::apply_usage_marks(&mut self.modules, &marks);
    tracing::debug!(
      included = self.modules.iter().filter(|module| module.is_included()).count(),
      total = self.modules.len(),
      "tree-shaking finished"
    );
  }

  fn check_retained_exports(&mut self) {
    for (module_path, names) in &self.options.retain_exports {
      let Some(module) = self.modules.iter().find(|module| module.stable_id() == module_path)
      else {
        self.warnings.push(anyhow::anyhow!(
          "retainExports: {module_path} is not part of the module graph"
        ));
        continue;
      };
      if let Some(module) = module.as_normal() {
        let exported = module.exported_names(&self.modules);
        for name in names.iter().filter(|name| !exported.iter().any(|e| e.as_str() == *name)) {
          self.warnings.push(anyhow::anyhow!("retainExports: {module_path} has no export {name:?}"));
        }
      }
    }
  }

  /// Every live import of an included module must point at an included module.
  fn validate_usage(&self) -> BuildResult<()> {
    for module in self.modules.iter().filter(|module| module.is_included()) {
      for record in module.import_records().iter().filter(|rec| rec.is_live()) {
        let target = &self.modules[record.resolved_module()];
        if !target.is_included() {
          return Err(
            GraphError {
              module: module.stable_id().to_string(),
              message: format!(
                "live import of {:?} points at {}, which was eliminated",
                record.specifier,
                target.stable_id()
              ),
            }
            .into(),
          );
        }
      }
    }
    Ok(())
  }
}

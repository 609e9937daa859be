pub mod task_result;

use hyperpack_error::BuildDiagnostic;
use task_result::NormalModuleTaskResult;

pub enum ModuleLoaderMsg {
  NormalModuleDone(NormalModuleTaskResult),
  BuildErrors(Vec<BuildDiagnostic>),
}

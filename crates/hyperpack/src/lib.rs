mod bundler;
mod generate_stage;
mod graph;
mod link_stage;
mod scan_stage;
#[cfg(test)]
mod test_utils;
mod types;
mod utils;

pub use crate::{
  bundler::Bundler,
  link_stage::tree_shaking::{ModuleUsage, UsageMarks, apply_usage_marks, compute_usage_marks},
  types::{bundle_output::BundleOutput, build_context::BuildContext},
  utils::tracing::enable_tracing_on_demand,
};
pub use hyperpack_common::*;
pub use hyperpack_error::{
  BuildDiagnostic, BuildError, BuildResult, EmitError, GraphError, ImportChain, ParseError,
  ResolutionError, ResolutionErrorKind,
};
pub use hyperpack_fs::{FileSystem, MemoryFileSystem, OsFileSystem, SharedFileSystem};
pub use hyperpack_plugin::{
  HookLoadArgs, HookOutcome, HookResolveArgs, HookResult, HookTransformArgs, Plugin,
  RenderedChunk, ResolveOverride, SharedPlugin,
};
pub use tokio_util::sync::CancellationToken;

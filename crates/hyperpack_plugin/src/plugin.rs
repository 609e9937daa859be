use std::{borrow::Cow, fmt::Debug, sync::Arc};

use crate::{
  HookLoadArgs, HookOutcome, HookResolveArgs, HookResult, HookTransformArgs, RenderedChunk,
  ResolveOverride,
};

/// A build observer. Every hook defaults to `Passthrough`.
pub trait Plugin: Send + Sync {
  fn name(&self) -> Cow<'static, str>;

  fn on_resolve(&self, _args: &HookResolveArgs<'_>) -> HookResult<ResolveOverride> {
    Ok(HookOutcome::Passthrough)
  }

  fn on_load(&self, _args: &HookLoadArgs<'_>) -> HookResult<String> {
    Ok(HookOutcome::Passthrough)
  }

  fn on_transform(&self, _args: &mut HookTransformArgs<'_, '_>) -> HookResult<()> {
    Ok(HookOutcome::Passthrough)
  }

  fn on_chunk_emit(&self, _chunk: &RenderedChunk<'_>) -> HookResult<String> {
    Ok(HookOutcome::Passthrough)
  }
}

impl Debug for dyn Plugin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Plugin").field(&self.name()).finish()
  }
}

pub type SharedPlugin = Arc<dyn Plugin>;

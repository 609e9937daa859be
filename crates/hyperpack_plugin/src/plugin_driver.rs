use anyhow::Context;

use crate::{
  HookLoadArgs, HookOutcome, HookResolveArgs, HookResult, HookTransformArgs, RenderedChunk,
  ResolveOverride, SharedPlugin,
};

/// Runs hooks in registration order and stops at the first override.
#[derive(Debug, Default)]
pub struct PluginDriver {
  plugins: Vec<SharedPlugin>,
}

impl PluginDriver {
  pub fn new(plugins: Vec<SharedPlugin>) -> Self {
    Self { plugins }
  }

  pub fn is_empty(&self) -> bool {
    self.plugins.is_empty()
  }

  pub fn resolve(&self, args: &HookResolveArgs<'_>) -> HookResult<ResolveOverride> {
    for plugin in &self.plugins {
      let outcome = plugin
        .on_resolve(args)
        .with_context(|| format!("Plugin {} failed in on_resolve", plugin.name()))?;
      if outcome.is_override() {
        tracing::debug!(plugin = %plugin.name(), specifier = args.specifier, kind = %args.kind, "resolve overridden");
        return Ok(outcome);
      }
    }
    Ok(HookOutcome::Passthrough)
  }

  pub fn load(&self, args: &HookLoadArgs<'_>) -> HookResult<String> {
    for plugin in &self.plugins {
      let outcome = plugin
        .on_load(args)
        .with_context(|| format!("Plugin {} failed in on_load", plugin.name()))?;
      if outcome.is_override() {
        tracing::debug!(plugin = %plugin.name(), id = args.id, "load overridden");
        return Ok(outcome);
      }
    }
    Ok(HookOutcome::Passthrough)
  }

  pub fn transform(&self, args: &mut HookTransformArgs<'_, '_>) -> HookResult<()> {
    for plugin in &self.plugins {
      let outcome = plugin
        .on_transform(args)
        .with_context(|| format!("Plugin {} failed in on_transform", plugin.name()))?;
      if outcome.is_override() {
        tracing::debug!(plugin = %plugin.name(), id = args.id, "ast transformed");
        return Ok(outcome);
      }
    }
    Ok(HookOutcome::Passthrough)
  }

  pub fn chunk_emit(&self, chunk: &RenderedChunk<'_>) -> HookResult<String> {
    for plugin in &self.plugins {
      let outcome = plugin
        .on_chunk_emit(chunk)
        .with_context(|| format!("Plugin {} failed in on_chunk_emit", plugin.name()))?;
      if outcome.is_override() {
        return Ok(outcome);
      }
    }
    Ok(HookOutcome::Passthrough)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    borrow::Cow,
    sync::{
      Arc,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use crate::Plugin;

  use super::*;

  struct Virtual {
    calls: AtomicUsize,
  }

  impl Plugin for Virtual {
    fn name(&self) -> Cow<'static, str> {
      Cow::Borrowed("virtual")
    }

    fn on_load(&self, args: &HookLoadArgs<'_>) -> HookResult<String> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if args.id.ends_with("virtual.js") {
        Ok(HookOutcome::Override("export const v = 1;".to_string()))
      } else {
        Ok(HookOutcome::Passthrough)
      }
    }
  }

  struct Never;

  impl Plugin for Never {
    fn name(&self) -> Cow<'static, str> {
      Cow::Borrowed("never")
    }

    fn on_load(&self, _args: &HookLoadArgs<'_>) -> HookResult<String> {
      anyhow::bail!("should not be reached")
    }
  }

  #[test]
  fn first_override_short_circuits() {
    let first = Arc::new(Virtual { calls: AtomicUsize::new(0) });
    let driver = PluginDriver::new(vec![Arc::clone(&first) as SharedPlugin, Arc::new(Never)]);

    let outcome = driver.load(&HookLoadArgs { id: "/project/virtual.js" }).unwrap();
    assert_eq!(outcome, HookOutcome::Override("export const v = 1;".to_string()));
    assert_eq!(first.calls.load(Ordering::SeqCst), 1);

    let err = driver.load(&HookLoadArgs { id: "/project/real.js" }).unwrap_err();
    assert_eq!(err.to_string(), "Plugin never failed in on_load");
  }

  #[test]
  fn empty_driver_passes_through() {
    let driver = PluginDriver::default();
    let args = HookResolveArgs {
      specifier: "./a",
      importer: None,
      kind: hyperpack_common::ImportKind::Import,
    };
    assert_eq!(driver.resolve(&args).unwrap(), HookOutcome::Passthrough);
  }
}

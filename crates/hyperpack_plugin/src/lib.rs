mod plugin;
mod plugin_driver;
mod types;

pub use crate::{
  plugin::{Plugin, SharedPlugin},
  plugin_driver::PluginDriver,
  types::{
    HookLoadArgs, HookOutcome, HookResolveArgs, HookResult, HookTransformArgs, RenderedChunk,
    ResolveOverride,
  },
};

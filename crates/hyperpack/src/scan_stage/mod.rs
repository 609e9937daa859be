pub mod ast_scanner;
pub mod module_loader;

mod module_task;
mod task_context;

use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use hyperpack_common::{ImportKind, ResolvedId, ResolvedKind, SharedWasmProvider};
use hyperpack_error::{BuildDiagnostic, BuildResult, ImportChain, ResolutionError};
use hyperpack_fs::SharedFileSystem;
use hyperpack_plugin::{HookOutcome, HookResolveArgs};
use module_loader::{ModuleLoader, ModuleLoaderOutput};

use crate::types::{SharedOptions, SharedPluginDriver, SharedResolver, build_context::BuildContext};

pub type ScanStageOutput = ModuleLoaderOutput;

pub struct ScanStage<'a> {
  fs: SharedFileSystem,
  options: SharedOptions,
  resolver: SharedResolver,
  plugin_driver: SharedPluginDriver,
  wasm_provider: Option<SharedWasmProvider>,
  ctx: &'a BuildContext,
}

impl<'a> ScanStage<'a> {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    plugin_driver: SharedPluginDriver,
    wasm_provider: Option<SharedWasmProvider>,
    ctx: &'a BuildContext,
  ) -> Self {
    Self { fs, options, resolver, plugin_driver, wasm_provider, ctx }
  }

  #[tracing::instrument(level = "debug", skip_all, fields(generation = self.ctx.generation))]
  pub async fn scan(&self) -> BuildResult<ScanStageOutput> {
    if self.options.input.is_empty() {
      return Err(anyhow::anyhow!("You must supply at least one entry point").into());
    }

    let mut user_defined_entries = Vec::with_capacity(self.options.input.len());
    let mut errors = vec![];
    for input_item in &self.options.input {
      match self.resolve_entry(&input_item.import) {
        Ok(resolved_id) => {
          user_defined_entries.push((input_item.name.as_deref().map(ArcStr::from), resolved_id));
        }
        Err(err) => errors.push(err),
      }
    }
    if !errors.is_empty() {
      return Err(errors.into());
    }

    let module_loader = ModuleLoader::new(
      Arc::clone(&self.fs),
      Arc::clone(&self.options),
      Arc::clone(&self.resolver),
      Arc::clone(&self.plugin_driver),
      self.wasm_provider.clone(),
      &self.ctx.cancel,
    );
    module_loader.fetch_all_modules(user_defined_entries).await
  }

  fn resolve_entry(&self, specifier: &str) -> Result<ResolvedId, BuildDiagnostic> {
    let args = HookResolveArgs { specifier, importer: None, kind: ImportKind::Import };
    let resolved_id = match self.plugin_driver.resolve(&args)? {
      HookOutcome::Override(ret) if ret.external => ResolvedId::external(ret.id),
      HookOutcome::Override(ret) => ResolvedId::normal(ret.id),
      HookOutcome::Passthrough => {
        self.resolver.resolve(None, specifier, true).map_err(|kind| ResolutionError {
          kind,
          specifier: specifier.to_string(),
          importer: None,
          chain: ImportChain::default(),
        })?
      }
    };

    match resolved_id.kind {
      ResolvedKind::Normal => Ok(resolved_id),
      ResolvedKind::External | ResolvedKind::Wasm => Err(BuildDiagnostic::Other(anyhow::anyhow!(
        "Failed to resolve {:?} - entry can't be external",
        resolved_id.debug_id(Path::new(&self.options.cwd))
      ))),
    }
  }
}

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context;
use hyperpack_common::{BundlerOptions, NormalizedBundlerOptions, SharedWasmProvider};
use hyperpack_error::BuildResult;
use hyperpack_fs::{OsFileSystem, SharedFileSystem};
use hyperpack_plugin::{PluginDriver, SharedPlugin};
use hyperpack_resolver::{ResolveOptions, Resolver};
use tokio_util::sync::CancellationToken;

use crate::{
  generate_stage::GenerateStage,
  link_stage::LinkStage,
  scan_stage::ScanStage,
  types::{
    SharedOptions, SharedPluginDriver, SharedResolver, build_context::BuildContext,
    bundle_output::BundleOutput,
  },
  utils::{normalize_options::normalize_options, tracing::enable_tracing_on_demand},
};

pub struct Bundler {
  options: SharedOptions,
  fs: SharedFileSystem,
  plugin_driver: SharedPluginDriver,
  wasm_provider: Option<SharedWasmProvider>,
  /// Number of builds started so far.
  generation: u64,
  /// Token of the next build.
  cancel: CancellationToken,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> Self {
    enable_tracing_on_demand();
    Self {
      options: Arc::new(normalize_options(options)),
      fs: Arc::new(OsFileSystem),
      plugin_driver: Arc::new(PluginDriver::default()),
      wasm_provider: None,
      generation: 0,
      cancel: CancellationToken::new(),
    }
  }

  /// Hooks run in the given order.
  #[must_use]
  pub fn with_plugins(mut self, plugins: Vec<SharedPlugin>) -> Self {
    self.plugin_driver = Arc::new(PluginDriver::new(plugins));
    self
  }

  #[must_use]
  pub fn with_file_system(mut self, fs: SharedFileSystem) -> Self {
    self.fs = fs;
    self
  }

  #[must_use]
  pub fn with_wasm_provider(mut self, provider: SharedWasmProvider) -> Self {
    self.wasm_provider = Some(provider);
    self
  }

  /// Takes effect from the next build. Resolution results of earlier builds are not reused.
  pub fn set_options(&mut self, options: BundlerOptions) {
    self.options = Arc::new(normalize_options(options));
  }

  pub fn options(&self) -> &NormalizedBundlerOptions {
    &self.options
  }

  /// Cancelling the returned token aborts the next build, or the one in progress.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  fn next_context(&mut self) -> BuildContext {
    self.generation += 1;
    BuildContext::new(self.generation, std::mem::replace(&mut self.cancel, CancellationToken::new()))
  }

  /// Runs a build and keeps the assets in memory.
  pub async fn generate(&mut self) -> BuildResult<BundleOutput> {
    let ctx = self.next_context();
    self.build(&ctx).await
  }

  /// Runs a build and writes the assets into `dir`. Nothing is written unless the whole
  /// build succeeded. Assets are staged next to their final path and renamed once all of
  /// them were written, so a failed or cancelled write leaves the previous output in place.
  pub async fn write(&mut self) -> BuildResult<BundleOutput> {
    let ctx = self.next_context();
    let output = self.build(&ctx).await?;
    ctx.check_cancelled()?;

    let out_dir = self.options.out_dir();
    let mut staged = Vec::with_capacity(output.assets.len());
    if let Err(err) = self.stage_assets(&ctx, &out_dir, &output, &mut staged) {
      for (staging, _) in &staged {
        if let Err(remove_err) = self.fs.remove_file(staging) {
          tracing::debug!(path = %staging.display(), %remove_err, "staged asset not removed");
        }
      }
      return Err(err);
    }

    for (staging, path) in &staged {
      self
        .fs
        .rename(staging, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    tracing::debug!(generation = ctx.generation, assets = output.assets.len(), "assets written");
    Ok(output)
  }

  /// Writes every asset to its staging path. `staged` receives `(staging, final)` pairs,
  /// including the one being written when an error occurs.
  fn stage_assets(
    &self,
    ctx: &BuildContext,
    out_dir: &Path,
    output: &BundleOutput,
    staged: &mut Vec<(PathBuf, PathBuf)>,
  ) -> BuildResult<()> {
    for asset in &output.assets {
      ctx.check_cancelled()?;
      let path = out_dir.join(asset.filename());
      if let Some(parent) = path.parent() {
        self
          .fs
          .create_dir_all(parent)
          .with_context(|| format!("Failed to create directory {}", parent.display()))?;
      }
      let staging = staging_path(&path);
      staged.push((staging.clone(), path));
      self
        .fs
        .write(&staging, asset.content_as_bytes())
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    }
    Ok(())
  }

  #[tracing::instrument(level = "debug", skip_all, fields(generation = ctx.generation))]
  async fn build(&self, ctx: &BuildContext) -> BuildResult<BundleOutput> {
    ctx.check_cancelled()?;

    let resolver: SharedResolver =
      Arc::new(Resolver::new(ResolveOptions::from(&*self.options), Arc::clone(&self.fs)));
    let scan_stage_output = ScanStage::new(
      Arc::clone(&self.fs),
      Arc::clone(&self.options),
      resolver,
      Arc::clone(&self.plugin_driver),
      self.wasm_provider.clone(),
      ctx,
    )
    .scan()
    .await?;
    ctx.check_cancelled()?;

    let mut link_stage_output = LinkStage::new(scan_stage_output, &self.options).link()?;
    ctx.check_cancelled()?;

    let output =
      GenerateStage::new(&mut link_stage_output, &self.options, &self.plugin_driver).generate().await?;
    ctx.check_cancelled()?;

    tracing::debug!(assets = output.assets.len(), warnings = output.warnings.len(), "build finished");
    Ok(output)
  }
}

fn staging_path(path: &Path) -> PathBuf {
  let mut staging = path.as_os_str().to_os_string();
  staging.push(".staging");
  PathBuf::from(staging)
}

mod code_splitting;
mod compute_cross_chunk_links;
mod generate_chunk_filenames;
mod manifest;
mod render_chunk_to_assets;
mod render_module;
mod runtime;

use hyperpack_error::BuildResult;

use crate::{
  link_stage::LinkStageOutput,
  types::{SharedOptions, SharedPluginDriver, bundle_output::BundleOutput},
};

pub struct GenerateStage<'a> {
  link_output: &'a mut LinkStageOutput,
  options: &'a SharedOptions,
  plugin_driver: &'a SharedPluginDriver,
}

impl<'a> GenerateStage<'a> {
  pub fn new(
    link_output: &'a mut LinkStageOutput,
    options: &'a SharedOptions,
    plugin_driver: &'a SharedPluginDriver,
  ) -> Self {
    Self { link_output, options, plugin_driver }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub async fn generate(&mut self) -> BuildResult<BundleOutput> {
    let mut chunk_graph = self.generate_chunks()?;
    self.compute_cross_chunk_links(&mut chunk_graph)?;
    self.generate_chunk_filenames(&mut chunk_graph)?;

    let mut output = self.render_chunk_to_assets(&mut chunk_graph).await?;
    let mut warnings = std::mem::take(&mut self.link_output.warnings);
    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    Ok(output)
  }
}

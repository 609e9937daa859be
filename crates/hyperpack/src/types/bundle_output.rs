use hyperpack_common::{Manifest, OutputAsset};

#[derive(Debug, Default)]
pub struct BundleOutput {
  /// Chunks in planning order, followed by `manifest.json`.
  pub assets: Vec<OutputAsset>,
  pub manifest: Manifest,
  pub warnings: Vec<anyhow::Error>,
}

impl BundleOutput {
  pub fn asset(&self, filename: &str) -> Option<&OutputAsset> {
    self.assets.iter().find(|asset| asset.filename == filename)
  }
}

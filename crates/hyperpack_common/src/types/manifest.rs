use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Written next to the chunks as `manifest.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  /// Entry name to the file of its chunk.
  pub entries: BTreeMap<String, String>,
  pub chunks: Vec<ManifestChunk>,
  /// Importer slot to specifier to target slot.
  pub registry: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestChunkKind {
  Entry,
  DynamicEntry,
  Common,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChunk {
  pub file: String,
  pub name: String,
  pub kind: ManifestChunkKind,
  /// Slots of the modules in the chunk, in execution order.
  pub modules: Vec<String>,
  pub imports: Vec<String>,
  pub dynamic_imports: Vec<String>,
}

impl Manifest {
  pub fn to_json(&self) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

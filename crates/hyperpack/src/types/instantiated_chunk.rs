use hyperpack_sourcemap::SourceMap;

/// A rendered chunk. Its filename and content may still hold hash placeholders.
#[derive(Debug)]
pub struct InstantiatedChunk {
  pub preliminary_filename: String,
  pub content: String,
  pub map: Option<SourceMap>,
}

use std::{fmt::Display, sync::Arc};

/// Stable ids of the modules leading from an entry point to the failing module, entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportChain(Arc<[String]>);

impl ImportChain {
  /// Returns a new chain with `id` appended.
  pub fn extend(&self, id: &str) -> Self {
    let mut ids = self.0.to_vec();
    ids.push(id.to_string());
    Self(ids.into())
  }

  pub fn ids(&self) -> &[String] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl Display for ImportChain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.0.is_empty() {
      return Ok(());
    }
    write!(f, "\n  import chain: {}", self.0.join(" -> "))
  }
}

#[test]
fn test_import_chain_display() {
  let chain = ImportChain::default().extend("src/main.js").extend("src/a.js");
  assert_eq!(chain.to_string(), "\n  import chain: src/main.js -> src/a.js");
  assert_eq!(ImportChain::default().to_string(), "");
}

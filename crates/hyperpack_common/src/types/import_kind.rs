use std::fmt::Display;

/// How an import record enters the graph. Only static edges take part in execution order
/// and cycle detection.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ImportKind {
  /// `import foo from 'foo'`, `export { foo } from 'foo'`, `export * from 'foo'`
  Import,
  /// `import('foo')`, loaded through the runtime when the importing statement runs.
  DynamicImport,
}

impl ImportKind {
  pub fn is_static(self) -> bool {
    self == Self::Import
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Import => "static",
      Self::DynamicImport => "dynamic",
    }
  }
}

impl Display for ImportKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

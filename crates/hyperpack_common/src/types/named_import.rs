use std::fmt::Display;

use hyperpack_utils::rstr::Rstr;
use oxc::span::Span;

use crate::ImportRecordIdx;

/// What a binding takes from the module it imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specifier {
  /// `import * as ns`, `export * as ns from`
  Star,
  Literal(Rstr),
}

impl Display for Specifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Star => f.write_str("*"),
      Self::Literal(name) => f.write_str(name),
    }
  }
}

/// `import { imported as local } from '...'`. Keyed by the local name in `EcmaView::named_imports`.
#[derive(Debug, Clone)]
pub struct NamedImport {
  pub imported: Specifier,
  pub record_id: ImportRecordIdx,
  pub span: Span,
}

use std::fmt::Debug;

use hyperpack_utils::rstr::Rstr;
use oxc::span::Span;

use crate::{ImportKind, ModuleIdx, StmtInfoIdx};

pub type RawImportRecord = ImportRecord<()>;
pub type ResolvedImportRecord = ImportRecord<ModuleIdx>;

bitflags::bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct ImportRecordMeta: u8 {
    /// `import {} from '...'` or `import '...'`
    const IS_PLAIN_IMPORT = 1;
    /// `export * from 'mod'` only
    const IS_EXPORT_STAR = 1 << 1;
    /// `export { a } from 'mod'` or `export * as ns from 'mod'`
    const IS_RE_EXPORT = 1 << 2;
    /// Set by the tree-shaker when the emitted module must `require` the target.
    const IS_LIVE = 1 << 3;
  }
}

#[derive(Debug, Clone)]
pub struct ImportRecord<State: Debug> {
  pub state: State,
  /// `./lib.js` in `import { foo } from './lib.js';`
  pub specifier: Rstr,
  pub kind: ImportKind,
  /// The whole `import(...)` expression for dynamic imports, the declaration otherwise.
  pub span: Span,
  pub meta: ImportRecordMeta,
  pub stmt_idx: StmtInfoIdx,
}

impl RawImportRecord {
  pub fn new(specifier: Rstr, kind: ImportKind, span: Span, stmt_idx: StmtInfoIdx) -> Self {
    Self { state: (), specifier, kind, span, meta: ImportRecordMeta::empty(), stmt_idx }
  }

  #[must_use]
  pub fn with_meta(mut self, meta: ImportRecordMeta) -> Self {
    self.meta = meta;
    self
  }

  pub fn into_resolved(self, resolved_module: ModuleIdx) -> ResolvedImportRecord {
    ResolvedImportRecord {
      state: resolved_module,
      specifier: self.specifier,
      kind: self.kind,
      span: self.span,
      meta: self.meta,
      stmt_idx: self.stmt_idx,
    }
  }
}

impl ResolvedImportRecord {
  pub fn resolved_module(&self) -> ModuleIdx {
    self.state
  }

  pub fn is_export_star(&self) -> bool {
    self.meta.contains(ImportRecordMeta::IS_EXPORT_STAR)
  }

  pub fn is_live(&self) -> bool {
    self.meta.contains(ImportRecordMeta::IS_LIVE)
  }
}

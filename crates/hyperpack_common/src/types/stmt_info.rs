use std::ops::{Deref, DerefMut};

use hyperpack_utils::rstr::Rstr;
use oxc::span::Span;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use crate::{ImportRecordIdx, StmtInfoIdx};

/// How the emitter edits a top-level statement before placing it in a module factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
  /// `import ... from '...'`, dropped.
  Import,
  /// `export ... from '...'`, dropped.
  ExportFrom,
  /// `export { a, b as c }`, dropped.
  ExportList,
  /// `export const a = 1`, the `export` keyword is dropped.
  ExportDeclaration { declaration_start: u32 },
  /// `export default function f() {}`. An anonymous declaration is bound to the default
  /// export local instead.
  ExportDefaultDeclaration { declaration_start: u32, anonymous: bool },
  /// `export default expr`, bound to the default export local.
  ExportDefaultExpression { expression_start: u32 },
  Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportRefKind {
  Plain,
  /// Callee of a call or a tagged template: `foo()`. Rewritten without a `this` binding.
  Callee,
  /// `{ foo }` object shorthand.
  Shorthand,
}

/// A reference to an import binding that the emitter rewrites to a registry access.
#[derive(Debug, Clone)]
pub struct ImportRef {
  pub span: Span,
  pub local: Rstr,
  pub kind: ImportRefKind,
}

#[derive(Debug, Clone, Copy)]
pub struct DynamicImportSite {
  pub record_id: ImportRecordIdx,
  /// The whole `import(...)` expression.
  pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StmtInfo {
  pub span: Span,
  pub kind: StmtKind,
  /// Top-level names this statement declares, in source order.
  pub declared_names: Vec<Rstr>,
  /// Top-level names this statement reads or writes, import bindings included.
  pub referenced_names: Vec<Rstr>,
  pub import_records: Vec<ImportRecordIdx>,
  pub import_refs: Vec<ImportRef>,
  pub dynamic_imports: Vec<DynamicImportSite>,
  pub side_effect: bool,
  pub is_included: bool,
}

impl StmtInfo {
  pub fn new(span: Span, kind: StmtKind) -> Self {
    Self {
      span,
      kind,
      declared_names: vec![],
      referenced_names: vec![],
      import_records: vec![],
      import_refs: vec![],
      dynamic_imports: vec![],
      side_effect: false,
      is_included: false,
    }
  }

  pub fn declare(&mut self, name: Rstr) {
    if !self.declared_names.contains(&name) {
      self.declared_names.push(name);
    }
  }

  pub fn reference(&mut self, name: Rstr) {
    if !self.referenced_names.contains(&name) {
      self.referenced_names.push(name);
    }
  }
}

#[derive(Debug, Default, Clone)]
pub struct StmtInfos {
  infos: IndexVec<StmtInfoIdx, StmtInfo>,
  declared_stmts_by_name: FxHashMap<Rstr, Vec<StmtInfoIdx>>,
}

impl StmtInfos {
  pub fn add_stmt_info(&mut self, info: StmtInfo) -> StmtInfoIdx {
    let id = self.infos.push(info);
    for name in &self.infos[id].declared_names {
      self.declared_stmts_by_name.entry(name.clone()).or_default().push(id);
    }
    id
  }

  pub fn declared_stmts_by_name(&self, name: &str) -> &[StmtInfoIdx] {
    self.declared_stmts_by_name.get(name).map_or(&[], Vec::as_slice)
  }

  pub fn declares(&self, name: &str) -> bool {
    self.declared_stmts_by_name.contains_key(name)
  }
}

impl Deref for StmtInfos {
  type Target = IndexVec<StmtInfoIdx, StmtInfo>;

  fn deref(&self) -> &Self::Target {
    &self.infos
  }
}

impl DerefMut for StmtInfos {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.infos
  }
}

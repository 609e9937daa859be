mod impl_visit;
pub mod side_effect_detector;

use hyperpack_common::{
  DEFAULT_EXPORT_LOCAL, EcmaViewMeta, ExportBinding, ImportKind, ImportRecordIdx,
  ImportRecordMeta, NamedImport, RawImportRecord, Specifier, StmtInfo, StmtInfoIdx, StmtInfos,
  StmtKind,
};
use hyperpack_utils::{indexmap::FxIndexMap, rstr::Rstr};
use oxc::{
  ast::ast::{
    BindingIdentifier, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportDeclarationSpecifier, Program, Statement,
  },
  ast_visit::Visit,
  semantic::{ScopeFlags, ScopeId, Scoping, SymbolId},
  span::{GetSpan, Span},
};
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub struct ScanResult {
  pub import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub named_imports: FxIndexMap<Rstr, NamedImport>,
  pub named_exports: FxIndexMap<Rstr, ExportBinding>,
  pub stmt_infos: StmtInfos,
  pub meta: EcmaViewMeta,
  pub warnings: Vec<anyhow::Error>,
}

/// Collects the import/export surface and per-statement facts of a module. Only top-level
/// bindings are tracked, by name, since names in the root scope are unique.
pub struct AstScanner<'me> {
  module_id: &'me str,
  scoping: &'me Scoping,
  root_scope_id: ScopeId,
  result: ScanResult,
  current_stmt_info: StmtInfo,
  current_stmt_idx: StmtInfoIdx,
  /// `export { a as b }` without a source, resolved once every import is known.
  export_list: Vec<(Rstr, Rstr)>,
  callee_spans: FxHashSet<Span>,
  shorthand_spans: FxHashSet<Span>,
}

impl<'me> AstScanner<'me> {
  pub fn new(module_id: &'me str, scoping: &'me Scoping) -> Self {
    Self {
      module_id,
      scoping,
      root_scope_id: scoping.root_scope_id(),
      result: ScanResult::default(),
      current_stmt_info: StmtInfo::new(Span::default(), StmtKind::Normal),
      current_stmt_idx: StmtInfoIdx::new(0),
      export_list: vec![],
      callee_spans: FxHashSet::default(),
      shorthand_spans: FxHashSet::default(),
    }
  }

  pub fn scan(mut self, program: &Program<'_>) -> ScanResult {
    self.visit_program(program);

    for (exported, local) in std::mem::take(&mut self.export_list) {
      let binding = match self.result.named_imports.get(&local) {
        Some(import) => ExportBinding::re_export(exported.clone(), import.record_id, import.imported.clone()),
        None => ExportBinding::local(exported.clone(), local),
      };
      self.add_named_export(exported, binding);
    }

    self.result
  }

  fn is_root_symbol(&self, symbol_id: SymbolId) -> bool {
    self.scoping.symbol_scope_id(symbol_id) == self.root_scope_id
  }

  fn add_import_record(
    &mut self,
    specifier: &str,
    kind: ImportKind,
    span: Span,
    meta: ImportRecordMeta,
  ) -> ImportRecordIdx {
    let record = RawImportRecord::new(specifier.into(), kind, span, self.current_stmt_idx)
      .with_meta(meta);
    let id = self.result.import_records.push(record);
    self.current_stmt_info.import_records.push(id);
    id
  }

  fn add_named_export(&mut self, exported: Rstr, binding: ExportBinding) {
    if self.result.named_exports.contains_key(&exported) {
      self
        .result
        .warnings
        .push(anyhow::anyhow!("Duplicate export {exported:?} in {}, the first one wins", self.module_id));
      return;
    }
    self.result.named_exports.insert(exported, binding);
  }

  fn scan_stmt(&mut self, stmt: &Statement<'_>) {
    match stmt {
      Statement::ImportDeclaration(decl) => self.scan_import_decl(decl),
      Statement::ExportAllDeclaration(decl) => self.scan_export_all_decl(decl),
      Statement::ExportNamedDeclaration(decl) => self.scan_export_named_decl(decl),
      Statement::ExportDefaultDeclaration(decl) => {
        self.scan_export_default_decl(decl);
      }
      _ => self.visit_statement(stmt),
    }
  }

  fn scan_import_decl(&mut self, decl: &ImportDeclaration<'_>) {
    self.current_stmt_info.kind = StmtKind::Import;
    let is_plain_import = decl.specifiers.as_ref().is_none_or(|specifiers| specifiers.is_empty());
    let record_id = self.add_import_record(
      decl.source.value.as_str(),
      ImportKind::Import,
      decl.span,
      if is_plain_import { ImportRecordMeta::IS_PLAIN_IMPORT } else { ImportRecordMeta::empty() },
    );

    for specifier in decl.specifiers.iter().flatten() {
      let (local, imported) = match specifier {
        ImportDeclarationSpecifier::ImportSpecifier(spec) => {
          (&spec.local, Specifier::Literal(spec.imported.name().as_str().into()))
        }
        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
          (&spec.local, Specifier::Literal("default".into()))
        }
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => (&spec.local, Specifier::Star),
      };
      self
        .result
        .named_imports
        .insert(local.name.as_str().into(), NamedImport { imported, record_id, span: local.span });
    }
  }

  fn scan_export_all_decl(&mut self, decl: &ExportAllDeclaration<'_>) {
    self.current_stmt_info.kind = StmtKind::ExportFrom;
    let specifier = decl.source.value.as_str();
    match &decl.exported {
      Some(exported) => {
        let record_id = self.add_import_record(
          specifier,
          ImportKind::Import,
          decl.span,
          ImportRecordMeta::IS_RE_EXPORT,
        );
        let exported: Rstr = exported.name().as_str().into();
        self.add_named_export(
          exported.clone(),
          ExportBinding::re_export(exported, record_id, Specifier::Star),
        );
      }
      None => {
        self.add_import_record(
          specifier,
          ImportKind::Import,
          decl.span,
          ImportRecordMeta::IS_EXPORT_STAR,
        );
        self.result.meta.insert(EcmaViewMeta::HAS_STAR_EXPORT);
      }
    }
  }

  fn scan_export_named_decl(&mut self, decl: &ExportNamedDeclaration<'_>) {
    if let Some(source) = &decl.source {
      self.current_stmt_info.kind = StmtKind::ExportFrom;
      let record_id = self.add_import_record(
        source.value.as_str(),
        ImportKind::Import,
        decl.span,
        ImportRecordMeta::IS_RE_EXPORT,
      );
      for spec in &decl.specifiers {
        let exported: Rstr = spec.exported.name().as_str().into();
        let imported = Specifier::Literal(spec.local.name().as_str().into());
        self.add_named_export(exported.clone(), ExportBinding::re_export(exported, record_id, imported));
      }
    } else if let Some(declaration) = &decl.declaration {
      self.scan_export_declaration(declaration);
    } else {
      self.current_stmt_info.kind = StmtKind::ExportList;
      for spec in &decl.specifiers {
        self
          .export_list
          .push((spec.exported.name().as_str().into(), spec.local.name().as_str().into()));
      }
    }
  }

  fn scan_export_declaration(&mut self, declaration: &Declaration<'_>) {
    self.current_stmt_info.kind =
      StmtKind::ExportDeclaration { declaration_start: declaration.span().start };
    self.visit_declaration(declaration);
    for name in self.current_stmt_info.declared_names.clone() {
      self.add_named_export(name.clone(), ExportBinding::local(name.clone(), name));
    }
  }

  fn scan_export_default_decl(&mut self, decl: &ExportDefaultDeclaration<'_>) {
    match &decl.declaration {
      ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
        self.visit_function(func, ScopeFlags::Function);
        self.bind_default_declaration(func.span.start, func.id.as_ref());
      }
      ExportDefaultDeclarationKind::ClassDeclaration(class) => {
        self.visit_class(class);
        self.bind_default_declaration(class.span.start, class.id.as_ref());
      }
      // Type only.
      ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
        self.current_stmt_info.kind = StmtKind::ExportList;
      }
      kind => {
        if let Some(expr) = kind.as_expression() {
          self.bind_default_expression(expr);
        }
      }
    }
  }

  fn bind_default_declaration(&mut self, declaration_start: u32, id: Option<&BindingIdentifier>) {
    let (local, anonymous): (Rstr, bool) = match id {
      Some(id) => (id.name.as_str().into(), false),
      None => {
        self.current_stmt_info.declare(DEFAULT_EXPORT_LOCAL.into());
        (DEFAULT_EXPORT_LOCAL.into(), true)
      }
    };
    self.current_stmt_info.kind =
      StmtKind::ExportDefaultDeclaration { declaration_start, anonymous };
    self.add_named_export("default".into(), ExportBinding::local("default".into(), local));
  }

  fn bind_default_expression(&mut self, expr: &Expression<'_>) {
    self.current_stmt_info.kind =
      StmtKind::ExportDefaultExpression { expression_start: expr.span().start };
    self.current_stmt_info.declare(DEFAULT_EXPORT_LOCAL.into());
    self.visit_expression(expr);
    self.add_named_export(
      "default".into(),
      ExportBinding::local("default".into(), DEFAULT_EXPORT_LOCAL.into()),
    );
  }
}

/// `'./a'` or `` `./a` `` without substitutions.
fn static_specifier<'a>(expr: &'a Expression<'_>) -> Option<&'a str> {
  match expr {
    Expression::StringLiteral(literal) => Some(literal.value.as_str()),
    Expression::TemplateLiteral(template) if template.expressions.is_empty() => {
      template.quasis.first().and_then(|quasi| quasi.value.cooked.as_ref()).map(|cooked| cooked.as_str())
    }
    _ => None,
  }
}

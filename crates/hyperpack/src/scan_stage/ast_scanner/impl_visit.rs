use hyperpack_common::{
  DynamicImportSite, EcmaViewMeta, ImportKind, ImportRecordMeta, ImportRef, ImportRefKind,
  StmtInfo, StmtInfoIdx, StmtKind,
};
use hyperpack_utils::rstr::Rstr;
use oxc::{
  ast::ast::{
    self, BindingIdentifier, CallExpression, Expression, IdentifierReference, ImportExpression,
    ObjectProperty, TaggedTemplateExpression,
  },
  ast_visit::{Visit, walk},
  span::{GetSpan, Span},
};

use super::{AstScanner, side_effect_detector::SideEffectDetector, static_specifier};

impl<'a> Visit<'a> for AstScanner<'_> {
  fn visit_program(&mut self, program: &ast::Program<'a>) {
    let detector = SideEffectDetector::new(self.scoping);
    for stmt in &program.body {
      self.current_stmt_idx = StmtInfoIdx::new(self.result.stmt_infos.len());
      self.current_stmt_info = StmtInfo::new(stmt.span(), StmtKind::Normal);
      self.current_stmt_info.side_effect = detector.detect_side_effect_of_stmt(stmt);

      self.scan_stmt(stmt);

      let stmt_info =
        std::mem::replace(&mut self.current_stmt_info, StmtInfo::new(Span::default(), StmtKind::Normal));
      if stmt_info.side_effect {
        self.result.meta.insert(EcmaViewMeta::HAS_SIDE_EFFECTS);
      }
      self.result.stmt_infos.add_stmt_info(stmt_info);
    }
  }

  fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
    if ident.symbol_id.get().is_some_and(|symbol_id| self.is_root_symbol(symbol_id)) {
      self.current_stmt_info.declare(ident.name.as_str().into());
    }
  }

  fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
    let Some(symbol_id) = ident
      .reference_id
      .get()
      .and_then(|reference_id| self.scoping.get_reference(reference_id).symbol_id())
    else {
      return;
    };
    if !self.is_root_symbol(symbol_id) {
      return;
    }

    let name: Rstr = ident.name.as_str().into();
    if self.scoping.symbol_flags(symbol_id).is_import() {
      let kind = if self.callee_spans.contains(&ident.span) {
        ImportRefKind::Callee
      } else if self.shorthand_spans.contains(&ident.span) {
        ImportRefKind::Shorthand
      } else {
        ImportRefKind::Plain
      };
      self.current_stmt_info.import_refs.push(ImportRef { span: ident.span, local: name.clone(), kind });
    }
    self.current_stmt_info.reference(name);
  }

  fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
    if let Expression::Identifier(callee) = &expr.callee {
      self.callee_spans.insert(callee.span);
    }
    walk::walk_call_expression(self, expr);
  }

  fn visit_tagged_template_expression(&mut self, expr: &TaggedTemplateExpression<'a>) {
    if let Expression::Identifier(tag) = &expr.tag {
      self.callee_spans.insert(tag.span);
    }
    walk::walk_tagged_template_expression(self, expr);
  }

  fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
    if prop.shorthand {
      if let Expression::Identifier(value) = &prop.value {
        self.shorthand_spans.insert(value.span);
      }
    }
    walk::walk_object_property(self, prop);
  }

  fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
    match static_specifier(&expr.source) {
      Some(specifier) => {
        let record_id = self.add_import_record(
          specifier,
          ImportKind::DynamicImport,
          expr.span,
          ImportRecordMeta::empty(),
        );
        self.current_stmt_info.dynamic_imports.push(DynamicImportSite { record_id, span: expr.span });
      }
      None => {
        self.result.warnings.push(anyhow::anyhow!(
          "{}: import() with a computed specifier is left to the runtime",
          self.module_id
        ));
      }
    }
    walk::walk_import_expression(self, expr);
  }
}

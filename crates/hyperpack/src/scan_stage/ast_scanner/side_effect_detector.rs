use oxc::{
  ast::ast::{
    ArrayExpressionElement, BindingPatternKind, Class, ClassElement, Declaration,
    ExportDefaultDeclarationKind, Expression, IdentifierReference, ObjectPropertyKind,
    PropertyKey, Statement, UnaryOperator, VariableDeclaration, VariableDeclarationKind,
  },
  semantic::Scoping,
};

/// Globals whose plain read can't throw or run user code.
const KNOWN_GLOBALS: &[&str] = &[
  "undefined",
  "NaN",
  "Infinity",
  "globalThis",
  "Object",
  "Array",
  "String",
  "Number",
  "Boolean",
  "Symbol",
  "BigInt",
  "Math",
  "JSON",
  "Date",
  "RegExp",
  "Error",
  "TypeError",
  "RangeError",
  "Map",
  "Set",
  "WeakMap",
  "WeakSet",
  "Promise",
  "Reflect",
  "Proxy",
  "console",
];

/// Decides conservatively whether evaluating a top-level statement is observable.
pub struct SideEffectDetector<'a> {
  scoping: &'a Scoping,
}

impl<'a> SideEffectDetector<'a> {
  pub fn new(scoping: &'a Scoping) -> Self {
    Self { scoping }
  }

  fn is_unresolved_reference(&self, ident: &IdentifierReference) -> bool {
    ident
      .reference_id
      .get()
      .is_none_or(|reference_id| self.scoping.get_reference(reference_id).symbol_id().is_none())
  }

  fn detect_side_effect_of_identifier(&self, ident: &IdentifierReference) -> bool {
    self.is_unresolved_reference(ident) && !KNOWN_GLOBALS.contains(&ident.name.as_str())
  }

  fn detect_side_effect_of_property_key(&self, key: &PropertyKey, computed: bool) -> bool {
    computed && key.as_expression().is_some_and(|expr| self.detect_side_effect_of_expr(expr))
  }

  fn detect_side_effect_of_class(&self, class: &Class) -> bool {
    if !class.decorators.is_empty() {
      return true;
    }

    if class.super_class.as_ref().is_some_and(|expr| self.detect_side_effect_of_expr(expr)) {
      return true;
    }

    class.body.body.iter().any(|element| match element {
      ClassElement::StaticBlock(block) => {
        block.body.iter().any(|stmt| self.detect_side_effect_of_stmt(stmt))
      }
      ClassElement::MethodDefinition(method) => {
        !method.decorators.is_empty()
          || self.detect_side_effect_of_property_key(&method.key, method.computed)
      }
      ClassElement::PropertyDefinition(property) => {
        !property.decorators.is_empty()
          || self.detect_side_effect_of_property_key(&property.key, property.computed)
          || (property.r#static
            && property.value.as_ref().is_some_and(|value| self.detect_side_effect_of_expr(value)))
      }
      ClassElement::AccessorProperty(property) => {
        !property.decorators.is_empty()
          || self.detect_side_effect_of_property_key(&property.key, property.computed)
          || (property.r#static
            && property.value.as_ref().is_some_and(|value| self.detect_side_effect_of_expr(value)))
      }
      ClassElement::TSIndexSignature(_) => false,
    })
  }

  pub fn detect_side_effect_of_expr(&self, expr: &Expression) -> bool {
    match expr {
      Expression::BooleanLiteral(_)
      | Expression::NullLiteral(_)
      | Expression::NumericLiteral(_)
      | Expression::BigIntLiteral(_)
      | Expression::RegExpLiteral(_)
      | Expression::StringLiteral(_)
      | Expression::FunctionExpression(_)
      | Expression::ArrowFunctionExpression(_) => false,
      Expression::Identifier(ident) => self.detect_side_effect_of_identifier(ident),
      Expression::ClassExpression(class) => self.detect_side_effect_of_class(class),
      Expression::TemplateLiteral(template) => {
        template.expressions.iter().any(|expr| self.detect_side_effect_of_expr(expr))
      }
      Expression::ObjectExpression(object) => object.properties.iter().any(|property| {
        match property {
          ObjectPropertyKind::ObjectProperty(property) => {
            self.detect_side_effect_of_property_key(&property.key, property.computed)
              || self.detect_side_effect_of_expr(&property.value)
          }
          // Spreading runs getters.
          ObjectPropertyKind::SpreadProperty(_) => true,
        }
      }),
      Expression::ArrayExpression(array) => array.elements.iter().any(|element| match element {
        ArrayExpressionElement::SpreadElement(_) => true,
        ArrayExpressionElement::Elision(_) => false,
        _ => element.as_expression().is_some_and(|expr| self.detect_side_effect_of_expr(expr)),
      }),
      Expression::ParenthesizedExpression(paren) => {
        self.detect_side_effect_of_expr(&paren.expression)
      }
      Expression::SequenceExpression(sequence) => {
        sequence.expressions.iter().any(|expr| self.detect_side_effect_of_expr(expr))
      }
      Expression::ConditionalExpression(cond) => {
        self.detect_side_effect_of_expr(&cond.test)
          || self.detect_side_effect_of_expr(&cond.consequent)
          || self.detect_side_effect_of_expr(&cond.alternate)
      }
      Expression::LogicalExpression(logical) => {
        self.detect_side_effect_of_expr(&logical.left)
          || self.detect_side_effect_of_expr(&logical.right)
      }
      Expression::UnaryExpression(unary) => match unary.operator {
        // `typeof` never throws, even on an undeclared name.
        UnaryOperator::Typeof if matches!(unary.argument, Expression::Identifier(_)) => false,
        UnaryOperator::Typeof | UnaryOperator::Void | UnaryOperator::LogicalNot => {
          self.detect_side_effect_of_expr(&unary.argument)
        }
        // `-1`, `+0`, `~0`: coercing a primitive literal runs no user code.
        UnaryOperator::UnaryNegation | UnaryOperator::UnaryPlus | UnaryOperator::BitwiseNot => {
          !is_primitive_literal(&unary.argument)
        }
        UnaryOperator::Delete => true,
      },
      Expression::BinaryExpression(binary) => {
        !(is_primitive_literal(&binary.left) && is_primitive_literal(&binary.right))
      }
      _ => true,
    }
  }

  fn detect_side_effect_of_var_decl(&self, decl: &VariableDeclaration) -> bool {
    if matches!(decl.kind, VariableDeclarationKind::Using | VariableDeclarationKind::AwaitUsing) {
      return true;
    }
    decl.declarations.iter().any(|declarator| {
      match &declarator.id.kind {
        BindingPatternKind::BindingIdentifier(_) => {
          declarator.init.as_ref().is_some_and(|init| self.detect_side_effect_of_expr(init))
        }
        // Destructuring runs getters and iterators.
        _ => true,
      }
    })
  }

  fn detect_side_effect_of_decl(&self, decl: &Declaration) -> bool {
    match decl {
      Declaration::VariableDeclaration(decl) => self.detect_side_effect_of_var_decl(decl),
      Declaration::FunctionDeclaration(_) => false,
      Declaration::ClassDeclaration(class) => self.detect_side_effect_of_class(class),
      Declaration::TSTypeAliasDeclaration(_)
      | Declaration::TSInterfaceDeclaration(_)
      | Declaration::TSEnumDeclaration(_)
      | Declaration::TSModuleDeclaration(_)
      | Declaration::TSImportEqualsDeclaration(_) => false,
    }
  }

  pub fn detect_side_effect_of_stmt(&self, stmt: &Statement) -> bool {
    match stmt {
      Statement::EmptyStatement(_)
      | Statement::FunctionDeclaration(_)
      | Statement::ImportDeclaration(_)
      | Statement::ExportAllDeclaration(_)
      | Statement::TSTypeAliasDeclaration(_)
      | Statement::TSInterfaceDeclaration(_) => false,
      Statement::VariableDeclaration(decl) => self.detect_side_effect_of_var_decl(decl),
      Statement::ClassDeclaration(class) => self.detect_side_effect_of_class(class),
      Statement::ExpressionStatement(expr) => self.detect_side_effect_of_expr(&expr.expression),
      Statement::BlockStatement(block) => {
        block.body.iter().any(|stmt| self.detect_side_effect_of_stmt(stmt))
      }
      Statement::ExportNamedDeclaration(decl) => {
        decl.declaration.as_ref().is_some_and(|decl| self.detect_side_effect_of_decl(decl))
      }
      Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(_)
        | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => false,
        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
          self.detect_side_effect_of_class(class)
        }
        kind => kind.as_expression().is_none_or(|expr| self.detect_side_effect_of_expr(expr)),
      },
      _ => true,
    }
  }
}

fn is_primitive_literal(expr: &Expression) -> bool {
  match expr {
    Expression::BooleanLiteral(_)
    | Expression::NullLiteral(_)
    | Expression::NumericLiteral(_)
    | Expression::BigIntLiteral(_)
    | Expression::StringLiteral(_) => true,
    Expression::ParenthesizedExpression(paren) => is_primitive_literal(&paren.expression),
    Expression::UnaryExpression(unary) => {
      matches!(unary.operator, UnaryOperator::UnaryNegation | UnaryOperator::UnaryPlus)
        && is_primitive_literal(&unary.argument)
    }
    _ => false,
  }
}

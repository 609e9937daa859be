use arcstr::ArcStr;
use hyperpack_common::ImportKind;
use oxc::{allocator::Allocator, ast::ast::Program};

/// Result of a hook. `Passthrough` hands the decision to the next plugin, then to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome<T> {
  Override(T),
  Passthrough,
}

impl<T> HookOutcome<T> {
  pub fn into_override(self) -> Option<T> {
    match self {
      Self::Override(value) => Some(value),
      Self::Passthrough => None,
    }
  }

  pub fn is_override(&self) -> bool {
    matches!(self, Self::Override(_))
  }
}

pub type HookResult<T> = anyhow::Result<HookOutcome<T>>;

#[derive(Debug, Clone, Copy)]
pub struct HookResolveArgs<'a> {
  pub specifier: &'a str,
  pub importer: Option<&'a str>,
  pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOverride {
  pub id: ArcStr,
  pub external: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct HookLoadArgs<'a> {
  pub id: &'a str,
}

/// Mutable access to a parsed module. Report `Override(())` after changing the program.
pub struct HookTransformArgs<'ast, 'a> {
  pub id: &'a str,
  pub allocator: &'ast Allocator,
  pub program: &'a mut Program<'ast>,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderedChunk<'a> {
  pub name: &'a str,
  pub filename: &'a str,
  pub code: &'a str,
  pub is_entry: bool,
  /// Registry slots of the modules in the chunk.
  pub modules: &'a [String],
}

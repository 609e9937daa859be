pub mod program_cell;

use std::fmt::Debug;

use arcstr::ArcStr;
use oxc::{allocator::Allocator, ast::ast::Program, span::SourceType};

use self::program_cell::ProgramCell;

/// A parsed module. Use `ast.program.with_mut(|fields| ...)` to reach `&mut Program`.
pub struct EcmaAst {
  pub program: ProgramCell,
  pub source_type: SourceType,
}

impl EcmaAst {
  pub fn source(&self) -> &ArcStr {
    &self.program.borrow_owner().source
  }

  pub fn allocator(&self) -> &Allocator {
    &self.program.borrow_owner().allocator
  }

  pub fn program(&self) -> &Program {
    &self.program.borrow_dependent().program
  }
}

impl Debug for EcmaAst {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EcmaAst")
      .field("source_type", &self.source_type)
      .field("source", &self.source())
      .finish_non_exhaustive()
  }
}

// The allocator is only touched through `&mut self` or from the owning task.
unsafe impl Send for EcmaAst {}
unsafe impl Sync for EcmaAst {}

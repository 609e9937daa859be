mod diagnostic;
mod import_chain;

use std::{
  fmt::Display,
  ops::{Deref, DerefMut},
};

pub use crate::{
  diagnostic::{
    BuildDiagnostic, EmitError, GraphError, ParseError, ResolutionError, ResolutionErrorKind,
  },
  import_chain::ImportChain,
};

#[derive(Debug)]
pub struct BuildError(pub Vec<BuildDiagnostic>);

impl BuildError {
  pub fn is_cancelled(&self) -> bool {
    self.0.iter().any(|diagnostic| matches!(diagnostic, BuildDiagnostic::Cancelled))
  }
}

impl Deref for BuildError {
  type Target = Vec<BuildDiagnostic>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (index, diagnostic) in self.0.iter().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      write!(f, "{diagnostic}")?;
    }
    Ok(())
  }
}

impl std::error::Error for BuildError {}

impl From<BuildDiagnostic> for BuildError {
  fn from(error: BuildDiagnostic) -> Self {
    Self(vec![error])
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(vec![BuildDiagnostic::Other(error)])
  }
}

macro_rules! impl_from_diagnostic {
  ($($ty:ty),*) => {
    $(impl From<$ty> for BuildError {
      fn from(error: $ty) -> Self {
        Self(vec![BuildDiagnostic::from(error)])
      }
    })*
  };
}

impl_from_diagnostic!(ResolutionError, ParseError, GraphError, EmitError);

impl From<Vec<BuildDiagnostic>> for BuildError {
  fn from(errors: Vec<BuildDiagnostic>) -> Self {
    Self(errors)
  }
}

pub type BuildResult<T> = anyhow::Result<T, BuildError>;

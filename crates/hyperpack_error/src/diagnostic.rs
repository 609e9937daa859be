use thiserror::Error;

use crate::ImportChain;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionErrorKind {
  #[error("could not be found")]
  NotFound,
  #[error("is ambiguous, candidates: {}", candidates.join(", "))]
  Ambiguous { candidates: Vec<String> },
  #[error("is an alias that resolves to itself: {}", path.join(" -> "))]
  CyclicAlias { path: Vec<String> },
}

#[derive(Debug, Clone, Error)]
#[error("Could not resolve \"{specifier}\"{}: it {kind}{chain}", importer.as_ref().map(|importer| format!(" from {importer}")).unwrap_or_default())]
pub struct ResolutionError {
  pub kind: ResolutionErrorKind,
  pub specifier: String,
  pub importer: Option<String>,
  pub chain: ImportChain,
}

#[derive(Debug, Clone, Error)]
#[error("Failed to parse {module}:{line}:{column}: {message}{chain}")]
pub struct ParseError {
  pub module: String,
  pub message: String,
  /// 1-based.
  pub line: usize,
  /// 1-based, counted in chars.
  pub column: usize,
  pub chain: ImportChain,
}

impl ParseError {
  pub fn at_offset(module: &str, message: String, source: &str, offset: usize) -> Self {
    let (line, column) = line_column(source, offset);
    Self { module: module.to_string(), message, line, column, chain: ImportChain::default() }
  }
}

/// Builder and tree-shaker disagree about the module graph.
#[derive(Debug, Clone, Error)]
#[error("Inconsistent module graph at {module}: {message}")]
pub struct GraphError {
  pub module: String,
  pub message: String,
}

/// A live reference points at a module that was eliminated or never placed in a chunk.
#[derive(Debug, Clone, Error)]
#[error("Failed to emit {module}: {message}")]
pub struct EmitError {
  pub module: String,
  pub message: String,
}

#[derive(Debug, Error)]
pub enum BuildDiagnostic {
  #[error(transparent)]
  Resolution(#[from] ResolutionError),
  #[error(transparent)]
  Parse(#[from] ParseError),
  #[error(transparent)]
  Graph(#[from] GraphError),
  #[error(transparent)]
  Emit(#[from] EmitError),
  #[error("Build was cancelled")]
  Cancelled,
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl BuildDiagnostic {
  /// Attaches the import chain to diagnostics that carry one.
  #[must_use]
  pub fn with_chain(mut self, new_chain: &ImportChain) -> Self {
    match &mut self {
      Self::Resolution(ResolutionError { chain, .. }) | Self::Parse(ParseError { chain, .. }) => {
        chain.clone_from(new_chain);
      }
      Self::Graph(_) | Self::Emit(_) | Self::Cancelled | Self::Other(_) => {}
    }
    self
  }
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
  let offset = offset.min(source.len());
  let prefix = source.get(..offset).unwrap_or(source);
  let line = prefix.matches('\n').count() + 1;
  let line_start = prefix.rfind('\n').map_or(0, |index| index + 1);
  let column = prefix[line_start..].chars().count() + 1;
  (line, column)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_error_location() {
    let error = ParseError::at_offset("a.js", "Unexpected token".into(), "let a;\nlet = ;", 11);
    assert_eq!((error.line, error.column), (2, 5));
    assert_eq!(error.to_string(), "Failed to parse a.js:2:5: Unexpected token");
  }

  #[test]
  fn resolution_error_message() {
    let error = ResolutionError {
      kind: ResolutionErrorKind::Ambiguous { candidates: vec!["a.js".into(), "a.ts".into()] },
      specifier: "./a".into(),
      importer: Some("src/main.js".into()),
      chain: ImportChain::default().extend("src/main.js"),
    };
    assert_eq!(
      error.to_string(),
      "Could not resolve \"./a\" from src/main.js: it is ambiguous, candidates: a.js, a.ts\n  import chain: src/main.js"
    );
  }
}

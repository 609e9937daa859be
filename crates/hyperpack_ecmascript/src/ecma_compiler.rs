use std::path::Path;

use arcstr::ArcStr;
use hyperpack_error::{BuildResult, ParseError};
use oxc::{
  allocator::Allocator,
  codegen::{Codegen, CodegenOptions, CodegenReturn},
  diagnostics::OxcDiagnostic,
  minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions},
  parser::Parser,
  semantic::{Scoping, SemanticBuilder},
  span::SourceType,
  transformer::{ESTarget, TransformOptions, Transformer},
};

use crate::ecma_ast::{
  EcmaAst,
  program_cell::{ProgramCell, ProgramCellDependent, ProgramCellOwner},
};

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Parses `source`. The first syntax error becomes a `ParseError` located in `filename`.
  pub fn parse(
    filename: &str,
    source: impl Into<ArcStr>,
    source_type: SourceType,
  ) -> BuildResult<EcmaAst> {
    let allocator = Allocator::default();
    let owner = ProgramCellOwner { source: source.into(), allocator };
    let program = ProgramCell::try_new(owner, |owner| {
      let ret = Parser::new(&owner.allocator, &owner.source, source_type).parse();
      match ret.errors.into_iter().next() {
        Some(error) => Err(to_parse_error(filename, &owner.source, &error)),
        None => Ok(ProgramCellDependent { program: ret.program }),
      }
    })?;

    Ok(EcmaAst { program, source_type })
  }

  pub fn print(ast: &EcmaAst) -> CodegenReturn {
    Codegen::new().build(ast.program())
  }

  pub fn scoping(ast: &EcmaAst) -> Scoping {
    SemanticBuilder::new().build(ast.program()).semantic.into_scoping()
  }

  /// Erases TypeScript syntax in place. The spans of the result no longer match the source,
  /// so callers print and re-parse it before scanning.
  pub fn strip_types(filename: &str, ast: &mut EcmaAst) -> BuildResult<()> {
    let scoping = Self::scoping(ast);
    let options = TransformOptions::from(ESTarget::ESNext);
    let errors = ast.program.with_mut(|fields| {
      Transformer::new(fields.allocator, Path::new(filename), &options)
        .build_with_scoping(scoping, fields.program)
        .errors
    });
    if let Some(error) = errors.first() {
      return Err(to_parse_error(filename, ast.source(), error).into());
    }
    ast.source_type = SourceType::mjs();
    Ok(())
  }

  /// Prints `ast` and parses the output again as a plain ECMAScript module.
  pub fn reparse(filename: &str, ast: &EcmaAst) -> BuildResult<EcmaAst> {
    let code = Self::print(ast).code;
    Self::parse(filename, code, SourceType::mjs())
  }

  /// Minifies a rendered chunk. Chunks are scripts, so top-level names are kept.
  pub fn minify(filename: &str, source_text: &str) -> BuildResult<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source_text, SourceType::cjs()).parse();
    if let Some(error) = ret.errors.first() {
      return Err(to_parse_error(filename, source_text, error).into());
    }
    let program = allocator.alloc(ret.program);

    let ret = Minifier::new(MinifierOptions {
      mangle: Some(MangleOptions::default()),
      compress: Some(CompressOptions::default()),
    })
    .build(&allocator, program);

    let ret = Codegen::new()
      .with_options(CodegenOptions { minify: true, ..CodegenOptions::default() })
      .with_scoping(ret.scoping)
      .build(program);

    Ok(ret.code)
  }
}

fn to_parse_error(filename: &str, source: &str, error: &OxcDiagnostic) -> ParseError {
  let offset = error
    .labels
    .as_ref()
    .and_then(|labels| labels.first())
    .map_or(0, |label| label.offset());
  ParseError::at_offset(filename, error.to_string(), source, offset)
}

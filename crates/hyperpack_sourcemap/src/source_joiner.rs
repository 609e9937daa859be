use std::ops::Range;

use oxc_sourcemap::{SourceMap, SourceMapBuilder};

use crate::lines_count::end_position;

/// Concatenates generated code and, when enabled, the mappings of the pieces that carry one.
pub struct SourceJoiner {
  code: String,
  builder: Option<SourceMapBuilder>,
  line: u32,
  column: u32,
}

impl SourceJoiner {
  pub fn new(with_sourcemap: bool) -> Self {
    Self { code: String::new(), builder: with_sourcemap.then(SourceMapBuilder::default), line: 0, column: 0 }
  }

  pub fn append_raw(&mut self, text: &str) {
    self.code.push_str(text);
    self.advance(text);
  }

  /// Appends `rendered[range]`. `map` describes the whole of `rendered`; only its tokens
  /// inside `range` are kept, moved to where the slice lands.
  pub fn append_mapped(&mut self, rendered: &str, range: Range<usize>, map: Option<&SourceMap>) {
    if let (Some(builder), Some(map)) = (self.builder.as_mut(), map) {
      let start = end_position(&rendered[..range.start]);
      let end = end_position(&rendered[..range.end]);
      let mut sources: Vec<(u32, u32)> = vec![];

      for token in map.get_tokens() {
        let position = (token.get_dst_line(), token.get_dst_col());
        if position < start || position >= end {
          continue;
        }
        let line = self.line + position.0 - start.0;
        let column =
          if position.0 == start.0 { self.column + position.1 - start.1 } else { position.1 };

        let source_id = token.get_source_id().and_then(|id| {
          if let Some((_, mapped)) = sources.iter().find(|(from, _)| *from == id) {
            return Some(*mapped);
          }
          let source = map.get_source(id)?;
          let mapped = builder
            .set_source_and_content(source, map.get_source_content(id).unwrap_or_default());
          sources.push((id, mapped));
          Some(mapped)
        });
        let name_id =
          token.get_name_id().and_then(|id| map.get_name(id)).map(|name| builder.add_name(name));

        builder.add_token(line, column, token.get_src_line(), token.get_src_col(), source_id, name_id);
      }
    }

    let text = &rendered[range];
    self.code.push_str(text);
    self.advance(text);
  }

  fn advance(&mut self, text: &str) {
    let (lines, column) = end_position(text);
    if lines == 0 {
      self.column += column;
    } else {
      self.line += lines;
      self.column = column;
    }
  }

  /// `file` is recorded as the `file` field of the map.
  pub fn join(self, file: &str) -> (String, Option<SourceMap>) {
    let map = self.builder.map(|mut builder| {
      builder.set_file(file);
      builder.into_sourcemap()
    });
    (self.code, map)
  }
}

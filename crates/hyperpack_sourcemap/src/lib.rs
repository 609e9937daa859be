mod lines_count;
mod source_joiner;

pub use lines_count::{end_position, lines_count};
pub use oxc_sourcemap::{SourceMap, SourceMapBuilder};
pub use source_joiner::SourceJoiner;

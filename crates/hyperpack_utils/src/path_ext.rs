use std::{borrow::Cow, path::Path};

/// Names used for directory imports. A module named like this is represented by its directory.
const DIRECTORY_MODULE_STEMS: [&str; 2] = ["index", "mod"];

pub trait PathExt {
  /// A short human-readable name for chunk and file naming. Not a valid identifier in general.
  fn representative_file_name(&self) -> Cow<str>;
}

impl PathExt for Path {
  fn representative_file_name(&self) -> Cow<str> {
    let Some(stem) = self.file_stem() else {
      return self.to_string_lossy();
    };
    let stem = stem.to_string_lossy();
    if !DIRECTORY_MODULE_STEMS.contains(&&*stem) {
      return stem;
    }
    match self.parent().and_then(Path::file_name) {
      Some(dir) => dir.to_string_lossy(),
      None => stem,
    }
  }
}

use std::{fmt::Display, path::Path};

use arcstr::ArcStr;
use sugar_path::SugarPath;

/// `ModuleId` is the unique string identifier of a module: its canonical path, the
/// specifier of an external module or the `wasm:` identity of a WebAssembly module.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  /// Path relative to `cwd` with `/` separators, identical across machines and os.
  pub fn stabilize(&self, cwd: &Path) -> String {
    if self.as_path().is_absolute() {
      self.relative(cwd).as_path().to_slash_lossy().into_owned()
    } else {
      self.to_string()
    }
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

#[test]
fn test_stabilize() {
  let cwd = Path::new("/project");
  assert_eq!(ModuleId::new("/project/src/a.js").stabilize(cwd), "src/a.js");
  assert_eq!(ModuleId::new("/other/b.js").stabilize(cwd), "../other/b.js");
  assert_eq!(ModuleId::new("react").stabilize(cwd), "react");
}

use std::{
  borrow::Borrow,
  fmt::{Debug, Display},
  ops::Deref,
};

use arcstr::ArcStr;

/// Cheaply clonable string used for binding and export names.
#[derive(Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rstr(ArcStr);

impl Rstr {
  pub fn new(value: &str) -> Self {
    Self(ArcStr::from(value))
  }

  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }
}

impl Deref for Rstr {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    self.as_str()
  }
}

impl Borrow<str> for Rstr {
  fn borrow(&self) -> &str {
    self.as_str()
  }
}

impl AsRef<str> for Rstr {
  fn as_ref(&self) -> &str {
    self.as_str()
  }
}

impl Debug for Rstr {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Debug::fmt(self.as_str(), f)
  }
}

impl Display for Rstr {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(self.as_str(), f)
  }
}

impl From<&str> for Rstr {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

impl From<String> for Rstr {
  fn from(value: String) -> Self {
    Self(ArcStr::from(value))
  }
}

impl From<ArcStr> for Rstr {
  fn from(value: ArcStr) -> Self {
    Self(value)
  }
}
